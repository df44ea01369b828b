//! Guest entity - One invitation on the guest list and its RSVP.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// RSVP response state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// No answer yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Coming
    #[sea_orm(string_value = "attending")]
    Attending,
    /// Declined
    #[sea_orm(string_value = "not_attending")]
    NotAttending,
}

/// Guest database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    /// Unique identifier for the guest
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Guest name
    pub name: String,
    /// Email address for the invitation
    pub email: Option<String>,
    /// RSVP response
    pub rsvp_status: RsvpStatus,
    /// Whether the guest may bring a companion
    pub plus_one: bool,
    /// Dietary restrictions or meal choice
    pub dietary_notes: Option<String>,
}

/// Guests have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
