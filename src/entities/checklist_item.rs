//! Checklist item entity - A planning task, grouped by free-form category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Checklist item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checklist_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// What needs doing
    pub title: String,
    /// Grouping label (e.g. "Venue", "Attire")
    pub category: String,
    /// Optional deadline
    pub due_date: Option<Date>,
    /// Whether the task is done
    pub completed: bool,
}

/// Checklist items have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
