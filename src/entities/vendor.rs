//! Vendor entity - A contracted wedding service provider.
//!
//! Each vendor carries a contracted price, the balance still owed, and a commitment
//! status. `remaining_balance` is derived from the vendor's payments and is only ever
//! written by the ledger service after a full recomputation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of service the vendor provides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum VendorCategory {
    /// Ceremony or reception venue
    #[sea_orm(string_value = "Venue")]
    Venue,
    /// Food and drink
    #[sea_orm(string_value = "Catering")]
    Catering,
    /// Photographer
    #[sea_orm(string_value = "Photography")]
    Photography,
    /// Videographer
    #[sea_orm(string_value = "Videography")]
    Videography,
    /// Flowers
    #[sea_orm(string_value = "Florist")]
    Florist,
    /// Band or DJ
    #[sea_orm(string_value = "Music")]
    Music,
    /// Wedding cake
    #[sea_orm(string_value = "Cake")]
    Cake,
    /// Decorations and rentals
    #[sea_orm(string_value = "Decor")]
    Decor,
    /// Cars, shuttles
    #[sea_orm(string_value = "Transportation")]
    Transportation,
    /// Anything else
    #[sea_orm(string_value = "Other")]
    Other,
}

/// Commitment progress with a vendor.
///
/// Loosely ordered, but not a strict pipeline: users set the early stages by hand and
/// the reconciler infers the payment-driven ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum VendorStatus {
    /// First contact made
    #[sea_orm(string_value = "Contacted")]
    Contacted,
    /// A meeting is on the calendar
    #[sea_orm(string_value = "Meeting Scheduled")]
    MeetingScheduled,
    /// Contract signed, nothing paid yet
    #[sea_orm(string_value = "Booked")]
    Booked,
    /// Some, but not all, of the price has been paid
    #[sea_orm(string_value = "Deposit Paid")]
    DepositPaid,
    /// Nothing left to pay
    #[sea_orm(string_value = "Paid in Full")]
    PaidInFull,
}

/// Vendor database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    /// Unique identifier for the vendor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Business name
    pub name: String,
    /// Service category
    pub category: VendorCategory,
    /// Person to talk to
    pub contact_name: Option<String>,
    /// Contact email address
    pub contact_email: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Contracted total cost
    pub price: Decimal,
    /// Current commitment status
    pub status: VendorStatus,
    /// `price` minus the sum of all payments; negative when overpaid
    pub remaining_balance: Decimal,
    /// Free-form notes
    pub notes: Option<String>,
    /// Optimistic-concurrency counter, bumped on every write
    pub version: i32,
    /// When the vendor was created
    pub created_at: DateTimeUtc,
    /// When the vendor was last written
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Vendor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One vendor has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
