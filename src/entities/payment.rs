//! Payment entity - A single payment made against a vendor's price.
//!
//! `vendor_id` is a back-reference only; the vendor owns its payments and deleting a
//! vendor removes them first.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the payment was made
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentMethod {
    /// Card payment
    #[sea_orm(string_value = "Credit Card")]
    CreditCard,
    /// Wire or ACH transfer
    #[sea_orm(string_value = "Bank Transfer")]
    BankTransfer,
    /// Cash
    #[sea_orm(string_value = "Cash")]
    Cash,
    /// Paper check
    #[sea_orm(string_value = "Check")]
    Check,
    /// Anything else
    #[sea_orm(string_value = "Other")]
    Other,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Vendor this payment was made to
    pub vendor_id: i64,
    /// Owning user
    pub user_id: String,
    /// Amount paid, always positive
    pub amount: Decimal,
    /// Date the payment was made
    pub date: Date,
    /// Payment method
    pub method: PaymentMethod,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the payment was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
