//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod checklist_item;
pub mod guest;
pub mod payment;
pub mod vendor;

// Re-export specific types to avoid conflicts
pub use checklist_item::{
    Column as ChecklistItemColumn, Entity as ChecklistItem, Model as ChecklistItemModel,
};
pub use guest::{Column as GuestColumn, Entity as Guest, Model as GuestModel, RsvpStatus};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentMethod,
};
pub use vendor::{
    Column as VendorColumn, Entity as Vendor, Model as VendorModel, VendorCategory, VendorStatus,
};
