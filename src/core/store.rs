//! Ledger store - the persistence and authorization boundary.
//!
//! [`LedgerStore`] is the contract the ledger service is written against: table-like
//! collections scoped to an owning user, where every record lookup fails with
//! [`Error::NotFound`] when the row is missing and [`Error::NotAuthorized`] when it
//! belongs to someone else. [`SeaOrmLedgerStore`] implements it over a `SeaORM`
//! connection.
//!
//! The store offers no multi-record transactions to its callers. Vendor writes are
//! guarded by an optimistic `version` column instead.

use crate::{
    entities::{
        ChecklistItem, Guest, Payment, PaymentMethod, RsvpStatus, Vendor, VendorCategory,
        VendorStatus, checklist_item, guest, payment, vendor,
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Fields of a vendor row as first inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVendor {
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
    /// Initial status
    pub status: VendorStatus,
    /// Initial balance (equal to `price` for a vendor with no payments)
    pub remaining_balance: Decimal,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Partial vendor update. Only `Some` fields are written.
///
/// Optional text columns use `Option<Option<String>>` so that a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorPatch {
    /// New business name
    pub name: Option<String>,
    /// New category
    pub category: Option<VendorCategory>,
    /// New contact name
    pub contact_name: Option<Option<String>>,
    /// New contact email
    pub contact_email: Option<Option<String>>,
    /// New contact phone
    pub contact_phone: Option<Option<String>>,
    /// New price
    pub price: Option<Decimal>,
    /// New status
    pub status: Option<VendorStatus>,
    /// Recomputed balance
    pub remaining_balance: Option<Decimal>,
    /// New notes
    pub notes: Option<Option<String>>,
}

/// Fields of a payment row as inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Vendor the payment was made to
    pub vendor_id: i64,
    /// Amount paid
    pub amount: Decimal,
    /// Date of payment
    pub date: NaiveDate,
    /// Payment method
    pub method: PaymentMethod,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Fields of a guest row as inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    /// Guest name
    pub name: String,
    /// Email address
    pub email: Option<String>,
    /// RSVP response
    pub rsvp_status: RsvpStatus,
    /// Whether the guest may bring a companion
    pub plus_one: bool,
    /// Dietary restrictions or meal choice
    pub dietary_notes: Option<String>,
}

/// Fields of a checklist row as inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChecklistItem {
    /// What needs doing
    pub title: String,
    /// Grouping label
    pub category: String,
    /// Optional deadline
    pub due_date: Option<NaiveDate>,
    /// Whether the task is done
    pub completed: bool,
}

/// Persistence collaborator for the ledger, scoped by owning user.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All vendors owned by `user_id`, ordered by name.
    async fn get_vendors(&self, user_id: &str) -> Result<Vec<vendor::Model>>;

    /// One vendor, checked for ownership.
    async fn get_vendor(&self, user_id: &str, vendor_id: i64) -> Result<vendor::Model>;

    /// Inserts a vendor owned by `user_id` at version 0.
    async fn insert_vendor(&self, user_id: &str, vendor: NewVendor) -> Result<vendor::Model>;

    /// Writes the `Some` fields of `patch` if the stored version still equals
    /// `expected_version`, bumping the version. Fails with [`Error::Conflict`] otherwise.
    async fn update_vendor(
        &self,
        user_id: &str,
        vendor_id: i64,
        expected_version: i32,
        patch: VendorPatch,
    ) -> Result<vendor::Model>;

    /// Deletes one vendor row. Payments are not touched.
    async fn delete_vendor(&self, user_id: &str, vendor_id: i64) -> Result<()>;

    /// Inserts a payment owned by `user_id`.
    async fn insert_payment(&self, user_id: &str, payment: NewPayment) -> Result<payment::Model>;

    /// One payment, checked for ownership.
    async fn get_payment(&self, user_id: &str, payment_id: i64) -> Result<payment::Model>;

    /// Deletes one payment row.
    async fn delete_payment(&self, user_id: &str, payment_id: i64) -> Result<()>;

    /// Payments of a vendor, ordered by date then id. The vendor is checked for ownership.
    async fn get_payments(&self, user_id: &str, vendor_id: i64) -> Result<Vec<payment::Model>>;

    /// Deletes every payment of a vendor, returning how many were removed. The vendor is
    /// checked for ownership.
    async fn delete_payments_for_vendor(&self, user_id: &str, vendor_id: i64) -> Result<u64>;

    /// The guest list, ordered by name.
    async fn get_guests(&self, user_id: &str) -> Result<Vec<guest::Model>>;

    /// Adds a guest.
    async fn insert_guest(&self, user_id: &str, guest: NewGuest) -> Result<guest::Model>;

    /// The checklist, ordered by due date then id.
    async fn get_checklist_items(&self, user_id: &str) -> Result<Vec<checklist_item::Model>>;

    /// Adds a checklist item.
    async fn insert_checklist_item(
        &self,
        user_id: &str,
        item: NewChecklistItem,
    ) -> Result<checklist_item::Model>;
}

/// [`LedgerStore`] backed by a `SeaORM` database connection.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Distinct user ids that own at least one vendor.
    ///
    /// Maintenance only: this deliberately crosses the per-user boundary.
    pub async fn owners(&self) -> Result<Vec<String>> {
        Vendor::find()
            .select_only()
            .column(vendor::Column::UserId)
            .distinct()
            .order_by_asc(vendor::Column::UserId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}

fn check_owner(entity: &'static str, id: i64, owner: &str, user_id: &str) -> Result<()> {
    if owner == user_id {
        Ok(())
    } else {
        Err(Error::NotAuthorized { entity, id })
    }
}

#[async_trait]
impl LedgerStore for SeaOrmLedgerStore {
    async fn get_vendors(&self, user_id: &str) -> Result<Vec<vendor::Model>> {
        Vendor::find()
            .filter(vendor::Column::UserId.eq(user_id))
            .order_by_asc(vendor::Column::Name)
            .order_by_asc(vendor::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn get_vendor(&self, user_id: &str, vendor_id: i64) -> Result<vendor::Model> {
        let vendor = Vendor::find_by_id(vendor_id)
            .one(&self.db)
            .await?
            .ok_or(Error::NotFound {
                entity: "vendor",
                id: vendor_id,
            })?;
        check_owner("vendor", vendor_id, &vendor.user_id, user_id)?;
        Ok(vendor)
    }

    #[instrument(skip(self, vendor), fields(name = %vendor.name))]
    async fn insert_vendor(&self, user_id: &str, vendor: NewVendor) -> Result<vendor::Model> {
        let now = chrono::Utc::now();
        let model = vendor::ActiveModel {
            user_id: Set(user_id.to_string()),
            name: Set(vendor.name),
            category: Set(vendor.category),
            contact_name: Set(vendor.contact_name),
            contact_email: Set(vendor.contact_email),
            contact_phone: Set(vendor.contact_phone),
            price: Set(vendor.price),
            status: Set(vendor.status),
            remaining_balance: Set(vendor.remaining_balance),
            notes: Set(vendor.notes),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = model.insert(&self.db).await?;
        debug!("Inserted vendor {}", inserted.id);
        Ok(inserted)
    }

    #[instrument(skip(self, patch))]
    async fn update_vendor(
        &self,
        user_id: &str,
        vendor_id: i64,
        expected_version: i32,
        patch: VendorPatch,
    ) -> Result<vendor::Model> {
        self.get_vendor(user_id, vendor_id).await?;

        let mut changes = vendor::ActiveModel {
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name {
            changes.name = Set(name);
        }
        if let Some(category) = patch.category {
            changes.category = Set(category);
        }
        if let Some(contact_name) = patch.contact_name {
            changes.contact_name = Set(contact_name);
        }
        if let Some(contact_email) = patch.contact_email {
            changes.contact_email = Set(contact_email);
        }
        if let Some(contact_phone) = patch.contact_phone {
            changes.contact_phone = Set(contact_phone);
        }
        if let Some(price) = patch.price {
            changes.price = Set(price);
        }
        if let Some(status) = patch.status {
            changes.status = Set(status);
        }
        if let Some(remaining_balance) = patch.remaining_balance {
            changes.remaining_balance = Set(remaining_balance);
        }
        if let Some(notes) = patch.notes {
            changes.notes = Set(notes);
        }

        // Compare-and-swap on the version column: only one writer per version wins.
        let result = Vendor::update_many()
            .set(changes)
            .col_expr(
                vendor::Column::Version,
                Expr::col(vendor::Column::Version).add(1),
            )
            .filter(vendor::Column::Id.eq(vendor_id))
            .filter(vendor::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::Conflict {
                entity: "vendor",
                id: vendor_id,
                expected_version,
            });
        }

        self.get_vendor(user_id, vendor_id).await
    }

    #[instrument(skip(self))]
    async fn delete_vendor(&self, user_id: &str, vendor_id: i64) -> Result<()> {
        self.get_vendor(user_id, vendor_id).await?;
        Vendor::delete_by_id(vendor_id).exec(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self, payment), fields(vendor_id = payment.vendor_id))]
    async fn insert_payment(&self, user_id: &str, payment: NewPayment) -> Result<payment::Model> {
        let model = payment::ActiveModel {
            vendor_id: Set(payment.vendor_id),
            user_id: Set(user_id.to_string()),
            amount: Set(payment.amount),
            date: Set(payment.date),
            method: Set(payment.method),
            notes: Set(payment.notes),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(Into::into)
    }

    async fn get_payment(&self, user_id: &str, payment_id: i64) -> Result<payment::Model> {
        let payment = Payment::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(Error::NotFound {
                entity: "payment",
                id: payment_id,
            })?;
        check_owner("payment", payment_id, &payment.user_id, user_id)?;
        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn delete_payment(&self, user_id: &str, payment_id: i64) -> Result<()> {
        self.get_payment(user_id, payment_id).await?;
        Payment::delete_by_id(payment_id).exec(&self.db).await?;
        Ok(())
    }

    async fn get_payments(&self, user_id: &str, vendor_id: i64) -> Result<Vec<payment::Model>> {
        self.get_vendor(user_id, vendor_id).await?;
        Payment::find()
            .filter(payment::Column::VendorId.eq(vendor_id))
            .filter(payment::Column::UserId.eq(user_id))
            .order_by_asc(payment::Column::Date)
            .order_by_asc(payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn delete_payments_for_vendor(&self, user_id: &str, vendor_id: i64) -> Result<u64> {
        self.get_vendor(user_id, vendor_id).await?;
        let result = Payment::delete_many()
            .filter(payment::Column::VendorId.eq(vendor_id))
            .filter(payment::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn get_guests(&self, user_id: &str) -> Result<Vec<guest::Model>> {
        Guest::find()
            .filter(guest::Column::UserId.eq(user_id))
            .order_by_asc(guest::Column::Name)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn insert_guest(&self, user_id: &str, guest: NewGuest) -> Result<guest::Model> {
        let model = guest::ActiveModel {
            user_id: Set(user_id.to_string()),
            name: Set(guest.name),
            email: Set(guest.email),
            rsvp_status: Set(guest.rsvp_status),
            plus_one: Set(guest.plus_one),
            dietary_notes: Set(guest.dietary_notes),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(Into::into)
    }

    async fn get_checklist_items(&self, user_id: &str) -> Result<Vec<checklist_item::Model>> {
        ChecklistItem::find()
            .filter(checklist_item::Column::UserId.eq(user_id))
            .order_by_asc(checklist_item::Column::DueDate)
            .order_by_asc(checklist_item::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn insert_checklist_item(
        &self,
        user_id: &str,
        item: NewChecklistItem,
    ) -> Result<checklist_item::Model> {
        let model = checklist_item::ActiveModel {
            user_id: Set(user_id.to_string()),
            title: Set(item.title),
            category: Set(item.category),
            due_date: Set(item.due_date),
            completed: Set(item.completed),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(Into::into)
    }
}
