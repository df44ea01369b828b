//! Shared test utilities for the vendor ledger.
//!
//! This module provides helpers for setting up in-memory test stores, building inputs
//! with sensible defaults, and a [`FlakyStore`] wrapper that injects storage failures
//! and concurrent writes at chosen points.

#![allow(clippy::unwrap_used)]

use crate::{
    config::settings::LedgerSettings,
    core::{
        ledger::{LedgerService, PaymentInput, VendorInput, VendorLedger},
        reconcile::reconcile,
        store::{
            LedgerStore, NewChecklistItem, NewGuest, NewPayment, NewVendor, SeaOrmLedgerStore,
            VendorPatch,
        },
    },
    entities::{
        PaymentMethod, RsvpStatus, VendorCategory, VendorStatus, checklist_item, guest, payment,
        vendor,
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::{collections::HashSet, sync::Mutex};

/// Owner used by most tests.
pub const ALICE: &str = "alice";
/// A second owner, for authorization tests.
pub const BOB: &str = "bob";

/// Parses an exact money amount, e.g. `money("12.50")`.
pub fn money(amount: &str) -> Decimal {
    Decimal::from_str_exact(amount).unwrap()
}

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A store over a fresh in-memory database.
pub async fn setup_test_store() -> Result<SeaOrmLedgerStore> {
    Ok(SeaOrmLedgerStore::new(setup_test_db().await?))
}

/// A service with default settings over a fresh in-memory database.
pub async fn setup_test_service() -> Result<LedgerService<SeaOrmLedgerStore>> {
    Ok(LedgerService::new(setup_test_store().await?))
}

/// A service whose store can be told to fail.
pub async fn setup_flaky_service() -> Result<LedgerService<FlakyStore>> {
    Ok(LedgerService::new(FlakyStore::new(setup_test_store().await?)))
}

/// Same as [`setup_flaky_service`] with an explicit conflict retry budget.
pub async fn setup_flaky_service_with_retries(
    max_conflict_retries: u32,
) -> Result<LedgerService<FlakyStore>> {
    Ok(LedgerService::with_settings(
        FlakyStore::new(setup_test_store().await?),
        &LedgerSettings {
            max_conflict_retries,
        },
    ))
}

/// Store operations that [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `delete_payments_for_vendor`
    DeletePayments,
    /// `delete_vendor`
    DeleteVendor,
    /// `update_vendor`
    UpdateVendor,
}

/// Wraps a real store and fails selected operations with [`Error::TransientIo`].
///
/// Failures stay armed until [`FlakyStore::clear_failures`]. An interleaved payment
/// fires once, on the next vendor write. An interleaved edit fires once, right after
/// the next vendor listing.
#[derive(Debug)]
pub struct FlakyStore {
    inner: SeaOrmLedgerStore,
    failing: Mutex<HashSet<FailPoint>>,
    interleaved: Mutex<Option<(i64, Decimal)>>,
    edited: Mutex<Option<i64>>,
}

impl FlakyStore {
    /// Wraps `inner` with no failures armed.
    pub fn new(inner: SeaOrmLedgerStore) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            interleaved: Mutex::new(None),
            edited: Mutex::new(None),
        }
    }

    /// Makes every call to `point` fail until cleared.
    pub fn fail_on(&self, point: FailPoint) {
        self.failing.lock().unwrap().insert(point);
    }

    /// Disarms all failures.
    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Simulates another session paying `amount` to `vendor_id` between this
    /// session's read and its next vendor write.
    pub fn interleave_payment(&self, vendor_id: i64, amount: impl Into<Decimal>) {
        *self.interleaved.lock().unwrap() = Some((vendor_id, amount.into()));
    }

    /// Simulates another session editing `vendor_id`'s notes right after this
    /// session listed the vendors.
    pub fn edit_after_listing(&self, vendor_id: i64) {
        *self.edited.lock().unwrap() = Some(vendor_id);
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.failing.lock().unwrap().contains(&point) {
            return Err(Error::TransientIo {
                message: format!("injected failure at {point:?}"),
            });
        }
        Ok(())
    }

    async fn run_interleaved(&self, user_id: &str, vendor_id: i64) -> Result<()> {
        let pending = self
            .interleaved
            .lock()
            .unwrap()
            .take_if(|(id, _)| *id == vendor_id);
        let Some((_, amount)) = pending else {
            return Ok(());
        };

        self.inner
            .insert_payment(user_id, new_payment(vendor_id, amount))
            .await?;
        let current = self.inner.get_vendor(user_id, vendor_id).await?;
        let payments = self.inner.get_payments(user_id, vendor_id).await?;
        let reconciliation = reconcile(current.price, &payments, current.status);
        self.inner
            .update_vendor(
                user_id,
                vendor_id,
                current.version,
                VendorPatch {
                    status: Some(reconciliation.status),
                    remaining_balance: Some(reconciliation.remaining_balance),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for FlakyStore {
    async fn get_vendors(&self, user_id: &str) -> Result<Vec<vendor::Model>> {
        let vendors = self.inner.get_vendors(user_id).await?;
        let pending = self
            .edited
            .lock()
            .unwrap()
            .take_if(|id| vendors.iter().any(|v| v.id == *id));

        if let Some(vendor_id) = pending {
            let current = self.inner.get_vendor(user_id, vendor_id).await?;
            self.inner
                .update_vendor(
                    user_id,
                    vendor_id,
                    current.version,
                    VendorPatch {
                        notes: Some(Some("Edited in another session".to_string())),
                        ..Default::default()
                    },
                )
                .await?;
        }
        Ok(vendors)
    }

    async fn get_vendor(&self, user_id: &str, vendor_id: i64) -> Result<vendor::Model> {
        self.inner.get_vendor(user_id, vendor_id).await
    }

    async fn insert_vendor(&self, user_id: &str, vendor: NewVendor) -> Result<vendor::Model> {
        self.inner.insert_vendor(user_id, vendor).await
    }

    async fn update_vendor(
        &self,
        user_id: &str,
        vendor_id: i64,
        expected_version: i32,
        patch: VendorPatch,
    ) -> Result<vendor::Model> {
        self.check(FailPoint::UpdateVendor)?;
        self.run_interleaved(user_id, vendor_id).await?;
        self.inner
            .update_vendor(user_id, vendor_id, expected_version, patch)
            .await
    }

    async fn delete_vendor(&self, user_id: &str, vendor_id: i64) -> Result<()> {
        self.check(FailPoint::DeleteVendor)?;
        self.inner.delete_vendor(user_id, vendor_id).await
    }

    async fn insert_payment(&self, user_id: &str, payment: NewPayment) -> Result<payment::Model> {
        self.inner.insert_payment(user_id, payment).await
    }

    async fn get_payment(&self, user_id: &str, payment_id: i64) -> Result<payment::Model> {
        self.inner.get_payment(user_id, payment_id).await
    }

    async fn delete_payment(&self, user_id: &str, payment_id: i64) -> Result<()> {
        self.inner.delete_payment(user_id, payment_id).await
    }

    async fn get_payments(&self, user_id: &str, vendor_id: i64) -> Result<Vec<payment::Model>> {
        self.inner.get_payments(user_id, vendor_id).await
    }

    async fn delete_payments_for_vendor(&self, user_id: &str, vendor_id: i64) -> Result<u64> {
        self.check(FailPoint::DeletePayments)?;
        self.inner.delete_payments_for_vendor(user_id, vendor_id).await
    }

    async fn get_guests(&self, user_id: &str) -> Result<Vec<guest::Model>> {
        self.inner.get_guests(user_id).await
    }

    async fn insert_guest(&self, user_id: &str, guest: NewGuest) -> Result<guest::Model> {
        self.inner.insert_guest(user_id, guest).await
    }

    async fn get_checklist_items(&self, user_id: &str) -> Result<Vec<checklist_item::Model>> {
        self.inner.get_checklist_items(user_id).await
    }

    async fn insert_checklist_item(
        &self,
        user_id: &str,
        item: NewChecklistItem,
    ) -> Result<checklist_item::Model> {
        self.inner.insert_checklist_item(user_id, item).await
    }
}

/// Store-level vendor row with no payments.
///
/// # Defaults
/// * `category`: Venue
/// * `status`: Contacted
/// * `remaining_balance`: `price`
pub fn new_vendor(name: &str, price: impl Into<Decimal>) -> NewVendor {
    let price = price.into();
    NewVendor {
        name: name.to_string(),
        category: VendorCategory::Venue,
        contact_name: None,
        contact_email: None,
        contact_phone: None,
        price,
        status: VendorStatus::Contacted,
        remaining_balance: price,
        notes: None,
    }
}

/// Store-level payment row, paid by card on a fixed date.
pub fn new_payment(vendor_id: i64, amount: impl Into<Decimal>) -> NewPayment {
    NewPayment {
        vendor_id,
        amount: amount.into(),
        date: test_date(),
        method: PaymentMethod::CreditCard,
        notes: None,
    }
}

/// Guest without email, companion or dietary notes.
pub fn new_guest(name: &str, rsvp_status: RsvpStatus) -> NewGuest {
    NewGuest {
        name: name.to_string(),
        email: None,
        rsvp_status,
        plus_one: false,
        dietary_notes: None,
    }
}

/// Checklist item without a due date.
pub fn new_checklist_item(title: &str, category: &str, completed: bool) -> NewChecklistItem {
    NewChecklistItem {
        title: title.to_string(),
        category: category.to_string(),
        due_date: None,
        completed,
    }
}

/// Service-level vendor input with default category and status.
pub fn vendor_input(name: &str, price: impl Into<Decimal>) -> VendorInput {
    VendorInput {
        name: name.to_string(),
        category: VendorCategory::Venue,
        contact_name: None,
        contact_email: None,
        contact_phone: None,
        price: price.into(),
        status: None,
        notes: None,
    }
}

/// Service-level payment input, paid by card on a fixed date.
pub fn payment_input(amount: impl Into<Decimal>) -> PaymentInput {
    PaymentInput {
        amount: amount.into(),
        date: test_date(),
        method: PaymentMethod::CreditCard,
        notes: None,
    }
}

/// Creates a vendor already at `Booked`.
pub async fn create_booked_vendor<S: LedgerStore>(
    service: &LedgerService<S>,
    user_id: &str,
    name: &str,
    price: impl Into<Decimal>,
) -> Result<vendor::Model> {
    service
        .create_vendor(
            user_id,
            VendorInput {
                status: Some(VendorStatus::Booked),
                ..vendor_input(name, price)
            },
        )
        .await
}

/// Asserts that the stored balance and status agree with the stored payments.
pub async fn assert_balance_invariant<S: LedgerStore>(
    service: &LedgerService<S>,
    user_id: &str,
    vendor_id: i64,
) -> Result<()> {
    let vendor = service.store().get_vendor(user_id, vendor_id).await?;
    let payments = service.store().get_payments(user_id, vendor_id).await?;
    let expected = reconcile(vendor.price, &payments, vendor.status);

    assert_eq!(
        vendor.remaining_balance, expected.remaining_balance,
        "vendor {vendor_id} balance drifted from its payments"
    );
    assert_eq!(vendor.status, expected.status);
    Ok(())
}

/// In-memory vendor with payments, for summary tests that need no database.
pub fn ledger_fixture(id: i64, price: i64, amounts: &[i64]) -> VendorLedger {
    let now = Utc::now();
    let price = Decimal::from(price);
    let payments: Vec<payment::Model> = amounts
        .iter()
        .zip(1..)
        .map(|(&amount, n)| payment::Model {
            id: id * 100 + n,
            vendor_id: id,
            user_id: ALICE.to_string(),
            amount: Decimal::from(amount),
            date: test_date(),
            method: PaymentMethod::BankTransfer,
            notes: None,
            created_at: now,
        })
        .collect();
    let reconciliation = reconcile(price, &payments, VendorStatus::Booked);

    VendorLedger {
        vendor: vendor::Model {
            id,
            user_id: ALICE.to_string(),
            name: format!("Vendor {id}"),
            category: VendorCategory::Other,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            price,
            status: reconciliation.status,
            remaining_balance: reconciliation.remaining_balance,
            notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        },
        payments,
    }
}

/// In-memory guest.
pub fn guest_fixture(id: i64, rsvp_status: RsvpStatus) -> guest::Model {
    guest::Model {
        id,
        user_id: ALICE.to_string(),
        name: format!("Guest {id}"),
        email: None,
        rsvp_status,
        plus_one: false,
        dietary_notes: None,
    }
}

/// In-memory checklist item.
pub fn checklist_fixture(id: i64, category: &str, completed: bool) -> checklist_item::Model {
    checklist_item::Model {
        id,
        user_id: ALICE.to_string(),
        title: format!("Task {id}"),
        category: category.to_string(),
        due_date: None,
        completed,
    }
}
