//! Ledger service - orchestrates vendor and payment mutations.
//!
//! Every mutation that touches payments is followed by a full reconciliation of the
//! vendor (see [`crate::core::reconcile`]) and a versioned vendor write. The store has
//! no multi-record transactions, so multi-step mutations are not rolled back when a
//! later step fails: they report [`Error::PartialFailure`] and the vendor is repaired
//! by [`LedgerService::reconcile_vendor`] or by retrying the whole operation.

use crate::{
    config::settings::LedgerSettings,
    core::{
        reconcile::{Reconciliation, reconcile, reconcile_amounts},
        store::{LedgerStore, NewPayment, NewVendor, VendorPatch},
        summary::{self, ChecklistSummary, RsvpSummary, VendorTotals},
    },
    entities::{PaymentMethod, VendorCategory, VendorStatus, payment, vendor},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Input for creating a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorInput {
    /// Business name
    pub name: String,
    /// Service category
    pub category: VendorCategory,
    /// Person to talk to
    #[serde(default)]
    pub contact_name: Option<String>,
    /// Contact email address
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Contact phone number
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Contracted total cost
    pub price: Decimal,
    /// Initial status; `Contacted` when omitted
    #[serde(default)]
    pub status: Option<VendorStatus>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for editing a vendor. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorUpdate {
    /// New business name
    #[serde(default)]
    pub name: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<VendorCategory>,
    /// New contact name (`Some(None)` clears it)
    #[serde(default)]
    pub contact_name: Option<Option<String>>,
    /// New contact email (`Some(None)` clears it)
    #[serde(default)]
    pub contact_email: Option<Option<String>>,
    /// New contact phone (`Some(None)` clears it)
    #[serde(default)]
    pub contact_phone: Option<Option<String>>,
    /// New price
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Status requested by the user, still subject to reconciliation
    #[serde(default)]
    pub status: Option<VendorStatus>,
    /// New notes (`Some(None)` clears them)
    #[serde(default)]
    pub notes: Option<Option<String>>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Amount paid
    pub amount: Decimal,
    /// Date of payment
    pub date: NaiveDate,
    /// Payment method
    pub method: PaymentMethod,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A single ledger mutation, as submitted by a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerCommand {
    /// Create a vendor
    CreateVendor(VendorInput),
    /// Edit a vendor
    UpdateVendor {
        /// Vendor to edit
        vendor_id: i64,
        /// Fields to change
        update: VendorUpdate,
    },
    /// Delete a vendor and its payments
    DeleteVendor {
        /// Vendor to delete
        vendor_id: i64,
    },
    /// Record a payment
    AddPayment {
        /// Vendor being paid
        vendor_id: i64,
        /// Payment details
        payment: PaymentInput,
    },
    /// Remove a payment
    DeletePayment {
        /// Payment to remove
        payment_id: i64,
        /// Vendor the payment is expected to belong to
        vendor_id: i64,
    },
}

/// What a [`LedgerCommand`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The vendor as persisted after the command
    Vendor(vendor::Model),
    /// The new payment and the reconciled vendor
    PaymentAdded {
        /// The recorded payment
        payment: payment::Model,
        /// The vendor after reconciliation
        vendor: vendor::Model,
    },
    /// The vendor was removed along with this many payments
    VendorDeleted {
        /// Removed vendor
        vendor_id: i64,
        /// How many payments went with it
        payments_deleted: u64,
    },
}

/// A vendor together with its payments, in collection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorLedger {
    /// The vendor row
    pub vendor: vendor::Model,
    /// Its payments
    pub payments: Vec<payment::Model>,
}

/// All dashboard summaries for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Budget totals across vendors
    pub vendors: VendorTotals,
    /// Guest responses
    pub guests: RsvpSummary,
    /// Checklist progress
    pub checklist: ChecklistSummary,
}

/// Orchestrates ledger mutations on top of a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    store: S,
    max_conflict_retries: u32,
}

fn require_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "Vendor name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn require_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(Error::validation("price", "Price cannot be negative"));
    }
    Ok(())
}

fn require_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(
            "amount",
            "Payment amount must be greater than zero",
        ));
    }
    Ok(())
}

fn is_stale(vendor: &vendor::Model, reconciliation: &Reconciliation) -> bool {
    vendor.remaining_balance != reconciliation.remaining_balance
        || vendor.status != reconciliation.status
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a service with default settings.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_settings(store, &LedgerSettings::default())
    }

    /// Creates a service with explicit settings.
    #[must_use]
    pub const fn with_settings(store: S, settings: &LedgerSettings) -> Self {
        Self {
            store,
            max_conflict_retries: settings.max_conflict_retries,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates a vendor with no payments and `remaining_balance = price`.
    ///
    /// The requested status goes through reconciliation like any other write, so a
    /// free vendor starts out paid in full and an unpaid one cannot claim to be.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_vendor(&self, user_id: &str, input: VendorInput) -> Result<vendor::Model> {
        let name = require_name(&input.name)?;
        require_price(input.price)?;
        let reconciliation = reconcile_amounts(
            input.price,
            [],
            input.status.unwrap_or(VendorStatus::Contacted),
        );

        let vendor = self
            .store
            .insert_vendor(
                user_id,
                NewVendor {
                    name,
                    category: input.category,
                    contact_name: input.contact_name,
                    contact_email: input.contact_email,
                    contact_phone: input.contact_phone,
                    price: input.price,
                    status: reconciliation.status,
                    remaining_balance: reconciliation.remaining_balance,
                    notes: input.notes,
                },
            )
            .await?;

        info!("Created vendor {} ({})", vendor.id, vendor.name);
        Ok(vendor)
    }

    /// Edits a vendor and reconciles it against its existing payments.
    ///
    /// A price change recomputes the balance against what has already been paid.
    #[instrument(skip(self, update))]
    pub async fn update_vendor(
        &self,
        user_id: &str,
        vendor_id: i64,
        update: VendorUpdate,
    ) -> Result<vendor::Model> {
        let name = update.name.as_deref().map(require_name).transpose()?;
        if let Some(price) = update.price {
            require_price(price)?;
        }

        let mut attempt = 0;
        loop {
            let current = self.store.get_vendor(user_id, vendor_id).await?;
            let payments = self.store.get_payments(user_id, vendor_id).await?;
            let price = update.price.unwrap_or(current.price);
            let reconciliation =
                reconcile(price, &payments, update.status.unwrap_or(current.status));

            let patch = VendorPatch {
                name: name.clone(),
                category: update.category,
                contact_name: update.contact_name.clone(),
                contact_email: update.contact_email.clone(),
                contact_phone: update.contact_phone.clone(),
                price: Some(price),
                status: Some(reconciliation.status),
                remaining_balance: Some(reconciliation.remaining_balance),
                notes: update.notes.clone(),
            };

            match self
                .store
                .update_vendor(user_id, vendor_id, current.version, patch)
                .await
            {
                Err(Error::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!("Vendor {vendor_id} changed underneath update, retrying ({attempt})");
                }
                result => return result,
            }
        }
    }

    /// Deletes a vendor, payments first.
    ///
    /// If the payments are gone but the vendor row could not be deleted, the result is a
    /// [`Error::PartialFailure`]; the vendor still exists and the whole delete should be
    /// retried.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, user_id: &str, vendor_id: i64) -> Result<u64> {
        self.store.get_vendor(user_id, vendor_id).await?;

        let payments_deleted = self
            .store
            .delete_payments_for_vendor(user_id, vendor_id)
            .await?;

        if let Err(e) = self.store.delete_vendor(user_id, vendor_id).await {
            warn!("Vendor {vendor_id} kept after its {payments_deleted} payments were deleted: {e}");
            return Err(Error::partial(
                "delete_vendor",
                format!("{payments_deleted} payments deleted, vendor {vendor_id} remains"),
                e,
            ));
        }

        info!("Deleted vendor {vendor_id} and {payments_deleted} payments");
        Ok(payments_deleted)
    }

    /// Records a payment and reconciles the vendor.
    ///
    /// Once the payment is inserted it is never discarded: if the vendor write fails the
    /// payment stays and the error is a [`Error::PartialFailure`].
    #[instrument(skip(self, input), fields(amount = %input.amount))]
    pub async fn add_payment(
        &self,
        user_id: &str,
        vendor_id: i64,
        input: PaymentInput,
    ) -> Result<(payment::Model, vendor::Model)> {
        require_amount(input.amount)?;
        self.store.get_vendor(user_id, vendor_id).await?;

        let payment = self
            .store
            .insert_payment(
                user_id,
                NewPayment {
                    vendor_id,
                    amount: input.amount,
                    date: input.date,
                    method: input.method,
                    notes: input.notes,
                },
            )
            .await?;

        let vendor = self
            .reconcile_vendor(user_id, vendor_id)
            .await
            .map_err(|e| {
                Error::partial(
                    "add_payment",
                    format!("payment {} recorded, vendor {vendor_id} balance stale", payment.id),
                    e,
                )
            })?;

        info!(
            "Recorded payment {} of ${:.2} for vendor {vendor_id}, ${:.2} remaining",
            payment.id, payment.amount, vendor.remaining_balance
        );
        Ok((payment, vendor))
    }

    /// Removes a payment and reconciles the vendor.
    ///
    /// The payment must belong to `vendor_id`; otherwise it is reported as not found.
    #[instrument(skip(self))]
    pub async fn delete_payment(
        &self,
        user_id: &str,
        payment_id: i64,
        vendor_id: i64,
    ) -> Result<vendor::Model> {
        self.store.get_vendor(user_id, vendor_id).await?;
        let payment = self.store.get_payment(user_id, payment_id).await?;
        if payment.vendor_id != vendor_id {
            return Err(Error::NotFound {
                entity: "payment",
                id: payment_id,
            });
        }

        self.store.delete_payment(user_id, payment_id).await?;

        let vendor = self
            .reconcile_vendor(user_id, vendor_id)
            .await
            .map_err(|e| {
                Error::partial(
                    "delete_payment",
                    format!("payment {payment_id} deleted, vendor {vendor_id} balance stale"),
                    e,
                )
            })?;

        info!(
            "Deleted payment {payment_id} from vendor {vendor_id}, ${:.2} remaining",
            vendor.remaining_balance
        );
        Ok(vendor)
    }

    /// Re-derives a vendor's balance and status from its live payments.
    ///
    /// Idempotent: a vendor that is already consistent is returned without a write.
    /// This is the recovery path for every partial failure.
    pub async fn reconcile_vendor(&self, user_id: &str, vendor_id: i64) -> Result<vendor::Model> {
        self.repair_vendor(user_id, vendor_id)
            .await
            .map(|(vendor, _)| vendor)
    }

    /// Reconciles one vendor and reports whether this call had to write.
    #[instrument(skip(self))]
    async fn repair_vendor(&self, user_id: &str, vendor_id: i64) -> Result<(vendor::Model, bool)> {
        let mut attempt = 0;
        loop {
            let current = self.store.get_vendor(user_id, vendor_id).await?;
            let payments = self.store.get_payments(user_id, vendor_id).await?;
            let reconciliation = reconcile(current.price, &payments, current.status);

            if !is_stale(&current, &reconciliation) {
                return Ok((current, false));
            }

            let patch = VendorPatch {
                status: Some(reconciliation.status),
                remaining_balance: Some(reconciliation.remaining_balance),
                ..Default::default()
            };
            match self
                .store
                .update_vendor(user_id, vendor_id, current.version, patch)
                .await
            {
                Err(Error::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!("Vendor {vendor_id} changed during reconciliation, retrying ({attempt})");
                }
                result => return result.map(|vendor| (vendor, true)),
            }
        }
    }

    /// Reconciles every vendor of `user_id`, returning the ones that had drifted.
    ///
    /// Vendors that changed concurrently but were already consistent are not reported.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self, user_id: &str) -> Result<Vec<vendor::Model>> {
        let vendors = self.store.get_vendors(user_id).await?;
        let mut repaired = Vec::new();

        for before in vendors {
            let (after, wrote) = self.repair_vendor(user_id, before.id).await?;
            if wrote {
                warn!(
                    "Repaired vendor {}: balance ${:.2} -> ${:.2}, status {:?} -> {:?}",
                    after.id,
                    before.remaining_balance,
                    after.remaining_balance,
                    before.status,
                    after.status
                );
                repaired.push(after);
            }
        }

        info!("Reconciled vendors for {user_id}, {} repaired", repaired.len());
        Ok(repaired)
    }

    /// Runs one typed command.
    pub async fn execute(&self, user_id: &str, command: LedgerCommand) -> Result<CommandOutcome> {
        match command {
            LedgerCommand::CreateVendor(input) => self
                .create_vendor(user_id, input)
                .await
                .map(CommandOutcome::Vendor),
            LedgerCommand::UpdateVendor { vendor_id, update } => self
                .update_vendor(user_id, vendor_id, update)
                .await
                .map(CommandOutcome::Vendor),
            LedgerCommand::DeleteVendor { vendor_id } => self
                .delete_vendor(user_id, vendor_id)
                .await
                .map(|payments_deleted| CommandOutcome::VendorDeleted {
                    vendor_id,
                    payments_deleted,
                }),
            LedgerCommand::AddPayment { vendor_id, payment } => self
                .add_payment(user_id, vendor_id, payment)
                .await
                .map(|(payment, vendor)| CommandOutcome::PaymentAdded { payment, vendor }),
            LedgerCommand::DeletePayment {
                payment_id,
                vendor_id,
            } => self
                .delete_payment(user_id, payment_id, vendor_id)
                .await
                .map(CommandOutcome::Vendor),
        }
    }

    /// Loads every vendor of `user_id` with its payments.
    pub async fn load_ledgers(&self, user_id: &str) -> Result<Vec<VendorLedger>> {
        let vendors = self.store.get_vendors(user_id).await?;
        let mut ledgers = Vec::with_capacity(vendors.len());
        for vendor in vendors {
            let payments = self.store.get_payments(user_id, vendor.id).await?;
            ledgers.push(VendorLedger { vendor, payments });
        }
        Ok(ledgers)
    }

    /// Fetches everything the dashboard shows and summarizes it.
    pub async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        let ledgers = self.load_ledgers(user_id).await?;
        let guests = self.store.get_guests(user_id).await?;
        let items = self.store.get_checklist_items(user_id).await?;

        Ok(Dashboard {
            vendors: summary::vendor_totals(&ledgers),
            guests: summary::guest_rsvp_summary(&guests),
            checklist: summary::checklist_summary(&items),
        })
    }
}
