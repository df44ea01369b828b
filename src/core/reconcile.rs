//! Balance reconciliation - derives a vendor's balance and status from its payments.
//!
//! These are pure functions. The balance is always recomputed from the complete
//! payment set and never adjusted by a delta against a stored value, so a missed
//! update or a half-finished mutation is repaired by simply reconciling again.
//!
//! Status rules, in order:
//! 1. nothing left to pay: `Paid in Full`
//! 2. something paid and the vendor is at `Contacted`, `Meeting Scheduled`, `Booked`
//!    or `Paid in Full`: `Deposit Paid`
//! 3. no payments and the vendor is at `Deposit Paid` or `Paid in Full`: `Booked`
//! 4. otherwise the current status is kept

use crate::entities::{VendorStatus, payment};
use rust_decimal::Decimal;

/// Result of reconciling one vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Sum of all payment amounts
    pub total_paid: Decimal,
    /// `price - total_paid`, negative when overpaid
    pub remaining_balance: Decimal,
    /// Inferred status
    pub status: VendorStatus,
    /// Number of payments considered
    pub payment_count: usize,
}

/// Sums payment amounts.
#[must_use]
pub fn total_paid(payments: &[payment::Model]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}

/// Reconciles a vendor against its current payments.
///
/// # Arguments
/// * `price` - Contracted price (the new price when it is being edited)
/// * `payments` - Every payment currently recorded for the vendor
/// * `current` - Status stored on the vendor (or requested by the user)
#[must_use]
pub fn reconcile(
    price: Decimal,
    payments: &[payment::Model],
    current: VendorStatus,
) -> Reconciliation {
    reconcile_amounts(price, payments.iter().map(|p| p.amount), current)
}

/// Same as [`reconcile`], over bare amounts.
#[must_use]
pub fn reconcile_amounts<I>(price: Decimal, amounts: I, current: VendorStatus) -> Reconciliation
where
    I: IntoIterator<Item = Decimal>,
{
    let (total_paid, payment_count) = amounts
        .into_iter()
        .fold((Decimal::ZERO, 0_usize), |(sum, count), amount| {
            (sum + amount, count + 1)
        });
    let remaining_balance = price - total_paid;

    Reconciliation {
        total_paid,
        remaining_balance,
        status: infer_status(remaining_balance, total_paid, payment_count, current),
        payment_count,
    }
}

/// Applies the status rules to already computed totals.
#[must_use]
pub fn infer_status(
    remaining_balance: Decimal,
    total_paid: Decimal,
    payment_count: usize,
    current: VendorStatus,
) -> VendorStatus {
    use VendorStatus::{Booked, Contacted, DepositPaid, MeetingScheduled, PaidInFull};

    if remaining_balance <= Decimal::ZERO {
        return PaidInFull;
    }

    match current {
        Contacted | MeetingScheduled | Booked | PaidInFull if total_paid > Decimal::ZERO => {
            DepositPaid
        }
        DepositPaid | PaidInFull if payment_count == 0 => Booked,
        other => other,
    }
}
