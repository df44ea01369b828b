//! Dashboard summaries.
//!
//! This module provides pure aggregation over already fetched records: budget totals
//! across vendors, RSVP counts and checklist progress. Nothing here touches the store,
//! and every percentage is defined as 0 for an empty collection.

use crate::{
    core::ledger::VendorLedger,
    entities::{RsvpStatus, checklist_item, guest},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Serialize;
use std::collections::BTreeMap;

/// Budget totals across all vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VendorTotals {
    /// Sum of vendor prices
    pub total_budget: Decimal,
    /// Sum of every payment to every vendor
    pub total_paid: Decimal,
    /// `total_budget - total_paid`
    pub remaining_balance: Decimal,
    /// Number of payments
    pub payment_count: usize,
    /// `round(total_paid / total_budget * 100)`, 0 without a budget
    pub payment_percentage: i64,
}

/// Guest RSVP counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RsvpSummary {
    /// Guests on the list
    pub total: usize,
    /// Not yet answered
    pub pending: usize,
    /// Coming
    pub attending: usize,
    /// Declined
    pub not_attending: usize,
    /// Share of guests who answered either way
    pub response_percentage: i64,
}

/// Completion counts for one checklist category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Items in the category
    pub total: usize,
    /// Items done
    pub completed: usize,
}

/// Checklist progress, overall and per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistSummary {
    /// Items on the checklist
    pub total: usize,
    /// Items done
    pub completed: usize,
    /// Items still to do
    pub upcoming: usize,
    /// Share of items done
    pub completion_percentage: i64,
    /// Progress per category, ordered by category name
    pub by_category: BTreeMap<String, CategoryProgress>,
}

/// Rounded percentage of `part` in `whole`; 0 when `whole` is not positive.
///
/// Halves round up, so 12.5% shows as 13%.
#[must_use]
pub fn percentage(part: Decimal, whole: Decimal) -> i64 {
    if whole <= Decimal::ZERO {
        return 0;
    }

    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|pct| pct.to_i64())
        .unwrap_or(0)
}

fn count_percentage(part: usize, whole: usize) -> i64 {
    percentage(Decimal::from(part), Decimal::from(whole))
}

/// Totals budget, payments and balance across vendors.
#[must_use]
pub fn vendor_totals(ledgers: &[VendorLedger]) -> VendorTotals {
    let total_budget: Decimal = ledgers.iter().map(|l| l.vendor.price).sum();
    let total_paid: Decimal = ledgers
        .iter()
        .flat_map(|l| l.payments.iter())
        .map(|p| p.amount)
        .sum();
    let payment_count = ledgers.iter().map(|l| l.payments.len()).sum();

    VendorTotals {
        total_budget,
        total_paid,
        remaining_balance: total_budget - total_paid,
        payment_count,
        payment_percentage: percentage(total_paid, total_budget),
    }
}

/// Counts guests by RSVP response.
#[must_use]
pub fn guest_rsvp_summary(guests: &[guest::Model]) -> RsvpSummary {
    let count = |status: RsvpStatus| guests.iter().filter(|g| g.rsvp_status == status).count();
    let attending = count(RsvpStatus::Attending);
    let not_attending = count(RsvpStatus::NotAttending);

    RsvpSummary {
        total: guests.len(),
        pending: count(RsvpStatus::Pending),
        attending,
        not_attending,
        response_percentage: count_percentage(attending + not_attending, guests.len()),
    }
}

/// Counts checklist items overall and per category.
#[must_use]
pub fn checklist_summary(items: &[checklist_item::Model]) -> ChecklistSummary {
    let mut by_category: BTreeMap<String, CategoryProgress> = BTreeMap::new();
    for item in items {
        let progress = by_category.entry(item.category.clone()).or_default();
        progress.total += 1;
        if item.completed {
            progress.completed += 1;
        }
    }

    let total = items.len();
    let completed = items.iter().filter(|i| i.completed).count();

    ChecklistSummary {
        total,
        completed,
        upcoming: total - completed,
        completion_percentage: count_percentage(completed, total),
        by_category,
    }
}

/// Formats a dollar amount with thousands separators, e.g. `$12,345.50` or `-$100.00`.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let cents = format!("{rounded:.2}");
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_zero() || amount.is_sign_positive() {
        ""
    } else {
        "-"
    };
    format!("{sign}${grouped}.{fraction}")
}
