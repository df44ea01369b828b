//! Core ledger logic, independent of any user interface.

pub mod cache;
pub mod ledger;
pub mod reconcile;
pub mod store;
pub mod summary;

pub use cache::LedgerCache;
pub use ledger::{
    CommandOutcome, Dashboard, LedgerCommand, LedgerService, PaymentInput, VendorInput,
    VendorLedger, VendorUpdate,
};
pub use store::{LedgerStore, SeaOrmLedgerStore};
