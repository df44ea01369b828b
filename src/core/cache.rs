//! Client-side read-through cache of vendor ledgers.
//!
//! The cache mirrors what a view last fetched and is never the system of record.
//! Mutations go through [`LedgerCache::apply`], which drops the user's entry whether
//! the command succeeded or not, so the next read always re-fetches.

use crate::{
    core::{
        ledger::{CommandOutcome, LedgerCommand, LedgerService, VendorLedger},
        store::LedgerStore,
    },
    errors::Result,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Per-user snapshot of vendor ledgers.
#[derive(Debug, Clone, Default)]
pub struct LedgerCache {
    entries: Arc<RwLock<HashMap<String, Vec<VendorLedger>>>>,
}

impl LedgerCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot for `user_id`, if one is held.
    pub async fn cached(&self, user_id: &str) -> Option<Vec<VendorLedger>> {
        self.entries.read().await.get(user_id).cloned()
    }

    /// Re-fetches `user_id`'s ledgers and replaces the cached snapshot.
    pub async fn refresh<S: LedgerStore>(
        &self,
        service: &LedgerService<S>,
        user_id: &str,
    ) -> Result<Vec<VendorLedger>> {
        let ledgers = service.load_ledgers(user_id).await?;
        let mut entries = self.entries.write().await;
        entries.insert(user_id.to_string(), ledgers.clone());
        debug!("Ledger cache refreshed for {user_id} with {} vendors", ledgers.len());
        Ok(ledgers)
    }

    /// Returns the cached snapshot, fetching it first on a miss.
    pub async fn get_or_refresh<S: LedgerStore>(
        &self,
        service: &LedgerService<S>,
        user_id: &str,
    ) -> Result<Vec<VendorLedger>> {
        if let Some(ledgers) = self.cached(user_id).await {
            trace!("Ledger cache hit for {user_id}");
            return Ok(ledgers);
        }
        self.refresh(service, user_id).await
    }

    /// Drops the snapshot for `user_id`.
    pub async fn invalidate(&self, user_id: &str) {
        if self.entries.write().await.remove(user_id).is_some() {
            debug!("Ledger cache invalidated for {user_id}");
        }
    }

    /// Runs a command and invalidates the user's snapshot.
    ///
    /// The entry is dropped on failure too, since a partial failure may have
    /// committed some of its writes.
    pub async fn apply<S: LedgerStore>(
        &self,
        service: &LedgerService<S>,
        user_id: &str,
        command: LedgerCommand,
    ) -> Result<CommandOutcome> {
        let outcome = service.execute(user_id, command).await;
        self.invalidate(user_id).await;
        outcome
    }
}
