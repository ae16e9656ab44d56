//! Capability traits the core consumes.
//!
//! The core is written purely against these contracts; PostgreSQL,
//! Elasticsearch and the in-memory store are interchangeable behind them.
//! Every exactly-once guarantee is delegated to the uniqueness enforcement of
//! the implementation, so implementations must be safe under concurrent
//! identical calls.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{CandidateQuery, Match, Swipe, User, UserId};

/// Errors raised by storage and index adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Search backend returned error: {0}")]
    BackendError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// A referenced user does not exist in the store
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to load seed users: {0}")]
    SeedError(String),
}

/// Directed swipe ledger
#[async_trait]
pub trait PreferenceLedger: Send + Sync {
    /// Store a swipe unless a decision for the same (source, target) exists.
    ///
    /// Returns `true` when this call stored the swipe, `false` when an earlier
    /// decision was kept. Concurrent calls for one pair store exactly one row.
    async fn record_if_absent(&self, swipe: &Swipe) -> Result<bool, StoreError>;

    /// Every swipe made by `user_id`
    async fn decisions_for(&self, user_id: UserId) -> Result<Vec<Swipe>, StoreError>;

    /// Every `yes` swipe targeting `user_id`, keyed by the swiping user
    async fn positive_decisions_toward(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<UserId, Swipe>, StoreError>;

    /// The stored decision of `source` toward `target`, if any
    async fn decision_between(
        &self,
        source: UserId,
        target: UserId,
    ) -> Result<Option<Swipe>, StoreError> {
        Ok(self
            .decisions_for(source)
            .await?
            .into_iter()
            .find(|swipe| swipe.target_id == target))
    }
}

/// Persistent match records keyed by canonical pair key
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Create the match for `pair_key` or return the one already persisted.
    ///
    /// Every caller for the same key observes the same `Match`.
    async fn create_if_absent(
        &self,
        pair_key: &str,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Match, StoreError>;
}

/// Filtered retrieval over discoverable user profiles
#[async_trait]
pub trait CandidateIndex: Send + Sync {
    async fn query(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError>;
}
