//! In-memory store implementing every storage contract.
//!
//! Used by tests and by the `memory` storage backend for local runs. A single
//! mutex stands in for the uniqueness constraints of a real database: swipes
//! are keyed by (source, target) and matches by pair key, so the same
//! first-decision-wins and create-if-absent semantics hold. Failures can be
//! injected, and a store built with [`InMemoryStore::recording`] keeps a log
//! of every call so tests can assert on what the core asked of its
//! collaborators. Discoverable users are loaded with
//! [`InMemoryStore::load_users`].
//!
//! # Example
//!
//! ```
//! use swipe_engine::models::{Preference, Swipe};
//! use swipe_engine::services::{InMemoryStore, PreferenceLedger};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//!
//! assert!(store.record_if_absent(&Swipe::new(1, 2, Preference::Yes)).await.unwrap());
//! // A later decision for the same pair is ignored.
//! assert!(!store.record_if_absent(&Swipe::new(1, 2, Preference::No)).await.unwrap());
//!
//! let stored = store.decision_between(1, 2).await.unwrap().unwrap();
//! assert_eq!(stored.preference, Preference::Yes);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{CandidateIndex, MatchStore, PreferenceLedger, StoreError};
use crate::models::{CandidateQuery, Match, Swipe, User, UserId};

/// Which operation should fail with [`StoreError::Unavailable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    RecordIfAbsent,
    DecisionsFor,
    DecisionBetween,
    PositiveDecisionsToward,
    CreateMatch,
    Query,
}

/// Recorded operation for test verification
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOperation {
    RecordIfAbsent { user_id: UserId, target_id: UserId },
    DecisionsFor { user_id: UserId },
    DecisionBetween { source: UserId, target: UserId },
    PositiveDecisionsToward { user_id: UserId },
    CreateMatch { pair_key: String },
    Query { excluded: Vec<UserId> },
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryInner>>,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    swipes: HashMap<(UserId, UserId), Swipe>,
    next_swipe_id: i64,
    matches: HashMap<String, Match>,
    next_match_id: i64,
    users: BTreeMap<UserId, User>,
    fail_on: Option<FailOn>,
    recording: bool,
    operations: Vec<StoreOperation>,
}

impl InMemoryInner {
    fn check(&self, op: FailOn) -> Result<(), StoreError> {
        if self.fail_on == Some(op) {
            return Err(StoreError::Unavailable(format!("{:?} failure injected", op)));
        }
        Ok(())
    }

    fn record(&mut self, op: StoreOperation) {
        if self.recording {
            self.operations.push(op);
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that logs every call for later inspection
    pub fn recording() -> Self {
        let store = Self::new();
        store.lock().recording = true;
        store
    }

    /// Create a store pre-populated with discoverable users
    pub fn with_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = User>,
    {
        let store = Self::new();
        for user in users {
            store.insert_user(user);
        }
        store
    }

    // A poisoned lock only means another test thread panicked mid-operation;
    // the maps themselves are never left half-updated.
    fn lock(&self) -> MutexGuard<'_, InMemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    /// Load discoverable users from a JSON array of user documents
    ///
    /// Returns how many users were loaded. Users already present with the
    /// same id are replaced.
    pub fn load_users<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::SeedError(format!("{}: {}", path.display(), e)))?;
        let users: Vec<User> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::SeedError(format!("{}: {}", path.display(), e)))?;

        let count = users.len();
        let mut inner = self.lock();
        for user in users {
            inner.users.insert(user.id, user);
        }
        Ok(count)
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn fail_on(&self, op: FailOn) {
        self.lock().fail_on = Some(op);
    }

    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    pub fn swipe_count(&self) -> usize {
        self.lock().swipes.len()
    }

    pub fn matches(&self) -> Vec<Match> {
        let mut matches: Vec<Match> = self.lock().matches.values().cloned().collect();
        matches.sort_by_key(|m| m.id);
        matches
    }
}

#[async_trait]
impl PreferenceLedger for InMemoryStore {
    async fn record_if_absent(&self, swipe: &Swipe) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::RecordIfAbsent {
            user_id: swipe.user_id,
            target_id: swipe.target_id,
        });
        inner.check(FailOn::RecordIfAbsent)?;

        let key = (swipe.user_id, swipe.target_id);
        if inner.swipes.contains_key(&key) {
            return Ok(false);
        }

        inner.next_swipe_id += 1;
        let stored = Swipe {
            id: Some(inner.next_swipe_id),
            created_at: Some(chrono::Utc::now()),
            ..swipe.clone()
        };
        inner.swipes.insert(key, stored);
        Ok(true)
    }

    async fn decisions_for(&self, user_id: UserId) -> Result<Vec<Swipe>, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::DecisionsFor { user_id });
        inner.check(FailOn::DecisionsFor)?;

        let mut swipes: Vec<Swipe> = inner
            .swipes
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        swipes.sort_by_key(|s| s.id);
        Ok(swipes)
    }

    async fn positive_decisions_toward(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<UserId, Swipe>, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::PositiveDecisionsToward { user_id });
        inner.check(FailOn::PositiveDecisionsToward)?;

        Ok(inner
            .swipes
            .values()
            .filter(|s| s.target_id == user_id && s.preference.is_yes())
            .map(|s| (s.user_id, s.clone()))
            .collect())
    }

    async fn decision_between(
        &self,
        source: UserId,
        target: UserId,
    ) -> Result<Option<Swipe>, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::DecisionBetween { source, target });
        inner.check(FailOn::DecisionBetween)?;

        Ok(inner.swipes.get(&(source, target)).cloned())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn create_if_absent(
        &self,
        pair_key: &str,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Match, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::CreateMatch {
            pair_key: pair_key.to_string(),
        });
        inner.check(FailOn::CreateMatch)?;

        if let Some(existing) = inner.matches.get(pair_key) {
            return Ok(existing.clone());
        }

        inner.next_match_id += 1;
        let created = Match {
            id: inner.next_match_id,
            match_id: pair_key.to_string(),
            user1_id: user_a.min(user_b),
            user2_id: user_a.max(user_b),
            created_at: chrono::Utc::now(),
        };
        inner.matches.insert(pair_key.to_string(), created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CandidateIndex for InMemoryStore {
    async fn query(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreOperation::Query {
            excluded: query.exclude.iter().collect(),
        });
        inner.check(FailOn::Query)?;

        Ok(inner
            .users
            .values()
            .filter(|user| query.admits(user))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExclusionSet, Gender, Location, Preference};

    fn user(id: UserId, age: i32, gender: &str) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            name: format!("User {}", id),
            gender: gender.to_string(),
            age,
            location: Location { lat: 40.7, lon: -74.0 },
        }
    }

    #[tokio::test]
    async fn test_first_decision_wins() {
        let store = InMemoryStore::new();

        assert!(store
            .record_if_absent(&Swipe::new(1, 2, Preference::No))
            .await
            .unwrap());
        assert!(!store
            .record_if_absent(&Swipe::new(1, 2, Preference::Yes))
            .await
            .unwrap());

        let decisions = store.decisions_for(1).await.unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].preference, Preference::No);
        assert_eq!(decisions[0].id, Some(1));
    }

    #[tokio::test]
    async fn test_positive_decisions_keyed_by_swiper() {
        let store = InMemoryStore::new();
        store.record_if_absent(&Swipe::new(2, 1, Preference::Yes)).await.unwrap();
        store.record_if_absent(&Swipe::new(3, 1, Preference::No)).await.unwrap();
        store.record_if_absent(&Swipe::new(4, 5, Preference::Yes)).await.unwrap();

        let toward = store.positive_decisions_toward(1).await.unwrap();
        assert_eq!(toward.len(), 1);
        assert!(toward.contains_key(&2));
    }

    #[tokio::test]
    async fn test_create_if_absent_returns_existing() {
        let store = InMemoryStore::new();

        let first = store.create_if_absent("key", 2, 1).await.unwrap();
        let second = store.create_if_absent("key", 1, 2).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.user1_id, 1);
        assert_eq!(first.user2_id, 2);
        assert_eq!(store.matches().len(), 1);
    }

    #[tokio::test]
    async fn test_query_applies_filters_and_limit() {
        let store = InMemoryStore::with_users(vec![
            user(1, 30, "female"),
            user(2, 30, "female"),
            user(3, 30, "male"),
            user(4, 30, "female"),
            user(5, 30, "female"),
        ]);

        let query = CandidateQuery {
            exclude: ExclusionSet::for_requester(1),
            min_age: None,
            max_age: None,
            gender: Some(Gender::Female),
            limit: 2,
        };

        let ids: Vec<UserId> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_default_store_keeps_no_operation_log() {
        let store = InMemoryStore::with_users(vec![user(2, 30, "female")]);

        for target in 2..50 {
            store.record_if_absent(&Swipe::new(1, target, Preference::No)).await.unwrap();
            store.decisions_for(1).await.unwrap();
        }

        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_decision_between_is_its_own_operation() {
        let store = InMemoryStore::recording();
        store.record_if_absent(&Swipe::new(1, 2, Preference::Yes)).await.unwrap();
        store.clear_operations();

        store.decision_between(1, 2).await.unwrap();
        store.decisions_for(1).await.unwrap();

        assert_eq!(
            store.operations(),
            vec![
                StoreOperation::DecisionBetween { source: 1, target: 2 },
                StoreOperation::DecisionsFor { user_id: 1 },
            ]
        );

        store.fail_on(FailOn::DecisionBetween);
        assert!(store.decision_between(1, 2).await.is_err());
        assert!(store.decisions_for(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_load_users_from_json() {
        let path = std::env::temp_dir().join(format!("swipe-seed-{}.json", std::process::id()));
        let users = vec![user(1, 30, "male"), user(2, 27, "female")];
        std::fs::write(&path, serde_json::to_string(&users).unwrap()).unwrap();

        let store = InMemoryStore::new();
        let loaded = store.load_users(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(store.user_count(), 2);

        let query = CandidateQuery {
            exclude: ExclusionSet::for_requester(1),
            min_age: None,
            max_age: None,
            gender: None,
            limit: 10,
        };
        let found = store.query(&query).await.unwrap();
        assert_eq!(found, vec![users[1].clone()]);
    }

    #[test]
    fn test_load_users_rejects_bad_files() {
        let store = InMemoryStore::new();
        let missing = store.load_users("/nonexistent/seed.json").unwrap_err();
        assert!(matches!(missing, StoreError::SeedError(_)));

        let path = std::env::temp_dir().join(format!("swipe-bad-seed-{}.json", std::process::id()));
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();
        let malformed = store.load_users(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(malformed, StoreError::SeedError(_)));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new();
        store.fail_on(FailOn::RecordIfAbsent);

        let err = store
            .record_if_absent(&Swipe::new(1, 2, Preference::Yes))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.swipe_count(), 0);

        store.clear_failure();
        assert!(store
            .record_if_absent(&Swipe::new(1, 2, Preference::Yes))
            .await
            .unwrap());
    }
}
