use std::sync::Arc;

use crate::core::error::EngineError;
use crate::core::pair::canonical_key;
use crate::models::{Match, Swipe};
use crate::services::{MatchStore, PreferenceLedger};

/// What the detector concluded for one stored swipe
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// The swipe was a `no`; the reverse direction is irrelevant
    NotEligible,
    /// `yes`, but the target has not said `yes` back yet
    Pending,
    /// Both directions are `yes`; the single persisted match for the pair
    Matched(Match),
}

impl Detection {
    pub fn matched(&self) -> Option<&Match> {
        match self {
            Detection::Matched(m) => Some(m),
            _ => None,
        }
    }
}

/// Detects mutual interest and creates the pair's match exactly once
///
/// Two users swiping `yes` on each other at the same instant each run the
/// detector with the same canonical key. The match store's create-if-absent
/// contract makes both runs return the same row, so neither caller sees a
/// conflict.
#[derive(Clone)]
pub struct MatchDetector {
    ledger: Arc<dyn PreferenceLedger>,
    matches: Arc<dyn MatchStore>,
}

impl MatchDetector {
    pub fn new(ledger: Arc<dyn PreferenceLedger>, matches: Arc<dyn MatchStore>) -> Self {
        Self { ledger, matches }
    }

    /// Evaluate a swipe that is already durable in the ledger
    pub async fn detect(&self, swipe: &Swipe) -> Result<Detection, EngineError> {
        if !swipe.preference.is_yes() {
            return Ok(Detection::NotEligible);
        }

        let admirers = self
            .ledger
            .positive_decisions_toward(swipe.user_id)
            .await
            .map_err(|e| EngineError::storage("positive_decisions_toward", e))?;

        if !admirers.contains_key(&swipe.target_id) {
            tracing::debug!(
                "No reciprocal yes from {} to {} yet",
                swipe.target_id,
                swipe.user_id
            );
            return Ok(Detection::Pending);
        }

        let pair_key = canonical_key(swipe.user_id, swipe.target_id);
        let created = self
            .matches
            .create_if_absent(&pair_key, swipe.user_id, swipe.target_id)
            .await
            .map_err(|e| EngineError::storage("create_if_absent", e))?;

        tracing::info!(
            "Match {} between {} and {}",
            created.id,
            created.user1_id,
            created.user2_id
        );

        Ok(Detection::Matched(created))
    }
}
