use std::sync::Arc;
use validator::ValidationErrors;

use crate::core::detector::{Detection, MatchDetector};
use crate::core::error::{field_error, EngineError};
use crate::models::{Preference, Swipe, SwipeOutcome, UserId};
use crate::services::{MatchStore, PreferenceLedger};

/// Records swipes and reports whether they completed a match
///
/// # Steps
/// 1. Validate ids (no write happens on failure)
/// 2. Record the swipe if the pair has no decision yet
/// 3. Resolve the effective decision: this swipe, or the earlier one that won
/// 4. Run match detection on the effective decision
///
/// Both writes are idempotent, so a caller that saw a storage error can
/// re-issue the same swipe and reach the same terminal outcome.
#[derive(Clone)]
pub struct SwipeOrchestrator {
    ledger: Arc<dyn PreferenceLedger>,
    detector: MatchDetector,
}

impl SwipeOrchestrator {
    pub fn new(ledger: Arc<dyn PreferenceLedger>, matches: Arc<dyn MatchStore>) -> Self {
        let detector = MatchDetector::new(ledger.clone(), matches);
        Self { ledger, detector }
    }

    pub async fn swipe(
        &self,
        user_id: UserId,
        target_id: UserId,
        preference: Preference,
    ) -> Result<SwipeOutcome, EngineError> {
        validate_pair(user_id, target_id)?;

        let requested = Swipe::new(user_id, target_id, preference);

        let stored = self
            .ledger
            .record_if_absent(&requested)
            .await
            .map_err(|e| EngineError::storage("record_if_absent", e))?;

        let effective = if stored {
            requested
        } else {
            self.earlier_decision(requested).await?
        };

        match self.detector.detect(&effective).await? {
            Detection::Matched(created) => Ok(SwipeOutcome::matched(created.id)),
            Detection::Pending | Detection::NotEligible => Ok(SwipeOutcome::unmatched()),
        }
    }

    /// The decision that already occupied the pair when `requested` arrived
    async fn earlier_decision(&self, requested: Swipe) -> Result<Swipe, EngineError> {
        let existing = self
            .ledger
            .decision_between(requested.user_id, requested.target_id)
            .await
            .map_err(|e| EngineError::storage("decision_between", e))?;

        match existing {
            Some(existing) => {
                if existing.preference != requested.preference {
                    tracing::info!(
                        "User {} already swiped {} on {}, ignoring {}",
                        requested.user_id,
                        existing.preference,
                        requested.target_id,
                        requested.preference
                    );
                }
                Ok(existing)
            }
            // The ledger said the pair was taken but the row is not visible;
            // fall back to the request, which is what a retry would record.
            None => {
                tracing::warn!(
                    "Ledger reported existing swipe {} -> {} but none was found",
                    requested.user_id,
                    requested.target_id
                );
                Ok(requested)
            }
        }
    }
}

fn validate_pair(user_id: UserId, target_id: UserId) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if user_id < 1 {
        errors.add("user_id", field_error("range", "user id must be positive"));
    }

    if target_id < 1 {
        errors.add("target_id", field_error("range", "target id must be positive"));
    } else if target_id == user_id {
        errors.add("target_id", field_error("self_swipe", "cannot swipe on yourself"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
