use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::core::distance::haversine_distance;
use crate::core::error::{field_error, EngineError};
use crate::models::{
    CandidateOrder, CandidateQuery, DiscoveredUser, ExclusionSet, Gender, SearchParams, UserId,
};
use crate::services::{CandidateIndex, PreferenceLedger};

/// Default and maximum number of candidates per discovery request
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl Validate for SearchParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.min_age.is_some_and(|age| age < 0) {
            errors.add("min_age", field_error("validation_non_negative", "must be non-negative"));
        }

        if self.max_age.is_some_and(|age| age < 0) {
            errors.add("max_age", field_error("validation_non_negative", "must be non-negative"));
        } else if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min >= 0 && max < min {
                errors.add("max_age", field_error("age_range", "must not be below min_age"));
            }
        }

        if let Some(gender) = self.gender.as_deref() {
            if !gender.is_empty() && gender.parse::<Gender>().is_err() {
                errors.add(
                    "gender",
                    field_error("validation_invalid_gender", "must be 'male', 'female', or empty"),
                );
            }
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            errors.add("lat", field_error("range", "must be between -90 and 90"));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            errors.add("lon", field_error("range", "must be between -180 and 180"));
        }

        if self.limit.is_some_and(|limit| limit < 1) {
            errors.add("limit", field_error("range", "must be at least 1"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Finds candidates a user has not yet swiped on
///
/// # Pipeline Stages
/// 1. Parameter validation (nothing is read on failure)
/// 2. Exclusion set: the requester plus every user they swiped on
/// 3. Filtered retrieval from the candidate index
/// 4. Distance annotation, optionally ordered by distance
#[derive(Clone)]
pub struct DiscoveryPlanner {
    ledger: Arc<dyn PreferenceLedger>,
    index: Arc<dyn CandidateIndex>,
    limits: DiscoveryLimits,
}

impl DiscoveryPlanner {
    pub fn new(ledger: Arc<dyn PreferenceLedger>, index: Arc<dyn CandidateIndex>) -> Self {
        Self::with_limits(ledger, index, DiscoveryLimits::default())
    }

    pub fn with_limits(
        ledger: Arc<dyn PreferenceLedger>,
        index: Arc<dyn CandidateIndex>,
        limits: DiscoveryLimits,
    ) -> Self {
        Self {
            ledger,
            index,
            limits,
        }
    }

    pub async fn discover(
        &self,
        user_id: UserId,
        params: &SearchParams,
    ) -> Result<Vec<DiscoveredUser>, EngineError> {
        if user_id < 1 {
            let mut errors = ValidationErrors::new();
            errors.add("user_id", field_error("range", "user id must be positive"));
            return Err(errors.into());
        }
        params.validate()?;

        let swipes = self
            .ledger
            .decisions_for(user_id)
            .await
            .map_err(|e| EngineError::storage("decisions_for", e))?;

        let exclude = ExclusionSet::for_requester(user_id).with_swiped(&swipes);

        let query = CandidateQuery {
            exclude,
            min_age: params.min_age,
            max_age: params.max_age,
            gender: params.gender_filter(),
            limit: params
                .limit
                .map_or(self.limits.default_limit, |limit| {
                    usize::try_from(limit).unwrap_or(usize::MAX)
                })
                .min(self.limits.max_limit),
        };

        let candidates = self
            .index
            .query(&query)
            .await
            .map_err(|e| EngineError::storage("candidate_query", e))?;

        let total = candidates.len();

        let mut discovered: Vec<DiscoveredUser> = candidates
            .into_iter()
            // The index may lag behind the ledger; never show a seen user.
            .filter(|user| !query.exclude.contains(user.id))
            .map(|user| {
                let distance_from_me = haversine_distance(
                    params.latitude,
                    params.longitude,
                    user.location.lat,
                    user.location.lon,
                );
                DiscoveredUser {
                    user,
                    distance_from_me,
                }
            })
            .collect();

        if params.order == CandidateOrder::Distance {
            discovered.sort_by(|a, b| a.distance_from_me.total_cmp(&b.distance_from_me));
        }

        tracing::debug!(
            "Discovery for {}: {} excluded, {} returned by index, {} kept",
            user_id,
            query.exclude.len(),
            total,
            discovered.len()
        );

        Ok(discovered)
    }
}
