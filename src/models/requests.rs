use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use crate::models::domain::{CandidateOrder, Preference, SearchParams, UserId};

/// Request to record a swipe
///
/// `user_id` is optional on the wire; when present it must equal the
/// authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[validate(range(min = 1))]
    pub target_id: UserId,
    pub preference: String,
}

impl SwipeRequest {
    /// Validate wire-level fields and parse the preference
    ///
    /// Reports every failing field, not just the first.
    pub fn parse_preference(&self) -> Result<Preference, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let preference = match self.preference.parse::<Preference>() {
            Ok(preference) => Some(preference),
            Err(e) => {
                let mut error = ValidationError::new("invalid_preference");
                error.message = Some(e.to_string().into());
                errors.add("preference", error);
                None
            }
        };

        match preference {
            Some(preference) if errors.is_empty() => Ok(preference),
            _ => Err(errors),
        }
    }
}

/// Query string of the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: Option<CandidateOrder>,
}

impl From<DiscoverQuery> for SearchParams {
    fn from(query: DiscoverQuery) -> Self {
        SearchParams {
            min_age: query.min_age,
            max_age: query.max_age,
            gender: query.gender,
            latitude: query.lat,
            longitude: query.lon,
            limit: query.limit,
            order: query.sort.unwrap_or_default(),
        }
    }
}
