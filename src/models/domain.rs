use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Numeric user identifier, assigned by the profile subsystem
pub type UserId = i64;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// User profile as stored in the candidate index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub location: Location,
}

/// A discovery result: the candidate plus its distance from the requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "distanceFromMe")]
    pub distance_from_me: f64,
}

/// Binary swipe decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "swipe_preference", rename_all = "lowercase")]
pub enum Preference {
    Yes,
    No,
}

impl Preference {
    pub fn is_yes(self) -> bool {
        matches!(self, Preference::Yes)
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Yes => f.write_str("yes"),
            Preference::No => f.write_str("no"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePreferenceError(pub String);

impl fmt::Display for ParsePreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preference must be 'yes' or 'no', got '{}'", self.0)
    }
}

impl std::error::Error for ParsePreferenceError {}

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" => Ok(Preference::Yes),
            "no" => Ok(Preference::No),
            _ => Err(ParsePreferenceError(s.to_string())),
        }
    }
}

/// A directed swipe from `user_id` toward `target_id`
///
/// `id` and `created_at` are assigned by the ledger when the swipe is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: UserId,
    pub target_id: UserId,
    pub preference: Preference,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Swipe {
    pub fn new(user_id: UserId, target_id: UserId, preference: Preference) -> Self {
        Self {
            id: None,
            user_id,
            target_id,
            preference,
            created_at: None,
        }
    }
}

/// Mutual match between two users
///
/// `user1_id` is always the smaller id of the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub match_id: String,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Match {
    pub fn involves(&self, user_id: UserId) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }
}

/// Outcome of a swipe as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub matched: bool,
    #[serde(rename = "matchID", skip_serializing_if = "Option::is_none", default)]
    pub match_id: Option<i64>,
}

impl SwipeOutcome {
    pub fn unmatched() -> Self {
        Self {
            matched: false,
            match_id: None,
        }
    }

    pub fn matched(match_id: i64) -> Self {
        Self {
            matched: true,
            match_id: Some(match_id),
        }
    }
}

/// Gender categories accepted by the discovery filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(other.to_string()),
        }
    }
}

/// How discovery results are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrder {
    /// Keep the order the candidate index returned
    #[default]
    Index,
    /// Ascending distance from the requester
    Distance,
}

/// Discovery request parameters supplied by the caller
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParams {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Signed so out-of-range values reach validation
    pub limit: Option<i64>,
    pub order: CandidateOrder,
}

impl SearchParams {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Gender filter, with the empty string treated as "no filter"
    ///
    /// Only meaningful after validation.
    pub fn gender_filter(&self) -> Option<Gender> {
        self.gender
            .as_deref()
            .filter(|g| !g.is_empty())
            .and_then(|g| g.parse().ok())
    }
}

/// Users a discovery query must never return
///
/// Always contains the requester; built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: BTreeSet<UserId>,
}

impl ExclusionSet {
    pub fn for_requester(user_id: UserId) -> Self {
        let mut ids = BTreeSet::new();
        ids.insert(user_id);
        Self { ids }
    }

    /// Add the target of every swipe the requester has made
    pub fn with_swiped<'a, I>(mut self, swipes: I) -> Self
    where
        I: IntoIterator<Item = &'a Swipe>,
    {
        self.ids.extend(swipes.into_iter().map(|s| s.target_id));
        self
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.ids.iter().copied()
    }
}

/// Filtered retrieval request sent to the candidate index
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub exclude: ExclusionSet,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<Gender>,
    pub limit: usize,
}

impl CandidateQuery {
    /// Whether a user satisfies every filter of this query
    pub fn admits(&self, user: &User) -> bool {
        if self.exclude.contains(user.id) {
            return false;
        }

        if self.min_age.is_some_and(|min| user.age < min) {
            return false;
        }

        if self.max_age.is_some_and(|max| user.age > max) {
            return false;
        }

        if let Some(gender) = self.gender {
            if user.gender != gender.as_str() {
                return false;
            }
        }

        true
    }
}
