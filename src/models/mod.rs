// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateOrder, CandidateQuery, DiscoveredUser, ExclusionSet, Gender, Location, Match,
    Preference, SearchParams, Swipe, SwipeOutcome, User, UserId,
};
pub use requests::{DiscoverQuery, SwipeRequest};
pub use responses::{ErrorResponse, HealthResponse};
