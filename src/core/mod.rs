// Core algorithm exports
pub mod detector;
pub mod discovery;
pub mod distance;
pub mod error;
pub mod orchestrator;
pub mod pair;

pub use detector::{Detection, MatchDetector};
pub use discovery::{DiscoveryLimits, DiscoveryPlanner};
pub use distance::{distance_between, haversine_distance};
pub use error::EngineError;
pub use orchestrator::SwipeOrchestrator;
pub use pair::canonical_key;
