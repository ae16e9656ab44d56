// Service exports
pub mod elasticsearch;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use elasticsearch::ElasticsearchClient;
pub use memory::{FailOn, InMemoryStore, StoreOperation};
pub use postgres::PostgresClient;
pub use traits::{CandidateIndex, MatchStore, PreferenceLedger, StoreError};
