//! Swipe Engine - swipe recording, mutual match detection and candidate discovery
//!
//! The core (`core`) is written against the storage capability traits in
//! `services`; the HTTP boundary in `routes` and the binary wire concrete
//! PostgreSQL, Elasticsearch or in-memory adapters behind them.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{canonical_key, haversine_distance, DiscoveryPlanner, EngineError, SwipeOrchestrator};
pub use models::{DiscoveredUser, Match, Preference, SearchParams, Swipe, SwipeOutcome, User};
