//! StyleSwipe Matches - match enrichment service for the StyleSwipe stylist app
//!
//! This library builds the "matched clients" view a stylist sees: matches
//! joined with each client's display name and styling preferences, with
//! fallbacks when either is missing. It also owns the match write paths.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{EnrichError, MatchEnricher, MatchRecorder, RecordError};
pub use models::{EnrichedMatch, Match, NewMatch, PreferencesView, UserPreferences, UserProfile};
pub use services::{InMemoryStore, MatchStore, StoreError};
