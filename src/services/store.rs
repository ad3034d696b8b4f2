use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, NewMatch, UserPreferences, UserProfile};

/// Errors that can occur when talking to the match store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read and write access to the match, profile and preference tables
///
/// Each method is a single round trip. Implementations hold no cache, so two
/// calls with the same arguments may observe different data if a concurrent
/// writer got in between.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// All matches for a stylist, most recent first
    async fn find_matches_for_stylist(&self, stylist_id: &str) -> Result<Vec<Match>, StoreError>;

    /// Profiles whose user id is in `user_ids`; unknown ids are simply absent
    async fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, StoreError>;

    /// Preference rows whose user id is in `user_ids`; unknown ids are simply absent
    async fn find_preferences(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserPreferences>, StoreError>;

    /// Insert a match stamped with the current time
    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, StoreError>;

    /// Delete every match created by `user_id`, returning how many were removed
    async fn delete_matches_for_user(&self, user_id: &str) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Table names, overridable per environment
#[derive(Debug, Clone)]
pub struct StoreTables {
    pub matches: String,
    pub user_profiles: String,
    pub user_preferences: String,
}

impl Default for StoreTables {
    fn default() -> Self {
        Self {
            matches: "matches".to_string(),
            user_profiles: "user_profiles".to_string(),
            user_preferences: "user_preferences".to_string(),
        }
    }
}
