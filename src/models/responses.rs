use serde::{Deserialize, Serialize};
use crate::models::domain::{EnrichedMatch, Match};

/// Response for the stylist matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylistMatchesResponse {
    #[serde(rename = "stylistId")]
    pub stylist_id: String,
    pub matches: Vec<EnrichedMatch>,
    pub total: usize,
}

/// Response for the match creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "stylistId")]
    pub stylist_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            stylist_id: m.stylist_id,
            matched_at: m.matched_at,
        }
    }
}

/// Response for the match reset endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub deleted: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
