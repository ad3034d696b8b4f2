// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{EnrichedMatch, Match, NewMatch, PreferencesView, Role, UserPreferences, UserProfile};
pub use requests::CreateMatchRequest;
pub use responses::{ErrorResponse, HealthResponse, MatchResponse, ResetMatchesResponse, StylistMatchesResponse};
