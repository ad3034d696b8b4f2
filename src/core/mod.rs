// Core pipeline exports
pub mod display_name;
pub mod enricher;
pub mod preferences;
pub mod recorder;

pub use display_name::{fallback_name, resolve_display_name, ResolvedName};
pub use enricher::{distinct_user_ids, enrich_matches, EnrichError, MatchEnricher};
pub use preferences::preferences_view;
pub use recorder::{MatchRecorder, RecordError};
