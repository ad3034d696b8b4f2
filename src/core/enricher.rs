use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::core::display_name::resolve_display_name;
use crate::core::preferences::preferences_view;
use crate::models::{EnrichedMatch, Match, UserPreferences, UserProfile};
use crate::services::{MatchStore, StoreError};

/// Errors surfaced by the enrichment pipeline
///
/// Only the match lookup is fatal. Profile and preference failures degrade
/// the output to placeholder values and are logged instead.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("failed to load matches for stylist {stylist_id}: {source}")]
    LookupFailure {
        stylist_id: String,
        #[source]
        source: StoreError,
    },
}

/// Builds the "matched clients" view for a stylist
///
/// # Pipeline Stages
/// 1. Match lookup (fatal on error)
/// 2. Profile and preference lookups, run concurrently (degrade on error)
/// 3. Join, with name and preference fallbacks
#[derive(Clone)]
pub struct MatchEnricher {
    store: Arc<dyn MatchStore>,
}

impl MatchEnricher {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// Enriched matches for `stylist_id`, most recent first
    ///
    /// The stylist id is passed in by the caller; nothing here reads session
    /// state.
    pub async fn enrich_for_stylist(
        &self,
        stylist_id: &str,
    ) -> Result<Vec<EnrichedMatch>, EnrichError> {
        let matches = self
            .store
            .find_matches_for_stylist(stylist_id)
            .await
            .map_err(|source| {
                tracing::error!("Failed to load matches for stylist {}: {}", stylist_id, source);
                EnrichError::LookupFailure {
                    stylist_id: stylist_id.to_string(),
                    source,
                }
            })?;

        if matches.is_empty() {
            tracing::debug!("Stylist {} has no matches", stylist_id);
            return Ok(Vec::new());
        }

        let user_ids = distinct_user_ids(&matches);

        let (profiles, preferences) = tokio::join!(
            self.store.find_profiles(&user_ids),
            self.store.find_preferences(&user_ids),
        );

        let profiles = profiles.unwrap_or_else(|e| {
            tracing::warn!(
                "Enrichment degraded for stylist {}: profile lookup failed: {}",
                stylist_id,
                e
            );
            Vec::new()
        });
        let preferences = preferences.unwrap_or_else(|e| {
            tracing::warn!(
                "Enrichment degraded for stylist {}: preference lookup failed: {}",
                stylist_id,
                e
            );
            Vec::new()
        });

        let enriched = enrich_matches(matches, &profiles, &preferences);

        tracing::debug!(
            "Enriched {} matches for stylist {} ({} profiles, {} preference rows)",
            enriched.len(),
            stylist_id,
            profiles.len(),
            preferences.len()
        );

        Ok(enriched)
    }
}

/// User ids in the order they first appear
pub fn distinct_user_ids(matches: &[Match]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(matches.len());
    matches
        .iter()
        .filter(|m| seen.insert(m.user_id.as_str()))
        .map(|m| m.user_id.clone())
        .collect()
}

/// Join matches with whatever profiles and preferences were found
///
/// Output has exactly one entry per input match, in input order. When a
/// lookup returned several rows for one user the first row wins.
pub fn enrich_matches(
    matches: Vec<Match>,
    profiles: &[UserProfile],
    preferences: &[UserPreferences],
) -> Vec<EnrichedMatch> {
    let mut profiles_by_user: HashMap<&str, &UserProfile> = HashMap::with_capacity(profiles.len());
    for profile in profiles {
        profiles_by_user.entry(profile.user_id.as_str()).or_insert(profile);
    }

    let mut preferences_by_user: HashMap<&str, &UserPreferences> =
        HashMap::with_capacity(preferences.len());
    for prefs in preferences {
        preferences_by_user.entry(prefs.user_id.as_str()).or_insert(prefs);
    }

    matches
        .into_iter()
        .map(|m| {
            let resolved = resolve_display_name(
                &m.user_id,
                profiles_by_user.get(m.user_id.as_str()).copied(),
            );
            let preferences = preferences_view(preferences_by_user.get(m.user_id.as_str()).copied());

            EnrichedMatch {
                id: m.id,
                user_id: m.user_id,
                stylist_id: m.stylist_id,
                matched_at: m.matched_at,
                display_name: resolved.name,
                preferences,
                is_complete: resolved.from_profile,
            }
        })
        .collect()
}
