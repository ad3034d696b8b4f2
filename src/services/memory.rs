use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

use crate::models::{Match, NewMatch, UserPreferences, UserProfile};
use crate::services::store::{MatchStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    matches: Vec<Match>,
    profiles: Vec<UserProfile>,
    preferences: Vec<UserPreferences>,
}

/// Process-local match store for development and tests
///
/// Behaves like the remote backends: no self-match check, a unique
/// (user_id, stylist_id) pair, newest matches first.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a match with an explicit timestamp
    pub fn insert_match(
        &self,
        user_id: &str,
        stylist_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Match {
        let created = Match {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            stylist_id: stylist_id.to_string(),
            matched_at,
        };
        self.write().matches.push(created.clone());
        created
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.write().profiles.push(profile);
    }

    pub fn insert_preferences(&self, preferences: UserPreferences) {
        self.write().preferences.push(preferences);
    }

    pub fn match_count(&self) -> usize {
        self.read().matches.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_matches_for_stylist(&self, stylist_id: &str) -> Result<Vec<Match>, StoreError> {
        let mut matches: Vec<Match> = self
            .read()
            .matches
            .iter()
            .filter(|m| m.stylist_id == stylist_id)
            .cloned()
            .collect();

        // Stable sort keeps insertion order between equal timestamps
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));
        Ok(matches)
    }

    async fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self
            .read()
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn find_preferences(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserPreferences>, StoreError> {
        Ok(self
            .read()
            .preferences
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, StoreError> {
        let mut tables = self.write();

        if tables
            .matches
            .iter()
            .any(|m| m.user_id == new_match.user_id && m.stylist_id == new_match.stylist_id)
        {
            return Err(StoreError::Conflict(format!(
                "match {} -> {} already exists",
                new_match.user_id, new_match.stylist_id
            )));
        }

        let created = Match {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_match.user_id.clone(),
            stylist_id: new_match.stylist_id.clone(),
            matched_at: Utc::now(),
        };
        tables.matches.push(created.clone());

        Ok(created)
    }

    async fn delete_matches_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut tables = self.write();
        let before = tables.matches.len();
        tables.matches.retain(|m| m.user_id != user_id);
        Ok((before - tables.matches.len()) as u64)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
