use std::sync::Arc;
use thiserror::Error;

use crate::models::{Match, NewMatch, Role};
use crate::services::{MatchStore, StoreError};

/// Errors from the match write paths
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A user cannot match with themselves")]
    SelfMatch,

    #[error("Target {0} is not a stylist")]
    NotAStylist(String),

    #[error("User {user_id} already matched with stylist {stylist_id}")]
    AlreadyMatched { user_id: String, stylist_id: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Owns the match lifecycle: creation on a "like" swipe and bulk reset
#[derive(Clone)]
pub struct MatchRecorder {
    store: Arc<dyn MatchStore>,
}

impl MatchRecorder {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// Record a user's "like" on a stylist
    ///
    /// Self-matches are rejected here whether or not the database carries a
    /// CHECK constraint for them.
    pub async fn record_like(&self, new_match: NewMatch) -> Result<Match, RecordError> {
        let new_match = NewMatch {
            user_id: new_match.user_id.trim().to_string(),
            stylist_id: new_match.stylist_id.trim().to_string(),
        };

        if new_match.user_id.is_empty() || new_match.stylist_id.is_empty() {
            return Err(RecordError::InvalidInput(
                "userId and stylistId are required".to_string(),
            ));
        }

        if new_match.user_id == new_match.stylist_id {
            tracing::info!("Rejected self-match for user {}", new_match.user_id);
            return Err(RecordError::SelfMatch);
        }

        // Profiles are written asynchronously at sign-up, so a missing one is
        // not a rejection
        let target = self
            .store
            .find_profiles(std::slice::from_ref(&new_match.stylist_id))
            .await?;
        if let Some(role) = target
            .iter()
            .find(|p| p.user_id == new_match.stylist_id)
            .and_then(|p| p.role)
        {
            if role != Role::Stylist {
                return Err(RecordError::NotAStylist(new_match.stylist_id));
            }
        }

        match self.store.create_match(&new_match).await {
            Ok(created) => {
                tracing::info!(
                    "Recorded match {}: {} -> {}",
                    created.id,
                    created.user_id,
                    created.stylist_id
                );
                Ok(created)
            }
            Err(StoreError::Conflict(_)) => Err(RecordError::AlreadyMatched {
                user_id: new_match.user_id,
                stylist_id: new_match.stylist_id,
            }),
            Err(StoreError::Constraint(message)) => {
                tracing::warn!("Store rejected match: {}", message);
                Err(RecordError::InvalidInput(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every match the user created
    pub async fn reset(&self, user_id: &str) -> Result<u64, RecordError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(RecordError::InvalidInput("userId is required".to_string()));
        }

        let deleted = self.store.delete_matches_for_user(user_id).await?;
        tracing::info!("Reset {} matches for user {}", deleted, user_id);

        Ok(deleted)
    }
}
