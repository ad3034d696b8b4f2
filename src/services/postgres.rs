use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Match, NewMatch, Role, UserPreferences, UserProfile};
use crate::services::store::{MatchStore, StoreError, StoreTables};

/// PostgreSQL-backed match store
///
/// Talks to the same tables the Supabase REST API exposes, for deployments
/// that sit next to the database. Identifier columns are UUIDs.
pub struct PostgresStore {
    pool: PgPool,
    tables: StoreTables,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
        tables: StoreTables,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool, tables })
    }

    /// Create a new store from settings, filling in pool defaults
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
        tables: StoreTables,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
            tables,
        )
        .await
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| StoreError::InvalidInput(format!("not a valid id: {}", value)))
}

fn parse_lookup_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

/// Ids that are not UUIDs cannot match any row, so they are dropped
fn parse_uuid_set(values: &[String]) -> Vec<Uuid> {
    values.iter().filter_map(|v| parse_lookup_id(v)).collect()
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    Ok(Match {
        id: row.try_get::<Uuid, _>("id")?.to_string(),
        user_id: row.try_get::<Uuid, _>("user_id")?.to_string(),
        stylist_id: row.try_get::<Uuid, _>("stylist_id")?.to_string(),
        matched_at: row.try_get("matched_at")?,
    })
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Conflict(db.message().to_string()),
            Some("23514") => return StoreError::Constraint(db.message().to_string()),
            _ => {}
        }
    }
    StoreError::SqlxError(err)
}

#[async_trait]
impl MatchStore for PostgresStore {
    async fn find_matches_for_stylist(&self, stylist_id: &str) -> Result<Vec<Match>, StoreError> {
        // A non-UUID id cannot match any row
        let Some(stylist_id) = parse_lookup_id(stylist_id) else {
            tracing::debug!("Stylist id {} is not a UUID; no matches", stylist_id);
            return Ok(Vec::new());
        };
        let query = format!(
            r#"
            SELECT id, user_id, stylist_id, matched_at
            FROM {}
            WHERE stylist_id = $1
            ORDER BY matched_at DESC
            "#,
            self.tables.matches
        );

        let rows = sqlx::query(&query)
            .bind(stylist_id)
            .fetch_all(&self.pool)
            .await?;

        let matches = rows
            .iter()
            .map(match_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Stylist {} has {} matches", stylist_id, matches.len());

        Ok(matches)
    }

    async fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        let ids = parse_uuid_set(user_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT user_id, full_name, role::text AS role
            FROM {}
            WHERE user_id = ANY($1)
            "#,
            self.tables.user_profiles
        );

        let rows = sqlx::query(&query).bind(&ids).fetch_all(&self.pool).await?;

        let profiles = rows
            .iter()
            .map(|row| -> Result<UserProfile, sqlx::Error> {
                let role: Option<String> = row.try_get("role")?;
                Ok(UserProfile {
                    user_id: row.try_get::<Uuid, _>("user_id")?.to_string(),
                    full_name: row.try_get("full_name")?,
                    role: role.and_then(|r| r.parse::<Role>().ok()),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(profiles)
    }

    async fn find_preferences(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserPreferences>, StoreError> {
        let ids = parse_uuid_set(user_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT user_id, gender, clothing_preferences, preferred_occasions,
                   style_preference, budget_range, is_completed
            FROM {}
            WHERE user_id = ANY($1)
            "#,
            self.tables.user_preferences
        );

        let rows = sqlx::query(&query).bind(&ids).fetch_all(&self.pool).await?;

        let preferences = rows
            .iter()
            .map(|row| -> Result<UserPreferences, sqlx::Error> {
                Ok(UserPreferences {
                    user_id: row.try_get::<Uuid, _>("user_id")?.to_string(),
                    gender: row.try_get("gender")?,
                    clothing_preferences: row
                        .try_get::<Option<Vec<String>>, _>("clothing_preferences")?
                        .unwrap_or_default(),
                    preferred_occasions: row
                        .try_get::<Option<Vec<String>>, _>("preferred_occasions")?
                        .unwrap_or_default(),
                    style_preference: row.try_get("style_preference")?,
                    budget_range: row.try_get("budget_range")?,
                    is_completed: row
                        .try_get::<Option<bool>, _>("is_completed")?
                        .unwrap_or(false),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(preferences)
    }

    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, StoreError> {
        let user_id = parse_uuid(&new_match.user_id)?;
        let stylist_id = parse_uuid(&new_match.stylist_id)?;

        let query = format!(
            r#"
            INSERT INTO {} (user_id, stylist_id, matched_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, stylist_id, matched_at
            "#,
            self.tables.matches
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(stylist_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        let created = match_from_row(&row)?;
        tracing::debug!("Created match {}: {} -> {}", created.id, user_id, stylist_id);

        Ok(created)
    }

    async fn delete_matches_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let user_id = parse_uuid(user_id)?;
        let query = format!("DELETE FROM {} WHERE user_id = $1", self.tables.matches);

        let result = sqlx::query(&query).bind(user_id).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
