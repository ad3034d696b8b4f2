use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::models::{Match, NewMatch, UserPreferences, UserProfile};
use crate::services::store::{MatchStore, StoreError, StoreTables};

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

/// Supabase REST (PostgREST) client
///
/// Handles all communication with the Supabase backend including:
/// - Listing a stylist's matches
/// - Batched profile and preference lookups
/// - Creating and resetting matches
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: StoreTables,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: StoreTables,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let query_string = query
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/rest/v1/{}?{}",
            self.base_url.trim_end_matches('/'),
            table,
            query_string
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    /// Fetch every row matching `user_id IN (...)`, skipping rows that fail to parse
    async fn select_by_user_ids<T>(
        &self,
        table: &str,
        columns: &str,
        user_ids: &[String],
    ) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.table_url(
            table,
            &[
                ("select", columns.to_string()),
                ("user_id", in_filter(user_ids)),
            ],
        );

        tracing::debug!("Fetching {} rows for {} users", table, user_ids.len());

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_response(response, table).await?;
        let rows: Vec<Value> = response.json().await?;

        let total = rows.len();
        let parsed: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Skipping malformed {} row: {}", table, e);
                    None
                }
            })
            .collect();

        tracing::debug!("Parsed {} of {} {} rows", parsed.len(), total, table);

        Ok(parsed)
    }
}

#[async_trait]
impl MatchStore for SupabaseClient {
    async fn find_matches_for_stylist(&self, stylist_id: &str) -> Result<Vec<Match>, StoreError> {
        let url = self.table_url(
            &self.tables.matches,
            &[
                ("select", "id,user_id,stylist_id,matched_at".to_string()),
                ("stylist_id", format!("eq.{}", stylist_id)),
                ("order", "matched_at.desc".to_string()),
            ],
        );

        tracing::debug!("Fetching matches for stylist: {}", stylist_id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_response(response, "Failed to fetch matches").await?;

        response
            .json::<Vec<Match>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse matches: {}", e)))
    }

    async fn find_profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        self.select_by_user_ids(&self.tables.user_profiles, "user_id,full_name,role", user_ids)
            .await
    }

    async fn find_preferences(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserPreferences>, StoreError> {
        self.select_by_user_ids(&self.tables.user_preferences, "*", user_ids)
            .await
    }

    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, StoreError> {
        let url = self.table_url(
            &self.tables.matches,
            &[("select", "id,user_id,stylist_id,matched_at".to_string())],
        );

        let payload = serde_json::json!({
            "user_id": new_match.user_id,
            "stylist_id": new_match.stylist_id,
            "matched_at": Utc::now(),
        });

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let response = check_response(response, "Failed to create match").await?;

        let mut created: Vec<Match> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse match: {}", e)))?;

        if created.is_empty() {
            return Err(StoreError::InvalidResponse(
                "Insert returned no representation".into(),
            ));
        }

        let created = created.swap_remove(0);
        tracing::debug!("Created match {}: {} -> {}", created.id, created.user_id, created.stylist_id);

        Ok(created)
    }

    async fn delete_matches_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let url = self.table_url(
            &self.tables.matches,
            &[
                ("select", "id".to_string()),
                ("user_id", format!("eq.{}", user_id)),
            ],
        );

        let response = self
            .authorized(self.client.delete(&url))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = check_response(response, "Failed to delete matches").await?;

        let deleted: Vec<Value> = response.json().await?;
        Ok(deleted.len() as u64)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = self.table_url(
            &self.tables.matches,
            &[("select", "id".to_string()), ("limit", "1".to_string())],
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        check_response(response, "Health check failed").await.map(|_| true)
    }
}

/// Build a PostgREST `in.(...)` filter, quoting every value
fn in_filter(values: &[String]) -> String {
    let quoted = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", quoted)
}

/// Turn a non-success PostgREST response into a typed error
async fn check_response(response: Response, context: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();
    let code = parsed
        .as_ref()
        .and_then(|e| e.code.clone())
        .unwrap_or_default();
    let message = parsed.and_then(|e| e.message).unwrap_or(body);

    tracing::error!("{}: {} - {} ({})", context, status, message, code);

    Err(match code.as_str() {
        "23505" => StoreError::Conflict(message),
        "23514" => StoreError::Constraint(message),
        "42501" => StoreError::PermissionDenied(message),
        _ if status == StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
        _ if status == StatusCode::FORBIDDEN => StoreError::PermissionDenied(message),
        _ => StoreError::ApiError(format!("{}: {} {}", context, status, message)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use crate::models::Role;

    fn client_for(server: &mockito::ServerGuard) -> SupabaseClient {
        SupabaseClient::new(server.url(), "service_key".to_string(), StoreTables::default(), 5)
            .unwrap()
    }

    #[test]
    fn test_in_filter_quotes_values() {
        let ids = vec!["a1".to_string(), "b,2".to_string(), "c\"3".to_string()];
        assert_eq!(in_filter(&ids), r#"in.("a1","b,2","c\"3")"#);
    }

    #[test]
    fn test_table_url_encodes_query() {
        let client = SupabaseClient::new(
            "https://project.supabase.co/".to_string(),
            "key".to_string(),
            StoreTables::default(),
            5,
        )
        .unwrap();

        let url = client.table_url("matches", &[("stylist_id", "eq.s 1".to_string())]);
        assert_eq!(url, "https://project.supabase.co/rest/v1/matches?stylist_id=eq.s%201");
    }

    #[tokio::test]
    async fn test_find_matches_for_stylist() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("stylist_id".into(), "eq.s1".into()),
                Matcher::UrlEncoded("order".into(), "matched_at.desc".into()),
            ]))
            .match_header("apikey", "service_key")
            .match_header("authorization", "Bearer service_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":"m2","user_id":"u2","stylist_id":"s1","matched_at":"2024-05-02T10:00:00+00:00"},
                    {"id":"m1","user_id":"u1","stylist_id":"s1","matched_at":"2024-05-01T10:00:00+00:00"}
                ]"#,
            )
            .create_async()
            .await;

        let matches = client_for(&server).find_matches_for_stylist("s1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "m2");
        assert_eq!(matches[1].user_id, "u1");
    }

    #[tokio::test]
    async fn test_find_matches_maps_permission_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"code":"42501","message":"permission denied for table matches"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .find_matches_for_stylist("s1")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_find_profiles_batches_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/user_profiles")
            .match_query(Matcher::UrlEncoded(
                "user_id".into(),
                r#"in.("u1","u2")"#.into(),
            ))
            .with_status(200)
            .with_body(
                r#"[{"user_id":"u1","full_name":"Jane Doe","role":"user"},{"user_id":42}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let ids = vec!["u1".to_string(), "u2".to_string()];
        let profiles = client_for(&server).find_profiles(&ids).await.unwrap();

        mock.assert_async().await;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].full_name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_profiles_with_unexpected_roles_are_kept() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/user_profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"user_id":"s1","full_name":"Ana","role":"Stylist"},{"user_id":"u1","full_name":"Jane Doe","role":"moderator"}]"#,
            )
            .create_async()
            .await;

        let ids = vec!["s1".to_string(), "u1".to_string()];
        let profiles = client_for(&server).find_profiles(&ids).await.unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].role, Some(Role::Stylist));
        assert_eq!(profiles[1].full_name.as_deref(), Some("Jane Doe"));
        assert!(profiles[1].role.is_none());
    }

    #[tokio::test]
    async fn test_empty_id_set_skips_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let prefs = client_for(&server).find_preferences(&[]).await.unwrap();

        mock.assert_async().await;
        assert!(prefs.is_empty());
    }

    #[tokio::test]
    async fn test_create_match_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/matches")
            .match_query(Matcher::Any)
            .match_header("prefer", "return=representation")
            .with_status(409)
            .with_body(r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_match(&NewMatch {
                user_id: "u1".to_string(),
                stylist_id: "s1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_matches_counts_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/rest/v1/matches")
            .match_query(Matcher::UrlEncoded("user_id".into(), "eq.u1".into()))
            .with_status(200)
            .with_body(r#"[{"id":"m1"},{"id":"m2"},{"id":"m3"}]"#)
            .create_async()
            .await;

        let deleted = client_for(&server).delete_matches_for_user("u1").await.unwrap();
        assert_eq!(deleted, 3);
    }
}
