use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's "like" on a stylist, treated as a connection as soon as it exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub user_id: String,
    pub stylist_id: String,
    pub matched_at: DateTime<Utc>,
}

/// Input for the match creation write path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub user_id: String,
    pub stylist_id: String,
}

/// Account role as stored on the profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Stylist,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Stylist => "stylist",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "stylist" => Ok(Role::Stylist),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Display identity for any account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
}

/// Parse the role column the same way the SQL backend does: case-insensitive,
/// unknown values read as no role rather than failing the whole row
fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|r| r.parse::<Role>().ok()))
}

/// Stored styling preferences for one user
///
/// Rows are created empty at sign-up and filled in later, so every column
/// other than `user_id` may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clothing_preferences: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub preferred_occasions: Vec<String>,
    #[serde(default)]
    pub style_preference: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_completed: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Preferences as shown next to a match; never null, every field defaulted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesView {
    pub gender: String,
    #[serde(rename = "clothingTypes")]
    pub clothing_types: Vec<String>,
    pub occasions: Vec<String>,
    pub style: String,
    #[serde(rename = "budgetRange")]
    pub budget_range: String,
}

impl PreferencesView {
    pub fn is_empty(&self) -> bool {
        self.gender.is_empty()
            && self.clothing_types.is_empty()
            && self.occasions.is_empty()
            && self.style.is_empty()
            && self.budget_range.is_empty()
    }
}

/// A match joined with its user's display name and preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMatch {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "stylistId")]
    pub stylist_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub preferences: PreferencesView,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
}
