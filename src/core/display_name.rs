use crate::models::UserProfile;

/// Number of trailing id characters used in a placeholder name
pub const FALLBACK_SUFFIX_LEN: usize = 6;

/// Resolved name for a match card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    /// True when the name came from the profile rather than the placeholder
    pub from_profile: bool,
}

/// Pick the name to show for `user_id`
///
/// A trimmed, non-blank `full_name` wins; anything else gets a placeholder
/// built from the end of the id.
pub fn resolve_display_name(user_id: &str, profile: Option<&UserProfile>) -> ResolvedName {
    let profile_name = profile
        .and_then(|p| p.full_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match profile_name {
        Some(name) => ResolvedName {
            name: name.to_string(),
            from_profile: true,
        },
        None => ResolvedName {
            name: fallback_name(user_id),
            from_profile: false,
        },
    }
}

/// `User <last 6 characters of the id>`, or the whole id when it is shorter
pub fn fallback_name(user_id: &str) -> String {
    let char_count = user_id.chars().count();
    let suffix: String = user_id
        .chars()
        .skip(char_count.saturating_sub(FALLBACK_SUFFIX_LEN))
        .collect();
    format!("User {}", suffix)
}
