use crate::models::{PreferencesView, UserPreferences};

/// Build the always-present preferences view for a match card
///
/// A missing row and a row of blanks produce the same empty view.
pub fn preferences_view(preferences: Option<&UserPreferences>) -> PreferencesView {
    let Some(prefs) = preferences else {
        return PreferencesView::default();
    };

    PreferencesView {
        gender: clean_scalar(prefs.gender.as_deref()),
        clothing_types: clean_set(&prefs.clothing_preferences),
        occasions: clean_set(&prefs.preferred_occasions),
        style: clean_scalar(prefs.style_preference.as_deref()),
        budget_range: clean_scalar(prefs.budget_range.as_deref()),
    }
}

fn clean_scalar(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trim entries, drop blanks and keep the first copy of each value
fn clean_set(values: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !cleaned.iter().any(|existing| existing == value) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}
