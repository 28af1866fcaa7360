//! Structured item metadata extracted from a screenshot by the vision model.

use serde::{Deserialize, Serialize};

/// The eight fields the vision model is prompted to return for a game item
/// screenshot, plus an `error` field populated on the degraded path.
///
/// Callers always receive a well-formed object: when the model call fails for
/// any reason (transport, non-2xx, unparseable content) the service returns
/// [`ExtractionResult::degraded`] instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Marketing title following the fixed listing template
    #[serde(default)]
    pub title: String,

    /// Short, precise name for market search (mutation + base item only)
    #[serde(default)]
    pub clean_name: String,

    /// Mutation name (e.g. "Rainbow", "Lava"); null when the item has none
    #[serde(default)]
    pub mutation: Option<String>,

    /// Number of traits visible on the item
    #[serde(default)]
    pub traits_count: i64,

    /// "Free" or "Non-free"
    #[serde(default = "default_brainrot_type")]
    pub brainrot_type: String,

    /// Rough price estimate; 0 for free items
    #[serde(default)]
    pub price_suggestion: f64,

    /// Base item name without mutations or variant tags
    #[serde(default)]
    pub item_name: String,

    /// The M/s or B/s rate string exactly as shown (e.g. "4.4B/s")
    #[serde(default)]
    pub ms_rate: Option<String>,

    /// Failure description, only present on the degraded path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_brainrot_type() -> String {
    "Non-free".to_string()
}

impl ExtractionResult {
    /// Fallback record returned when the model call fails.
    ///
    /// Fixed error title, null mutation, zero traits, "Non-free", zero price
    /// suggestion, and the failure reason in `error`.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            title: "Error Analyzing Image".to_string(),
            clean_name: String::new(),
            mutation: None,
            traits_count: 0,
            brainrot_type: "Non-free".to_string(),
            price_suggestion: 0.0,
            item_name: String::new(),
            ms_rate: None,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_record_has_fallback_shape() {
        let result = ExtractionResult::degraded("connection timed out");
        assert_eq!(result.title, "Error Analyzing Image");
        assert_eq!(result.mutation, None);
        assert_eq!(result.traits_count, 0);
        assert_eq!(result.brainrot_type, "Non-free");
        assert_eq!(result.price_suggestion, 0.0);
        assert_eq!(result.error.as_deref(), Some("connection timed out"));
    }

    #[test]
    fn error_field_is_omitted_on_success() {
        let json = serde_json::to_value(ExtractionResult {
            title: "🌋 Lava 1 Trait Skibidi Toilet".to_string(),
            clean_name: "Lava Skibidi Toilet".to_string(),
            mutation: Some("Lava".to_string()),
            traits_count: 1,
            brainrot_type: "Non-free".to_string(),
            price_suggestion: 500.0,
            item_name: "Skibidi Toilet".to_string(),
            ms_rate: Some("4.4B/s".to_string()),
            error: None,
        })
        .unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"title": "x", "clean_name": "y"}"#).unwrap();
        assert_eq!(result.traits_count, 0);
        assert_eq!(result.brainrot_type, "Non-free");
        assert_eq!(result.mutation, None);
    }
}
