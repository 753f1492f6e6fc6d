//! Wire types for the agent backend

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    /// Always serialized, `null` when no image is attached
    pub image_base64: Option<String>,
}

/// Response of `POST /chat`
///
/// Only `answer` is checked: it must be a string or the body is malformed.
/// Off-shape `image_urls` entries and `fact_check` objects are dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "strings_only")]
    pub image_urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub fact_check: Option<FactCheckResult>,
}

/// Follow-up actions offered on an actionable agent answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Explain like I'm five
    Eli5,
    DeepDive,
    SuggestQuestions,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::Eli5,
        ActionKind::DeepDive,
        ActionKind::SuggestQuestions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Eli5 => "eli5",
            ActionKind::DeepDive => "deep_dive",
            ActionKind::SuggestQuestions => "suggest_questions",
        }
    }

    /// Button label shown under an actionable answer
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Eli5 => "Simplify This Knowledge",
            ActionKind::DeepDive => "Deep Space Exploration",
            ActionKind::SuggestQuestions => "Related Cosmic Mysteries",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    pub topic: String,
}

/// Response of `POST /action`; which field is populated depends on the action
///
/// Values of the wrong type read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub questions: Option<Vec<String>>,
}

/// Body of `POST /fact-check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactCheckRequest {
    pub original_query: String,
    pub answer_to_check: String,
}

/// Accuracy assessment of an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub is_accurate: bool,
    /// Expected in `[0, 1]`; not validated here
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified_facts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues_found: Vec<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
}

impl FactCheckResult {
    /// Confidence as a percentage with one decimal, e.g. `42.0%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence_score * 100.0)
    }

    /// Confidence clamped to `[0, 1]` for drawing a gauge
    pub fn confidence_ratio(&self) -> f64 {
        if self.confidence_score.is_nan() {
            return 0.0;
        }
        self.confidence_score.clamp(0.0, 1.0)
    }

    /// Recommendation text, if the backend sent a non-blank one
    pub fn recommendation(&self) -> Option<&str> {
        self.recommendations
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any value that does not decode as `T` becomes `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// String entries of a list; anything else reads as empty
fn strings_only<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}
