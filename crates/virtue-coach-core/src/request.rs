//! Request payloads for the two coaching endpoints and their validation.
//!
//! Validation runs on the raw JSON value first so that a wrong container type
//! (`analyses: "text"`) is reported by field name, then the value is deserialized into the
//! typed request. Optional fields default instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::RequestError;

/// One virtue in the user's priority list. The list order is the priority order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawVirtueScore")]
pub struct VirtueScore {
    /// Display name; empty when neither `virtue` nor `name` carries text.
    pub virtue: String,
    /// Identifier used in `stageProgress` keys. Numbers are accepted and kept as text.
    pub id: Option<String>,
    /// How strongly the opposing defect shows up, 0–10. Display score is `10 - intensity`.
    pub defect_intensity: Option<f64>,
}

/// Wire shape: `virtue` and `name` may both appear, either may be null.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVirtueScore {
    #[serde(default)]
    virtue: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(default)]
    defect_intensity: Option<f64>,
}

impl From<RawVirtueScore> for VirtueScore {
    fn from(raw: RawVirtueScore) -> Self {
        let virtue = [raw.virtue, raw.name]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();
        Self {
            virtue,
            id: raw.id,
            defect_intensity: raw.defect_intensity,
        }
    }
}

/// Body of `POST /api/generate-recommendation`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub prioritized_virtues: Vec<VirtueScore>,
    /// Sparse map keyed `"<virtueId>-<stageNumber>"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_progress: BTreeMap<String, Value>,
    #[serde(default)]
    pub recent_update: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_first_time: bool,
}

/// One prior per-virtue analysis fed into the synthesis prompt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtueAnalysis {
    #[serde(default, alias = "virtueName", deserialize_with = "null_as_default")]
    pub virtue: String,
    #[serde(
        default,
        alias = "text",
        alias = "content",
        deserialize_with = "null_as_default"
    )]
    pub analysis: String,
}

/// Body of `POST /api/generate-synthesis`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub analyses: Vec<VirtueAnalysis>,
    pub prioritized_virtues: Vec<VirtueScore>,
}

/// Parse and validate a recommendation body.
pub fn parse_recommendation_request(body: &[u8]) -> Result<RecommendationRequest, RequestError> {
    let value = parse_json(body)?;
    require_array(&value, "prioritizedVirtues")?;
    optional_object(&value, "stageProgress")?;
    serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))
}

/// Parse and validate a synthesis body.
pub fn parse_synthesis_request(body: &[u8]) -> Result<SynthesisRequest, RequestError> {
    let value = parse_json(body)?;
    require_array(&value, "analyses")?;
    require_array(&value, "prioritizedVirtues")?;
    serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))
}

fn parse_json(body: &[u8]) -> Result<Value, RequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(RequestError::InvalidJson("expected a JSON object".to_string()));
    }
    Ok(value)
}

fn require_array(value: &Value, field: &'static str) -> Result<(), RequestError> {
    match value.get(field) {
        Some(Value::Array(_)) => Ok(()),
        _ => Err(RequestError::InvalidField {
            field,
            expected: "an array",
        }),
    }
}

fn optional_object(value: &Value, field: &'static str) -> Result<(), RequestError> {
    match value.get(field) {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(RequestError::InvalidField {
            field,
            expected: "an object",
        }),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
