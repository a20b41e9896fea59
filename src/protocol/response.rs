use super::canonical::canonical_json;
use super::task::TaskType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

/// Opaque peer identity (the hotkey the registry reports).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PeerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a peer returned as its task output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    /// A well-formed JSON object.
    Structured(Map<String, Value>),
    /// Anything that failed to parse as a JSON object.
    Malformed { raw: String, reason: String },
}

impl OutputData {
    /// Parses serialized output. Only a JSON object counts as structured.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::Structured(map),
            Ok(other) => Self::Malformed {
                raw: raw.to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            },
            Err(e) => Self::Malformed {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// Normalizes an already-decoded value. Strings are treated as serialized output.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            Value::String(raw) => Self::parse(&raw),
            other => Self::Malformed {
                raw: other.to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            },
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Structured(map) => Some(map),
            Self::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Canonical text used for similarity and duplicate hashing.
    pub fn canonical(&self) -> String {
        match self {
            Self::Structured(map) => canonical_json(&Value::Object(map.clone())),
            Self::Malformed { raw, .. } => raw.clone(),
        }
    }

    /// `{}`: a reply with nothing in it, treated the same as no reply.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Structured(map) if map.is_empty())
    }

    /// The miner's own failure report: an `error` key with nothing beside it
    /// but `hint` and `raw_output`.
    pub fn is_error_report(&self) -> bool {
        match self {
            Self::Structured(map) => {
                map.contains_key("error")
                    && map.keys().all(|key| ERROR_REPORT_KEYS.contains(&key.as_str()))
            }
            Self::Malformed { .. } => false,
        }
    }
}

const ERROR_REPORT_KEYS: [&str; 3] = ["error", "hint", "raw_output"];

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// How a peer says it produced its content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GenerationMode {
    Local,
    Api,
    Vllm,
    Custom,
    Mock,
    Unknown,
}

/// Self-reported model metadata. Every field is optional because peers are untrusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GenerationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ModelInfo {
    pub fn new(mode: GenerationMode, name: impl Into<String>) -> Self {
        Self {
            mode: Some(mode),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Lenient decode: unknown modes become `Unknown`, wrong-typed fields are dropped.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        let mode = text("mode").map(|m| m.parse().unwrap_or(GenerationMode::Unknown));
        Self {
            mode,
            name: text("name"),
            version: text("version"),
            provider: text("provider"),
            parameters: map
                .get("parameters")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// A peer has declared its model when it reports any mode other than `unknown`.
    pub fn is_declared(&self) -> bool {
        matches!(self.mode, Some(mode) if mode != GenerationMode::Unknown)
    }
}

/// One peer's reply to one task, normalized at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResponse {
    pub responder: PeerId,
    pub task_type: TaskType,
    /// `None` when the peer timed out or never replied.
    pub output: Option<OutputData>,
    pub generation_time: f64,
    pub model_info: ModelInfo,
}

impl TaskResponse {
    pub fn new(
        responder: PeerId,
        task_type: TaskType,
        output: OutputData,
        generation_time: f64,
        model_info: ModelInfo,
    ) -> Self {
        Self {
            responder,
            task_type,
            output: Some(output).filter(|o| !o.is_empty()),
            generation_time: sanitize_seconds(generation_time),
            model_info,
        }
    }

    pub fn absent(responder: PeerId, task_type: TaskType) -> Self {
        Self {
            responder,
            task_type,
            output: None,
            generation_time: 0.0,
            model_info: ModelInfo::default(),
        }
    }

    /// Normalizes a loosely-typed reply mapping.
    ///
    /// Accepts `output_data` as an object or a serialized string, `generation_time`
    /// as a number or numeric string, and `model_info` / `declared_model_info`.
    /// An empty `output_data` object counts as no reply.
    pub fn from_wire(responder: PeerId, task_type: TaskType, reply: &Value) -> Self {
        let Some(map) = reply.as_object() else {
            return Self::absent(responder, task_type);
        };

        let output = match map.get("output_data") {
            None | Some(Value::Null) => None,
            Some(value) => Some(OutputData::from_value(value.clone())).filter(|o| !o.is_empty()),
        };

        let generation_time = map
            .get("generation_time")
            .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
            .unwrap_or(0.0);

        let model_info = map
            .get("model_info")
            .or_else(|| map.get("declared_model_info"))
            .map(ModelInfo::from_value)
            .unwrap_or_default();

        Self {
            responder,
            task_type,
            output,
            generation_time: sanitize_seconds(generation_time),
            model_info,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.output.is_none()
    }
}

fn sanitize_seconds(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_accepts_objects_only() {
        assert!(matches!(
            OutputData::parse(r#"{"title":"T"}"#),
            OutputData::Structured(_)
        ));
        let OutputData::Malformed { reason, .. } = OutputData::parse(r#"[{"title":"T"}]"#) else {
            panic!("bare list must be malformed");
        };
        assert!(reason.contains("array"));
        assert!(OutputData::parse("{not json").is_malformed());
    }

    #[test]
    fn model_info_tolerates_garbage() {
        let info = ModelInfo::from_value(&json!({"mode": "quantum", "name": 7}));
        assert_eq!(info.mode, Some(GenerationMode::Unknown));
        assert_eq!(info.name, None);
        assert!(!info.is_declared());

        let info = ModelInfo::from_value(&json!({"mode": "VLLM", "name": "qwen2.5-7b"}));
        assert_eq!(info.mode, Some(GenerationMode::Vllm));
        assert!(info.is_declared());

        assert_eq!(ModelInfo::from_value(&json!({})), ModelInfo::default());
    }

    #[test]
    fn from_wire_normalizes_string_payloads() {
        let reply = json!({
            "output_data": "{\"title\": \"T\"}",
            "generation_time": "4.5",
            "declared_model_info": {"mode": "local", "name": "llama"}
        });
        let response = TaskResponse::from_wire("p1".into(), TaskType::Blueprint, &reply);
        assert!(matches!(response.output, Some(OutputData::Structured(_))));
        assert!((response.generation_time - 4.5).abs() < f64::EPSILON);
        assert_eq!(response.model_info.mode, Some(GenerationMode::Local));
    }

    #[test]
    fn from_wire_without_output_is_absent() {
        let response = TaskResponse::from_wire("p1".into(), TaskType::Chapters, &json!({}));
        assert!(response.is_absent());
        let response = TaskResponse::from_wire("p1".into(), TaskType::Chapters, &json!(null));
        assert!(response.is_absent());
    }

    #[test]
    fn empty_output_object_is_absent() {
        for output in [json!({}), json!("{}"), json!(" { } ")] {
            let reply = json!({"output_data": output, "generation_time": 2.0});
            let response = TaskResponse::from_wire("p1".into(), TaskType::Blueprint, &reply);
            assert!(response.is_absent(), "{reply}");
        }
        let response = TaskResponse::new(
            "p1".into(),
            TaskType::Blueprint,
            OutputData::parse("{}"),
            2.0,
            ModelInfo::default(),
        );
        assert!(response.is_absent());
    }

    #[test]
    fn error_reports_are_recognized() {
        let report = |value: serde_json::Value| OutputData::from_value(value).is_error_report();
        assert!(report(json!({"error": "generator timed out"})));
        assert!(report(json!({"error": "Format mismatch", "hint": "use an object", "raw_output": []})));
        assert!(!report(json!({"error": "x", "title": "Still a story"})));
        assert!(!report(json!({"title": "T"})));
        assert!(!OutputData::parse("{oops").is_error_report());
    }

    #[test]
    fn negative_generation_time_is_clamped() {
        let response = TaskResponse::new(
            "p".into(),
            TaskType::Blueprint,
            OutputData::parse(r#"{"title": "T"}"#),
            -3.0,
            ModelInfo::default(),
        );
        assert!(response.generation_time.abs() < f64::EPSILON);
    }
}
