use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Opaque artwork metadata.
///
/// The registry does not interpret artwork fields. The only shape check is
/// that the payload is a non-empty JSON object, so that version fields can
/// be attached on update. Serialization goes through `serde_json`'s sorted
/// map, which makes [`Metadata::to_bytes`] deterministic for equal values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub const VERSION_FIELD: &'static str = "version";
    pub const PREVIOUS_VERSION_FIELD: &'static str = "previousVersion";

    /// Validate a raw JSON value as metadata.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) if map.is_empty() => {
                Err(TypeError::InvalidMetadata("metadata object is empty".into()))
            }
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(TypeError::InvalidMetadata("metadata is missing".into())),
            other => Err(TypeError::InvalidMetadata(format!(
                "metadata must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Return a copy tagged with `version` and `previousVersion`.
    pub fn with_version(&self, version: u64, previous_version: u64) -> Self {
        let mut map = self.0.clone();
        map.insert(Self::VERSION_FIELD.into(), Value::from(version));
        map.insert(Self::PREVIOUS_VERSION_FIELD.into(), Value::from(previous_version));
        Self(map)
    }

    pub fn version(&self) -> Option<u64> {
        self.0.get(Self::VERSION_FIELD).and_then(Value::as_u64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Canonical byte encoding used for content addressing.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(&self.0).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Metadata {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Metadata> for Value {
    fn from(metadata: Metadata) -> Self {
        metadata.into_value()
    }
}

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
