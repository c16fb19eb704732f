//! DID codec for `did:art:hkust:<recordId>` identifiers.
//!
//! Parsing and formatting are pure and lossless: for every valid DID `d`,
//! `format_did(&parse_did(d)?) == d`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::RecordId;
use crate::error::TypeError;

pub const DID_SCHEME: &str = "did";
pub const DID_METHOD: &str = "art";
pub const DID_NAMESPACE: &str = "hkust";

const SEGMENT_COUNT: usize = 4;

/// Parse a DID string and return its record id.
pub fn parse_did(did: &str) -> Result<RecordId, TypeError> {
    let segments: Vec<&str> = did.split(':').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(TypeError::InvalidFormat(format!(
            "expected {SEGMENT_COUNT} colon-separated segments, got {}",
            segments.len()
        )));
    }

    let expected = [DID_SCHEME, DID_METHOD, DID_NAMESPACE];
    for (position, (found, wanted)) in segments.iter().zip(expected).enumerate() {
        if *found != wanted {
            return Err(TypeError::InvalidFormat(format!(
                "segment {} must be '{wanted}', got '{found}'",
                position + 1
            )));
        }
    }

    let record_id = segments[SEGMENT_COUNT - 1];
    if record_id.is_empty() {
        return Err(TypeError::InvalidFormat("record id is empty".into()));
    }
    Ok(RecordId::new(record_id))
}

/// Format a record id as a DID string.
pub fn format_did(record_id: &RecordId) -> String {
    format!("{DID_SCHEME}:{DID_METHOD}:{DID_NAMESPACE}:{record_id}")
}

/// A validated art DID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did {
    record_id: RecordId,
}

impl Did {
    pub fn new(record_id: RecordId) -> Self {
        Self { record_id }
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn into_record_id(self) -> RecordId {
        self.record_id
    }
}

impl FromStr for Did {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_did(s).map(Self::new)
    }
}

impl TryFrom<String> for Did {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.to_string()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_did(&self.record_id))
    }
}
