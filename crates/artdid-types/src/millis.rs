//! Serde adapter encoding a [`Duration`] as integer milliseconds.
//!
//! Use as `#[serde(with = "artdid_types::millis")]` on config fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timeouts {
        #[serde(with = "super")]
        call: Duration,
    }

    #[test]
    fn encodes_whole_milliseconds() {
        let t = Timeouts {
            call: Duration::from_millis(1500),
        };
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"call":1500}"#);
        let back: Timeouts = serde_json::from_str(r#"{"call":250}"#).unwrap();
        assert_eq!(back.call, Duration::from_millis(250));
    }

    #[test]
    fn rejects_negative_values() {
        assert!(serde_json::from_str::<Timeouts>(r#"{"call":-1}"#).is_err());
    }
}
