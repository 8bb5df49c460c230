//! The shared document persisted for every device of a deployment

use crate::pads::PadMapping;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Collection that holds the shared document.
pub const COLLECTION: &str = "rectangles";

/// Identifier of the one document every device reads and writes.
pub const SHARED_DOC_ID: &str = "shared";

/// Persisted shape: `{ "rectangles": {index: text}, "updatedAt": ISO8601 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDocument {
    pub rectangles: PadMapping,
    #[serde(rename = "updatedAt", with = "iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl SharedDocument {
    /// Wrap a mapping and stamp it with the current time, truncated to the
    /// millisecond precision the timestamp is persisted with.
    pub fn stamp(rectangles: PadMapping) -> Self {
        Self {
            rectangles,
            updated_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::Deserialization(e.to_string()))
    }
}

/// Millisecond precision with a `Z` suffix, e.g. `2024-05-01T10:00:00.000Z`.
mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
