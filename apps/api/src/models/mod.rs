pub mod candidate;
pub mod requisition;
pub mod review;

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub use candidate::{Candidate, CandidateAnalysis, CandidateStatus, PrSubmission};
pub use requisition::{Requisition, RequisitionStatus};
pub use review::{Review, ReviewAnalysis};

/// Identifier of a stored record.
///
/// Older collections carry millisecond timestamps as numeric ids, newer records
/// carry UUID strings. Both deserialize into the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(de::Error::custom(format!(
                "record id must be a string or number, got {other}"
            ))),
        }
    }
}

/// Accepts `3` as well as `"3"`; form posts deliver numbers as strings.
pub(crate) fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| de::Error::custom("expected a non-negative whole number")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| de::Error::custom(format!("'{s}' is not a whole number"))),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}
