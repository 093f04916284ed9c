//! Allows serialization and deserialization to JSON, with the ``serde`` crate.

use serde::{Deserialize, Serialize};
use serde_json;

use crate::periods::{
    DateDefinition, DateDefinitionConfig, DatePeriod, DatePeriodConfig, ExcludeMonth,
    ExcludeWeekday, Exclusion, SegmentDuration,
};

/// Handles the `to` and `from` JSON conversion.
pub trait JSON: Serialize + for<'de> Deserialize<'de> {
    /// Return a JSON string representing the object.
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Create an object from a JSON string representation.
    fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl JSON for DateDefinition {}
impl JSON for DateDefinitionConfig {}
impl JSON for DatePeriod {}
impl JSON for DatePeriodConfig {}
impl JSON for ExcludeMonth {}
impl JSON for ExcludeWeekday {}
impl JSON for Exclusion {}
impl JSON for SegmentDuration {}

/// Container for all of the serializable objects of the crate.
///
/// This allows a single [`from_json`] function to detect the type of a tagged JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeserializedObj {
    DateDefinition(DateDefinition),
    DatePeriod(DatePeriod),
    Exclusion(Exclusion),
    SegmentDuration(SegmentDuration),
}

impl JSON for DeserializedObj {}

/// Create any tagged object from its JSON representation, e.g. `{"DatePeriod": {...}}`.
pub fn from_json(json: &str) -> serde_json::Result<DeserializedObj> {
    DeserializedObj::from_json(json)
}
