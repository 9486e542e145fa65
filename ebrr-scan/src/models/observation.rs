//! Records returned by the remote observation service
//!
//! Only the fields the scan reads are typed. Everything else the service
//! sends is kept in `extra` so it survives into the result file untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Exotic category marking a human-introduced or escaped bird
pub const ESCAPEE_CATEGORY: &str = "X";

/// A single historic observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Common species name
    #[serde(rename = "comName")]
    pub com_name: String,

    #[serde(rename = "speciesCode", default, skip_serializing_if = "Option::is_none")]
    pub species_code: Option<String>,

    /// Observation date-time as sent by the service ("YYYY-MM-DD HH:MM")
    #[serde(rename = "obsDt", default, skip_serializing_if = "Option::is_none")]
    pub obs_dt: Option<String>,

    /// Name of the county the observation was made in
    #[serde(rename = "subnational2Name", default, skip_serializing_if = "Option::is_none")]
    pub subnational2_name: Option<String>,

    /// Submission (checklist) identifier
    #[serde(rename = "subId")]
    pub sub_id: String,

    /// Absent on native species; "X" marks escapees
    #[serde(
        rename = "exoticCategory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exotic_category: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Observation {
    pub fn is_escapee(&self) -> bool {
        self.exotic_category.as_deref() == Some(ESCAPEE_CATEGORY)
    }
}

/// One species line inside a checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    #[serde(rename = "speciesCode", default)]
    pub species_code: String,

    /// Photo/audio/video counts; absent or empty when no media was attached
    #[serde(rename = "mediaCounts", default, skip_serializing_if = "Option::is_none")]
    pub media_counts: Option<Value>,
}

impl ChecklistEntry {
    /// True when the media-count structure carries anything
    pub fn has_media(&self) -> bool {
        match &self.media_counts {
            None | Some(Value::Null) => false,
            Some(Value::Object(counts)) => !counts.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            Some(Value::Bool(b)) => *b,
        }
    }
}

/// A full checklist (submission) as returned by the checklist view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(rename = "subId", default)]
    pub sub_id: String,

    #[serde(rename = "protocolId", default)]
    pub protocol_id: String,

    #[serde(default)]
    pub obs: Vec<ChecklistEntry>,
}

/// Taxonomy entry, used only for validating policy species names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    #[serde(rename = "comName")]
    pub com_name: String,

    #[serde(rename = "speciesCode", default)]
    pub species_code: String,
}
