//! Classification output

use crate::models::{Observation, ReviewRule};
use serde::{Deserialize, Serialize};

/// Why an observation was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Species absent from the baseline list
    New,
    /// Species subject to a review rule that applies in this county
    Reviewable,
}

/// An observation that survived classification
///
/// On disk the classification is also spelled out as `new` and
/// `reviewable` booleans, which the document renderer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "FlaggedRecordRepr", from = "FlaggedRecordRepr")]
pub struct FlaggedRecord {
    pub observation: Observation,

    pub classification: Classification,

    /// Matched rule, only for reviewable records
    pub review_species: Option<ReviewRule>,

    /// Whether the checklist carries media for this species
    pub media: bool,
}

#[derive(Serialize, Deserialize)]
struct FlaggedRecordRepr {
    observation: Observation,
    classification: Classification,
    #[serde(default)]
    new: bool,
    #[serde(default)]
    reviewable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    review_species: Option<ReviewRule>,
    media: bool,
}

impl From<FlaggedRecord> for FlaggedRecordRepr {
    fn from(record: FlaggedRecord) -> Self {
        Self {
            new: record.classification == Classification::New,
            reviewable: record.classification == Classification::Reviewable,
            observation: record.observation,
            classification: record.classification,
            review_species: record.review_species,
            media: record.media,
        }
    }
}

impl From<FlaggedRecordRepr> for FlaggedRecord {
    fn from(repr: FlaggedRecordRepr) -> Self {
        Self {
            observation: repr.observation,
            classification: repr.classification,
            review_species: repr.review_species,
            media: repr.media,
        }
    }
}

impl FlaggedRecord {
    pub fn new_record(observation: Observation, media: bool) -> Self {
        Self {
            observation,
            classification: Classification::New,
            review_species: None,
            media,
        }
    }

    pub fn reviewable(observation: Observation, rule: ReviewRule, media: bool) -> Self {
        Self {
            observation,
            classification: Classification::Reviewable,
            review_species: Some(rule),
            media,
        }
    }
}

/// Flagged records of one county, in scan order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyRecords {
    pub county: String,
    pub records: Vec<FlaggedRecord>,
}
