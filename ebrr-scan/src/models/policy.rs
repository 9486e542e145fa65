//! Baseline species list and review policy documents

use crate::models::RegionGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Name of the region group whose counties are treated as pelagic
pub const PELAGIC_GROUP_NAME: &str = "Pelagic Counties";

/// Entry of the baseline list (`{"comName": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    #[serde(rename = "comName")]
    pub com_name: String,
}

/// Species already established in the jurisdiction
///
/// Membership is exact common-name equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Species>")]
pub struct BaselineSpeciesList {
    species: HashSet<String>,
}

impl BaselineSpeciesList {
    pub fn contains(&self, com_name: &str) -> bool {
        self.species.contains(com_name)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.species.iter().map(String::as_str)
    }
}

impl From<Vec<Species>> for BaselineSpeciesList {
    fn from(species: Vec<Species>) -> Self {
        species.into_iter().map(|s| s.com_name).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for BaselineSpeciesList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            species: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-species review rule
///
/// `only` and `exclude` hold county names or region group names.
/// Both empty means reviewable everywhere. Any other keys (committee
/// notes such as `uniqueExcludeNotes`) are kept in `extra` and written out
/// with the flagged record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRule {
    #[serde(rename = "comName")]
    pub com_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReviewRule {
    pub fn everywhere(com_name: impl Into<String>) -> Self {
        Self {
            com_name: com_name.into(),
            only: Vec::new(),
            exclude: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Review policy: species rules plus the region groups they may refer to
///
/// `review_species` is required; a document without it fails to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub review_species: Vec<ReviewRule>,

    #[serde(default)]
    pub county_groups: Vec<RegionGroup>,
}

impl ReviewPolicy {
    pub fn group(&self, name: &str) -> Option<&RegionGroup> {
        self.county_groups.iter().find(|g| g.name == name)
    }

    /// Counties of the pelagic group, empty when the policy has none
    pub fn pelagic_region_names(&self) -> &[String] {
        self.group(PELAGIC_GROUP_NAME)
            .map(|g| g.counties.as_slice())
            .unwrap_or(&[])
    }
}
