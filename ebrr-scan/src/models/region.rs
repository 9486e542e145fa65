//! Regions (counties) and named region groups

use serde::{Deserialize, Serialize};

/// A county-level region as listed by the remote service
///
/// Equality is over the full value: a checkpoint written with one
/// representation only matches regions with the same code AND name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Opaque region code used to query the remote service (e.g. "US-VA-059")
    pub code: String,
    /// Display name used for grouping results and matching rules
    pub name: String,
}

impl Region {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Named set of region display names, used as shorthand in policy rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGroup {
    pub name: String,
    #[serde(default)]
    pub counties: Vec<String>,
}

impl RegionGroup {
    pub fn contains(&self, region_name: &str) -> bool {
        self.counties.iter().any(|c| c == region_name)
    }
}
