//! Review policy document loading and validation
//!
//! The document holds the baseline list (`state_list`), the per-species
//! rules (`review_species`) and the county groups. Validation only logs
//! warnings: a questionable policy still runs.

use crate::models::{BaselineSpeciesList, Region, ReviewPolicy, Taxon};
use ebrr_common::{Error, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Parsed policy document
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "state_list")]
    pub baseline: BaselineSpeciesList,

    #[serde(flatten)]
    pub policy: ReviewPolicy,
}

impl PolicyDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read policy file {}: {}", path.display(), e))
        })?;
        let document: PolicyDocument = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Malformed policy file {}: {}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            baseline_species = document.baseline.len(),
            review_species = document.policy.review_species.len(),
            county_groups = document.policy.county_groups.len(),
            "Loaded review policy"
        );
        Ok(document)
    }
}

/// A policy problem worth telling the user about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyWarning {
    CountyInNoGroup(String),
    CountyInMultipleGroups(String),
    GroupCountyNotInRegionList { group: String, county: String },
    UnknownCountyOrGroup { species: String, entry: String },
    SpeciesNotInTaxonomy(String),
}

impl std::fmt::Display for PolicyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyWarning::CountyInNoGroup(county) => {
                write!(f, "County {} not found in any county group", county)
            }
            PolicyWarning::CountyInMultipleGroups(county) => {
                write!(f, "County {} found in multiple county groups", county)
            }
            PolicyWarning::GroupCountyNotInRegionList { group, county } => write!(
                f,
                "County {} in group {} not found in the region list",
                county, group
            ),
            PolicyWarning::UnknownCountyOrGroup { species, entry } => write!(
                f,
                "{} (rule for {}) was not found as a group or county",
                entry, species
            ),
            PolicyWarning::SpeciesNotInTaxonomy(species) => {
                write!(f, "Species {} not found in eBird taxonomy", species)
            }
        }
    }
}

/// Check the policy against the region list and, when given, the taxonomy
pub fn validate_policy(
    document: &PolicyDocument,
    regions: &[Region],
    taxonomy: Option<&[Taxon]>,
) -> Vec<PolicyWarning> {
    let policy = &document.policy;
    let mut warnings = Vec::new();

    // Group membership count per county, in region order
    let mut group_count: HashMap<&str, usize> = HashMap::new();
    for group in &policy.county_groups {
        for county in &group.counties {
            *group_count.entry(county.as_str()).or_default() += 1;
        }
    }
    for region in regions {
        match group_count.get(region.name.as_str()).copied().unwrap_or(0) {
            0 => warnings.push(PolicyWarning::CountyInNoGroup(region.name.clone())),
            1 => {}
            _ => warnings.push(PolicyWarning::CountyInMultipleGroups(region.name.clone())),
        }
    }

    let region_names: HashSet<&str> = regions.iter().map(|r| r.name.as_str()).collect();
    for group in &policy.county_groups {
        for county in &group.counties {
            if !region_names.contains(county.as_str()) {
                warnings.push(PolicyWarning::GroupCountyNotInRegionList {
                    group: group.name.clone(),
                    county: county.clone(),
                });
            }
        }
    }

    for rule in &policy.review_species {
        for entry in rule.only.iter().chain(rule.exclude.iter()) {
            if !region_names.contains(entry.as_str()) && policy.group(entry).is_none() {
                warnings.push(PolicyWarning::UnknownCountyOrGroup {
                    species: rule.com_name.clone(),
                    entry: entry.clone(),
                });
            }
        }
    }

    if let Some(taxonomy) = taxonomy {
        let known: HashSet<&str> = taxonomy.iter().map(|t| t.com_name.as_str()).collect();

        let mut baseline_names: Vec<&str> = document.baseline.names().collect();
        baseline_names.sort_unstable();
        let species = baseline_names
            .into_iter()
            .chain(policy.review_species.iter().map(|r| r.com_name.as_str()));
        for name in species {
            if !known.contains(name) {
                warnings.push(PolicyWarning::SpeciesNotInTaxonomy(name.to_string()));
            }
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}
