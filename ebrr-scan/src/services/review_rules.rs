//! Review rule evaluation
//!
//! Pure decision functions: given an observation, the baseline list and the
//! review policy, decide whether a record is new or reviewable. The
//! checklist-based checks take an already fetched `Checklist`; fetching is
//! the orchestrator's job.

use crate::models::{BaselineSpeciesList, Checklist, Observation, Region, ReviewPolicy, ReviewRule};

/// Protocol code of pelagic (open-water boat trip) checklists
pub const PELAGIC_PROTOCOL: &str = "P60";

/// True when `region_name` is listed directly in `names`, or `names` holds a
/// group of `policy` whose counties contain it.
pub fn region_in_list_or_group(region_name: &str, names: &[String], policy: &ReviewPolicy) -> bool {
    if names.iter().any(|n| n == region_name) {
        return true;
    }
    names
        .iter()
        .filter_map(|n| policy.group(n))
        .any(|group| group.contains(region_name))
}

/// Not an escapee and not in the baseline list
pub fn is_new_record(observation: &Observation, baseline: &BaselineSpeciesList) -> bool {
    !observation.is_escapee() && !baseline.contains(&observation.com_name)
}

/// First rule whose species name equals the observation's
pub fn find_matching_rule<'a>(
    observation: &Observation,
    policy: &'a ReviewPolicy,
) -> Option<&'a ReviewRule> {
    policy
        .review_species
        .iter()
        .find(|rule| rule.com_name == observation.com_name)
}

/// Whether `rule` applies in `region`.
///
/// A non-empty `only` list decides alone; otherwise a matching `exclude`
/// entry makes the species not reviewable; otherwise it is reviewable.
pub fn is_reviewable_here(rule: &ReviewRule, policy: &ReviewPolicy, region: &Region) -> bool {
    if !rule.only.is_empty() {
        region_in_list_or_group(&region.name, &rule.only, policy)
    } else {
        !region_in_list_or_group(&region.name, &rule.exclude, policy)
    }
}

/// Whether the observation's county is pelagic-tagged, meaning its checklist
/// has to be inspected before the record can be kept.
pub fn needs_pelagic_check(observation: &Observation, pelagic_region_names: &[String]) -> bool {
    observation
        .subnational2_name
        .as_deref()
        .is_some_and(|county| pelagic_region_names.iter().any(|n| n == county))
}

pub fn is_pelagic_checklist(checklist: &Checklist) -> bool {
    checklist.protocol_id == PELAGIC_PROTOCOL
}

/// Any checklist line for `species_code` with a non-empty media structure
pub fn checklist_has_media(checklist: &Checklist, species_code: &str) -> bool {
    checklist
        .obs
        .iter()
        .any(|entry| entry.species_code == species_code && entry.has_media())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChecklistEntry, RegionGroup};
    use serde_json::json;

    fn observation(com_name: &str, exotic: Option<&str>) -> Observation {
        let mut raw = json!({
            "comName": com_name,
            "speciesCode": "spc1",
            "subId": "S1",
            "subnational2Name": "Fairfax"
        });
        if let Some(category) = exotic {
            raw["exoticCategory"] = json!(category);
        }
        serde_json::from_value(raw).unwrap()
    }

    fn policy_with_groups() -> ReviewPolicy {
        ReviewPolicy {
            review_species: vec![
                ReviewRule::everywhere("Swainson's Warbler"),
                ReviewRule {
                    com_name: "Red Crossbill".to_string(),
                    only: vec!["GroupX".to_string()],
                    exclude: vec!["RegionY".to_string()],
                    extra: Default::default(),
                },
                ReviewRule {
                    com_name: "Brown Pelican".to_string(),
                    only: vec![],
                    exclude: vec!["Group1".to_string()],
                    extra: Default::default(),
                },
            ],
            county_groups: vec![
                RegionGroup {
                    name: "GroupX".to_string(),
                    counties: vec!["RegionY".to_string(), "Highland".to_string()],
                },
                RegionGroup {
                    name: "Group1".to_string(),
                    counties: vec!["CountyC".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_new_record_requires_absence_from_baseline() {
        let baseline: BaselineSpeciesList = ["American Robin"].into_iter().collect();

        assert!(is_new_record(&observation("Painted Bunting", Some("")), &baseline));
        assert!(is_new_record(&observation("Painted Bunting", None), &baseline));
        assert!(!is_new_record(&observation("American Robin", None), &baseline));
    }

    #[test]
    fn test_escapee_is_never_new() {
        let baseline = BaselineSpeciesList::default();
        assert!(!is_new_record(&observation("Mandarin Duck", Some("X")), &baseline));
        // Naturalized/provisional categories still count
        assert!(is_new_record(&observation("Mandarin Duck", Some("N")), &baseline));
    }

    #[test]
    fn test_find_matching_rule_exact_name() {
        let policy = policy_with_groups();

        let rule = find_matching_rule(&observation("Red Crossbill", None), &policy).unwrap();
        assert_eq!(rule.com_name, "Red Crossbill");
        assert!(find_matching_rule(&observation("Red crossbill", None), &policy).is_none());
    }

    #[test]
    fn test_rule_without_lists_is_reviewable_everywhere() {
        let policy = policy_with_groups();
        let rule = &policy.review_species[0];
        assert!(is_reviewable_here(rule, &policy, &Region::new("US-VA-059", "Fairfax")));
    }

    #[test]
    fn test_only_takes_precedence_over_exclude() {
        let policy = policy_with_groups();
        let rule = &policy.review_species[1];

        // In GroupX and literally named in exclude: only wins
        assert!(is_reviewable_here(rule, &policy, &Region::new("US-VA-999", "RegionY")));
        assert!(is_reviewable_here(rule, &policy, &Region::new("US-VA-091", "Highland")));
        assert!(!is_reviewable_here(rule, &policy, &Region::new("US-VA-059", "Fairfax")));
    }

    #[test]
    fn test_exclusion_through_group_membership() {
        let policy = policy_with_groups();
        let rule = &policy.review_species[2];

        assert!(!is_reviewable_here(rule, &policy, &Region::new("US-VA-777", "CountyC")));
        assert!(is_reviewable_here(rule, &policy, &Region::new("US-VA-059", "Fairfax")));
    }

    #[test]
    fn test_unknown_group_name_matches_nothing() {
        let policy = policy_with_groups();
        assert!(!region_in_list_or_group(
            "Fairfax",
            &["No Such Group".to_string()],
            &policy
        ));
    }

    #[test]
    fn test_pelagic_checks() {
        let obs = observation("Black-capped Petrel", None);
        assert!(needs_pelagic_check(&obs, &["Fairfax".to_string()]));
        assert!(!needs_pelagic_check(&obs, &["Virginia Beach".to_string()]));

        let mut no_county = obs.clone();
        no_county.subnational2_name = None;
        assert!(!needs_pelagic_check(&no_county, &["Fairfax".to_string()]));

        let mut checklist = Checklist {
            sub_id: "S1".to_string(),
            protocol_id: PELAGIC_PROTOCOL.to_string(),
            obs: vec![],
        };
        assert!(is_pelagic_checklist(&checklist));
        checklist.protocol_id = "P21".to_string();
        assert!(!is_pelagic_checklist(&checklist));
    }

    #[test]
    fn test_media_only_counts_for_same_species() {
        let checklist = Checklist {
            sub_id: "S1".to_string(),
            protocol_id: "P22".to_string(),
            obs: vec![
                ChecklistEntry {
                    species_code: "amerob".to_string(),
                    media_counts: Some(json!({"P": 1})),
                },
                ChecklistEntry {
                    species_code: "paibun".to_string(),
                    media_counts: Some(json!({})),
                },
            ],
        };

        assert!(checklist_has_media(&checklist, "amerob"));
        assert!(!checklist_has_media(&checklist, "paibun"));
        assert!(!checklist_has_media(&checklist, "snoowl1"));
    }
}
