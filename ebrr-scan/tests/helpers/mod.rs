//! Scripted in-memory observation source for scan tests
//!
//! Observations are keyed by (region code, day), checklists by submission
//! id. Every call is logged so tests can assert on request order and count.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use ebrr_scan::models::{Checklist, ChecklistEntry, Observation, Region};
use ebrr_scan::services::{ObservationFilters, ObservationSource, SourceError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Observations(String, NaiveDate),
    Checklist(String),
}

#[derive(Default)]
pub struct FakeSource {
    observations: HashMap<(String, NaiveDate), Vec<Observation>>,
    checklists: HashMap<String, Checklist>,
    failing_region: Option<String>,
    transient_failures: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observation(mut self, region_code: &str, day: NaiveDate, obs: Observation) -> Self {
        self.observations
            .entry((region_code.to_string(), day))
            .or_default()
            .push(obs);
        self
    }

    pub fn with_checklist(mut self, checklist: Checklist) -> Self {
        self.checklists.insert(checklist.sub_id.clone(), checklist);
        self
    }

    /// Observation requests for this region fail with a non-transient error
    pub fn failing_region(mut self, region_code: &str) -> Self {
        self.failing_region = Some(region_code.to_string());
        self
    }

    /// The next `n` requests of any kind fail with a network error
    pub fn with_transient_failures(self, n: usize) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn observation_calls(&self) -> Vec<(String, NaiveDate)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Observations(region, day) => Some((region, day)),
                Call::Checklist(_) => None,
            })
            .collect()
    }

    pub fn checklist_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Checklist(sub_id) => Some(sub_id),
                Call::Observations(..) => None,
            })
            .collect()
    }

    fn take_transient_failure(&self) -> bool {
        self.transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ObservationSource for FakeSource {
    async fn fetch_checklist(&self, sub_id: &str) -> Result<Checklist, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Checklist(sub_id.to_string()));

        if self.take_transient_failure() {
            return Err(SourceError::Network("connection reset".to_string()));
        }
        self.checklists
            .get(sub_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(sub_id.to_string()))
    }

    async fn fetch_observations(
        &self,
        region_code: &str,
        day: NaiveDate,
        _filters: &ObservationFilters,
    ) -> Result<Vec<Observation>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Observations(region_code.to_string(), day));

        if self.take_transient_failure() {
            return Err(SourceError::Network("connection reset".to_string()));
        }
        if self.failing_region.as_deref() == Some(region_code) {
            return Err(SourceError::Api(403, "forbidden".to_string()));
        }
        Ok(self
            .observations
            .get(&(region_code.to_string(), day))
            .cloned()
            .unwrap_or_default())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn observation(com_name: &str, species_code: &str, county: &str, sub_id: &str) -> Observation {
    serde_json::from_value(json!({
        "comName": com_name,
        "speciesCode": species_code,
        "subnational2Name": county,
        "subId": sub_id,
        "obsDt": "2024-05-17 07:30",
        "locName": "Test Location"
    }))
    .unwrap()
}

pub fn escapee(com_name: &str, species_code: &str, county: &str, sub_id: &str) -> Observation {
    let mut obs = observation(com_name, species_code, county, sub_id);
    obs.exotic_category = Some("X".to_string());
    obs
}

pub fn checklist(sub_id: &str, protocol_id: &str, media_for: &[&str]) -> Checklist {
    Checklist {
        sub_id: sub_id.to_string(),
        protocol_id: protocol_id.to_string(),
        obs: media_for
            .iter()
            .map(|code| ChecklistEntry {
                species_code: code.to_string(),
                media_counts: Some(json!({"P": 1})),
            })
            .collect(),
    }
}

pub fn counties() -> Vec<Region> {
    vec![
        Region::new("US-VA-001", "Accomack"),
        Region::new("US-VA-059", "Fairfax"),
        Region::new("US-VA-810", "Virginia Beach"),
    ]
}
