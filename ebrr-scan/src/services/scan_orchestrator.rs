//! Region × day scan orchestration
//!
//! For every unfinished county: fetch each day's observations, classify
//! them, collect the flagged records, and checkpoint the county before
//! moving on. A crash therefore loses at most the county in progress.
//!
//! # Ordering
//! Results come out in county input order; within a county, by month, then
//! day, then in the order the remote service returned observations.

use crate::error::ScanResult;
use crate::models::{
    BaselineSpeciesList, Checklist, CountyRecords, FlaggedRecord, Observation, Region,
    ReviewPolicy,
};
use crate::services::checkpoint_store::CheckpointStore;
use crate::services::data_access::{ObservationFilters, ObservationSource, RetryingDataAccess};
use crate::services::review_rules::{
    checklist_has_media, find_matching_rule, is_new_record, is_pelagic_checklist,
    is_reviewable_here, needs_pelagic_check,
};
use chrono::{Datelike, NaiveDate};
use ebrr_common::Error;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Dates to scan. `month == 0` means every month of `year`;
/// `day == 0` means every day of each selected month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ScanWindow {
    /// Validate and build a window.
    ///
    /// A specific month and day must form a real date. With `month == 0`
    /// and a specific day, months lacking that day are skipped.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, Error> {
        if month > 12 {
            return Err(Error::InvalidInput(format!("month {} is not 0-12", month)));
        }
        if day > 31 {
            return Err(Error::InvalidInput(format!("day {} is not 0-31", day)));
        }
        if month != 0 && day != 0 && NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(Error::InvalidInput(format!(
                "{:04}-{:02}-{:02} is not a valid date",
                year, month, day
            )));
        }
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
            return Err(Error::InvalidInput(format!("year {} is out of range", year)));
        }
        Ok(Self { year, month, day })
    }

    pub fn months(&self) -> RangeInclusive<u32> {
        if self.month == 0 {
            1..=12
        } else {
            self.month..=self.month
        }
    }

    /// Every date in the window, in calendar order
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        for month in self.months() {
            if self.day == 0 {
                let mut date = NaiveDate::from_ymd_opt(self.year, month, 1);
                while let Some(d) = date.filter(|d| d.month() == month) {
                    days.push(d);
                    date = d.succ_opt();
                }
            } else {
                match NaiveDate::from_ymd_opt(self.year, month, self.day) {
                    Some(d) => days.push(d),
                    None => debug!(
                        year = self.year,
                        month,
                        day = self.day,
                        "Skipping month without this day"
                    ),
                }
            }
        }
        days
    }
}

/// Scan orchestrator service
pub struct ScanOrchestrator<S> {
    data: RetryingDataAccess<S>,
    checkpoint_path: PathBuf,
    filters: ObservationFilters,
}

impl<S: ObservationSource> ScanOrchestrator<S> {
    /// Create a new orchestrator
    ///
    /// # Arguments
    /// * `data` - Retrying access to the remote service
    /// * `checkpoint_path` - File used to resume interrupted scans
    pub fn new(data: RetryingDataAccess<S>, checkpoint_path: impl Into<PathBuf>) -> Self {
        Self {
            data,
            checkpoint_path: checkpoint_path.into(),
            filters: ObservationFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: ObservationFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn data(&self) -> &RetryingDataAccess<S> {
        &self.data
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    /// Scan `regions` over `window` and return flagged records per county.
    ///
    /// Counties finished by an earlier interrupted run are skipped and their
    /// results carried over. Each county is checkpointed when done, even
    /// with no matches; the checkpoint is deleted after the last one.
    pub async fn scan(
        &self,
        regions: &[Region],
        window: ScanWindow,
        baseline: &BaselineSpeciesList,
        policy: &ReviewPolicy,
    ) -> ScanResult<Vec<CountyRecords>> {
        let checkpoint = CheckpointStore::open(&self.checkpoint_path, regions)?;
        let mut records_to_review = checkpoint.carried_records().to_vec();
        let days = window.days();
        let pelagic_region_names = policy.pelagic_region_names();

        info!(
            counties = checkpoint.remaining().len(),
            days = days.len(),
            "Starting scan"
        );

        for region in checkpoint.remaining() {
            info!(county = %region.name, code = %region.code, "Scanning county");

            let mut county_records = Vec::new();
            for day in &days {
                let found = self
                    .find_records_of_interest(region, *day, baseline, policy, pelagic_region_names)
                    .await?;
                county_records.extend(found);
            }

            if !county_records.is_empty() {
                info!(
                    county = %region.name,
                    records = county_records.len(),
                    "County has records to review"
                );
                records_to_review.push(CountyRecords {
                    county: region.name.clone(),
                    records: county_records,
                });
            }

            checkpoint.record(region, &records_to_review)?;
        }

        checkpoint.finish()?;
        Ok(records_to_review)
    }

    /// Flagged records for one county on one day
    async fn find_records_of_interest(
        &self,
        region: &Region,
        day: NaiveDate,
        baseline: &BaselineSpeciesList,
        policy: &ReviewPolicy,
        pelagic_region_names: &[String],
    ) -> ScanResult<Vec<FlaggedRecord>> {
        let observations = self
            .data
            .fetch_observations(&region.code, day, &self.filters)
            .await?;

        debug!(
            county = %region.name,
            %day,
            observations = observations.len(),
            "Fetched observations"
        );

        let mut records = Vec::new();
        for observation in observations {
            if let Some(record) = self
                .classify(observation, region, baseline, policy, pelagic_region_names)
                .await?
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// New-record test first, then review policy; the pelagic override
    /// suppresses both. The checklist is fetched at most once per observation.
    async fn classify(
        &self,
        observation: Observation,
        region: &Region,
        baseline: &BaselineSpeciesList,
        policy: &ReviewPolicy,
        pelagic_region_names: &[String],
    ) -> ScanResult<Option<FlaggedRecord>> {
        let mut checklist = None;

        if is_new_record(&observation, baseline) {
            if self
                .is_pelagic_record(&observation, pelagic_region_names, &mut checklist)
                .await?
            {
                debug!(species = %observation.com_name, sub_id = %observation.sub_id, "Pelagic checklist, skipped");
                return Ok(None);
            }

            info!(
                species = %observation.com_name,
                "Species {} not in state list. A new record?",
                observation.com_name
            );
            let media = self.has_media(&observation, &mut checklist).await?;
            return Ok(Some(FlaggedRecord::new_record(observation, media)));
        }

        let Some(rule) = find_matching_rule(&observation, policy) else {
            return Ok(None);
        };

        if !is_reviewable_here(rule, policy, region)
            || self
                .is_pelagic_record(&observation, pelagic_region_names, &mut checklist)
                .await?
        {
            return Ok(None);
        }

        info!(
            species = %observation.com_name,
            county = %region.name,
            "Species {} is reviewable in {}.",
            observation.com_name,
            region.name
        );
        let media = self.has_media(&observation, &mut checklist).await?;
        Ok(Some(FlaggedRecord::reviewable(observation, rule.clone(), media)))
    }

    async fn is_pelagic_record(
        &self,
        observation: &Observation,
        pelagic_region_names: &[String],
        cache: &mut Option<Checklist>,
    ) -> ScanResult<bool> {
        if !needs_pelagic_check(observation, pelagic_region_names) {
            return Ok(false);
        }
        let checklist = self.checklist(observation, cache).await?;
        Ok(is_pelagic_checklist(checklist))
    }

    async fn has_media(
        &self,
        observation: &Observation,
        cache: &mut Option<Checklist>,
    ) -> ScanResult<bool> {
        let Some(species_code) = observation.species_code.as_deref() else {
            return Ok(false);
        };
        let checklist = self.checklist(observation, cache).await?;
        Ok(checklist_has_media(checklist, species_code))
    }

    async fn checklist<'c>(
        &self,
        observation: &Observation,
        cache: &'c mut Option<Checklist>,
    ) -> ScanResult<&'c Checklist> {
        let checklist = match cache.take() {
            Some(checklist) => checklist,
            None => self.data.fetch_checklist(&observation.sub_id).await?,
        };
        Ok(cache.insert(checklist))
    }
}
