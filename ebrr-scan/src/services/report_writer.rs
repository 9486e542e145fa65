//! Result file output
//!
//! One JSON document per scanned month, named after the observation year
//! and month. Nothing is written for an empty result.

use crate::models::CountyRecords;
use chrono::NaiveDate;
use ebrr_common::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct RecordsReport<'a> {
    #[serde(rename = "date of observations")]
    date_of_observations: String,
    state: &'a str,
    #[serde(rename = "date of report")]
    date_of_report: String,
    records: &'a [CountyRecords],
}

/// `<reports_dir>/records_to_review_<YYYY>_<MM>.json`
pub fn report_path(reports_dir: &Path, year: i32, month: u32) -> PathBuf {
    reports_dir.join(format!("records_to_review_{:04}_{:02}.json", year, month))
}

/// Write the scan results, returning the file path, or `None` when there
/// was nothing to report.
pub fn write_report(
    reports_dir: &Path,
    state: &str,
    year: i32,
    month: u32,
    report_date: NaiveDate,
    records: &[CountyRecords],
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        info!("No records to review, no report written");
        return Ok(None);
    }

    std::fs::create_dir_all(reports_dir)?;

    let report = RecordsReport {
        date_of_observations: format!("{:04},{:02}", year, month),
        state,
        date_of_report: report_date.format("%Y-%m-%d").to_string(),
        records,
    };

    let path = report_path(reports_dir, year, month);
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;

    info!(
        path = %path.display(),
        counties = records.len(),
        "Wrote records to review"
    );
    Ok(Some(path))
}
