//! Remote data access contract and its retrying wrapper
//!
//! The scan depends on exactly two remote calls: fetch one checklist by
//! submission id, and fetch the historic observations of a region for a
//! day. `ObservationSource` is that contract; `RetryingDataAccess` adds
//! bounded retry on top of any implementation.

use crate::models::{Checklist, Observation};
use crate::utils::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Remote data source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Transient I/O-class failures are worth retrying; the rest are not
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Network(_) | SourceError::Timeout(_) | SourceError::RateLimited => true,
            SourceError::Api(status, _) => *status >= 500,
            SourceError::NotFound(_) | SourceError::Parse(_) => false,
        }
    }
}

/// Query filters for the historic observations call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationFilters {
    /// Taxonomic category ("species")
    pub category: String,
    /// Which observation of a species per location to return ("create" = first)
    pub rank: String,
    /// Response detail level ("full" includes county and submission fields)
    pub detail: String,
}

impl Default for ObservationFilters {
    fn default() -> Self {
        Self {
            category: "species".to_string(),
            rank: "create".to_string(),
            detail: "full".to_string(),
        }
    }
}

/// The two remote operations the scan needs
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Fetch a single checklist by submission id
    async fn fetch_checklist(&self, sub_id: &str) -> Result<Checklist, SourceError>;

    /// Fetch historic observations for a region on one day
    async fn fetch_observations(
        &self,
        region_code: &str,
        day: NaiveDate,
        filters: &ObservationFilters,
    ) -> Result<Vec<Observation>, SourceError>;
}

/// `ObservationSource` wrapper adding bounded retry with linear backoff
pub struct RetryingDataAccess<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: ObservationSource> RetryingDataAccess<S> {
    /// Wrap `source` with the default policy (3 attempts, 100ms step)
    pub fn new(source: S) -> Self {
        Self::with_policy(source, RetryPolicy::default())
    }

    pub fn with_policy(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn fetch_checklist(&self, sub_id: &str) -> Result<Checklist, SourceError> {
        retry_with_backoff(
            "get_checklist",
            sub_id,
            &self.policy,
            SourceError::is_transient,
            || self.source.fetch_checklist(sub_id),
        )
        .await
    }

    pub async fn fetch_observations(
        &self,
        region_code: &str,
        day: NaiveDate,
        filters: &ObservationFilters,
    ) -> Result<Vec<Observation>, SourceError> {
        let call_args = format!(
            "{}, {}, {}, {}, {}",
            region_code, day, filters.category, filters.rank, filters.detail
        );
        retry_with_backoff(
            "get_historic_observations",
            &call_args,
            &self.policy,
            SourceError::is_transient,
            || self.source.fetch_observations(region_code, day, filters),
        )
        .await
    }
}
