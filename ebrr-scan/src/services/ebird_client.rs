//! eBird API 2.0 client
//!
//! Implements `ObservationSource` over HTTP, plus the region and taxonomy
//! lookups the binary needs before a scan. Requests are rate limited on the
//! client side; the service also enforces its own limits.
//!
//! API Documentation: https://documenter.getpostman.com/view/664302/S1ENwy59

use crate::models::{Checklist, Observation, Region, Taxon};
use crate::services::data_access::{ObservationFilters, ObservationSource, SourceError};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;

const EBIRD_BASE_URL: &str = "https://api.ebird.org/v2";
const TOKEN_HEADER: &str = "X-eBirdApiToken";
const USER_AGENT: &str = concat!("ebrr-scan/", env!("CARGO_PKG_VERSION"));

/// eBird API client
pub struct EbirdClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl EbirdClient {
    /// Create a client for the public eBird API
    ///
    /// # Arguments
    /// * `api_key` - eBird API token
    /// * `requests_per_second` - Client-side request budget
    pub fn new(api_key: impl Into<String>, requests_per_second: NonZeroU32) -> Result<Self, SourceError> {
        Self::with_base_url(EBIRD_BASE_URL, api_key, requests_per_second)
    }

    /// Create a client against another base URL (mirrors, test servers)
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        requests_per_second: NonZeroU32,
    ) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            rate_limiter: RateLimiter::direct(Quota::per_second(requests_per_second)),
        })
    }

    /// List sub-regions of `parent` (e.g. counties: `subnational2`, `US-VA`)
    pub async fn fetch_regions(&self, region_type: &str, parent: &str) -> Result<Vec<Region>, SourceError> {
        let url = format!("{}/ref/region/list/{}/{}", self.base_url, region_type, parent);
        self.get_json(&url, &[("fmt", "json")]).await
    }

    /// Full eBird taxonomy
    pub async fn fetch_taxonomy(&self) -> Result<Vec<Taxon>, SourceError> {
        let url = format!("{}/ref/taxonomy/ebird", self.base_url);
        self.get_json(&url, &[("fmt", "json")]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Querying eBird API");

        let response = self
            .http_client
            .get(url)
            .header(TOKEN_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(e.to_string())
                } else {
                    SourceError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 404 {
            return Err(SourceError::NotFound(url.to_string()));
        }

        if status == 429 {
            return Err(SourceError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ObservationSource for EbirdClient {
    async fn fetch_checklist(&self, sub_id: &str) -> Result<Checklist, SourceError> {
        let url = format!("{}/product/checklist/view/{}", self.base_url, sub_id);
        self.get_json(&url, &[]).await
    }

    async fn fetch_observations(
        &self,
        region_code: &str,
        day: NaiveDate,
        filters: &ObservationFilters,
    ) -> Result<Vec<Observation>, SourceError> {
        let url = historic_url(&self.base_url, region_code, day);
        self.get_json(
            &url,
            &[
                ("cat", filters.category.as_str()),
                ("rank", filters.rank.as_str()),
                ("detail", filters.detail.as_str()),
            ],
        )
        .await
    }
}

fn historic_url(base_url: &str, region_code: &str, day: NaiveDate) -> String {
    format!(
        "{}/data/obs/{}/historic/{}/{}/{}",
        base_url,
        region_code,
        day.year(),
        day.month(),
        day.day()
    )
}
