// src/fetch.rs
//! Unified HTTP client plus the job service built on it.
//!
//! Every backend service speaks the same JSON envelope dialect, so the
//! wrappers share one [`ApiClient`]. The client carries the session bearer
//! token when one exists and keeps a cookie store so the backend's session
//! cookie rides along with every request. Requests are issued exactly once:
//! no retries, no backoff, no de-duplication. Racing fetches are resolved
//! by the board's sequence numbers, not here.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::query::QueryState;
use crate::types::job::{JobDraft, JobListing};
use crate::types::response::{ApiMessage, JobResponse, JobsResponse};

/// Shared HTTP plumbing for the service wrappers.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        Self::with_token(base_url, timeout_seconds, None)
    }

    pub fn with_token(
        base_url: String,
        timeout_seconds: u64,
        token: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("Session token is not a valid header value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub async fn get_json<R>(&self, path: &str, params: &[(&str, String)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} ({} params)", url, params.len());

        let mut request = self.client.get(&url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to GET {url}"))?;
        read_json(response, &url).await
    }

    pub async fn post_json<T, R>(&self, path: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {url}"))?;
        read_json(response, &url).await
    }

    pub async fn put_json<T, R>(&self, path: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to PUT to {url}"))?;
        read_json(response, &url).await
    }

    pub async fn delete_json<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Failed to DELETE {url}"))?;
        read_json(response, &url).await
    }
}

async fn read_json<R>(response: reqwest::Response, url: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        response
            .json::<R>()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("{url} returned status {status}: {error_text}")
    }
}

/// Client for the jobs endpoint.
pub struct JobService {
    api: ApiClient,
}

impl JobService {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout_seconds)?,
        })
    }

    pub fn with_token(base_url: String, timeout_seconds: u64, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::with_token(base_url, timeout_seconds, Some(token))?,
        })
    }

    /// One GET against the search endpoint with the query's backend-relevant
    /// parameters. Returns the full unpaginated result set; refinement and
    /// paging happen client-side.
    pub async fn fetch(&self, query: &QueryState) -> Result<Vec<JobListing>> {
        let params = query.server_params();
        let body: JobsResponse = self.api.get_json("/get", &params).await?;
        Ok(body.jobs)
    }

    /// Most recent listings, optionally excluding one id (used by the
    /// "similar jobs" rail on a listing page).
    pub async fn latest(&self, limit: usize, exclude: Option<&str>) -> Result<Vec<JobListing>> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(id) = exclude {
            params.push(("exclude", id.to_string()));
        }
        let body: JobsResponse = self.api.get_json("/getlatest", &params).await?;
        Ok(body.jobs)
    }

    pub async fn get(&self, id: &str) -> Result<JobListing> {
        let body: JobResponse = self.api.get_json(&format!("/{id}"), &[]).await?;
        Ok(body.job)
    }

    /// Listings posted by the signed-in recruiter.
    pub async fn mine(&self) -> Result<Vec<JobListing>> {
        let body: JobsResponse = self.api.get_json("/mine", &[]).await?;
        Ok(body.jobs)
    }

    pub async fn post(&self, draft: &JobDraft) -> Result<JobListing> {
        let body: JobResponse = self.api.post_json("", draft).await?;
        Ok(body.job)
    }

    pub async fn update(&self, id: &str, draft: &JobDraft) -> Result<JobListing> {
        let body: JobResponse = self.api.put_json(&format!("/{id}"), draft).await?;
        Ok(body.job)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let body: ApiMessage = self.api.delete_json(&format!("/{id}")).await?;
        if !body.success {
            anyhow::bail!(
                "Deleting listing {id} was rejected: {}",
                body.message.unwrap_or_else(|| "no reason given".to_string())
            );
        }
        Ok(())
    }
}
