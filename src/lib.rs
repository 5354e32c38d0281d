// src/lib.rs
use std::collections::{HashMap, HashSet};
use std::env;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;

pub mod analytics;
pub mod audit;
pub mod cache;
pub mod change_request;
pub mod environment;
pub mod feature;
pub mod identity;
pub mod integration;
pub mod metadata;
pub mod organisation;
pub mod paging;
pub mod permission;
pub mod pipeline;
pub mod segment;
pub mod value;
mod tests;

pub use crate::paging::{EdgePagedResponse, GitHubPagedResponse, GithubPaginatedRepos, PagedResponse};
pub use crate::value::{FeatureStateValue, FlagsmithValue, IdOrKey, ValueType};

use crate::audit::{AuditLogDetail, AuditLogItem};
use crate::cache::{Cache, MemoryCache};
use crate::change_request::{ChangeRequest, ChangeRequestSummary};
use crate::environment::{Environment, Project, ProjectSummary};
use crate::feature::{FeatureVersion, ProjectFlag};
use crate::identity::Identity;
use crate::organisation::Organisation;
use crate::permission::Role;
use crate::pipeline::{ReleasePipeline, SingleReleasePipeline};
use crate::segment::Segment;

const BASE_URL: &str = "https://api.flagsmith.com/api/v1";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CIRCUIT_OPEN_SECONDS: i64 = 10;
const FLAG_CACHE_TTL_SECONDS: i64 = 60;
const LOCAL_FLAG_PREFIX: &str = "FLAGSMITH_FLAG_";

/// Credentials for the admin API.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Organisation (master) API key, sent as `Api-Key <key>`.
    ApiKey(String),
    /// Personal user token, sent as `Token <token>`.
    Token(String),
}

impl Auth {
    fn header_value(&self) -> Result<HeaderValue, ApiError> {
        let (scheme, secret) = match self {
            Auth::ApiKey(key) => ("Api-Key", key),
            Auth::Token(token) => ("Token", token),
        };
        if secret.is_empty() {
            return Err(ApiError::AuthError(format!("{} must not be empty", scheme)));
        }
        let mut value = HeaderValue::from_str(&format!("{} {}", scheme, secret))
            .map_err(|e| ApiError::AuthError(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status code {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Missing authentication: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Refusing to follow link off the API host: {0}")]
    ForeignHostError(String),
}

#[derive(Debug)]
struct CircuitState {
    is_open: bool,
    failure_count: u32,
    last_failure: Option<DateTime<Utc>>,
}

/// A handle on one project flag, looked up by name through the flag cache.
pub struct Flag<'a> {
    name: String,
    client: &'a Client,
}

impl<'a> Flag<'a> {
    pub async fn get(&self) -> Option<ProjectFlag> {
        self.client.cached_flag(&self.name).await
    }

    /// The flag's project-level default, unless overridden by a
    /// `FLAGSMITH_FLAG_<NAME>` environment variable.
    pub async fn default_enabled(&self) -> bool {
        let local_flags = build_local();
        if let Some(&enabled) = local_flags.get(&self.name.to_lowercase()) {
            return enabled;
        }
        self.get().await.map(|flag| flag.default_enabled).unwrap_or(false)
    }
}

pub struct Client {
    base_url: String,
    http_client: reqwest::Client,
    cache: RwLock<Box<dyn Cache + Send + Sync>>,
    max_retries: u32,
    circuit_state: RwLock<CircuitState>,
    auth: Option<Auth>,
    project_id: Option<i64>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn debug_info(&self) -> String {
        format!(
            "Client {{ base_url: {}, max_retries: {}, project_id: {:?}, authenticated: {} }}",
            self.base_url,
            self.max_retries,
            self.project_id,
            self.auth.is_some()
        )
    }

    pub fn flag(&self, name: &str) -> Flag<'_> {
        Flag {
            name: name.to_string(),
            client: self,
        }
    }

    /// All flags of the configured project, refreshed when the cache expires.
    pub async fn list(&self) -> Result<Vec<ProjectFlag>, ApiError> {
        self.refresh_if_stale().await;
        let cache = self.cache.read().await;
        cache
            .get_all()
            .await
            .map_err(|e| ApiError::CacheError(e.to_string()))
    }

    pub async fn projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        self.get_json(&self.endpoint("/projects/"), &[]).await
    }

    pub async fn project(&self, project_id: i64) -> Result<Project, ApiError> {
        self.get_json(&self.endpoint(&format!("/projects/{}/", project_id)), &[])
            .await
    }

    pub async fn environments(&self, project_id: i64) -> Result<PagedResponse<Environment>, ApiError> {
        self.get_json(
            &self.endpoint("/environments/"),
            &[("project", project_id.to_string())],
        )
        .await
    }

    pub async fn environment(&self, api_key: &str) -> Result<Environment, ApiError> {
        self.get_json(&self.endpoint(&format!("/environments/{}/", api_key)), &[])
            .await
    }

    pub async fn project_flags(
        &self,
        project_id: i64,
        page: u32,
    ) -> Result<PagedResponse<ProjectFlag>, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/projects/{}/features/", project_id)),
            &[("page", page.to_string())],
        )
        .await
    }

    /// Every flag of a project, following `next` links until exhausted.
    pub async fn all_project_flags(&self, project_id: i64) -> Result<Vec<ProjectFlag>, ApiError> {
        let first = self.project_flags(project_id, 1).await?;
        self.collect_pages(first).await
    }

    pub async fn segments(&self, project_id: i64, page: u32) -> Result<PagedResponse<Segment>, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/projects/{}/segments/", project_id)),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn segment(&self, project_id: i64, segment_id: i64) -> Result<Segment, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/projects/{}/segments/{}/", project_id, segment_id)),
            &[],
        )
        .await
    }

    pub async fn edge_identities(
        &self,
        environment_key: &str,
        page_size: u32,
        last_evaluated_key: Option<&str>,
    ) -> Result<EdgePagedResponse<Identity>, ApiError> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(key) = last_evaluated_key {
            query.push(("last_evaluated_key", key.to_string()));
        }
        self.get_json(
            &self.endpoint(&format!("/environments/{}/edge-identities/", environment_key)),
            &query,
        )
        .await
    }

    /// Walks the edge identity listing by its `last_evaluated_key` cursor.
    pub async fn all_edge_identities(
        &self,
        environment_key: &str,
        page_size: u32,
    ) -> Result<Vec<Identity>, ApiError> {
        let mut identities = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .edge_identities(environment_key, page_size, cursor.as_deref())
                .await?;
            let next = page.last_evaluated_key.clone();
            identities.extend(page);

            match next {
                Some(key) if cursor.as_deref() != Some(key.as_str()) => cursor = Some(key),
                Some(key) => {
                    warn!("Edge identity cursor did not advance past {}", key);
                    break;
                }
                None => break,
            }
        }

        Ok(identities)
    }

    pub async fn change_requests(
        &self,
        environment_key: &str,
        page: u32,
    ) -> Result<PagedResponse<ChangeRequestSummary>, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/environments/{}/list-change-requests/", environment_key)),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn change_request(&self, change_request_id: i64) -> Result<ChangeRequest, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/features/workflows/change-requests/{}/", change_request_id)),
            &[],
        )
        .await
    }

    pub async fn feature_versions(
        &self,
        environment_id: i64,
        feature_id: i64,
    ) -> Result<PagedResponse<FeatureVersion>, ApiError> {
        self.get_json(
            &self.endpoint(&format!(
                "/environments/{}/features/{}/versions/",
                environment_id, feature_id
            )),
            &[],
        )
        .await
    }

    pub async fn audit_logs(&self, project_id: i64, page: u32) -> Result<PagedResponse<AuditLogItem>, ApiError> {
        self.get_json(
            &self.endpoint("/audit/"),
            &[("project", project_id.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn audit_log(&self, audit_log_id: i64) -> Result<AuditLogDetail, ApiError> {
        self.get_json(&self.endpoint(&format!("/audit/{}/", audit_log_id)), &[])
            .await
    }

    pub async fn organisations(&self) -> Result<PagedResponse<Organisation>, ApiError> {
        self.get_json(&self.endpoint("/organisations/"), &[]).await
    }

    pub async fn roles(&self, organisation_id: i64) -> Result<PagedResponse<Role>, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/organisations/{}/roles/", organisation_id)),
            &[],
        )
        .await
    }

    pub async fn release_pipelines(&self, project_id: i64) -> Result<PagedResponse<ReleasePipeline>, ApiError> {
        self.get_json(
            &self.endpoint(&format!("/projects/{}/release-pipelines/", project_id)),
            &[],
        )
        .await
    }

    pub async fn release_pipeline(
        &self,
        project_id: i64,
        pipeline_id: i64,
    ) -> Result<SingleReleasePipeline, ApiError> {
        self.get_json(
            &self.endpoint(&format!(
                "/projects/{}/release-pipelines/{}/",
                project_id, pipeline_id
            )),
            &[],
        )
        .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let auth = match &self.auth {
            Some(auth) => auth,
            None => return Err(ApiError::AuthError("Authentication is required".to_string())),
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("flagsmith-api-rust"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth.header_value()?);
        Ok(headers)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let headers = self.headers()?;

        debug!("GET {} {:?}", url, query);
        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn collect_pages<T: DeserializeOwned>(&self, first: PagedResponse<T>) -> Result<Vec<T>, ApiError> {
        let mut next = first.next.clone();
        let mut results = first.results;
        let mut visited = HashSet::new();

        while let Some(url) = next {
            if !visited.insert(url.clone()) {
                warn!("Pagination link {} was already followed", url);
                break;
            }
            self.check_same_origin(&url)?;

            let page: PagedResponse<T> = self.get_json(&url, &[]).await?;
            next = page.next.clone();
            results.extend(page);
        }

        Ok(results)
    }

    /// `next` links carry the credentials, so they must point back at the API host.
    fn check_same_origin(&self, url: &str) -> Result<(), ApiError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ApiError::ConfigError(format!("base URL {:?}: {}", self.base_url, e)))?;
        let link = Url::parse(url).map_err(|_| ApiError::ForeignHostError(url.to_string()))?;

        if link.origin() != base.origin() {
            error!("Pagination link {} does not match {}", url, self.base_url);
            return Err(ApiError::ForeignHostError(url.to_string()));
        }
        Ok(())
    }

    async fn cached_flag(&self, name: &str) -> Option<ProjectFlag> {
        self.refresh_if_stale().await;
        let cache = self.cache.read().await;
        cache.get(name).await.ok().flatten()
    }

    async fn refresh_if_stale(&self) {
        let stale = self.cache.read().await.should_refresh_cache().await;
        if stale {
            if let Err(e) = self.refetch().await {
                error!("Failed to refetch flags: {}", e);
            }
        }
    }

    async fn refetch(&self) -> Result<(), ApiError> {
        let project_id = self
            .project_id
            .ok_or_else(|| ApiError::ConfigError("Project ID is required".to_string()))?;

        {
            let mut circuit_state = self.circuit_state.write().await;
            if circuit_state.is_open {
                if let Some(last_failure) = circuit_state.last_failure {
                    if (Utc::now() - last_failure).num_seconds() < CIRCUIT_OPEN_SECONDS {
                        return Ok(());
                    }
                }
                circuit_state.is_open = false;
                circuit_state.failure_count = 0;
            }
        }

        let mut flags = None;
        let mut last_error = None;

        for retry in 0..self.max_retries {
            match self.all_project_flags(project_id).await {
                Ok(fetched) => {
                    flags = Some(fetched);
                    self.circuit_state.write().await.failure_count = 0;
                    break;
                }
                Err(e) => {
                    warn!("Fetching project flags failed (attempt {}): {}", retry + 1, e);
                    last_error = Some(e);
                    let mut circuit_state = self.circuit_state.write().await;
                    circuit_state.failure_count += 1;

                    if circuit_state.failure_count >= self.max_retries {
                        warn!("Opening circuit for {} seconds", CIRCUIT_OPEN_SECONDS);
                        circuit_state.is_open = true;
                        circuit_state.last_failure = Some(Utc::now());
                        break;
                    }
                    drop(circuit_state);

                    tokio::time::sleep(Duration::from_secs((retry + 1) as u64)).await;
                }
            }
        }

        let flags = match (flags, last_error) {
            (Some(flags), _) => flags,
            (None, Some(e)) => return Err(e),
            (None, None) => return Ok(()),
        };

        let mut cache = self.cache.write().await;
        cache
            .refresh(&flags, FLAG_CACHE_TTL_SECONDS)
            .await
            .map_err(|e| ApiError::CacheError(e.to_string()))
    }
}

pub struct ClientBuilder {
    base_url: String,
    max_retries: u32,
    auth: Option<Auth>,
    project_id: Option<i64>,
    timeout: Duration,
    cache: Option<Box<dyn Cache + Send + Sync>>,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            max_retries: MAX_RETRIES,
            auth: None,
            project_id: None,
            timeout: REQUEST_TIMEOUT,
            cache: None,
        }
    }

    /// Starts from `FLAGSMITH_API_URL`, `FLAGSMITH_API_KEY` or
    /// `FLAGSMITH_API_TOKEN`, and `FLAGSMITH_PROJECT_ID`. Unset variables keep
    /// the defaults, and blank values count as unset; an API key wins over a
    /// token.
    pub fn from_env() -> Result<Self, ApiError> {
        let mut builder = Self::new();

        if let Ok(url) = env::var("FLAGSMITH_API_URL") {
            builder = builder.with_base_url(&url);
        }

        if let Some(key) = non_empty_var("FLAGSMITH_API_KEY") {
            builder = builder.with_auth(Auth::ApiKey(key));
        } else if let Some(token) = non_empty_var("FLAGSMITH_API_TOKEN") {
            builder = builder.with_auth(Auth::Token(token));
        }

        if let Ok(project_id) = env::var("FLAGSMITH_PROJECT_ID") {
            let project_id = project_id.trim().parse::<i64>().map_err(|e| {
                ApiError::ConfigError(format!("FLAGSMITH_PROJECT_ID {:?}: {}", project_id, e))
            })?;
            builder = builder.with_project(project_id);
        }

        Ok(builder)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_project(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_memory_cache(mut self) -> Self {
        self.cache = Some(Box::new(MemoryCache::new()));
        self
    }

    pub fn with_cache(mut self, cache: Box<dyn Cache + Send + Sync>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::ConfigError(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }

        let cache = self
            .cache
            .unwrap_or_else(|| Box::new(MemoryCache::new()));

        Ok(Client {
            base_url: self.base_url,
            http_client: reqwest::Client::builder().timeout(self.timeout).build()?,
            cache: RwLock::new(cache),
            max_retries: self.max_retries.max(1),
            circuit_state: RwLock::new(CircuitState {
                is_open: false,
                failure_count: 0,
                last_failure: None,
            }),
            auth: self.auth,
            project_id: self.project_id,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn build_local() -> HashMap<String, bool> {
    let mut result = HashMap::new();

    for (key, value) in env::vars() {
        if !key.starts_with(LOCAL_FLAG_PREFIX) {
            continue;
        }

        let enabled = value == "true";
        let key_lower = key.trim_start_matches(LOCAL_FLAG_PREFIX).to_lowercase();

        result.insert(key_lower.clone(), enabled);
        result.insert(key_lower.replace('_', "-"), enabled);
        result.insert(key_lower.replace('_', " "), enabled);
    }

    result
}
