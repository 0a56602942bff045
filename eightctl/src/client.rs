//! Authenticated client for the schedule and travel service.
//!
//! The command layer talks to the service only through [`EightApi`] and
//! [`TravelApi`]; [`EightClient`] is the HTTP implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use eight_core::api::{ScheduleListResponse, TokenRequest, TokenResponse};
use eight_core::{EightError, SchedulePatch, TemperatureSchedule};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::{CliConfig, Credentials};

/// Schedule operations of the remote service
#[async_trait]
pub trait EightApi: Send + Sync {
    /// Fetch every schedule on the account
    async fn list_schedules(&self) -> Result<Vec<TemperatureSchedule>>;

    /// Create a schedule, returning it with its assigned id
    async fn create_schedule(&self, schedule: TemperatureSchedule) -> Result<TemperatureSchedule>;

    /// Apply a partial update to one schedule
    async fn update_schedule(&self, id: &str, patch: &SchedulePatch) -> Result<Value>;

    /// Delete one schedule
    async fn delete_schedule(&self, id: &str) -> Result<()>;

    /// Travel/jetlag queries
    fn travel(&self) -> &dyn TravelApi;
}

/// Read-only travel/jetlag queries
#[async_trait]
pub trait TravelApi: Send + Sync {
    async fn trips(&self) -> Result<Value>;

    /// Plans, optionally for one trip (empty = all)
    async fn plans(&self, trip_id: &str) -> Result<Value>;

    /// Tasks for a plan; an empty id is forwarded as-is
    async fn plan_tasks(&self, plan_id: &str) -> Result<Value>;

    async fn airport_search(&self, query: &str) -> Result<Value>;

    async fn flight_status(&self, flight_number: &str) -> Result<Value>;
}

/// Normalize a base URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Which transport failures a request may be retried on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryPolicy {
    /// Reads and the token exchange: connection failures and timeouts
    Idempotent,
    /// Writes: only failures where the request never reached the server
    ConnectOnly,
}

impl RetryPolicy {
    fn should_retry(self, err: &reqwest::Error) -> bool {
        match self {
            RetryPolicy::Idempotent => err.is_connect() || err.is_timeout(),
            RetryPolicy::ConnectOnly => err.is_connect(),
        }
    }
}

/// Transport settings for [`EightClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub auth_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ClientOptions {
    /// Options derived from the resolved CLI configuration
    pub fn from_config(config: &CliConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            auth_url: config.auth_url.clone(),
            timeout_secs: config.timeout,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Shared HTTP state behind both the schedule and travel handles
#[derive(Debug)]
struct Session {
    client: Client,
    api_url: String,
    auth_url: String,
    credentials: Credentials,
    max_retries: u32,
    retry_delay: Duration,
    token: OnceCell<String>,
}

/// HTTP client for the remote service.
///
/// Construction performs no I/O. A bearer token is obtained on the first
/// call and reused for the life of the handle.
///
/// # Retry Logic
///
/// Requests that fail before a response arrives (connection refused,
/// timeout) are retried with a linearly growing delay. HTTP error statuses
/// are never retried.
#[derive(Debug, Clone)]
pub struct EightClient {
    session: Arc<Session>,
    travel: TravelClient,
}

/// Travel half of [`EightClient`]
#[derive(Debug, Clone)]
pub struct TravelClient {
    session: Arc<Session>,
}

impl EightClient {
    /// Create a new client from credentials and transport options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(concat!("eightctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let session = Arc::new(Session {
            client,
            api_url: normalize_url(&options.api_url),
            auth_url: normalize_url(&options.auth_url),
            credentials,
            max_retries: options.max_retries,
            retry_delay: options.retry_delay,
            token: OnceCell::new(),
        });

        Ok(Self {
            travel: TravelClient {
                session: session.clone(),
            },
            session,
        })
    }
}

impl Session {
    /// URL under the account's user path
    fn user_url(&self, path: &str) -> String {
        format!(
            "{}/v1/users/{}/{}",
            self.api_url,
            urlencoding::encode(&self.credentials.user_id),
            path
        )
    }

    /// Get the cached bearer token, fetching it on first use
    async fn access_token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let url = format!("{}/v1/tokens", self.auth_url);
                let body = TokenRequest {
                    client_id: &self.credentials.client_id,
                    client_secret: &self.credentials.client_secret,
                    grant_type: "password",
                    username: &self.credentials.email,
                    password: &self.credentials.password,
                };

                debug!("Requesting access token for {}", self.credentials.email);
                let token: TokenResponse = self
                    .execute_with_retry("tokens", RetryPolicy::Idempotent, || {
                        self.client.post(&url).json(&body)
                    })
                    .await?;

                if let Some(user_id) = &token.user_id {
                    if user_id != &self.credentials.user_id {
                        warn!("Token issued for a different user id than configured");
                    }
                }

                Ok::<_, anyhow::Error>(token.access_token)
            })
            .await?;

        Ok(token.as_str())
    }

    /// Send an authorized request built by `request_fn`
    async fn authorized<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        policy: RetryPolicy,
        request_fn: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let token = self.access_token().await?;
        self.execute_with_retry(endpoint, policy, || request_fn().bearer_auth(token))
            .await
    }

    /// Process an HTTP response and deserialize its body.
    ///
    /// An empty body deserializes as JSON `null`, so `()` and `Value`
    /// targets accept bodiless success responses.
    ///
    /// # Errors
    ///
    /// Returns [`EightError::Api`] for non-success statuses, or a context
    /// error if the body cannot be read or parsed.
    async fn handle_response<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", endpoint))?;

        if !status.is_success() {
            let summary = match status {
                StatusCode::NOT_FOUND => format!("{} not found", endpoint),
                StatusCode::UNAUTHORIZED => format!("Unauthorized access to {}", endpoint),
                StatusCode::FORBIDDEN => format!("Access forbidden to {}", endpoint),
                StatusCode::SERVICE_UNAVAILABLE => format!("Service unavailable at {}", endpoint),
                _ => format!("Request to {} failed", endpoint),
            };
            let body = text.trim();
            let message = if body.is_empty() {
                summary
            } else {
                format!("{}: {}", summary, body)
            };
            return Err(EightError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body)
            .with_context(|| format!("Failed to parse JSON response from {}", endpoint))
    }

    /// Execute an HTTP request with automatic retry logic.
    ///
    /// Only transport errors allowed by `policy` are retried; a write that
    /// timed out may already have been applied, so it is never resent.
    /// Uses linear backoff: delay * (attempt + 1).
    async fn execute_with_retry<T, F>(
        &self,
        endpoint: &str,
        policy: RetryPolicy,
        request_fn: F,
    ) -> Result<T>
    where
        F: Fn() -> RequestBuilder,
        T: DeserializeOwned,
    {
        let mut attempt = 0;

        loop {
            debug!("Sending request to {} (attempt {})", endpoint, attempt + 1);
            match request_fn().send().await {
                Ok(response) => return Self::handle_response(response, endpoint).await,
                Err(e) => {
                    if policy.should_retry(&e) && attempt < self.max_retries {
                        warn!("Request to {} failed, retrying: {}", endpoint, e);
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(EightError::Http(format!(
                        "Failed to reach {} after {} attempts: {}",
                        endpoint,
                        attempt + 1,
                        e
                    ))
                    .into());
                }
            }
        }
    }
}

/// Build a GET request with a query parameter, omitted when empty
fn get_with_optional_param(
    client: &Client,
    url: &str,
    name: &'static str,
    value: &str,
) -> RequestBuilder {
    let request = client.get(url);
    if value.is_empty() {
        request
    } else {
        request.query(&[(name, value)])
    }
}

#[async_trait]
impl EightApi for EightClient {
    async fn list_schedules(&self) -> Result<Vec<TemperatureSchedule>> {
        let s = &self.session;
        let url = s.user_url("temperature/schedules");

        let response: ScheduleListResponse = s
            .authorized("temperature/schedules", RetryPolicy::Idempotent, || {
                s.client.get(&url)
            })
            .await?;
        Ok(response.schedules)
    }

    async fn create_schedule(&self, schedule: TemperatureSchedule) -> Result<TemperatureSchedule> {
        let s = &self.session;
        let url = s.user_url("temperature/schedules");

        s.authorized("temperature/schedules", RetryPolicy::ConnectOnly, || {
            s.client.post(&url).json(&schedule)
        })
        .await
    }

    async fn update_schedule(&self, id: &str, patch: &SchedulePatch) -> Result<Value> {
        let s = &self.session;
        let path = format!("temperature/schedules/{}", urlencoding::encode(id));
        let url = s.user_url(&path);

        debug!(
            "Updating schedule {} fields: {:?}",
            id,
            patch.field_names().collect::<Vec<_>>()
        );
        s.authorized(&path, RetryPolicy::ConnectOnly, || {
            s.client.patch(&url).json(patch)
        })
        .await
    }

    async fn delete_schedule(&self, id: &str) -> Result<()> {
        let s = &self.session;
        let path = format!("temperature/schedules/{}", urlencoding::encode(id));
        let url = s.user_url(&path);

        let _: Value = s
            .authorized(&path, RetryPolicy::ConnectOnly, || s.client.delete(&url))
            .await?;
        Ok(())
    }

    fn travel(&self) -> &dyn TravelApi {
        &self.travel
    }
}

#[async_trait]
impl TravelApi for TravelClient {
    async fn trips(&self) -> Result<Value> {
        let s = &self.session;
        let url = s.user_url("travel/trips");
        s.authorized("travel/trips", RetryPolicy::Idempotent, || s.client.get(&url))
            .await
    }

    async fn plans(&self, trip_id: &str) -> Result<Value> {
        let s = &self.session;
        let url = s.user_url("travel/plans");
        s.authorized("travel/plans", RetryPolicy::Idempotent, || {
            get_with_optional_param(&s.client, &url, "tripId", trip_id)
        })
        .await
    }

    async fn plan_tasks(&self, plan_id: &str) -> Result<Value> {
        let s = &self.session;
        let url = s.user_url("travel/plan-tasks");
        s.authorized("travel/plan-tasks", RetryPolicy::Idempotent, || {
            s.client.get(&url).query(&[("planId", plan_id)])
        })
        .await
    }

    async fn airport_search(&self, query: &str) -> Result<Value> {
        let s = &self.session;
        let url = s.user_url("travel/airports");
        s.authorized("travel/airports", RetryPolicy::Idempotent, || {
            get_with_optional_param(&s.client, &url, "query", query)
        })
        .await
    }

    async fn flight_status(&self, flight_number: &str) -> Result<Value> {
        let s = &self.session;
        let url = s.user_url("travel/flight-status");
        s.authorized("travel/flight-status", RetryPolicy::Idempotent, || {
            get_with_optional_param(&s.client, &url, "flightNumber", flight_number)
        })
        .await
    }
}
