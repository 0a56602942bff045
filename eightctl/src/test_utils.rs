//! Test utilities for CLI testing
//!
//! Provides a recording client for handler tests and a mock HTTP server for
//! exercising [`crate::client::EightClient`].

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use eight_core::{EightError, SchedulePatch, TemperatureSchedule};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::client::{EightApi, TravelApi};
use crate::config::{CliConfig, Credentials};

const TEST_TOKEN: &str = "test-token";

/// Credentials accepted by [`MockServer`]
pub fn test_credentials() -> Credentials {
    Credentials {
        email: "me@example.com".to_string(),
        password: "hunter2".to_string(),
        user_id: "u-1".to_string(),
        client_id: "cid".to_string(),
        client_secret: "csecret".to_string(),
    }
}

/// Configuration carrying [`test_credentials`]
pub fn test_config() -> CliConfig {
    let creds = test_credentials();
    CliConfig {
        email: Some(creds.email),
        password: Some(creds.password),
        user_id: Some(creds.user_id),
        client_id: Some(creds.client_id),
        client_secret: Some(creds.client_secret),
        ..CliConfig::default()
    }
}

// =========================================================================
// Recording client
// =========================================================================

/// One call made against [`RecordingClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListSchedules,
    CreateSchedule(TemperatureSchedule),
    UpdateSchedule(String, SchedulePatch),
    DeleteSchedule(String),
    Trips,
    Plans(String),
    PlanTasks(String),
    AirportSearch(String),
    FlightStatus(String),
}

/// In-memory client that records every call and returns canned results
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    calls: Arc<Mutex<Vec<Call>>>,
    schedules: Vec<TemperatureSchedule>,
    failure: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these schedules from `list_schedules`
    pub fn with_schedules(mut self, schedules: Vec<TemperatureSchedule>) -> Self {
        self.schedules = schedules;
        self
    }

    /// Fail every call with a remote error carrying `message`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Calls made so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(EightError::Api {
                status: 500,
                message: message.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EightApi for RecordingClient {
    async fn list_schedules(&self) -> Result<Vec<TemperatureSchedule>> {
        self.record(Call::ListSchedules)?;
        Ok(self.schedules.clone())
    }

    async fn create_schedule(&self, schedule: TemperatureSchedule) -> Result<TemperatureSchedule> {
        self.record(Call::CreateSchedule(schedule.clone()))?;
        Ok(TemperatureSchedule {
            id: Some("new-1".to_string()),
            ..schedule
        })
    }

    async fn update_schedule(&self, id: &str, patch: &SchedulePatch) -> Result<Value> {
        self.record(Call::UpdateSchedule(id.to_string(), patch.clone()))?;
        Ok(json!({ "id": id }))
    }

    async fn delete_schedule(&self, id: &str) -> Result<()> {
        self.record(Call::DeleteSchedule(id.to_string()))
    }

    fn travel(&self) -> &dyn TravelApi {
        self
    }
}

#[async_trait]
impl TravelApi for RecordingClient {
    async fn trips(&self) -> Result<Value> {
        self.record(Call::Trips)?;
        Ok(json!([{ "id": "T1", "destination": "NRT" }]))
    }

    async fn plans(&self, trip_id: &str) -> Result<Value> {
        self.record(Call::Plans(trip_id.to_string()))?;
        Ok(json!([{ "id": "P1", "tripId": trip_id }]))
    }

    async fn plan_tasks(&self, plan_id: &str) -> Result<Value> {
        self.record(Call::PlanTasks(plan_id.to_string()))?;
        Ok(json!([{ "planId": plan_id, "task": "light exposure" }]))
    }

    async fn airport_search(&self, query: &str) -> Result<Value> {
        self.record(Call::AirportSearch(query.to_string()))?;
        Ok(json!([{ "code": "SFO", "query": query }]))
    }

    async fn flight_status(&self, flight_number: &str) -> Result<Value> {
        self.record(Call::FlightStatus(flight_number.to_string()))?;
        Ok(json!({ "flight": flight_number, "status": "on time" }))
    }
}

// =========================================================================
// Mock HTTP server
// =========================================================================

#[derive(Debug)]
struct MockData {
    schedules: Vec<TemperatureSchedule>,
    next_id: u32,
    token_requests: usize,
    last_token_body: Option<Value>,
    last_patch: Option<(String, Value)>,
    create_requests: usize,
    create_delay: Option<Duration>,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    data: Arc<Mutex<MockData>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        let seeded = TemperatureSchedule {
            id: Some("s-1".to_string()),
            ..TemperatureSchedule::new("06:00", 20, vec![1, 2, 3, 4, 5], true)
        };

        Self {
            data: Arc::new(Mutex::new(MockData {
                schedules: vec![seeded],
                next_id: 2,
                token_requests: 0,
                last_token_body: None,
                last_patch: None,
                create_requests: 0,
                create_delay: None,
            })),
        }
    }
}

impl MockServerState {
    /// Stored schedules
    pub fn schedules(&self) -> Vec<TemperatureSchedule> {
        self.data.lock().unwrap().schedules.clone()
    }

    /// Number of token exchanges served
    pub fn token_requests(&self) -> usize {
        self.data.lock().unwrap().token_requests
    }

    /// Body of the most recent token request
    pub fn last_token_body(&self) -> Option<Value> {
        self.data.lock().unwrap().last_token_body.clone()
    }

    /// Id and raw body of the most recent PATCH
    pub fn last_patch(&self) -> Option<(String, Value)> {
        self.data.lock().unwrap().last_patch.clone()
    }

    /// Number of create requests received, including ones still in flight
    pub fn create_requests(&self) -> usize {
        self.data.lock().unwrap().create_requests
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Delay every create response by `delay`, after the schedule is stored
    pub fn with_create_delay(self, delay: Duration) -> Self {
        self.state.data.lock().unwrap().create_delay = Some(delay);
        self
    }

    /// Start the mock server and return the address
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
        }

        Ok((self, server_url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    /// Create the mock server router
    fn create_router(&self) -> Router {
        Router::new()
            .route("/v1/tokens", post(token_handler))
            .route(
                "/v1/users/:user/temperature/schedules",
                get(list_schedules_handler).post(create_schedule_handler),
            )
            .route(
                "/v1/users/:user/temperature/schedules/:id",
                patch(update_schedule_handler).delete(delete_schedule_handler),
            )
            .route("/v1/users/:user/travel/trips", get(trips_handler))
            .route("/v1/users/:user/travel/plans", get(plans_handler))
            .route("/v1/users/:user/travel/plan-tasks", get(plan_tasks_handler))
            .route("/v1/users/:user/travel/airports", get(airports_handler))
            .route(
                "/v1/users/:user/travel/flight-status",
                get(flight_status_handler),
            )
            .with_state(self.state.clone())
    }
}

// Handler functions

type Params = Query<HashMap<String, String>>;

fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {}", TEST_TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn token_handler(
    State(state): State<MockServerState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let creds = test_credentials();
    {
        let mut data = state.data.lock().unwrap();
        data.token_requests += 1;
        data.last_token_body = Some(body.clone());
    }

    if body["username"] != creds.email.as_str() || body["password"] != creds.password.as_str() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(json!({
        "access_token": TEST_TOKEN,
        "expires_in": 3600,
        "userId": creds.user_id,
    })))
}

async fn list_schedules_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let schedules = state.schedules();
    Ok(Json(json!({ "schedules": schedules })))
}

async fn create_schedule_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(mut schedule): Json<TemperatureSchedule>,
) -> Result<Json<TemperatureSchedule>, StatusCode> {
    authorize(&headers)?;
    if schedule.validate().is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let delay = {
        let mut data = state.data.lock().unwrap();
        data.create_requests += 1;
        schedule.id = Some(format!("s-{}", data.next_id));
        data.next_id += 1;
        data.schedules.push(schedule.clone());
        data.create_delay
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Ok(Json(schedule))
}

async fn update_schedule_handler(
    State(state): State<MockServerState>,
    Path((_user, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    authorize(&headers).map_err(|status| (status, String::new()))?;
    let mut data = state.data.lock().unwrap();
    data.last_patch = Some((id.clone(), body.clone()));

    let stored = data
        .schedules
        .iter_mut()
        .find(|s| s.id.as_deref() == Some(id.as_str()))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("schedule {} does not exist", id),
            )
        })?;

    // Merge the patch over the stored record
    let mut merged = serde_json::to_value(&*stored)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if let (Some(target), Some(patch)) = (merged.as_object_mut(), body.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    *stored = serde_json::from_value(merged.clone())
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(merged))
}

async fn delete_schedule_handler(
    State(state): State<MockServerState>,
    Path((_user, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    authorize(&headers)?;
    let mut data = state.data.lock().unwrap();
    let before = data.schedules.len();
    data.schedules.retain(|s| s.id.as_deref() != Some(id.as_str()));

    if data.schedules.len() == before {
        Err(StatusCode::NOT_FOUND)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

async fn trips_handler(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(json!({ "trips": [{ "id": "T1", "destination": "NRT" }] })))
}

async fn plans_handler(
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(json!({ "tripId": params.get("tripId"), "plans": [] })))
}

async fn plan_tasks_handler(
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(json!({ "planId": params.get("planId"), "tasks": [] })))
}

async fn airports_handler(
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(
        json!({ "query": params.get("query"), "airports": [{ "code": "SFO" }] }),
    ))
}

async fn flight_status_handler(
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    Ok(Json(
        json!({ "flightNumber": params.get("flightNumber"), "status": "on time" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let server = MockServer::new();
        let (server, url) = server.start().await.unwrap();

        assert!(server.port() > 0);
        assert!(url.contains(&server.port().to_string()));
    }

    #[tokio::test]
    async fn test_mock_server_requires_token() {
        let (_server, url) = MockServer::new().start().await.unwrap();

        let response = reqwest::Client::new()
            .get(format!("{}/v1/users/u-1/travel/trips", url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_recording_client_records_calls() {
        let client = RecordingClient::new();
        client.delete_schedule("x").await.unwrap();
        client.travel().plans("T9").await.unwrap();

        assert_eq!(
            client.calls(),
            vec![Call::DeleteSchedule("x".to_string()), Call::Plans("T9".to_string())]
        );
    }

    #[tokio::test]
    async fn test_recording_client_failure_mode() {
        let client = RecordingClient::new().failing("boom");
        let err = client.list_schedules().await.unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert_eq!(client.calls(), vec![Call::ListSchedules]);
    }
}
