//! Test utilities for fcon-client
//!
//! [`MockVendorServer`] serves the two Query API endpoints from an in-process
//! axum router so the client, the coordinator and the daemon can be tested
//! without the real vendor API.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::{FordClient, Result};

/// Path prefix the mock serves, mirroring the production API
pub const API_PREFIX: &str = "/fcon-query/v1";

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Value,
}

impl MockResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({ "error": format!("HTTP {}", status) }),
        }
    }
}

#[derive(Default)]
struct MockState {
    garage: Option<MockResponse>,
    /// Queued telemetry responses, consumed in order
    telemetry_queue: VecDeque<MockResponse>,
    /// Served once the queue is empty
    telemetry_default: Option<MockResponse>,
    telemetry_requests: usize,
    garage_requests: usize,
    last_authorization: Option<String>,
}

type SharedState = Arc<Mutex<MockState>>;

/// Fake vendor API that shuts down when dropped
pub struct MockVendorServer {
    pub addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockVendorServer {
    /// Start a server answering garage with `vin` and telemetry with `telemetry`
    pub async fn start(vin: &str, telemetry: Value) -> Result<Self> {
        let state = MockState {
            garage: Some(MockResponse::ok(json!({ "vin": vin }))),
            telemetry_default: Some(MockResponse::ok(telemetry)),
            ..Default::default()
        };
        let state = Arc::new(Mutex::new(state));

        let router = Router::new()
            .route(&format!("{}/garage", API_PREFIX), get(garage))
            .route(&format!("{}/telemetry", API_PREFIX), get(telemetry_handler))
            .with_state(state.clone());

        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Base URL to hand to [`FordClient::new`]
    pub fn base_url(&self) -> String {
        format!("http://{}{}/", self.addr, API_PREFIX)
    }

    /// Build a client pointing at this server
    pub fn client(&self) -> Result<FordClient> {
        FordClient::with_config(
            &self.base_url(),
            Duration::from_secs(5),
            Duration::from_secs(2),
        )
    }

    /// Queue a telemetry response served before the default one
    pub fn push_telemetry(&self, response: MockResponse) {
        self.state.lock().telemetry_queue.push_back(response);
    }

    /// Replace the response served once the queue is drained
    pub fn set_default_telemetry(&self, response: MockResponse) {
        self.state.lock().telemetry_default = Some(response);
    }

    pub fn set_garage(&self, response: MockResponse) {
        self.state.lock().garage = Some(response);
    }

    pub fn telemetry_requests(&self) -> usize {
        self.state.lock().telemetry_requests
    }

    pub fn garage_requests(&self) -> usize {
        self.state.lock().garage_requests
    }

    /// Authorization header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().last_authorization.clone()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MockVendorServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn record_authorization(state: &mut MockState, headers: &HeaderMap) {
    state.last_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
}

fn render(response: Option<MockResponse>) -> Response {
    match response {
        Some(r) => {
            let status = StatusCode::from_u16(r.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(r.body)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn garage(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let response = {
        let mut state = state.lock();
        state.garage_requests += 1;
        record_authorization(&mut state, &headers);
        state.garage.clone()
    };
    render(response)
}

async fn telemetry_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let response = {
        let mut state = state.lock();
        state.telemetry_requests += 1;
        record_authorization(&mut state, &headers);
        match state.telemetry_queue.pop_front() {
            Some(r) => Some(r),
            None => state.telemetry_default.clone(),
        }
    };
    render(response)
}
