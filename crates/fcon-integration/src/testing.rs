//! Test utilities for fcon-integration
//!
//! [`ScriptedSource`] stands in for the vendor client when a test needs
//! control over individual poll results without running an HTTP server.

use std::collections::VecDeque;

use async_trait::async_trait;
use fcon_core::{parse_api_response, sample, VehicleData};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::coordinator::TelemetrySource;

/// Decoded reference payload
pub fn sample_data() -> VehicleData {
    sample::telemetry_payload()
        .and_then(|payload| parse_api_response(&payload))
        .unwrap_or_default()
}

/// Telemetry source answering from a queue, then with a default record
pub struct ScriptedSource {
    queue: Mutex<VecDeque<fcon_client::Result<VehicleData>>>,
    default: VehicleData,
    calls: Mutex<Vec<Instant>>,
    tokens: Mutex<Vec<String>>,
    notify: Notify,
}

impl ScriptedSource {
    pub fn new(default: VehicleData) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default,
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Queue a result served before the default record
    pub fn push(&self, result: fcon_client::Result<VehicleData>) {
        self.queue.lock().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Time of every fetch, in order
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }

    /// Bearer tokens passed to every fetch
    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    /// Wait until at least `count` fetches happened
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.call_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl TelemetrySource for ScriptedSource {
    async fn fetch_telemetry(&self, access_token: &str) -> fcon_client::Result<VehicleData> {
        self.calls.lock().push(Instant::now());
        self.tokens.lock().push(access_token.to_string());

        let next = self.queue.lock().pop_front();
        let result = match next {
            Some(result) => result,
            None => Ok(self.default.clone()),
        };

        self.notify.notify_waiters();
        result
    }
}
