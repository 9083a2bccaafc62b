//! Update coordinator
//!
//! One refresh cycle: obtain a valid token, fetch telemetry, store the
//! normalized record and tell subscribers. Failures are classified so the
//! poll loop knows when to try again.
//!
//! ```text
//!        timer fires                  fetch done (ok or error)
//!   Idle ─────────────▶ Refreshing ─────────────────────────▶ Idle
//! ```
//!
//! Refreshes never overlap; a refresh requested while another one is running
//! returns [`RefreshOutcome::Skipped`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fcon_auth::TokenProvider;
use fcon_client::{ClientError, FordClient};
use fcon_core::VehicleData;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Default poll interval
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);
/// Minimum wait after the vendor answered 429
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// Source of normalized telemetry, given a bearer token
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_telemetry(&self, access_token: &str) -> fcon_client::Result<VehicleData>;
}

#[async_trait]
impl TelemetrySource for FordClient {
    async fn fetch_telemetry(&self, access_token: &str) -> fcon_client::Result<VehicleData> {
        FordClient::fetch_telemetry(self, access_token).await
    }
}

/// Coordinator timing
///
/// A `rate_limit_backoff` below [`RATE_LIMIT_BACKOFF`] is raised to it.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub update_interval: Duration,
    pub rate_limit_backoff: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            rate_limit_backoff: RATE_LIMIT_BACKOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Refreshing,
}

/// Why a refresh failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No valid token could be obtained
    Auth,
    /// Vendor answered 429
    RateLimited,
    /// Any other HTTP or network failure
    Transport,
    /// Payload arrived but a required key was missing
    Mapping,
}

impl FailureKind {
    /// Only rate limiting is retried with a dedicated backoff
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::RateLimited)
    }

    fn from_client_error(err: &ClientError) -> Self {
        if err.is_rate_limited() {
            FailureKind::RateLimited
        } else if err.is_mapping() {
            FailureKind::Mapping
        } else {
            FailureKind::Transport
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Broadcast to subscribers after every refresh
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    Updated(Arc<VehicleData>),
    Failed(UpdateFailure),
}

/// Result of one call to [`UpdateCoordinator::refresh`]
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated {
        next_refresh: Duration,
    },
    Failed {
        failure: UpdateFailure,
        next_refresh: Duration,
    },
    /// Another refresh was already running
    Skipped,
}

impl RefreshOutcome {
    /// Delay until the next poll is eligible, if this refresh ran
    pub fn next_refresh(&self) -> Option<Duration> {
        match self {
            RefreshOutcome::Updated { next_refresh } => Some(*next_refresh),
            RefreshOutcome::Failed { next_refresh, .. } => Some(*next_refresh),
            RefreshOutcome::Skipped => None,
        }
    }
}

/// Read-only view handed to entities
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorSnapshot {
    #[serde(skip)]
    pub data: Option<Arc<VehicleData>>,
    pub last_update_success: bool,
    /// Data is retained from an earlier poll after a non-retryable failure
    pub stale: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure: Option<UpdateFailure>,
    pub phase: Phase,
}

#[derive(Debug)]
struct CoordinatorState {
    data: Option<Arc<VehicleData>>,
    last_update_success: bool,
    stale: bool,
    last_success_at: Option<DateTime<Utc>>,
    last_failure: Option<UpdateFailure>,
    phase: Phase,
}

/// Polls the vendor API for one vehicle
pub struct UpdateCoordinator {
    vin: String,
    config: CoordinatorConfig,
    tokens: Arc<dyn TokenProvider>,
    source: Arc<dyn TelemetrySource>,
    state: RwLock<CoordinatorState>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl UpdateCoordinator {
    pub fn new(
        vin: impl Into<String>,
        config: CoordinatorConfig,
        tokens: Arc<dyn TokenProvider>,
        source: Arc<dyn TelemetrySource>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            vin: vin.into(),
            config,
            tokens,
            source,
            state: RwLock::new(CoordinatorState {
                data: None,
                last_update_success: false,
                stale: false,
                last_success_at: None,
                last_failure: None,
                phase: Phase::Idle,
            }),
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Most recent normalized record
    pub fn data(&self) -> Option<Arc<VehicleData>> {
        self.state.read().data.clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.state.read().last_update_success
    }

    pub fn is_stale(&self) -> bool {
        self.state.read().stale
    }

    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let state = self.state.read();
        CoordinatorSnapshot {
            data: state.data.clone(),
            last_update_success: state.last_update_success,
            stale: state.stale,
            last_success_at: state.last_success_at,
            last_failure: state.last_failure.clone(),
            phase: state.phase,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    /// Run one refresh cycle
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            debug!(vin = %self.vin, "Refresh already in progress");
            return RefreshOutcome::Skipped;
        };

        self.state.write().phase = Phase::Refreshing;
        info!(vin = %self.vin, "Updating data");

        let outcome = match self.fetch().await {
            Ok(data) => self.store(data),
            Err(failure) => self.record_failure(failure),
        };

        self.state.write().phase = Phase::Idle;
        outcome
    }

    async fn fetch(&self) -> Result<VehicleData, UpdateFailure> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| UpdateFailure {
                kind: FailureKind::Auth,
                message: e.to_string(),
            })?;

        self.source
            .fetch_telemetry(&token)
            .await
            .map_err(|e| UpdateFailure {
                kind: FailureKind::from_client_error(&e),
                message: e.to_string(),
            })
    }

    fn store(&self, data: VehicleData) -> RefreshOutcome {
        let data = Arc::new(data);
        {
            let mut state = self.state.write();
            state.data = Some(data.clone());
            state.last_update_success = true;
            state.stale = false;
            state.last_success_at = Some(Utc::now());
            state.last_failure = None;
        }

        debug!(vin = %self.vin, "Telemetry updated");
        // No receivers is fine
        let _ = self.events.send(CoordinatorEvent::Updated(data));

        RefreshOutcome::Updated {
            next_refresh: self.config.update_interval,
        }
    }

    fn record_failure(&self, failure: UpdateFailure) -> RefreshOutcome {
        let next_refresh = if failure.kind.is_retryable() {
            self.config
                .update_interval
                .max(self.config.rate_limit_backoff)
                .max(RATE_LIMIT_BACKOFF)
        } else {
            self.config.update_interval
        };

        {
            let mut state = self.state.write();
            state.last_update_success = false;
            if !failure.kind.is_retryable() && state.data.is_some() {
                state.stale = true;
            }
            state.last_failure = Some(failure.clone());
        }

        warn!(
            vin = %self.vin,
            kind = ?failure.kind,
            retry_in_secs = next_refresh.as_secs(),
            "Error fetching data: {}",
            failure.message
        );
        let _ = self.events.send(CoordinatorEvent::Failed(failure.clone()));

        RefreshOutcome::Failed {
            failure,
            next_refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_data, ScriptedSource};
    use fcon_auth::{StaticToken, StoredToken};
    use fcon_core::MappingError;

    fn coordinator(source: Arc<ScriptedSource>) -> UpdateCoordinator {
        UpdateCoordinator::new(
            "VIN1",
            CoordinatorConfig::default(),
            Arc::new(StaticToken::new(StoredToken::new("token"))),
            source,
        )
    }

    #[tokio::test]
    async fn test_successful_refresh_stores_data() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = coordinator(source.clone());
        let mut events = coordinator.subscribe();

        let outcome = coordinator.refresh().await;

        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                next_refresh: DEFAULT_UPDATE_INTERVAL
            }
        );
        assert!(coordinator.last_update_success());
        assert_eq!(coordinator.data().unwrap().odometer, sample_data().odometer);
        assert_eq!(coordinator.phase(), Phase::Idle);
        assert!(matches!(events.try_recv(), Ok(CoordinatorEvent::Updated(_))));
        assert_eq!(source.tokens_seen(), vec!["token".to_string()]);
    }

    #[tokio::test]
    async fn test_rate_limit_keeps_data_and_backs_off() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = coordinator(source.clone());
        coordinator.refresh().await;
        let before = coordinator.data().unwrap();

        source.push(Err(ClientError::status_error(429, "Too Many Requests")));
        let outcome = coordinator.refresh().await;

        assert!(outcome.next_refresh().unwrap() >= RATE_LIMIT_BACKOFF);
        assert!(matches!(
            outcome,
            RefreshOutcome::Failed { ref failure, .. } if failure.kind == FailureKind::RateLimited
        ));
        assert!(Arc::ptr_eq(&before, &coordinator.data().unwrap()));
        assert!(!coordinator.last_update_success());
        assert!(!coordinator.is_stale());
    }

    #[tokio::test]
    async fn test_transport_failure_marks_stale() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = coordinator(source.clone());
        coordinator.refresh().await;

        source.push(Err(ClientError::status_error(500, "boom")));
        let outcome = coordinator.refresh().await;

        assert_eq!(outcome.next_refresh(), Some(DEFAULT_UPDATE_INTERVAL));
        assert!(coordinator.data().is_some());
        assert!(coordinator.is_stale());
        assert_eq!(
            coordinator.snapshot().last_failure.unwrap().kind,
            FailureKind::Transport
        );

        // Next success clears the stale flag
        coordinator.refresh().await;
        assert!(!coordinator.is_stale());
        assert!(coordinator.last_update_success());
    }

    #[tokio::test]
    async fn test_mapping_failure_exposes_no_record() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        source.push(Err(ClientError::Mapping(MappingError::MissingDiscriminator {
            metric: "doorStatus",
            key: "TAILGATE++PASSENGER".to_string(),
        })));
        let coordinator = coordinator(source);

        let outcome = coordinator.refresh().await;

        assert!(matches!(
            outcome,
            RefreshOutcome::Failed { ref failure, .. } if failure.kind == FailureKind::Mapping
        ));
        assert!(coordinator.data().is_none());
        assert!(!coordinator.is_stale());
    }

    #[tokio::test]
    async fn test_token_failure_is_auth() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = UpdateCoordinator::new(
            "VIN1",
            CoordinatorConfig::default(),
            Arc::new(StaticToken::default()),
            source.clone(),
        );

        let outcome = coordinator.refresh().await;

        assert!(matches!(
            outcome,
            RefreshOutcome::Failed { ref failure, .. } if failure.kind == FailureKind::Auth
        ));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_skipped() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = coordinator(source);

        let _held = coordinator.refresh_lock.lock().await;
        assert_eq!(coordinator.refresh().await, RefreshOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_configured_backoff_cannot_undercut_floor() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        source.push(Err(ClientError::status_error(429, "Too Many Requests")));
        let coordinator = UpdateCoordinator::new(
            "VIN1",
            CoordinatorConfig {
                update_interval: DEFAULT_UPDATE_INTERVAL,
                rate_limit_backoff: Duration::from_secs(5),
            },
            Arc::new(StaticToken::new(StoredToken::new("token"))),
            source,
        );

        let outcome = coordinator.refresh().await;
        assert_eq!(outcome.next_refresh(), Some(RATE_LIMIT_BACKOFF));
    }

    #[test]
    fn test_backoff_never_shorter_than_interval() {
        let source = Arc::new(ScriptedSource::new(sample_data()));
        let coordinator = UpdateCoordinator::new(
            "VIN1",
            CoordinatorConfig {
                update_interval: Duration::from_secs(120),
                rate_limit_backoff: RATE_LIMIT_BACKOFF,
            },
            Arc::new(StaticToken::default()),
            source,
        );

        let outcome = coordinator.record_failure(UpdateFailure {
            kind: FailureKind::RateLimited,
            message: "429".to_string(),
        });
        assert_eq!(outcome.next_refresh(), Some(Duration::from_secs(120)));
    }
}
