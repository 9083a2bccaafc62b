//! Config entry setup and the poll loop
//!
//! [`create_entry`] discovers the VIN of a freshly authorized account.
//! [`Integration::setup`] wires a coordinator and the entity platform for one
//! entry; [`Integration::run`] drives refreshes until shutdown.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use fcon_auth::TokenProvider;
use fcon_client::FordClient;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::coordinator::{CoordinatorConfig, TelemetrySource, UpdateCoordinator};
use crate::entity::EntityPlatform;
use crate::restore::RestoreStore;

/// Device identifier namespace
pub const DOMAIN: &str = "fordconnect";

/// Title given to entries created from the garage lookup
pub const ENTRY_TITLE: &str = "Ford Query integration";

#[derive(Error, Debug)]
pub enum SetupError {
    /// Prerequisites are missing; the host should retry later
    #[error("Integration not ready: {0}")]
    NotReady(String),
}

/// One configured vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub title: String,
    pub vin: String,
}

impl ConfigEntry {
    pub fn new(entry_id: impl Into<String>, vin: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: ENTRY_TITLE.to_string(),
            vin: vin.into(),
        }
    }
}

/// Create an entry for the account's vehicle, looking up its VIN
pub async fn create_entry(
    entry_id: &str,
    client: &FordClient,
    tokens: &dyn TokenProvider,
) -> Result<ConfigEntry, SetupError> {
    let token = tokens
        .access_token()
        .await
        .map_err(|e| SetupError::NotReady(e.to_string()))?;
    let garage = client
        .fetch_garage(&token)
        .await
        .map_err(|e| SetupError::NotReady(format!("garage lookup failed: {}", e)))?;

    info!(vin = %garage.vin, "Discovered vehicle");
    Ok(ConfigEntry::new(entry_id, garage.vin))
}

/// A set-up entry: coordinator, entities and their restore store
pub struct Integration {
    entry: ConfigEntry,
    coordinator: Arc<UpdateCoordinator>,
    platform: Arc<RwLock<EntityPlatform>>,
    restore: Option<RestoreStore>,
}

impl Integration {
    pub async fn setup(
        entry: ConfigEntry,
        config: CoordinatorConfig,
        tokens: Arc<dyn TokenProvider>,
        source: Arc<dyn TelemetrySource>,
        restore: Option<RestoreStore>,
    ) -> Result<Self, SetupError> {
        tokens
            .access_token()
            .await
            .map_err(|e| SetupError::NotReady(e.to_string()))?;

        info!(entry_id = %entry.entry_id, vin = %entry.vin, "Setting up FordConnect entry");

        let coordinator = Arc::new(UpdateCoordinator::new(
            entry.vin.clone(),
            config,
            tokens,
            source,
        ));

        let mut platform = EntityPlatform::new(&entry);
        let stored = match &restore {
            Some(store) => store.load().await.unwrap_or_else(|e| {
                warn!(path = %store.path().display(), "Ignoring restore state: {}", e);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        platform.restore(&stored, coordinator.last_update_success());

        Ok(Self {
            entry,
            coordinator,
            platform: Arc::new(RwLock::new(platform)),
            restore,
        })
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    pub fn coordinator(&self) -> &Arc<UpdateCoordinator> {
        &self.coordinator
    }

    pub fn platform(&self) -> &Arc<RwLock<EntityPlatform>> {
        &self.platform
    }

    /// One refresh followed by the entity update
    pub async fn refresh(&self) -> crate::coordinator::RefreshOutcome {
        let outcome = self.coordinator.refresh().await;
        let snapshot = self.coordinator.snapshot();

        let restorable = {
            let mut platform = self.platform.write();
            platform.handle_coordinator_update(&snapshot);
            platform.restorable_values()
        };

        if snapshot.last_update_success {
            self.persist(&restorable).await;
        }
        outcome
    }

    /// Poll until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let interval = self.coordinator.config().update_interval;

        loop {
            let delay = self.refresh().await.next_refresh().unwrap_or(interval);

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(vin = %self.entry.vin, "Poll loop stopped");
    }

    async fn persist(&self, values: &BTreeMap<String, f64>) {
        let Some(store) = &self.restore else {
            return;
        };
        if let Err(e) = store.save(values).await {
            warn!(path = %store.path().display(), "Failed to save restore state: {}", e);
        }
    }
}
