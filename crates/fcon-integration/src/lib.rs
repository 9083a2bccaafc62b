//! fcon-integration - Polling, entities and HTTP surface for one vehicle
//!
//! The [`UpdateCoordinator`] polls the vendor API on a fixed interval and
//! keeps the latest normalized record. After each refresh the
//! [`EntityPlatform`] re-reads that record into sensor, lock and tracker
//! entities, which [`server::create_router`] exposes as JSON.
//!
//! ```rust,ignore
//! let entry = create_entry("entry-1", &client, tokens.as_ref()).await?;
//! let integration = Arc::new(
//!     Integration::setup(entry, CoordinatorConfig::default(), tokens, source, None).await?,
//! );
//! tokio::spawn(async move { integration.run(shutdown).await });
//! ```

pub mod coordinator;
pub mod entity;
pub mod restore;
pub mod server;
pub mod setup;
pub mod testing;

pub use coordinator::{
    CoordinatorConfig, CoordinatorEvent, CoordinatorSnapshot, FailureKind, Phase,
    RefreshOutcome, TelemetrySource, UpdateCoordinator, UpdateFailure, DEFAULT_UPDATE_INTERVAL,
    RATE_LIMIT_BACKOFF,
};
pub use entity::{DeviceInfo, EntityPlatform, EntityReading, EntityState, VehicleEntity};
pub use restore::{RestoreStore, StoreError};
pub use server::{create_router, AppState};
pub use setup::{create_entry, ConfigEntry, Integration, SetupError, DOMAIN, ENTRY_TITLE};
