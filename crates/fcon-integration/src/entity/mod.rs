//! Presentation entities
//!
//! Every entity reads one aspect of the coordinator's current record. After
//! each refresh the [`EntityPlatform`] hands the record to every entity
//! synchronously; entities never perform I/O of their own.

pub mod lock;
pub mod sensor;
pub mod tracker;

use std::collections::BTreeMap;

use fcon_core::VehicleData;
use serde::Serialize;

use crate::coordinator::CoordinatorSnapshot;
use crate::setup::{ConfigEntry, DOMAIN};

pub use lock::{LockKind, VehicleLock};
pub use sensor::{capitalize, SensorKey, SensorValue, VehicleSensor};
pub use tracker::VehiclePosition;

/// Device the entities are grouped under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
}

impl DeviceInfo {
    pub fn for_vin(vin: &str) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), vin.to_string())],
            name: format!("Vehicle {}", vin),
        }
    }
}

/// `{entry_id}_{name}`
pub fn unique_id(entry: &ConfigEntry, name: &str) -> String {
    format!("{}_{}", entry.entry_id, name)
}

/// Entity-specific part of an [`EntityState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum EntityReading {
    Sensor {
        value: Option<SensorValue>,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        device_class: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        state_class: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggested_display_precision: Option<u8>,
    },
    Lock {
        is_locked: Option<bool>,
        is_open: Option<bool>,
    },
    DeviceTracker {
        latitude: Option<f64>,
        longitude: Option<f64>,
        altitude: Option<f64>,
    },
}

/// Serializable view of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub name: String,
    pub available: bool,
    #[serde(flatten)]
    pub reading: EntityReading,
}

/// An entity fed by the update coordinator
pub trait VehicleEntity: Send + Sync {
    fn name(&self) -> &str;

    fn unique_id(&self) -> &str;

    /// Apply a freshly stored record
    fn handle_coordinator_update(&mut self, data: &VehicleData);

    fn reading(&self) -> EntityReading;

    /// Availability given the coordinator's last result
    fn available(&self, coordinator_ok: bool) -> bool {
        coordinator_ok
    }

    /// Value persisted across restarts, for entities that restore state
    fn restorable_value(&self) -> Option<f64> {
        None
    }

    /// Called once at startup with the persisted value
    fn restore(&mut self, _stored: Option<f64>, _coordinator_ok: bool) {}

    fn state(&self, coordinator_ok: bool) -> EntityState {
        EntityState {
            unique_id: self.unique_id().to_string(),
            name: self.name().to_string(),
            available: self.available(coordinator_ok),
            reading: self.reading(),
        }
    }
}

/// All entities of one config entry
pub struct EntityPlatform {
    device: DeviceInfo,
    entities: Vec<Box<dyn VehicleEntity>>,
    coordinator_ok: bool,
}

impl EntityPlatform {
    /// Create the sensor, lock and tracker entities for `entry`
    pub fn new(entry: &ConfigEntry) -> Self {
        let mut entities: Vec<Box<dyn VehicleEntity>> = Vec::new();
        entities.extend(
            sensor::entities(entry)
                .into_iter()
                .map(|e| Box::new(e) as Box<dyn VehicleEntity>),
        );
        entities.extend(
            lock::entities(entry)
                .into_iter()
                .map(|e| Box::new(e) as Box<dyn VehicleEntity>),
        );
        entities.push(Box::new(VehiclePosition::new(entry)));

        Self {
            device: DeviceInfo::for_vin(&entry.vin),
            entities,
            coordinator_ok: false,
        }
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Apply persisted values before the first refresh
    pub fn restore(&mut self, stored: &BTreeMap<String, f64>, coordinator_ok: bool) {
        self.coordinator_ok = coordinator_ok;
        for entity in &mut self.entities {
            let value = stored.get(entity.unique_id()).copied();
            entity.restore(value, coordinator_ok);
        }
    }

    /// Push the coordinator's current record to every entity
    ///
    /// Runs after every refresh. A failed refresh leaves the previous record
    /// in place, so entities simply re-read it; with no record yet only the
    /// availability changes.
    pub fn handle_coordinator_update(&mut self, snapshot: &CoordinatorSnapshot) {
        self.coordinator_ok = snapshot.last_update_success;
        let Some(data) = snapshot.data.as_deref() else {
            return;
        };
        for entity in &mut self.entities {
            entity.handle_coordinator_update(data);
        }
    }

    pub fn states(&self) -> Vec<EntityState> {
        self.entities
            .iter()
            .map(|e| e.state(self.coordinator_ok))
            .collect()
    }

    pub fn state(&self, unique_id: &str) -> Option<EntityState> {
        self.entities
            .iter()
            .find(|e| e.unique_id() == unique_id)
            .map(|e| e.state(self.coordinator_ok))
    }

    /// Values to persist for restorable entities
    pub fn restorable_values(&self) -> BTreeMap<String, f64> {
        self.entities
            .iter()
            .filter_map(|e| {
                e.restorable_value()
                    .map(|value| (e.unique_id().to_string(), value))
            })
            .collect()
    }
}
