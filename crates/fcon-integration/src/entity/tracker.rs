//! Device tracker for the vehicle position

use fcon_core::VehicleData;

use super::{unique_id, EntityReading, VehicleEntity};
use crate::setup::ConfigEntry;

const NAME: &str = "Vehicle Position";

pub struct VehiclePosition {
    unique_id: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
}

impl VehiclePosition {
    pub fn new(entry: &ConfigEntry) -> Self {
        Self {
            unique_id: unique_id(entry, NAME),
            latitude: None,
            longitude: None,
            altitude: None,
        }
    }
}

impl VehicleEntity for VehiclePosition {
    fn name(&self) -> &str {
        NAME
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn handle_coordinator_update(&mut self, data: &VehicleData) {
        self.latitude = Some(data.position.latitude);
        self.longitude = Some(data.position.longitude);
        self.altitude = Some(data.position.altitude);
    }

    fn reading(&self) -> EntityReading {
        EntityReading::DeviceTracker {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_data;

    #[test]
    fn test_position_from_record() {
        let mut tracker = VehiclePosition::new(&ConfigEntry::new("e1", "VIN"));
        assert_eq!(
            tracker.reading(),
            EntityReading::DeviceTracker {
                latitude: None,
                longitude: None,
                altitude: None
            }
        );

        tracker.handle_coordinator_update(&sample_data());
        assert_eq!(
            tracker.reading(),
            EntityReading::DeviceTracker {
                latitude: Some(51.5072),
                longitude: Some(-0.1276),
                altitude: Some(35.2)
            }
        );
        assert_eq!(tracker.unique_id(), "e1_Vehicle Position");
    }
}
