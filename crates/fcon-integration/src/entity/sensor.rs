//! Sensor entities

use fcon_core::{VehicleData, Wheel};
use serde::Serialize;

use super::{unique_id, EntityReading, VehicleEntity};
use crate::setup::ConfigEntry;

/// Sensor state value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Text(String),
}

impl SensorValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => Some(*n),
            SensorValue::Text(_) => None,
        }
    }
}

/// Which field of the record a sensor shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKey {
    AmbientTemp,
    BatteryChargeLevel,
    BatteryVoltage,
    FuelLevel,
    FuelRange,
    Odometer,
    OutsideTemperature,
    GearLeverPosition,
    IgnitionStatus,
    TirePressure(Wheel),
}

impl SensorKey {
    pub const ALL: [SensorKey; 13] = [
        SensorKey::AmbientTemp,
        SensorKey::BatteryChargeLevel,
        SensorKey::BatteryVoltage,
        SensorKey::FuelLevel,
        SensorKey::FuelRange,
        SensorKey::Odometer,
        SensorKey::OutsideTemperature,
        SensorKey::GearLeverPosition,
        SensorKey::IgnitionStatus,
        SensorKey::TirePressure(Wheel::FrontLeft),
        SensorKey::TirePressure(Wheel::FrontRight),
        SensorKey::TirePressure(Wheel::RearLeft),
        SensorKey::TirePressure(Wheel::RearRight),
    ];

    pub fn name(self) -> String {
        match self {
            SensorKey::AmbientTemp => "Ambient Temperature".to_string(),
            SensorKey::BatteryChargeLevel => "Battery Charge Level".to_string(),
            SensorKey::BatteryVoltage => "Battery Voltage".to_string(),
            SensorKey::FuelLevel => "Fuel Level".to_string(),
            SensorKey::FuelRange => "Fuel Range".to_string(),
            SensorKey::Odometer => "Odometer".to_string(),
            SensorKey::OutsideTemperature => "Outside Temperature".to_string(),
            SensorKey::GearLeverPosition => "Gear Lever Position".to_string(),
            SensorKey::IgnitionStatus => "Ignition Status".to_string(),
            SensorKey::TirePressure(wheel) => format!("Tire Pressure: {}", wheel.label()),
        }
    }

    pub fn device_class(self) -> Option<&'static str> {
        match self {
            SensorKey::AmbientTemp | SensorKey::OutsideTemperature => Some("temperature"),
            SensorKey::BatteryChargeLevel => Some("battery"),
            SensorKey::BatteryVoltage => Some("voltage"),
            SensorKey::FuelRange | SensorKey::Odometer => Some("distance"),
            SensorKey::TirePressure(_) => Some("pressure"),
            SensorKey::FuelLevel | SensorKey::GearLeverPosition | SensorKey::IgnitionStatus => {
                None
            }
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            SensorKey::AmbientTemp | SensorKey::OutsideTemperature => Some("°C"),
            SensorKey::BatteryChargeLevel | SensorKey::FuelLevel => Some("%"),
            SensorKey::BatteryVoltage => Some("V"),
            SensorKey::FuelRange | SensorKey::Odometer => Some("km"),
            SensorKey::TirePressure(_) => Some("bar"),
            SensorKey::GearLeverPosition | SensorKey::IgnitionStatus => None,
        }
    }

    pub fn suggested_display_precision(self) -> Option<u8> {
        match self {
            SensorKey::BatteryVoltage => Some(2),
            SensorKey::FuelLevel | SensorKey::Odometer => Some(0),
            SensorKey::GearLeverPosition | SensorKey::IgnitionStatus => None,
            _ => Some(1),
        }
    }

    pub fn state_class(self) -> Option<&'static str> {
        match self {
            SensorKey::FuelLevel | SensorKey::FuelRange => Some("measurement"),
            _ => None,
        }
    }

    /// Restores its last value across restarts
    pub fn is_restorable(self) -> bool {
        matches!(
            self,
            SensorKey::Odometer | SensorKey::FuelLevel | SensorKey::FuelRange
        )
    }

    /// New value from `data`, or `None` to keep the current one
    pub fn extract(self, data: &VehicleData) -> Option<SensorValue> {
        let value = match self {
            SensorKey::AmbientTemp => SensorValue::Number(data.ambient_temp),
            SensorKey::BatteryChargeLevel => SensorValue::Number(data.battery_charge_level),
            SensorKey::BatteryVoltage => SensorValue::Number(data.battery_voltage),
            SensorKey::FuelLevel if fuel_reported(data) => SensorValue::Number(data.fuel_level),
            SensorKey::FuelRange if fuel_reported(data) => SensorValue::Number(data.fuel_range),
            SensorKey::FuelLevel | SensorKey::FuelRange => return None,
            SensorKey::Odometer => SensorValue::Number(data.odometer),
            SensorKey::OutsideTemperature => SensorValue::Number(data.outside_temperature),
            SensorKey::GearLeverPosition => {
                SensorValue::Text(capitalize(&data.gear_lever_position))
            }
            SensorKey::IgnitionStatus => SensorValue::Text(capitalize(&data.ignition_status)),
            SensorKey::TirePressure(wheel) => SensorValue::Number(data.tires.get(wheel).pressure),
        };
        Some(value)
    }
}

/// Fuel figures read zero while the vehicle sleeps; only trust them when a
/// range is reported or the ignition is on.
fn fuel_reported(data: &VehicleData) -> bool {
    data.fuel_range > 0.0 || data.ignition_status == "ON"
}

/// First character upper case, the rest lower case
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub struct VehicleSensor {
    key: SensorKey,
    name: String,
    unique_id: String,
    value: Option<SensorValue>,
}

impl VehicleSensor {
    pub fn new(entry: &ConfigEntry, key: SensorKey) -> Self {
        let name = key.name();
        Self {
            key,
            unique_id: unique_id(entry, &name),
            name,
            value: None,
        }
    }

    pub fn key(&self) -> SensorKey {
        self.key
    }

    pub fn value(&self) -> Option<&SensorValue> {
        self.value.as_ref()
    }
}

impl VehicleEntity for VehicleSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn handle_coordinator_update(&mut self, data: &VehicleData) {
        if let Some(value) = self.key.extract(data) {
            self.value = Some(value);
        }
    }

    fn reading(&self) -> EntityReading {
        EntityReading::Sensor {
            value: self.value.clone(),
            unit: self.key.unit(),
            device_class: self.key.device_class(),
            state_class: self.key.state_class(),
            suggested_display_precision: self.key.suggested_display_precision(),
        }
    }

    fn available(&self, coordinator_ok: bool) -> bool {
        if self.key.is_restorable() {
            coordinator_ok || self.value.is_some()
        } else {
            coordinator_ok
        }
    }

    fn restorable_value(&self) -> Option<f64> {
        if !self.key.is_restorable() {
            return None;
        }
        self.value.as_ref().and_then(SensorValue::as_number)
    }

    fn restore(&mut self, stored: Option<f64>, coordinator_ok: bool) {
        if !self.key.is_restorable() || coordinator_ok {
            return;
        }
        if let Some(value) = stored.filter(|v| *v != 0.0) {
            self.value = Some(SensorValue::Number(value));
        }
    }
}

pub fn entities(entry: &ConfigEntry) -> Vec<VehicleSensor> {
    SensorKey::ALL
        .iter()
        .map(|key| VehicleSensor::new(entry, *key))
        .collect()
}
