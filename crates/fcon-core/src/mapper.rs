//! Vendor payload normalization
//!
//! Converts the `metrics` object of a FordConnect telemetry response into a
//! [`VehicleData`] record.
//!
//! Per-item metrics (tires, windows, door locks, door status) arrive as
//! arrays tagged with discriminator fields. Each array is indexed once into a
//! map keyed by a tuple of those discriminators; insertion order means a later
//! entry for the same key replaces an earlier one.
//!
//! Door lock and door status entries are mandatory: if one of the fixed keys
//! is absent the whole mapping fails. Tire and window entries fall back to
//! `""` / `0.0`, and `parkingBrakeStatus` maps to `None` when absent.

use std::collections::HashMap;
use std::hash::Hash;

use serde_json::{Map, Value};

use crate::error::{MappingError, MappingResult};
use crate::model::{
    Acceleration, BatteryLoad, DoorStatus, Doors, Heading, ParkingBrake, Position, TireStatus,
    Tires, TripValue, VehicleData, Wheel, WindowStatus, Windows,
};

const TIRE_PRESSURE: &str = "tirePressure";
const TIRE_PRESSURE_STATUS: &str = "tirePressureStatus";
const WINDOW_STATUS: &str = "windowStatus";
const DOOR_LOCK_STATUS: &str = "doorLockStatus";
const DOOR_STATUS: &str = "doorStatus";
const PARKING_BRAKE_STATUS: &str = "parkingBrakeStatus";

const LOCKED: &str = "LOCKED";
const CLOSED: &str = "CLOSED";

/// (vehicleSide, vehicleWindow)
type WindowKey<'a> = (&'a str, &'a str);
/// (vehicleSide, vehicleDoor)
type DoorLockKey<'a> = (&'a str, &'a str);
/// (vehicleDoor, vehicleSide, vehicleOccupantRole)
type DoorStatusKey<'a> = (&'a str, &'a str, &'a str);

const ALL_DOORS_LOCK: DoorLockKey<'static> = ("", "ALL_DOORS");
const DRIVER_FRONT_LOCK: DoorLockKey<'static> = ("DRIVER", "UNSPECIFIED_FRONT");

const FRONT_LEFT_DOOR: DoorStatusKey<'static> = ("UNSPECIFIED_FRONT", "DRIVER", "DRIVER");
const FRONT_RIGHT_DOOR: DoorStatusKey<'static> = ("UNSPECIFIED_FRONT", "PASSENGER", "PASSENGER");
const REAR_LEFT_DOOR: DoorStatusKey<'static> = ("REAR_LEFT", "UNKNOWN", "PASSENGER");
const REAR_RIGHT_DOOR: DoorStatusKey<'static> = ("REAR_RIGHT", "UNKNOWN", "PASSENGER");
const TAILGATE_DOOR: DoorStatusKey<'static> = ("TAILGATE", "", "PASSENGER");

const FRONT_LEFT_WINDOW: WindowKey<'static> = ("DRIVER", "UNSPECIFIED_FRONT");
const FRONT_RIGHT_WINDOW: WindowKey<'static> = ("PASSENGER", "UNSPECIFIED_FRONT");
const REAR_LEFT_WINDOW: WindowKey<'static> = ("DRIVER", "UNSPECIFIED_REAR");
const REAR_RIGHT_WINDOW: WindowKey<'static> = ("PASSENGER", "UNSPECIFIED_REAR");

/// Normalize a decoded telemetry payload.
///
/// Fails without producing a partial record when a required key is missing.
pub fn parse_api_response(data: &Value) -> MappingResult<VehicleData> {
    let metrics = Metrics::from_payload(data)?;

    let tire_pressure_status = index_items(metrics.optional_items(TIRE_PRESSURE_STATUS)?, |item| {
        Ok((
            text_ref(item, "vehicleWheel", TIRE_PRESSURE_STATUS)?,
            required(item, "value", TIRE_PRESSURE_STATUS)?,
        ))
    })?;
    let tire_pressure = index_items(metrics.optional_items(TIRE_PRESSURE)?, |item| {
        Ok((text_ref(item, "vehicleWheel", TIRE_PRESSURE)?, item))
    })?;
    let windows = index_items(metrics.optional_items(WINDOW_STATUS)?, |item| {
        let key = (
            text_ref(item, "vehicleSide", WINDOW_STATUS)?,
            text_ref(item, "vehicleWindow", WINDOW_STATUS)?,
        );
        Ok((key, required(item, "value", WINDOW_STATUS)?))
    })?;
    let door_lock = index_items(metrics.items(DOOR_LOCK_STATUS)?, |item| {
        let key = (
            text_or_empty(item, "vehicleSide", DOOR_LOCK_STATUS)?,
            text_ref(item, "vehicleDoor", DOOR_LOCK_STATUS)?,
        );
        Ok((key, item))
    })?;
    let door_status = index_items(metrics.items(DOOR_STATUS)?, |item| {
        let key = (
            text_or_empty(item, "vehicleDoor", DOOR_STATUS)?,
            text_or_empty(item, "vehicleSide", DOOR_STATUS)?,
            text_or_empty(item, "vehicleOccupantRole", DOOR_STATUS)?,
        );
        Ok((key, item))
    })?;

    let parking_brake_status = match metrics.get(PARKING_BRAKE_STATUS) {
        Some(status) => Some(ParkingBrake {
            brake_type: text(status, "parkingBrakeType", PARKING_BRAKE_STATUS)?,
            value: text(status, "value", PARKING_BRAKE_STATUS)?,
        }),
        None => None,
    };

    let doors = Doors {
        all_doors_locked: door_locked(&door_lock, ALL_DOORS_LOCK)?,
        driver_front_locked: door_locked(&door_lock, DRIVER_FRONT_LOCK)?,
        front_left: door_closed(&door_status, FRONT_LEFT_DOOR)?,
        front_right: door_closed(&door_status, FRONT_RIGHT_DOOR)?,
        rear_left: door_closed(&door_status, REAR_LEFT_DOOR)?,
        rear_right: door_closed(&door_status, REAR_RIGHT_DOOR)?,
        tailgate: door_closed(&door_status, TAILGATE_DOOR)?,
    };

    let tire = |wheel: Wheel| -> MappingResult<TireStatus> {
        let key = wheel.vendor_key();
        let status = match tire_pressure_status.get(key) {
            Some(value) => value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| invalid_type(TIRE_PRESSURE_STATUS, "value", "string"))?,
            None => String::new(),
        };
        let reading = tire_pressure.get(key).copied();
        Ok(TireStatus {
            status,
            pressure: number_or_default(reading, "value", TIRE_PRESSURE)?,
            placard_pressure: number_or_default(reading, wheel.placard_field(), TIRE_PRESSURE)?,
        })
    };
    let window = |key: WindowKey<'static>| -> MappingResult<WindowStatus> {
        let value = windows.get(&key).copied();
        Ok(WindowStatus {
            lower: number_or_default(value, "lower", WINDOW_STATUS)?,
            upper: number_or_default(value, "upper", WINDOW_STATUS)?,
        })
    };

    let acceleration = metrics.value("acceleration")?;
    let heading = metrics.metric("heading")?;
    let heading_value = required(heading, "value", "metrics.heading")?;
    let position = metrics.metric("position")?;
    let location = required(
        required(position, "value", "metrics.position")?,
        "location",
        "metrics.position.value",
    )?;
    let battery_load = metrics.metric("batteryLoadStatus")?;
    let trip_fuel_economy = metrics.metric("tripFuelEconomy")?;
    let trip_xev_distance = metrics.metric("tripXevBatteryDistanceAccumulated")?;

    Ok(VehicleData {
        acceleration: Acceleration {
            x: number(acceleration, "x", "metrics.acceleration.value")?,
            y: number(acceleration, "y", "metrics.acceleration.value")?,
            z: number(acceleration, "z", "metrics.acceleration.value")?,
        },
        accelerator_pedal_position: metrics.number("acceleratorPedalPosition")?,
        ambient_temp: metrics.number("ambientTemp")?,
        battery_charge_level: metrics.number("batteryStateOfCharge")?,
        battery_voltage: metrics.number("batteryVoltage")?,
        brake_pedal_status: metrics.text("brakePedalStatus")?,
        brake_torque: metrics.number("brakeTorque")?,
        compass_direction: metrics.text("compassDirection")?,
        doors,
        engine_coolant_temp: metrics.number("engineCoolantTemp")?,
        engine_speed: metrics.number("engineSpeed")?,
        fuel_level: metrics.number("fuelLevel")?,
        fuel_range: metrics.number("fuelRange")?,
        gear_lever_position: metrics.text("gearLeverPosition")?,
        heading: Heading {
            gps_timestamp: text(heading, "gpsModuleTimestamp", "metrics.heading")?,
            detection_type: text(heading_value, "detectionType", "metrics.heading.value")?,
            heading: number(heading_value, "heading", "metrics.heading.value")?,
            uncertainty: number(heading_value, "uncertainty", "metrics.heading.value")?,
        },
        hood_status: metrics.text("hoodStatus")?,
        hybrid_vehicle_mode_status: metrics.text("hybridVehicleModeStatus")?,
        ignition_status: metrics.text("ignitionStatus")?,
        outside_temperature: metrics.number("outsideTemperature")?,
        yaw_rate: metrics.number("yawRate")?,
        windows: Windows {
            front_left: window(FRONT_LEFT_WINDOW)?,
            front_right: window(FRONT_RIGHT_WINDOW)?,
            rear_left: window(REAR_LEFT_WINDOW)?,
            rear_right: window(REAR_RIGHT_WINDOW)?,
        },
        wheel_torque_status: metrics.text("wheelTorqueStatus")?,
        tires: Tires {
            front_left: tire(Wheel::FrontLeft)?,
            front_right: tire(Wheel::FrontRight)?,
            rear_left: tire(Wheel::RearLeft)?,
            rear_right: tire(Wheel::RearRight)?,
        },
        position: Position {
            gps_timestamp: text(position, "gpsModuleTimestamp", "metrics.position")?,
            latitude: number(location, "lat", "metrics.position.value.location")?,
            longitude: number(location, "lon", "metrics.position.value.location")?,
            altitude: number(location, "alt", "metrics.position.value.location")?,
        },
        parking_brake_status,
        oil_life_remaining: metrics.number("oilLifeRemaining")?,
        odometer: metrics.number("odometer")?,
        speed: metrics.number("speed")?,
        vehicle_life_cycle_mode: metrics.text("vehicleLifeCycleMode")?,
        battery_load_status: BatteryLoad {
            battery: text(battery_load, "vehicleBattery", "metrics.batteryLoadStatus")?,
            value: text(battery_load, "value", "metrics.batteryLoadStatus")?,
        },
        torque_at_transmission: metrics.number("torqueAtTransmission")?,
        trip_fuel_economy: TripValue {
            trip_progress: text(trip_fuel_economy, "tripProgress", "metrics.tripFuelEconomy")?,
            value: number(trip_fuel_economy, "value", "metrics.tripFuelEconomy")?,
        },
        trip_xev_battery_distance_accumulated: TripValue {
            trip_progress: text(
                trip_xev_distance,
                "tripProgress",
                "metrics.tripXevBatteryDistanceAccumulated",
            )?,
            value: number(
                trip_xev_distance,
                "value",
                "metrics.tripXevBatteryDistanceAccumulated",
            )?,
        },
    })
}

/// Parse and normalize a raw JSON body
pub fn parse_api_response_str(body: &str) -> MappingResult<VehicleData> {
    let data: Value = serde_json::from_str(body)?;
    parse_api_response(&data)
}

// =============================================================================
// Metrics accessor
// =============================================================================

/// Borrowed view over the payload's `metrics` object
struct Metrics<'a>(&'a Map<String, Value>);

impl<'a> Metrics<'a> {
    fn from_payload(data: &'a Value) -> MappingResult<Self> {
        let metrics = data
            .get("metrics")
            .ok_or_else(|| MappingError::MissingKey("metrics".to_string()))?;
        metrics
            .as_object()
            .map(Metrics)
            .ok_or_else(|| MappingError::InvalidType {
                path: "metrics".to_string(),
                expected: "object",
            })
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.0.get(name)
    }

    fn metric(&self, name: &str) -> MappingResult<&'a Value> {
        self.0
            .get(name)
            .ok_or_else(|| MappingError::MissingKey(format!("metrics.{}", name)))
    }

    fn value(&self, name: &str) -> MappingResult<&'a Value> {
        required(self.metric(name)?, "value", &format!("metrics.{}", name))
    }

    fn number(&self, name: &str) -> MappingResult<f64> {
        number(self.metric(name)?, "value", &format!("metrics.{}", name))
    }

    fn text(&self, name: &str) -> MappingResult<String> {
        text(self.metric(name)?, "value", &format!("metrics.{}", name))
    }

    fn items(&self, name: &str) -> MappingResult<&'a [Value]> {
        as_items(self.metric(name)?, name)
    }

    /// Like [`Metrics::items`] but an absent metric yields no entries
    fn optional_items(&self, name: &str) -> MappingResult<&'a [Value]> {
        match self.0.get(name) {
            Some(value) => as_items(value, name),
            None => Ok(&[]),
        }
    }
}

fn as_items<'a>(value: &'a Value, name: &str) -> MappingResult<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| MappingError::InvalidType {
            path: format!("metrics.{}", name),
            expected: "array",
        })
}

// =============================================================================
// Lookup tables
// =============================================================================

/// Build a lookup from per-item entries. Later entries win.
fn index_items<'a, K, V, F>(items: &'a [Value], entry: F) -> MappingResult<HashMap<K, V>>
where
    K: Eq + Hash,
    F: Fn(&'a Value) -> MappingResult<(K, V)>,
{
    let mut lookup = HashMap::with_capacity(items.len());
    for item in items {
        let (key, value) = entry(item)?;
        lookup.insert(key, value);
    }
    Ok(lookup)
}

fn door_locked(
    lookup: &HashMap<DoorLockKey<'_>, &Value>,
    key: DoorLockKey<'static>,
) -> MappingResult<bool> {
    let item = lookup
        .get(&key)
        .ok_or_else(|| MappingError::MissingDiscriminator {
            metric: DOOR_LOCK_STATUS,
            key: format!("{}+{}", key.0, key.1),
        })?;
    Ok(required(item, "value", DOOR_LOCK_STATUS)?.as_str() == Some(LOCKED))
}

fn door_closed(
    lookup: &HashMap<DoorStatusKey<'_>, &Value>,
    key: DoorStatusKey<'static>,
) -> MappingResult<DoorStatus> {
    let item = lookup
        .get(&key)
        .ok_or_else(|| MappingError::MissingDiscriminator {
            metric: DOOR_STATUS,
            key: format!("{}+{}+{}", key.0, key.1, key.2),
        })?;
    Ok(DoorStatus {
        closed: required(item, "value", DOOR_STATUS)?.as_str() == Some(CLOSED),
    })
}

// =============================================================================
// Field helpers
// =============================================================================

fn required<'a>(value: &'a Value, key: &str, path: &str) -> MappingResult<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| MappingError::MissingKey(format!("{}.{}", path, key)))
}

fn invalid_type(path: &str, key: &str, expected: &'static str) -> MappingError {
    MappingError::InvalidType {
        path: format!("{}.{}", path, key),
        expected,
    }
}

fn number(value: &Value, key: &str, path: &str) -> MappingResult<f64> {
    required(value, key, path)?
        .as_f64()
        .ok_or_else(|| invalid_type(path, key, "number"))
}

fn text(value: &Value, key: &str, path: &str) -> MappingResult<String> {
    text_ref(value, key, path).map(str::to_owned)
}

fn text_ref<'a>(value: &'a Value, key: &str, path: &str) -> MappingResult<&'a str> {
    required(value, key, path)?
        .as_str()
        .ok_or_else(|| invalid_type(path, key, "string"))
}

/// Discriminator that may be omitted by the vendor; absent means `""`
fn text_or_empty<'a>(value: &'a Value, key: &str, path: &str) -> MappingResult<&'a str> {
    match value.get(key) {
        Some(v) => v.as_str().ok_or_else(|| invalid_type(path, key, "string")),
        None => Ok(""),
    }
}

/// Numeric field with a `0.0` fallback when the entry or the field is absent
fn number_or_default(value: Option<&Value>, key: &str, path: &str) -> MappingResult<f64> {
    match value.and_then(|v| v.get(key)) {
        Some(v) => v.as_f64().ok_or_else(|| invalid_type(path, key, "number")),
        None => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::telemetry_payload;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metrics_mut(payload: &mut Value) -> &mut Map<String, Value> {
        payload["metrics"].as_object_mut().unwrap()
    }

    #[test]
    fn test_sample_payload_maps_verbatim() {
        let data = parse_api_response(&telemetry_payload().unwrap()).unwrap();

        assert_eq!(
            data.acceleration,
            Acceleration {
                x: 0.01,
                y: -0.02,
                z: 9.81
            }
        );
        assert_eq!(data.accelerator_pedal_position, 12.5);
        assert_eq!(data.battery_voltage, 12.64);
        assert_eq!(data.compass_direction, "NORTH_WEST");
        assert_eq!(data.gear_lever_position, "PARK");
        assert_eq!(data.odometer, 48211.7);
        assert_eq!(data.fuel_level, 63.2);
        assert_eq!(data.fuel_range, 512.4);
        assert_eq!(
            data.heading,
            Heading {
                gps_timestamp: "2025-06-01T10:15:28.000Z".to_string(),
                detection_type: "GPS".to_string(),
                heading: 312.5,
                uncertainty: 4.0,
            }
        );
        assert_eq!(
            data.position,
            Position {
                gps_timestamp: "2025-06-01T10:15:28.000Z".to_string(),
                latitude: 51.5072,
                longitude: -0.1276,
                altitude: 35.2,
            }
        );
        assert_eq!(
            data.parking_brake_status,
            Some(ParkingBrake {
                brake_type: "ELECTRIC".to_string(),
                value: "ENGAGED".to_string(),
            })
        );
        assert_eq!(
            data.battery_load_status,
            BatteryLoad {
                battery: "BATTERY_1".to_string(),
                value: "NORMAL".to_string(),
            }
        );
        assert_eq!(data.trip_fuel_economy.trip_progress, "END");
        assert_eq!(data.trip_fuel_economy.value, 7.8);
    }

    #[test]
    fn test_doors() {
        let data = parse_api_response(&telemetry_payload().unwrap()).unwrap();

        assert!(data.doors.all_doors_locked);
        assert!(data.doors.driver_front_locked);
        assert!(data.doors.front_left.closed);
        assert!(data.doors.front_right.closed);
        assert!(!data.doors.rear_left.closed);
        assert!(data.doors.rear_right.closed);
        assert!(data.doors.tailgate.closed);
    }

    #[test]
    fn test_tires_use_axle_placard() {
        let data = parse_api_response(&telemetry_payload().unwrap()).unwrap();

        assert_eq!(data.tires.front_right.placard_pressure, 2.5);
        assert_eq!(data.tires.rear_left.placard_pressure, 2.7);
        assert_eq!(data.tires.rear_right.status, "LOW");
        assert_eq!(data.tires.rear_right.pressure, 2.65);
    }

    #[test]
    fn test_front_left_tire_scenario() {
        let mut payload = telemetry_payload().unwrap();
        let metrics = metrics_mut(&mut payload);
        metrics.insert(
            TIRE_PRESSURE_STATUS.to_string(),
            json!([{ "vehicleWheel": "FRONT_LEFT", "value": "NORMAL" }]),
        );
        metrics.insert(
            TIRE_PRESSURE.to_string(),
            json!([{ "vehicleWheel": "FRONT_LEFT", "value": 2.3, "wheelPlacardFront": 2.5 }]),
        );

        let data = parse_api_response(&payload).unwrap();
        assert_eq!(
            data.tires.front_left,
            TireStatus {
                status: "NORMAL".to_string(),
                pressure: 2.3,
                placard_pressure: 2.5,
            }
        );
        // Wheels without entries fall back to defaults
        assert_eq!(data.tires.rear_right, TireStatus::default());
    }

    #[test]
    fn test_duplicate_tire_entries_last_wins() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert(
            TIRE_PRESSURE.to_string(),
            json!([
                { "vehicleWheel": "FRONT_LEFT", "value": 1.9, "wheelPlacardFront": 2.5 },
                { "vehicleWheel": "FRONT_LEFT", "value": 2.2, "wheelPlacardFront": 2.6 }
            ]),
        );

        let data = parse_api_response(&payload).unwrap();
        assert_eq!(data.tires.front_left.pressure, 2.2);
        assert_eq!(data.tires.front_left.placard_pressure, 2.6);
    }

    #[test]
    fn test_missing_parking_brake_is_none() {
        let mut payload = telemetry_payload().unwrap();
        let full = parse_api_response(&payload).unwrap();
        metrics_mut(&mut payload).remove(PARKING_BRAKE_STATUS);

        let data = parse_api_response(&payload).unwrap();
        assert_eq!(data.parking_brake_status, None);
        assert_eq!(
            data,
            VehicleData {
                parking_brake_status: None,
                ..full
            }
        );
    }

    #[test]
    fn test_missing_all_doors_lock_fails() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert(
            DOOR_LOCK_STATUS.to_string(),
            json!([{ "vehicleDoor": "UNSPECIFIED_FRONT", "vehicleSide": "DRIVER", "value": "LOCKED" }]),
        );

        let err = parse_api_response(&payload).unwrap_err();
        assert!(err.is_lookup_failure());
        assert!(matches!(
            err,
            MappingError::MissingDiscriminator { metric: DOOR_LOCK_STATUS, ref key } if key == "+ALL_DOORS"
        ));
    }

    #[test]
    fn test_missing_driver_front_lock_fails() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert(
            DOOR_LOCK_STATUS.to_string(),
            json!([{ "vehicleDoor": "ALL_DOORS", "value": "LOCKED" }]),
        );

        let err = parse_api_response(&payload).unwrap_err();
        assert!(err.is_lookup_failure());
        assert!(matches!(
            err,
            MappingError::MissingDiscriminator { metric: DOOR_LOCK_STATUS, ref key } if key == "DRIVER+UNSPECIFIED_FRONT"
        ));
    }

    #[test]
    fn test_missing_door_status_fails() {
        let mut payload = telemetry_payload().unwrap();
        let doors = metrics_mut(&mut payload)
            .get_mut(DOOR_STATUS)
            .and_then(Value::as_array_mut)
            .unwrap();
        doors.retain(|d| d["vehicleDoor"] != "REAR_RIGHT");

        let err = parse_api_response(&payload).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingDiscriminator { metric: DOOR_STATUS, ref key }
                if key == "REAR_RIGHT+UNKNOWN+PASSENGER"
        ));
    }

    #[test]
    fn test_unlocked_doors() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert(
            DOOR_LOCK_STATUS.to_string(),
            json!([
                { "vehicleDoor": "ALL_DOORS", "value": "UNLOCKED" },
                { "vehicleDoor": "UNSPECIFIED_FRONT", "vehicleSide": "DRIVER", "value": "UNLOCKED" }
            ]),
        );

        let data = parse_api_response(&payload).unwrap();
        assert!(!data.doors.all_doors_locked);
        assert!(!data.doors.driver_front_locked);
    }

    #[test]
    fn test_missing_windows_default_to_zero() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert(
            WINDOW_STATUS.to_string(),
            json!([{
                "vehicleSide": "PASSENGER",
                "vehicleWindow": "UNSPECIFIED_FRONT",
                "value": { "lower": 4.0 }
            }]),
        );

        let data = parse_api_response(&payload).unwrap();
        assert_eq!(
            data.windows.front_right,
            WindowStatus {
                lower: 4.0,
                upper: 0.0
            }
        );
        assert_eq!(data.windows.front_left, WindowStatus::default());
    }

    #[test]
    fn test_missing_required_metric_fails() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).remove("odometer");

        let err = parse_api_response(&payload).unwrap_err();
        assert!(matches!(err, MappingError::MissingKey(ref path) if path == "metrics.odometer"));
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut payload = telemetry_payload().unwrap();
        metrics_mut(&mut payload).insert("speed".to_string(), json!({ "value": "fast" }));

        let err = parse_api_response(&payload).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidType { ref path, expected: "number" } if path == "metrics.speed.value"
        ));
    }

    #[test]
    fn test_missing_metrics_object() {
        let err = parse_api_response(&json!({ "vin": "X" })).unwrap_err();
        assert!(matches!(err, MappingError::MissingKey(ref k) if k == "metrics"));
    }

    #[test]
    fn test_parse_from_str() {
        let data = parse_api_response_str(crate::sample::TELEMETRY_JSON).unwrap();
        assert_eq!(data.hood_status, "CLOSED");
        assert!(parse_api_response_str("{not json").is_err());
    }
}
