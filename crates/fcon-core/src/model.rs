//! Normalized vehicle-state record
//!
//! `VehicleData` is the stable internal schema produced by
//! [`crate::parse_api_response`]. Values are carried exactly as the vendor
//! reports them; units and display precision belong to the entities.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Positions
// =============================================================================

/// Wheel positions reported by `tirePressure` / `tirePressureStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Wheel {
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    /// Vendor `vehicleWheel` discriminator
    pub fn vendor_key(self) -> &'static str {
        match self {
            Wheel::FrontLeft => "FRONT_LEFT",
            Wheel::FrontRight => "FRONT_RIGHT",
            Wheel::RearLeft => "REAR_LEFT",
            Wheel::RearRight => "REAR_RIGHT",
        }
    }

    /// Field holding the recommended pressure for this axle
    pub fn placard_field(self) -> &'static str {
        match self {
            Wheel::FrontLeft | Wheel::FrontRight => "wheelPlacardFront",
            Wheel::RearLeft | Wheel::RearRight => "wheelPlacardRear",
        }
    }

    /// Snake-case name used in entity keys
    pub fn as_str(self) -> &'static str {
        match self {
            Wheel::FrontLeft => "front_left",
            Wheel::FrontRight => "front_right",
            Wheel::RearLeft => "rear_left",
            Wheel::RearRight => "rear_right",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Wheel::FrontLeft => "Front Left",
            Wheel::FrontRight => "Front Right",
            Wheel::RearLeft => "Rear Left",
            Wheel::RearRight => "Rear Right",
        }
    }
}

impl fmt::Display for Wheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-door positions with open/closed reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
    Tailgate,
}

impl DoorPosition {
    /// The four passenger-compartment doors
    pub const SIDE_DOORS: [DoorPosition; 4] = [
        DoorPosition::FrontLeft,
        DoorPosition::FrontRight,
        DoorPosition::RearLeft,
        DoorPosition::RearRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DoorPosition::FrontLeft => "front_left",
            DoorPosition::FrontRight => "front_right",
            DoorPosition::RearLeft => "rear_left",
            DoorPosition::RearRight => "rear_right",
            DoorPosition::Tailgate => "tailgate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DoorPosition::FrontLeft => "Front Left",
            DoorPosition::FrontRight => "Front Right",
            DoorPosition::RearLeft => "Rear Left",
            DoorPosition::RearRight => "Rear Right",
            DoorPosition::Tailgate => "Tailgate",
        }
    }
}

// =============================================================================
// Record components
// =============================================================================

/// Acceleration vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Compass heading with GPS metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Heading {
    pub gps_timestamp: String,
    pub detection_type: String,
    pub heading: f64,
    pub uncertainty: f64,
}

/// GPS position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub gps_timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorStatus {
    pub closed: bool,
}

/// Lock and open state of every door
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Doors {
    pub all_doors_locked: bool,
    pub driver_front_locked: bool,
    pub front_left: DoorStatus,
    pub front_right: DoorStatus,
    pub rear_left: DoorStatus,
    pub rear_right: DoorStatus,
    pub tailgate: DoorStatus,
}

impl Doors {
    pub fn get(&self, position: DoorPosition) -> &DoorStatus {
        match position {
            DoorPosition::FrontLeft => &self.front_left,
            DoorPosition::FrontRight => &self.front_right,
            DoorPosition::RearLeft => &self.rear_left,
            DoorPosition::RearRight => &self.rear_right,
            DoorPosition::Tailgate => &self.tailgate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TireStatus {
    /// Vendor status string, empty when not reported
    pub status: String,
    pub pressure: f64,
    pub placard_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tires {
    pub front_left: TireStatus,
    pub front_right: TireStatus,
    pub rear_left: TireStatus,
    pub rear_right: TireStatus,
}

impl Tires {
    pub fn get(&self, wheel: Wheel) -> &TireStatus {
        match wheel {
            Wheel::FrontLeft => &self.front_left,
            Wheel::FrontRight => &self.front_right,
            Wheel::RearLeft => &self.rear_left,
            Wheel::RearRight => &self.rear_right,
        }
    }
}

/// Window opening range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStatus {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Windows {
    pub front_left: WindowStatus,
    pub front_right: WindowStatus,
    pub rear_left: WindowStatus,
    pub rear_right: WindowStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParkingBrake {
    pub brake_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatteryLoad {
    pub battery: String,
    pub value: String,
}

/// Trip aggregate tagged with its trip progress marker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripValue {
    pub trip_progress: String,
    pub value: f64,
}

// =============================================================================
// VehicleData
// =============================================================================

/// Normalized snapshot of one vehicle's telemetry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleData {
    pub acceleration: Acceleration,
    pub accelerator_pedal_position: f64,
    pub ambient_temp: f64,
    pub battery_charge_level: f64,
    pub battery_voltage: f64,
    pub brake_pedal_status: String,
    pub brake_torque: f64,
    pub compass_direction: String,
    pub doors: Doors,
    pub engine_coolant_temp: f64,
    pub engine_speed: f64,
    pub fuel_level: f64,
    pub fuel_range: f64,
    pub gear_lever_position: String,
    pub heading: Heading,
    pub hood_status: String,
    pub hybrid_vehicle_mode_status: String,
    pub ignition_status: String,
    pub outside_temperature: f64,
    pub yaw_rate: f64,
    pub windows: Windows,
    pub wheel_torque_status: String,
    pub tires: Tires,
    pub position: Position,
    pub parking_brake_status: Option<ParkingBrake>,
    pub oil_life_remaining: f64,
    pub odometer: f64,
    pub speed: f64,
    pub vehicle_life_cycle_mode: String,
    pub battery_load_status: BatteryLoad,
    pub torque_at_transmission: f64,
    pub trip_fuel_economy: TripValue,
    pub trip_xev_battery_distance_accumulated: TripValue,
}
