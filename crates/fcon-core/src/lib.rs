//! fcon-core - Vehicle-state model and vendor telemetry mapper
//!
//! Turns the FordConnect `telemetry` response into a [`VehicleData`]
//! record with a fixed schema.
//!
//! ```rust
//! use fcon_core::{parse_api_response, sample};
//!
//! let payload = sample::telemetry_payload().unwrap();
//! let data = parse_api_response(&payload).unwrap();
//! assert_eq!(data.tires.front_left.status, "NORMAL");
//! ```

pub mod error;
pub mod mapper;
pub mod model;
pub mod sample;

pub use error::{MappingError, MappingResult};
pub use mapper::{parse_api_response, parse_api_response_str};
pub use model::*;
