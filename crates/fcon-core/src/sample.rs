//! Reference telemetry payload
//!
//! A complete vendor response with every metric populated. Used by tests
//! across the workspace and by the mock vendor server.

use serde_json::Value;

use crate::error::MappingResult;

/// Raw JSON of the reference payload
pub const TELEMETRY_JSON: &str = include_str!("../fixtures/telemetry.json");

/// VIN carried by the reference payload
pub const SAMPLE_VIN: &str = "WF0XXXGCDX1234567";

/// Decode the reference payload
pub fn telemetry_payload() -> MappingResult<Value> {
    Ok(serde_json::from_str(TELEMETRY_JSON)?)
}
