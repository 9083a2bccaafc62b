//! Vendor response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of the garage endpoint
///
/// Only the VIN is relied upon; everything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garage {
    pub vin: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Garage {
    pub fn new(vin: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_garage_keeps_extra_fields() {
        let garage: Garage = serde_json::from_value(json!({
            "vin": "WF0XXXGCDX1234567",
            "vehicleType": "Kuga",
            "modelYear": "2022"
        }))
        .unwrap();

        assert_eq!(garage.vin, "WF0XXXGCDX1234567");
        assert_eq!(garage.extra.get("vehicleType"), Some(&json!("Kuga")));
    }

    #[test]
    fn test_garage_requires_vin() {
        let result = serde_json::from_value::<Garage>(json!({ "vehicleType": "Kuga" }));
        assert!(result.is_err());
    }
}
