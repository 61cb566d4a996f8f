//! Reverse-geocoded place information

use serde::{Deserialize, Serialize};

pub const UNKNOWN_PLACE: &str = "Unknown Place";
pub const UNKNOWN_CODE: &str = "Unknown Code";

/// Human readable place attached to a check-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInfo {
    pub place_name: String,
    pub compound_code: String,
}

impl PlaceInfo {
    /// Build from optional lookup fields, substituting the unknown defaults
    pub fn from_lookup(place_name: Option<String>, compound_code: Option<String>) -> Self {
        Self {
            place_name: place_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            compound_code: compound_code
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_CODE.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.place_name == UNKNOWN_PLACE && self.compound_code == UNKNOWN_CODE
    }
}

impl Default for PlaceInfo {
    fn default() -> Self {
        Self::from_lookup(None, None)
    }
}
