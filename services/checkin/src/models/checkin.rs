//! Check-in event model

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{PlaceInfo, Position, User};

/// Africa/Blantyre (CAT) is UTC+02:00 all year round
pub const BLANTYRE_UTC_OFFSET_SECS: i32 = 2 * 3600;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Zone every event date and time is expressed in
pub fn blantyre_offset() -> FixedOffset {
    FixedOffset::east_opt(BLANTYRE_UTC_OFFSET_SECS).expect("UTC+2 is a valid offset")
}

/// Direction of an attendance event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInType {
    In,
    Out,
}

impl CheckInType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInType::In => "in",
            CheckInType::Out => "out",
        }
    }
}

impl fmt::Display for CheckInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(CheckInType::In),
            "out" => Ok(CheckInType::Out),
            other => Err(format!("Unknown check-in type: {other}")),
        }
    }
}

/// Payload posted to the savedata endpoint
///
/// Only constructible from an existing [`User`] and [`Position`]; it is built
/// fresh for each submission and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInEvent {
    #[serde(rename = "type")]
    pub kind: CheckInType,
    pub date: String,
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub compound_code: String,
    pub user_name: String,
    pub user_email: String,
}

impl CheckInEvent {
    /// Assemble an event, stamping `now` in Blantyre local time
    pub fn new(
        kind: CheckInType,
        user: &User,
        position: &Position,
        place: PlaceInfo,
        now: DateTime<Utc>,
    ) -> Self {
        let local = now.with_timezone(&blantyre_offset());

        Self {
            kind,
            date: local.format(DATE_FORMAT).to_string(),
            time: local.format(TIME_FORMAT).to_string(),
            latitude: position.latitude,
            longitude: position.longitude,
            place_name: place.place_name,
            compound_code: place.compound_code,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
        }
    }
}
