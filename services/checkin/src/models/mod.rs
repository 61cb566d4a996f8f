//! Check-in client models

pub mod checkin;
pub mod place;
pub mod position;
pub mod user;

// Re-export for convenience
pub use checkin::{CheckInEvent, CheckInType};
pub use place::{PlaceInfo, UNKNOWN_CODE, UNKNOWN_PLACE};
pub use position::Position;
pub use user::{LoginCredentials, User};
