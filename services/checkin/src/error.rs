//! Error types for the check-in client
//!
//! Each collaborator has its own error type; [`SessionError`] is the single
//! type the session controller hands to the presentation layer.

use thiserror::Error;

/// Login collaborator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoginError {
    /// The backend answered and refused the credentials
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable answer
    #[error("Login request failed: {0}")]
    Transport(String),
}

/// Location collaborator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location is not available on this device")]
    UnsupportedEnvironment,

    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("Failed to fetch location: {0}")]
    FetchFailed(String),
}

/// Geocode collaborator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("Geocode request failed: {0}")]
    Transport(String),
}

/// Check-in submission errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Save request failed: {0}")]
    Transport(String),

    /// The backend answered with something other than success or duplicate
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Errors surfaced by the session controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("{0}")]
    InvalidEmail(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Location is not available on this device")]
    UnsupportedEnvironment,

    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("Failed to fetch location: {0}")]
    LocationFetchFailed(String),

    #[error("Location not available")]
    LocationUnavailable,

    #[error("A location request is already running")]
    AcquisitionInProgress,

    #[error("A check-in is already being submitted")]
    SubmissionInProgress,

    #[error("{0}")]
    SubmissionFailed(String),

    /// Operation not allowed from the current state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The session was logged out before the operation completed
    #[error("Session ended before the request completed")]
    SessionEnded,
}

impl From<LoginError> for SessionError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Rejected(message) => SessionError::AuthFailed(message),
            LoginError::Transport(reason) => SessionError::NetworkError(reason),
        }
    }
}

impl From<LocationError> for SessionError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::UnsupportedEnvironment => SessionError::UnsupportedEnvironment,
            LocationError::PermissionDenied => SessionError::PermissionDenied,
            LocationError::FetchFailed(reason) => SessionError::LocationFetchFailed(reason),
        }
    }
}

impl From<SubmitError> for SessionError {
    fn from(err: SubmitError) -> Self {
        SessionError::SubmissionFailed(err.to_string())
    }
}

/// Type alias for Result with SessionError
pub type SessionResult<T> = Result<T, SessionError>;
