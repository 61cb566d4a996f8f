//! Presentation-facing projections
//!
//! [`SessionView`] is what a screen renders for a state snapshot and
//! [`Notification`] is the single message shown for an operation result.

use serde::Serialize;

use crate::error::SessionError;
use crate::models::{LoginCredentials, User};
use crate::session::{LoggedInPhase, LoginOutcome, SessionState};
use crate::submitter::SubmissionOutcome;
use crate::validation::is_valid_email;

/// Renderable projection of [`SessionState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum SessionView {
    Login {
        email: String,
        /// False while the email is malformed or a login is in flight
        login_enabled: bool,
        authenticating: bool,
    },
    Home {
        user: User,
        fetching_location: bool,
        /// `(latitude, longitude)` once a fix is available
        position: Option<(f64, f64)>,
        location_error: Option<String>,
        check_in_enabled: bool,
        submitting: bool,
    },
}

impl SessionView {
    pub fn project(state: &SessionState, credentials: &LoginCredentials) -> Self {
        match state {
            SessionState::LoggedOut => SessionView::Login {
                email: credentials.email.clone(),
                login_enabled: is_valid_email(&credentials.email),
                authenticating: false,
            },
            SessionState::Authenticating { .. } => SessionView::Login {
                email: credentials.email.clone(),
                login_enabled: false,
                authenticating: true,
            },
            SessionState::LoggedIn(logged_in) => {
                let (fetching_location, location_error) = match &logged_in.phase {
                    LoggedInPhase::LocationPending {
                        fetching,
                        last_error,
                    } => (*fetching, last_error.as_ref().map(ToString::to_string)),
                    _ => (false, None),
                };

                SessionView::Home {
                    user: logged_in.session.user.clone(),
                    fetching_location,
                    position: state.position().map(|p| (p.latitude, p.longitude)),
                    location_error,
                    check_in_enabled: matches!(
                        logged_in.phase,
                        LoggedInPhase::LocationReady { .. }
                    ),
                    submitting: matches!(logged_in.phase, LoggedInPhase::Submitting { .. }),
                }
            }
        }
    }
}

/// One user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl From<&SessionError> for Notification {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::InvalidEmail(_) => {
                Notification::new("Invalid Email", "Please enter a valid email address.")
            }
            SessionError::AuthFailed(message) => Notification::new("Login Failed", message),
            SessionError::NetworkError(_) => {
                Notification::new("Login Failed", "An error occurred. Please try again.")
            }
            SessionError::UnsupportedEnvironment => Notification::new(
                "Location Unavailable",
                "Oops, this will not work in an Android emulator. Try it on your device!",
            ),
            SessionError::PermissionDenied => Notification::new(
                "Location Unavailable",
                "Permission to access location was denied",
            ),
            SessionError::LocationFetchFailed(_) => {
                Notification::new("Error", "Failed to fetch location")
            }
            SessionError::LocationUnavailable => {
                Notification::new("Error", "Location not available")
            }
            SessionError::AcquisitionInProgress | SessionError::SubmissionInProgress => {
                Notification::new("Please Wait", err.to_string())
            }
            SessionError::SubmissionFailed(reason) => Notification::new("Error", reason),
            SessionError::InvalidState { .. } | SessionError::SessionEnded => {
                Notification::new("Error", err.to_string())
            }
        }
    }
}

impl From<&SubmissionOutcome> for Notification {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success { kind, place_name } => Notification::new(
                "Success",
                format!("Checked {} successfully at {}", kind, place_name),
            ),
            SubmissionOutcome::DuplicateRejected { message, .. } => {
                Notification::new("Check-In/Out Error", message)
            }
        }
    }
}

impl From<&LoginOutcome> for Notification {
    fn from(outcome: &LoginOutcome) -> Self {
        match &outcome.location {
            Ok(_) => Notification::new("Welcome", format!("Welcome, {}", outcome.user.name)),
            Err(e) => e.into(),
        }
    }
}
