//! Session controller
//!
//! One owned [`SessionState`] moves through
//! `LoggedOut → Authenticating → LoggedIn(LocationPending → LocationReady ⇄ Submitting)`
//! and back to `LoggedOut` on logout. The lock guarding the state is never
//! held across an await; every suspending step re-checks on completion that
//! the state it started from is still current and otherwise drops its result.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthService, AuthSession};
use crate::error::{LocationError, SessionError, SessionResult};
use crate::location::LocationAcquirer;
use crate::models::{CheckInType, LoginCredentials, Position, User};
use crate::submitter::{CheckInSubmitter, SubmissionOutcome};
use crate::validation::validate_email;
use crate::view::SessionView;

/// Controller state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    /// A login request is in flight
    Authenticating { attempt: Uuid },
    LoggedIn(LoggedIn),
}

/// Logged-in session and where it stands on location and submission
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedIn {
    pub session: AuthSession,
    pub phase: LoggedInPhase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoggedInPhase {
    /// No usable position yet
    LocationPending {
        fetching: bool,
        last_error: Option<LocationError>,
    },
    LocationReady {
        position: Position,
    },
    Submitting {
        position: Position,
        kind: CheckInType,
    },
}

impl SessionState {
    /// Short name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::LoggedOut => "logged out",
            SessionState::Authenticating { .. } => "authenticating",
            SessionState::LoggedIn(logged_in) => match logged_in.phase {
                LoggedInPhase::LocationPending { .. } => "waiting for location",
                LoggedInPhase::LocationReady { .. } => "location ready",
                LoggedInPhase::Submitting { .. } => "submitting",
            },
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::LoggedIn(logged_in) => Some(&logged_in.session.user),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            SessionState::LoggedIn(LoggedIn {
                phase:
                    LoggedInPhase::LocationReady { position }
                    | LoggedInPhase::Submitting { position, .. },
                ..
            }) => Some(position),
            _ => None,
        }
    }

    fn session_id(&self) -> Option<Uuid> {
        match self {
            SessionState::LoggedIn(logged_in) => Some(logged_in.session.id),
            _ => None,
        }
    }
}

/// Result of a successful login
///
/// `location` is the outcome of the acquisition that entering
/// `LocationPending` triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    pub location: SessionResult<Position>,
}

struct Inner {
    state: SessionState,
    credentials: LoginCredentials,
}

/// The only component the presentation layer talks to
pub struct SessionController {
    auth: AuthService,
    acquirer: LocationAcquirer,
    submitter: CheckInSubmitter,
    inner: Mutex<Inner>,
}

impl SessionController {
    pub fn new(auth: AuthService, acquirer: LocationAcquirer, submitter: CheckInSubmitter) -> Self {
        Self {
            auth,
            acquirer,
            submitter,
            inner: Mutex::new(Inner {
                state: SessionState::LoggedOut,
                credentials: LoginCredentials::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Snapshot of the login form
    pub fn credentials(&self) -> LoginCredentials {
        self.lock().credentials.clone()
    }

    /// Renderable projection of the current state
    pub fn view(&self) -> SessionView {
        let inner = self.lock();
        SessionView::project(&inner.state, &inner.credentials)
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.lock().credentials.email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.lock().credentials.password = password.into();
    }

    /// Log in with the given credentials, then acquire the first position
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> SessionResult<LoginOutcome> {
        {
            let mut inner = self.lock();
            if inner.state == SessionState::LoggedOut {
                inner.credentials = LoginCredentials::new(email, password);
            }
        }
        self.submit_login().await
    }

    /// Log in with the credentials already entered in the form
    pub async fn submit_login(&self) -> SessionResult<LoginOutcome> {
        let (attempt, credentials) = {
            let mut inner = self.lock();
            if !matches!(inner.state, SessionState::LoggedOut) {
                return Err(SessionError::InvalidState {
                    operation: "log in",
                    state: inner.state.name(),
                });
            }
            validate_email(&inner.credentials.email).map_err(SessionError::InvalidEmail)?;

            let attempt = Uuid::new_v4();
            inner.state = SessionState::Authenticating { attempt };
            (attempt, inner.credentials.clone())
        };

        let result = self.auth.authenticate(&credentials).await;

        let session = {
            let mut inner = self.lock();
            if inner.state != (SessionState::Authenticating { attempt }) {
                info!("Discarding login response for abandoned attempt {}", attempt);
                return Err(SessionError::SessionEnded);
            }

            match result {
                Ok(session) => {
                    inner.state = SessionState::LoggedIn(LoggedIn {
                        session: session.clone(),
                        phase: LoggedInPhase::LocationPending {
                            fetching: true,
                            last_error: None,
                        },
                    });
                    session
                }
                Err(e) => {
                    inner.state = SessionState::LoggedOut;
                    return Err(e.into());
                }
            }
        };

        // Entering LocationPending starts acquisition
        let location = match self.run_acquisition(session.id).await {
            Err(SessionError::SessionEnded) => return Err(SessionError::SessionEnded),
            location => location,
        };

        Ok(LoginOutcome {
            user: session.user,
            location,
        })
    }

    /// Re-run location acquisition, e.g. after permission was granted
    ///
    /// From `LocationReady` this refreshes the position; check-ins are
    /// unavailable until it completes.
    pub async fn acquire_location(&self) -> SessionResult<Position> {
        let session_id = {
            let mut inner = self.lock();
            let state_name = inner.state.name();
            let SessionState::LoggedIn(logged_in) = &mut inner.state else {
                return Err(SessionError::InvalidState {
                    operation: "acquire location",
                    state: state_name,
                });
            };

            match logged_in.phase {
                LoggedInPhase::LocationPending { fetching: true, .. } => {
                    return Err(SessionError::AcquisitionInProgress);
                }
                LoggedInPhase::Submitting { .. } => {
                    return Err(SessionError::SubmissionInProgress);
                }
                LoggedInPhase::LocationPending { .. } | LoggedInPhase::LocationReady { .. } => {
                    logged_in.phase = LoggedInPhase::LocationPending {
                        fetching: true,
                        last_error: None,
                    };
                }
            }
            logged_in.session.id
        };

        self.run_acquisition(session_id).await
    }

    async fn run_acquisition(&self, session_id: Uuid) -> SessionResult<Position> {
        let result = self.acquirer.acquire().await;

        let mut inner = self.lock();
        let SessionState::LoggedIn(logged_in) = &mut inner.state else {
            info!("Discarding location for ended session {}", session_id);
            return Err(SessionError::SessionEnded);
        };
        if logged_in.session.id != session_id
            || !matches!(
                logged_in.phase,
                LoggedInPhase::LocationPending { fetching: true, .. }
            )
        {
            info!("Discarding location for ended session {}", session_id);
            return Err(SessionError::SessionEnded);
        }

        match result {
            Ok(position) => {
                logged_in.phase = LoggedInPhase::LocationReady {
                    position: position.clone(),
                };
                Ok(position)
            }
            Err(e) => {
                warn!("Location unavailable for session {}: {}", session_id, e);
                logged_in.phase = LoggedInPhase::LocationPending {
                    fetching: false,
                    last_error: Some(e.clone()),
                };
                Err(e.into())
            }
        }
    }

    pub async fn check_in(&self) -> SessionResult<SubmissionOutcome> {
        self.submit(CheckInType::In).await
    }

    pub async fn check_out(&self) -> SessionResult<SubmissionOutcome> {
        self.submit(CheckInType::Out).await
    }

    /// Submit one event; only one submission may be in flight
    pub async fn submit(&self, kind: CheckInType) -> SessionResult<SubmissionOutcome> {
        let (session, position) = {
            let mut inner = self.lock();
            let SessionState::LoggedIn(logged_in) = &mut inner.state else {
                return Err(SessionError::LocationUnavailable);
            };

            let position = match &logged_in.phase {
                LoggedInPhase::LocationReady { position } => position.clone(),
                LoggedInPhase::Submitting { .. } => {
                    warn!("Rejected check-{} while a submission is in flight", kind);
                    return Err(SessionError::SubmissionInProgress);
                }
                LoggedInPhase::LocationPending { .. } => {
                    return Err(SessionError::LocationUnavailable);
                }
            };

            logged_in.phase = LoggedInPhase::Submitting {
                position: position.clone(),
                kind,
            };
            (logged_in.session.clone(), position)
        };

        let result = self
            .submitter
            .submit(kind, &session.user, &position)
            .await;

        {
            let mut inner = self.lock();
            let current = inner.state.session_id();
            match &mut inner.state {
                SessionState::LoggedIn(logged_in)
                    if current == Some(session.id)
                        && matches!(logged_in.phase, LoggedInPhase::Submitting { .. }) =>
                {
                    logged_in.phase = LoggedInPhase::LocationReady { position };
                }
                _ => {
                    info!(
                        "Discarding check-{} response for ended session {}",
                        kind, session.id
                    );
                    return Err(SessionError::SessionEnded);
                }
            }
        }

        result.map_err(SessionError::from)
    }

    /// Clear user, position and form fields; always succeeds
    pub fn logout(&self) {
        let mut inner = self.lock();
        if let Some(user) = inner.state.user() {
            info!("Logging out {}", user.email);
        }
        inner.state = SessionState::LoggedOut;
        inner.credentials = LoginCredentials::default();
    }
}
