//! Attendance check-in client core
//!
//! Sequences login, location acquisition, reverse geocoding and idempotent
//! submission of daily check-in/check-out events. A presentation layer talks
//! only to [`SessionController`], rendering [`SessionView`] snapshots and
//! showing one [`Notification`] per operation.

pub mod auth;
pub mod error;
pub mod geocode;
pub mod location;
pub mod models;
pub mod session;
pub mod submitter;
pub mod validation;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use common::Settings;
use tracing::info;

pub use crate::error::{SessionError, SessionResult};
pub use crate::session::{LoginOutcome, SessionController, SessionState};
pub use crate::submitter::SubmissionOutcome;
pub use crate::view::{Notification, SessionView};

use crate::auth::{AuthService, HttpLoginClient};
use crate::geocode::{GoogleGeocoder, PlaceEnricher};
use crate::location::{LocationAcquirer, LocationProvider};
use crate::submitter::{CheckInSubmitter, HttpSaveDataClient};

/// Wire the HTTP collaborators from settings around a location provider
pub fn build_controller(
    settings: &Settings,
    provider: Arc<dyn LocationProvider>,
) -> anyhow::Result<SessionController> {
    let timeout = Duration::from_secs(settings.api.timeout_secs);
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let auth = AuthService::new(Arc::new(HttpLoginClient::new(
        client.clone(),
        settings.api.base_url.clone(),
    )));
    let enricher = PlaceEnricher::new(
        Arc::new(GoogleGeocoder::new(
            client.clone(),
            settings.geocode.endpoint.clone(),
            settings.geocode.api_key.clone(),
        )),
        settings.geocode.failure_policy,
    );
    let submitter = CheckInSubmitter::new(
        Arc::new(HttpSaveDataClient::new(client, settings.api.base_url.clone())),
        enricher,
    );
    let acquirer = LocationAcquirer::new(provider).with_timeout(timeout);

    info!(
        "Check-in client configured for {} (geocode failures: {:?})",
        settings.api.base_url, settings.geocode.failure_policy
    );

    Ok(SessionController::new(auth, acquirer, submitter))
}
