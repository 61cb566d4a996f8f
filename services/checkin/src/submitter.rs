//! Check-in submission
//!
//! Builds a [`CheckInEvent`] from the session user, the current position and
//! the enriched place, posts it to the savedata endpoint and classifies the
//! reply. The backend owns the one-event-per-type-per-day rule, this side
//! only reports what it answered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::SubmitError;
use crate::geocode::PlaceEnricher;
use crate::models::{CheckInEvent, CheckInType, Position, User};

/// Shown when the backend refuses a duplicate without a message
pub const DEFAULT_DUPLICATE_MESSAGE: &str = "You have already checked in/out today";

/// Source of the submission timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Response body for `POST /api/savedata`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveDataBody {
    pub status: Option<String>,
    pub message: Option<String>,
}

/// HTTP status plus whatever body could be decoded
#[derive(Debug, Clone)]
pub struct SaveDataReply {
    pub http_status: u16,
    pub body: SaveDataBody,
}

/// SaveData endpoint port
#[async_trait]
pub trait SaveDataClient: Send + Sync {
    async fn save(&self, event: &CheckInEvent) -> Result<SaveDataReply, SubmitError>;
}

/// `reqwest` implementation of [`SaveDataClient`]
#[derive(Clone)]
pub struct HttpSaveDataClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSaveDataClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/api/savedata", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SaveDataClient for HttpSaveDataClient {
    async fn save(&self, event: &CheckInEvent) -> Result<SaveDataReply, SubmitError> {
        let response = self
            .client
            .post(self.url())
            .json(event)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        let http_status = status.as_u16();
        let body = match response.json::<SaveDataBody>().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(SubmitError::Failed(format!("invalid response: {}", e)));
            }
            Err(_) => SaveDataBody::default(),
        };

        Ok(SaveDataReply { http_status, body })
    }
}

/// How the backend answered a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success {
        kind: CheckInType,
        place_name: String,
    },
    /// Same type already recorded today
    DuplicateRejected {
        kind: CheckInType,
        message: String,
    },
}

/// Map a savedata reply onto an outcome
///
/// 400 and 409 are duplicates. A 2xx without `status: "success"` is a
/// duplicate when its message says so (or is missing), otherwise a failure.
pub fn classify_reply(
    reply: SaveDataReply,
    kind: CheckInType,
    place_name: &str,
) -> Result<SubmissionOutcome, SubmitError> {
    let SaveDataReply { http_status, body } = reply;
    let message = body.message.filter(|m| !m.trim().is_empty());

    match http_status {
        400 | 409 => Ok(SubmissionOutcome::DuplicateRejected {
            kind,
            message: message.unwrap_or_else(|| DEFAULT_DUPLICATE_MESSAGE.to_string()),
        }),
        200..=299 if body.status.as_deref() == Some("success") => {
            Ok(SubmissionOutcome::Success {
                kind,
                place_name: place_name.to_string(),
            })
        }
        200..=299 => match message {
            Some(message) if !message.to_lowercase().contains("already") => {
                Err(SubmitError::Failed(message))
            }
            message => Ok(SubmissionOutcome::DuplicateRejected {
                kind,
                message: message.unwrap_or_else(|| DEFAULT_DUPLICATE_MESSAGE.to_string()),
            }),
        },
        status => Err(SubmitError::Failed(
            message.unwrap_or_else(|| format!("server responded with {}", status)),
        )),
    }
}

/// Assembles and submits check-in events
#[derive(Clone)]
pub struct CheckInSubmitter {
    client: Arc<dyn SaveDataClient>,
    enricher: PlaceEnricher,
    clock: Arc<dyn Clock>,
}

impl CheckInSubmitter {
    pub fn new(client: Arc<dyn SaveDataClient>, enricher: PlaceEnricher) -> Self {
        Self {
            client,
            enricher,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn submit(
        &self,
        kind: CheckInType,
        user: &User,
        position: &Position,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let now = self.clock.now();
        let place = self.enricher.enrich(position).await?;
        let event = CheckInEvent::new(kind, user, position, place, now);

        info!(
            "Submitting check-{} for {} on {} {} at {}",
            kind, event.user_email, event.date, event.time, event.place_name
        );

        let reply = self
            .client
            .save(&event)
            .await
            .inspect_err(|e| error!("Check-in error: {}", e))?;

        let outcome = classify_reply(reply, kind, &event.place_name)?;
        match &outcome {
            SubmissionOutcome::Success { .. } => info!("Check-{} recorded", kind),
            SubmissionOutcome::DuplicateRejected { message, .. } => {
                warn!("Check-{} rejected as duplicate: {}", kind, message)
            }
        }

        Ok(outcome)
    }
}
