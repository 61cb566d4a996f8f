//! In-memory collaborators for driving the session controller

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use checkin::auth::{AuthService, LoginClient};
use checkin::error::{GeocodeError, LocationError, LoginError, SubmitError};
use checkin::geocode::{GeocodeResponse, GeocodeResult, Geocoder, PlaceEnricher, PlusCode};
use checkin::location::{LocationAcquirer, LocationProvider, PermissionStatus};
use checkin::models::{CheckInEvent, CheckInType, LoginCredentials, Position, User};
use checkin::submitter::{CheckInSubmitter, Clock, SaveDataBody, SaveDataClient, SaveDataReply};
use checkin::{SessionController, SessionState};
use common::config::{DevicePlatform, GeocodeFailurePolicy};

pub fn jo() -> User {
    User {
        name: "Jo".to_string(),
        email: "a@b.com".to_string(),
        photo: None,
    }
}

/// Optional gate a fake waits on before answering
#[derive(Default, Clone)]
pub struct Gate(Option<Arc<Notify>>);

impl Gate {
    pub fn closed() -> (Self, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        (Self(Some(notify.clone())), notify)
    }

    async fn pass(&self) {
        if let Some(notify) = &self.0 {
            notify.notified().await;
        }
    }
}

pub struct FakeLogin {
    pub result: Mutex<Result<User, LoginError>>,
    pub calls: AtomicUsize,
    pub gate: Gate,
}

impl FakeLogin {
    pub fn ok(user: User) -> Self {
        Self::with_result(Ok(user))
    }

    pub fn with_result(result: Result<User, LoginError>) -> Self {
        Self {
            result: Mutex::new(result),
            calls: AtomicUsize::new(0),
            gate: Gate::default(),
        }
    }
}

#[async_trait]
impl LoginClient for FakeLogin {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<User, LoginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.result.lock().unwrap().clone()
    }
}

pub struct FakeLocation {
    pub platform: DevicePlatform,
    pub physical: bool,
    pub permission: AtomicBool,
    pub position: Position,
    pub gate: Gate,
}

impl FakeLocation {
    pub fn blantyre() -> Self {
        Self {
            platform: DevicePlatform::Android,
            physical: true,
            permission: AtomicBool::new(true),
            position: Position::new(-15.78, 35.0),
            gate: Gate::default(),
        }
    }
}

#[async_trait]
impl LocationProvider for FakeLocation {
    fn platform(&self) -> DevicePlatform {
        self.platform
    }

    fn is_physical_device(&self) -> bool {
        self.physical
    }

    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(if self.permission.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn current_position(&self) -> Result<Position, LocationError> {
        self.gate.pass().await;
        Ok(self.position.clone())
    }
}

pub struct FakeGeocoder(pub Result<GeocodeResponse, GeocodeError>);

impl FakeGeocoder {
    pub fn place(address: &str, code: &str) -> Self {
        Self(Ok(GeocodeResponse {
            results: vec![GeocodeResult {
                formatted_address: Some(address.to_string()),
                plus_code: Some(PlusCode {
                    compound_code: Some(code.to_string()),
                    global_code: None,
                }),
            }],
            status: Some("OK".to_string()),
        }))
    }

    pub fn empty() -> Self {
        Self(Ok(GeocodeResponse::default()))
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse_geocode(&self, _position: &Position) -> Result<GeocodeResponse, GeocodeError> {
        self.0.clone()
    }
}

/// Mimics the backend's one-event-per-type-per-day rule
#[derive(Default)]
pub struct FakeSaveData {
    pub recorded: Mutex<HashSet<(CheckInType, String, String)>>,
    pub events: Mutex<Vec<CheckInEvent>>,
    pub calls: AtomicUsize,
    pub gate: Gate,
}

#[async_trait]
impl SaveDataClient for FakeSaveData {
    async fn save(&self, event: &CheckInEvent) -> Result<SaveDataReply, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.events.lock().unwrap().push(event.clone());

        let key = (event.kind, event.user_email.clone(), event.date.clone());
        let fresh = self.recorded.lock().unwrap().insert(key);
        Ok(if fresh {
            SaveDataReply {
                http_status: 200,
                body: SaveDataBody {
                    status: Some("success".to_string()),
                    message: None,
                },
            }
        } else {
            SaveDataReply {
                http_status: 400,
                body: SaveDataBody {
                    status: Some("error".to_string()),
                    message: Some(format!("already checked {} today", event.kind)),
                },
            }
        })
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2024-05-01 08:00 in Blantyre
pub fn may_first() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()))
}

pub struct Harness {
    pub controller: Arc<SessionController>,
    pub login: Arc<FakeLogin>,
    pub location: Arc<FakeLocation>,
    pub save: Arc<FakeSaveData>,
}

pub struct HarnessBuilder {
    pub login: FakeLogin,
    pub location: FakeLocation,
    pub geocoder: FakeGeocoder,
    pub save: FakeSaveData,
    pub policy: GeocodeFailurePolicy,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            login: FakeLogin::ok(jo()),
            location: FakeLocation::blantyre(),
            geocoder: FakeGeocoder::place("Blantyre CBD", "6XQ2+2F Blantyre"),
            save: FakeSaveData::default(),
            policy: GeocodeFailurePolicy::Degrade,
        }
    }

    pub fn build(self) -> Harness {
        let login = Arc::new(self.login);
        let location = Arc::new(self.location);
        let save = Arc::new(self.save);

        let submitter = CheckInSubmitter::new(
            save.clone(),
            PlaceEnricher::new(Arc::new(self.geocoder), self.policy),
        )
        .with_clock(may_first());
        let controller = SessionController::new(
            AuthService::new(login.clone()),
            LocationAcquirer::new(location.clone()),
            submitter,
        );

        Harness {
            controller: Arc::new(controller),
            login,
            location,
            save,
        }
    }
}

/// Yield until `predicate` holds for the controller state
pub async fn wait_for(controller: &SessionController, predicate: impl Fn(&SessionState) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !predicate(&controller.state()) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("state never reached");
}
