//! End-to-end tests of the HTTP collaborators
//!
//! An axum router on an ephemeral port stands in for the attendance backend
//! and the reverse-geocode service.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use checkin::location::ConfiguredLocationProvider;
use checkin::models::CheckInEvent;
use checkin::{SessionController, SessionError, SubmissionOutcome, build_controller};
use common::Settings;
use common::config::DeviceSettings;

#[derive(Clone, Default)]
struct Backend {
    recorded: Arc<Mutex<HashSet<(String, String, String)>>>,
    events: Arc<Mutex<Vec<CheckInEvent>>>,
    fail_savedata: bool,
    html_savedata: bool,
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "a@b.com" && body["password"] == "pw" {
        Json(json!({
            "status": "success",
            "user": {"name": "Jo", "email": "a@b.com", "photo": "https://example.com/jo.png"}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn geocode(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return Json(json!({"results": [], "status": "REQUEST_DENIED"}));
    }

    let address = match params.get("latlng").map(String::as_str) {
        Some("-15.78,35") => "Blantyre CBD",
        _ => "Somewhere",
    };
    Json(json!({
        "status": "OK",
        "results": [
            {"formatted_address": address, "plus_code": {"compound_code": "6XQ2+2F Blantyre"}}
        ]
    }))
}

async fn savedata(State(backend): State<Backend>, Json(event): Json<CheckInEvent>) -> Response {
    if backend.fail_savedata {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if backend.html_savedata {
        return (StatusCode::OK, "<html>502 Bad Gateway from proxy</html>").into_response();
    }

    backend.events.lock().unwrap().push(event.clone());
    let key = (
        event.kind.to_string(),
        event.user_email.clone(),
        event.date.clone(),
    );
    if backend.recorded.lock().unwrap().insert(key) {
        Json(json!({"status": "success"})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": format!("already checked {} today", event.kind)})),
        )
            .into_response()
    }
}

async fn spawn_backend(backend: Backend) -> SocketAddr {
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/savedata", post(savedata))
        .route("/geocode", get(geocode))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn settings_for(addr: SocketAddr, api_key: &str) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = format!("http://{}", addr);
    settings.api.timeout_secs = 5;
    settings.geocode.endpoint = format!("http://{}/geocode", addr);
    settings.geocode.api_key = api_key.to_string();
    settings.device = DeviceSettings {
        latitude: Some(-15.78),
        longitude: Some(35.0),
        accuracy: Some(10.0),
        ..DeviceSettings::default()
    };
    settings
}

fn controller_for(settings: &Settings) -> SessionController {
    let provider = Arc::new(ConfiguredLocationProvider::new(settings.device.clone()));
    build_controller(settings, provider).unwrap()
}

#[tokio::test]
async fn test_full_check_in_flow_over_http() {
    let backend = Backend::default();
    let addr = spawn_backend(backend.clone()).await;
    let controller = controller_for(&settings_for(addr, "test-key"));

    let outcome = assert_ok!(controller.login("a@b.com", "pw").await);
    assert_eq!(outcome.user.name, "Jo");
    assert_eq!(
        outcome.user.photo.as_deref(),
        Some("https://example.com/jo.png")
    );
    assert_ok!(outcome.location);

    assert_eq!(
        controller.check_in().await,
        Ok(SubmissionOutcome::Success {
            kind: checkin::models::CheckInType::In,
            place_name: "Blantyre CBD".to_string(),
        })
    );
    assert_eq!(
        controller.check_in().await,
        Ok(SubmissionOutcome::DuplicateRejected {
            kind: checkin::models::CheckInType::In,
            message: "already checked in today".to_string(),
        })
    );

    let events = backend.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].compound_code, "6XQ2+2F Blantyre");
    assert_eq!(events[0].user_email, "a@b.com");
    assert_eq!(events[0].date.len(), "YYYY-MM-DD".len());
    assert_eq!(events[0].time.len(), "HH:mm:ss".len());
}

#[tokio::test]
async fn test_wrong_password_surfaces_server_message() {
    let addr = spawn_backend(Backend::default()).await;
    let controller = controller_for(&settings_for(addr, "test-key"));

    assert_eq!(
        controller.login("a@b.com", "nope").await,
        Err(SessionError::AuthFailed("Invalid credentials".to_string()))
    );
}

#[tokio::test]
async fn test_denied_geocode_key_submits_unknown_place() {
    let backend = Backend::default();
    let addr = spawn_backend(backend.clone()).await;
    let controller = controller_for(&settings_for(addr, "wrong-key"));
    assert_ok!(controller.login("a@b.com", "pw").await);

    assert_eq!(
        controller.check_out().await,
        Ok(SubmissionOutcome::Success {
            kind: checkin::models::CheckInType::Out,
            place_name: "Unknown Place".to_string(),
        })
    );
    assert_eq!(backend.events.lock().unwrap()[0].compound_code, "Unknown Code");
}

#[tokio::test]
async fn test_server_error_is_submission_failure() {
    let addr = spawn_backend(Backend {
        fail_savedata: true,
        ..Backend::default()
    })
    .await;
    let controller = controller_for(&settings_for(addr, "test-key"));
    assert_ok!(controller.login("a@b.com", "pw").await);

    assert_eq!(
        controller.check_in().await,
        Err(SessionError::SubmissionFailed(
            "server responded with 500".to_string()
        ))
    );
    assert!(controller.state().position().is_some());
}

#[tokio::test]
async fn test_ok_status_with_html_body_is_submission_failure() {
    let addr = spawn_backend(Backend {
        html_savedata: true,
        ..Backend::default()
    })
    .await;
    let controller = controller_for(&settings_for(addr, "test-key"));
    assert_ok!(controller.login("a@b.com", "pw").await);

    match controller.check_in().await {
        Err(SessionError::SubmissionFailed(message)) => {
            assert!(message.starts_with("invalid response"), "{}", message)
        }
        other => panic!("expected a submission failure, got {:?}", other),
    }
    assert!(controller.state().position().is_some());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let controller = controller_for(&settings_for(addr, "test-key"));

    assert!(matches!(
        controller.login("a@b.com", "pw").await,
        Err(SessionError::NetworkError(_))
    ));
    assert_eq!(controller.state(), checkin::SessionState::LoggedOut);
}
