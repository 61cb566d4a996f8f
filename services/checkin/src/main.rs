use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

use checkin::location::ConfiguredLocationProvider;
use checkin::models::CheckInType;
use checkin::{Notification, build_controller};
use common::{Settings, telemetry};

fn print_notification(notification: &Notification) {
    println!("{}: {}", notification.title, notification.message);
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let kind: CheckInType = std::env::args()
        .nth(1)
        .context("usage: checkin <in|out>")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let email = std::env::var("CHECKIN_EMAIL").context("CHECKIN_EMAIL is not set")?;
    let password = std::env::var("CHECKIN_PASSWORD").context("CHECKIN_PASSWORD is not set")?;

    let settings = Settings::load()?;
    let provider = Arc::new(ConfiguredLocationProvider::new(settings.device.clone()));
    let controller = build_controller(&settings, provider)?;

    info!("Starting check-{} for {}", kind, email);

    let login = match controller.login(email, password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            print_notification(&Notification::from(&e));
            anyhow::bail!("login failed: {}", e);
        }
    };
    debug!("View after login: {}", serde_json::to_string(&controller.view())?);
    if let Err(e) = &login.location {
        print_notification(&Notification::from(e));
        controller.logout();
        anyhow::bail!("location unavailable: {}", e);
    }

    let result = controller.submit(kind).await;
    controller.logout();

    match result {
        Ok(outcome) => {
            print_notification(&Notification::from(&outcome));
            Ok(())
        }
        Err(e) => {
            error!("Check-{} failed: {}", kind, e);
            print_notification(&Notification::from(&e));
            Err(e.into())
        }
    }
}
