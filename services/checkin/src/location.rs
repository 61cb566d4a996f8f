//! Location acquisition
//!
//! The acquirer runs three steps in order, stopping at the first failure:
//! platform capability check, permission request, single position fetch.

use async_trait::async_trait;
use chrono::Utc;
use common::config::{DevicePlatform, DeviceSettings};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::LocationError;
use crate::models::Position;

/// Upper bound for a single position fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a foreground permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Device location port
#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn platform(&self) -> DevicePlatform;

    /// False for emulators and simulators
    fn is_physical_device(&self) -> bool;

    async fn request_permission(&self) -> Result<PermissionStatus, LocationError>;

    async fn current_position(&self) -> Result<Position, LocationError>;
}

/// Android emulators report no usable GPS
pub fn is_supported_environment(platform: DevicePlatform, is_physical_device: bool) -> bool {
    !(platform == DevicePlatform::Android && !is_physical_device)
}

/// Requests permission and a single fix from a [`LocationProvider`]
#[derive(Clone)]
pub struct LocationAcquirer {
    provider: Arc<dyn LocationProvider>,
    fetch_timeout: Duration,
}

impl LocationAcquirer {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub async fn acquire(&self) -> Result<Position, LocationError> {
        let platform = self.provider.platform();
        if !is_supported_environment(platform, self.provider.is_physical_device()) {
            warn!("Location unsupported on {:?} emulator", platform);
            return Err(LocationError::UnsupportedEnvironment);
        }

        let permission = self.provider.request_permission().await?;
        if permission != PermissionStatus::Granted {
            warn!("Location permission not granted: {:?}", permission);
            return Err(LocationError::PermissionDenied);
        }

        let fetched =
            match tokio::time::timeout(self.fetch_timeout, self.provider.current_position()).await
            {
                Ok(result) => result,
                Err(_) => Err(LocationError::FetchFailed(format!(
                    "timed out after {}s",
                    self.fetch_timeout.as_secs_f32()
                ))),
            };
        let position = fetched.inspect_err(|e| error!("Location error: {}", e))?;

        info!(
            "Position acquired: {:.5},{:.5} (accuracy {:?})",
            position.latitude, position.longitude, position.accuracy
        );
        Ok(position)
    }
}

/// Provider backed by configuration, for headless runs without a sensor
#[derive(Debug, Clone)]
pub struct ConfiguredLocationProvider {
    settings: DeviceSettings,
}

impl ConfiguredLocationProvider {
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocationProvider {
    fn platform(&self) -> DevicePlatform {
        self.settings.platform
    }

    fn is_physical_device(&self) -> bool {
        self.settings.is_physical
    }

    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(if self.settings.permission_granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn current_position(&self) -> Result<Position, LocationError> {
        match (self.settings.latitude, self.settings.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Position {
                latitude,
                longitude,
                accuracy: self.settings.accuracy,
                timestamp: Utc::now(),
            }),
            _ => Err(LocationError::FetchFailed(
                "no position configured for this device".to_string(),
            )),
        }
    }
}
