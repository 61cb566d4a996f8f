//! Configuration for the check-in client
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional `checkin.toml` (or `.yaml`/`.json`) in the working directory,
//! then environment variables prefixed with `CHECKIN` using `__` to separate
//! nested keys.
//!
//! # Environment Variables
//! - `CHECKIN__API__BASE_URL`: attendance backend (default: "https://dot.mhubmw.tech")
//! - `CHECKIN__API__TIMEOUT_SECS`: per-request timeout (default: 30)
//! - `CHECKIN__GEOCODE__ENDPOINT`: reverse-geocode JSON endpoint
//! - `CHECKIN__GEOCODE__API_KEY`: reverse-geocode API key (default: empty)
//! - `CHECKIN__GEOCODE__FAILURE_POLICY`: `degrade` or `abort` (default: `degrade`)
//! - `CHECKIN__DEVICE__*`: the location source used by the headless binary

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Default attendance backend
pub const DEFAULT_API_BASE_URL: &str = "https://dot.mhubmw.tech";

/// Default reverse-geocode endpoint
pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub geocode: GeocodeSettings,
    #[serde(default)]
    pub device: DeviceSettings,
}

/// Attendance backend (login and savedata endpoints)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// What a submission does when the reverse-geocode lookup itself fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeFailurePolicy {
    /// Fall back to the "Unknown" place and keep submitting
    #[default]
    Degrade,
    /// Fail the whole submission
    Abort,
}

/// Reverse-geocode collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodeSettings {
    pub endpoint: String,
    pub api_key: String,
    pub failure_policy: GeocodeFailurePolicy,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            api_key: String::new(),
            failure_policy: GeocodeFailurePolicy::Degrade,
        }
    }
}

/// Operating system family the client runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Android,
    Ios,
    #[default]
    Other,
}

/// Location source for headless runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub platform: DevicePlatform,
    pub is_physical: bool,
    pub permission_granted: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            platform: DevicePlatform::Other,
            is_physical: true,
            permission_granted: true,
            latitude: None,
            longitude: None,
            accuracy: None,
        }
    }
}

impl Settings {
    /// Load settings from the default file and the environment
    pub fn load() -> ConfigResult<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name("checkin").required(false))
            .add_source(
                config::Environment::with_prefix("CHECKIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(
            "Loaded settings: api={} geocode={}",
            settings.api.base_url, settings.geocode.endpoint
        );

        Ok(settings)
    }

    /// Validate semantic constraints the deserializer cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        check_http_url("api.base_url", &self.api.base_url)?;
        check_http_url("geocode.endpoint", &self.geocode.endpoint)?;

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if let Some(latitude) = self.device.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(ConfigError::InvalidValue {
                    field: "device.latitude",
                    reason: format!("{latitude} is outside [-90, 90]"),
                });
            }
        }

        if let Some(longitude) = self.device.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(ConfigError::InvalidValue {
                    field: "device.longitude",
                    reason: format!("{longitude} is outside [-180, 180]"),
                });
            }
        }

        Ok(())
    }
}

fn check_http_url(field: &'static str, value: &str) -> ConfigResult<()> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
    }
}
