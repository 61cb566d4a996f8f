//! Common library for the check-in workspace
//!
//! This crate provides shared functionality used by the check-in service
//! and its binaries: layered configuration, configuration errors and
//! tracing initialisation.
//!
//! ```rust,no_run
//! use common::{Settings, telemetry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     telemetry::init_tracing();
//!     let settings = Settings::load()?;
//!     println!("Backend: {}", settings.api.base_url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod telemetry;

pub use crate::config::{GeocodeFailurePolicy, Settings};
pub use crate::error::{ConfigError, ConfigResult};
