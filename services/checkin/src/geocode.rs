//! Reverse geocoding of check-in positions

use async_trait::async_trait;
use common::config::GeocodeFailurePolicy;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GeocodeError;
use crate::models::{PlaceInfo, Position};

/// Reverse-geocode response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub plus_code: Option<PlusCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlusCode {
    pub compound_code: Option<String>,
    pub global_code: Option<String>,
}

impl GeocodeResponse {
    /// First result wins; missing fields fall back to the unknown defaults
    pub fn into_place(self) -> PlaceInfo {
        match self.results.into_iter().next() {
            Some(first) => PlaceInfo::from_lookup(
                first.formatted_address,
                first.plus_code.and_then(|code| code.compound_code),
            ),
            None => PlaceInfo::default(),
        }
    }
}

/// Reverse-geocode port
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, position: &Position) -> Result<GeocodeResponse, GeocodeError>;
}

/// Google Geocoding API client
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, position: &Position) -> Result<GeocodeResponse, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("latlng", position.latlng()), ("key", self.api_key.clone())])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Transport(format!(
                "server responded with {}",
                response.status()
            )));
        }

        response
            .json::<GeocodeResponse>()
            .await
            .map_err(|e| GeocodeError::Transport(format!("invalid response: {}", e)))
    }
}

/// Turns a position into [`PlaceInfo`]
#[derive(Clone)]
pub struct PlaceEnricher {
    geocoder: Arc<dyn Geocoder>,
    policy: GeocodeFailurePolicy,
}

impl PlaceEnricher {
    pub fn new(geocoder: Arc<dyn Geocoder>, policy: GeocodeFailurePolicy) -> Self {
        Self { geocoder, policy }
    }

    pub fn policy(&self) -> GeocodeFailurePolicy {
        self.policy
    }

    /// Only fails when the lookup fails under [`GeocodeFailurePolicy::Abort`]
    pub async fn enrich(&self, position: &Position) -> Result<PlaceInfo, GeocodeError> {
        match self.geocoder.reverse_geocode(position).await {
            Ok(response) => {
                if let Some(status) = response.status.as_deref().filter(|s| *s != "OK") {
                    debug!("Geocode status {} for {}", status, position.latlng());
                }
                Ok(response.into_place())
            }
            Err(e) => match self.policy {
                GeocodeFailurePolicy::Degrade => {
                    warn!("Geocode lookup failed, using unknown place: {}", e);
                    Ok(PlaceInfo::default())
                }
                GeocodeFailurePolicy::Abort => Err(e),
            },
        }
    }
}
