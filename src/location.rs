use serde::Deserialize;

use crate::config::EndpointConfig;
use crate::error::PipelineError;
use crate::http::Transport;
use crate::types::{GeoPoint, IpLocation};

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Locates the caller by its network egress point. One attempt, no retries.
pub struct LocationResolver<T> {
    transport: T,
    url: String,
    api_key: String,
}

impl<T: Transport> LocationResolver<T> {
    pub fn new(transport: T, config: &EndpointConfig) -> Self {
        LocationResolver {
            transport,
            url: config.ip_location_url.clone(),
            api_key: config.maptiler_key.clone(),
        }
    }

    /// Any failure, including a malformed payload, is reported as `Network`.
    pub async fn resolve(&self) -> Result<IpLocation, PipelineError> {
        self.lookup().await.map_err(PipelineError::into_network)
    }

    /// Resolves, or falls back to [`GeoPoint::FALLBACK_CENTER`] so the map can still render.
    pub async fn resolve_or_fallback(&self) -> IpLocation {
        match self.resolve().await {
            Ok(location) => location,
            Err(e) => {
                log::warn!("IP location lookup failed, using fallback center: {}", e);
                IpLocation::fallback()
            }
        }
    }

    async fn lookup(&self) -> Result<IpLocation, PipelineError> {
        let url = format!("{}?key={}", self.url, self.api_key);
        log::debug!("Requesting IP location from {}", self.url);

        let response = self.transport.get(&url, &[]).await?;
        let body: IpLocationResponse = response.decode("IP geolocation provider")?;
        let point = GeoPoint::new(body.latitude, body.longitude)?;

        log::info!("Resolved IP location to {}, {}", point.lat(), point.lng());
        Ok(IpLocation {
            point,
            city: body.city,
            region: body.region,
            country: body.country,
        })
    }
}
