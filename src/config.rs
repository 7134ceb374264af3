use serde::Deserialize;
use std::env;

use crate::error::PipelineError;
use crate::types::CoordinateOrder;

pub const DEFAULT_IP_LOCATION_URL: &str = "https://api.maptiler.com/geolocation/ip.json";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_DIRECTIONS_URL: &str =
    "https://trueway-directions2.p.rapidapi.com/FindDrivingRoute";
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 7500.0;

/// Provider endpoints and credentials. The frontend hands these over as JSON;
/// any field left out falls back to the public defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub ip_location_url: String,
    pub maptiler_key: String,
    pub overpass_url: String,
    /// Server-side limit written into the Overpass query header, in seconds.
    pub overpass_timeout_secs: u32,
    pub directions_url: String,
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub route_coordinate_order: CoordinateOrder,
    pub search_radius_meters: f64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            ip_location_url: DEFAULT_IP_LOCATION_URL.to_string(),
            maptiler_key: String::new(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            overpass_timeout_secs: 25,
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            rapidapi_key: String::new(),
            rapidapi_host: String::new(),
            route_coordinate_order: CoordinateOrder::default(),
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }
}

impl EndpointConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        if json.trim().is_empty() {
            return Ok(EndpointConfig::default());
        }
        serde_json::from_str(json)
            .map_err(|e| PipelineError::Validation(format!("invalid endpoint config: {}", e)))
    }

    /// For native callers. Keys that are not set stay empty and the provider rejects the call.
    pub fn from_env() -> Self {
        let defaults = EndpointConfig::default();
        let var = |name: &str, fallback: String| env::var(name).unwrap_or(fallback);
        EndpointConfig {
            ip_location_url: var("IP_LOCATION_URL", defaults.ip_location_url),
            maptiler_key: var("MAPTILER_API_KEY", defaults.maptiler_key),
            overpass_url: var("OVERPASS_URL", defaults.overpass_url),
            directions_url: var("DIRECTIONS_URL", defaults.directions_url),
            rapidapi_key: var("RAPIDAPI_KEY", defaults.rapidapi_key),
            rapidapi_host: var("RAPIDAPI_HOST", defaults.rapidapi_host),
            ..defaults
        }
    }
}
