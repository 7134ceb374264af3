use serde::Deserialize;

use crate::config::EndpointConfig;
use crate::error::PipelineError;
use crate::http::Transport;
use crate::types::{GeoPoint, RawBuildingRecord};

// The part of an Overpass answer we care about. `remark` carries runtime errors
// (timeouts, memory exhaustion) that still arrive with a 200 status.
#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<RawBuildingRecord>,
    #[serde(default)]
    remark: Option<String>,
}

/// Overpass QL asking for every node tagged `building` within `radius_meters` of `center`.
pub fn building_query(center: &GeoPoint, radius_meters: f64, timeout_secs: u32) -> String {
    format!(
        r#"[out:json][timeout:{}];(node(around:{},{},{})["building"];);out;"#,
        timeout_secs,
        radius_meters,
        center.lat(),
        center.lng()
    )
}

/// Decodes the element list. Upstream order is kept and nothing is filtered or deduplicated.
pub fn parse_elements(body: &str) -> Result<Vec<RawBuildingRecord>, PipelineError> {
    let response: OverpassResponse = serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse Overpass response. Error: {}. Body: {}", e, body);
        PipelineError::fetch(format!("building index returned an unreadable body: {}", e))
    })?;
    if let Some(remark) = response.remark.filter(|r| r.contains("error")) {
        return Err(PipelineError::fetch(remark));
    }
    Ok(response.elements)
}

pub struct ProximitySearch<T> {
    transport: T,
    url: String,
    timeout_secs: u32,
}

impl<T: Transport> ProximitySearch<T> {
    pub fn new(transport: T, config: &EndpointConfig) -> Self {
        ProximitySearch {
            transport,
            url: config.overpass_url.clone(),
            timeout_secs: config.overpass_timeout_secs,
        }
    }

    /// Fetches raw building records around `center`. Zero buildings is a successful, empty answer.
    pub async fn search(
        &self,
        center: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<RawBuildingRecord>, PipelineError> {
        if !(radius_meters > 0.0 && radius_meters.is_finite()) {
            return Err(PipelineError::Validation(format!(
                "search radius must be positive, got {}",
                radius_meters
            )));
        }
        let query = building_query(center, radius_meters, self.timeout_secs);
        log::debug!("Overpass query: {}", query);

        let response = self
            .transport
            .post(
                &self.url,
                &[("Content-Type", "application/x-www-form-urlencoded")],
                query,
            )
            .await?;
        if !response.is_success() {
            return Err(response.status_error("building index"));
        }
        let elements = parse_elements(&response.body)?;

        log::info!(
            "Found {} buildings within {} m of {}, {}",
            elements.len(),
            radius_meters,
            center.lat(),
            center.lng()
        );
        Ok(elements)
    }
}
