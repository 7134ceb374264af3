use wasm_bindgen::prelude::*;
use serde::Serialize;
use log::Level;
use wasm_bindgen_futures::future_to_promise;
use wasm_bindgen_futures::js_sys;

pub mod address;
pub mod buildings;
pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod location;
pub mod metrics;
pub mod osm_fetcher;
pub mod route;
pub mod types;

use self::config::EndpointConfig;
use self::error::PipelineError;
use self::generation::{Generation, Ticket};
use self::http::{ReqwestTransport, Transport};
use self::location::LocationResolver;
use self::metrics::{CommuteMetrics, CommuteSummary};
use self::osm_fetcher::ProximitySearch;
use self::route::RouteService;
use self::types::GeoPoint;

#[wasm_bindgen]
pub fn rust_init() {
    init_logger(Level::Error);
}

/// Same as [`rust_init`] with a level name (`"info"`, `"debug"`, ...). Unknown names mean `error`.
#[wasm_bindgen]
pub fn rust_init_with_level(level: &str) {
    init_logger(level.parse().unwrap_or(Level::Error));
}

fn init_logger(level: Level) {
    if console_log::init_with_level(level).is_err() {
        log::warn!("Logger already initialized");
        return;
    }
    log::info!("Logger initialized from library");
}

fn to_js_error(e: PipelineError) -> JsValue {
    let payload = serde_json::json!({ "kind": e.kind(), "message": e.to_string() });
    JsValue::from_str(&payload.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, PipelineError> {
    serde_json::to_string(value)
        .map_err(|e| PipelineError::Validation(format!("could not serialize result: {}", e)))
}

/// What the frontend needs to draw a route and fill the details card.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteReport {
    /// Polyline pairs, in the directions provider's axis order.
    coordinates: Vec<[f64; 2]>,
    distance: f64,
    duration: f64,
    metrics: CommuteMetrics,
    summary: Option<CommuteSummary>,
}

pub async fn resolve_location_async<T: Transport>(
    transport: T,
    config_json: &str,
) -> Result<String, PipelineError> {
    let config = EndpointConfig::from_json(config_json)?;
    let location = LocationResolver::new(transport, &config).resolve().await?;
    to_json(&location)
}

pub async fn search_buildings_async<T: Transport>(
    transport: T,
    config_json: &str,
    lat: f64,
    lng: f64,
    radius_meters: Option<f64>,
) -> Result<String, PipelineError> {
    let config = EndpointConfig::from_json(config_json)?;
    let center = GeoPoint::new(lat, lng)?;
    let radius_meters = radius_meters.unwrap_or(config.search_radius_meters);

    let records = ProximitySearch::new(transport, &config)
        .search(&center, radius_meters)
        .await?;
    to_json(&buildings::listings(&center, &records))
}

pub async fn find_route_async<T: Transport>(
    transport: T,
    config_json: &str,
    office: (f64, f64),
    house: (f64, f64),
) -> Result<String, PipelineError> {
    let config = EndpointConfig::from_json(config_json)?;
    let office = GeoPoint::new(office.0, office.1)?;
    let house = GeoPoint::new(house.0, house.1)?;

    let path = RouteService::new(transport, &config)
        .route(&office, &house)
        .await?;
    let report = RouteReport {
        coordinates: path.provider_coordinates(),
        distance: path.distance_meters,
        duration: path.duration_seconds,
        metrics: metrics::derive(path.distance_meters, path.duration_seconds),
        summary: CommuteSummary::from_route(&path),
    };
    to_json(&report)
}

#[wasm_bindgen]
pub fn resolve_location(config_json: String) -> js_sys::Promise {
    future_to_promise(async move {
        match resolve_location_async(ReqwestTransport::new(), &config_json).await {
            Ok(json) => Ok(JsValue::from_str(&json)),
            Err(e) => Err(to_js_error(e)),
        }
    })
}

/// The point to center the map on when [`resolve_location`] fails.
#[wasm_bindgen]
pub fn fallback_center() -> String {
    serde_json::json!({ "lat": GeoPoint::FALLBACK_CENTER.lat(), "lng": GeoPoint::FALLBACK_CENTER.lng() })
        .to_string()
}

#[wasm_bindgen]
pub fn search_buildings(
    config_json: String,
    lat: f64,
    lng: f64,
    radius_meters: Option<f64>,
) -> js_sys::Promise {
    future_to_promise(async move {
        let transport = ReqwestTransport::new();
        match search_buildings_async(transport, &config_json, lat, lng, radius_meters).await {
            Ok(json) => Ok(JsValue::from_str(&json)),
            Err(e) => Err(to_js_error(e)),
        }
    })
}

#[wasm_bindgen]
pub fn find_route(
    config_json: String,
    office_lat: f64,
    office_lng: f64,
    house_lat: f64,
    house_lng: f64,
) -> js_sys::Promise {
    future_to_promise(async move {
        match find_route_async(
            ReqwestTransport::new(),
            &config_json,
            (office_lat, office_lng),
            (house_lat, house_lng),
        )
        .await
        {
            Ok(json) => Ok(JsValue::from_str(&json)),
            Err(e) => Err(to_js_error(e)),
        }
    })
}

pub fn normalize_address_json(tags_json: &str) -> Result<String, PipelineError> {
    let tags = address::tags_from_json(tags_json)
        .map_err(|e| PipelineError::Validation(format!("tags must be a JSON object: {}", e)))?;
    to_json(&address::normalize(tags.iter().map(|(k, v)| (k, v))))
}

#[wasm_bindgen]
pub fn normalize_address(tags_json: &str) -> Result<String, JsValue> {
    normalize_address_json(tags_json).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn commute_metrics(distance_meters: f64, duration_seconds: f64) -> Result<JsValue, JsValue> {
    let metrics = metrics::derive(distance_meters, duration_seconds);
    serde_wasm_bindgen::to_value(&metrics).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(js_name = secondsToHMS)]
pub fn seconds_to_hms(seconds: f64) -> String {
    metrics::seconds_to_hms(seconds)
}

/// Generation counter for the frontend: one per logical query (searches, routes).
#[wasm_bindgen]
#[derive(Default)]
pub struct RequestGeneration {
    inner: Generation,
}

#[wasm_bindgen]
impl RequestGeneration {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request and returns its number; every earlier number becomes stale.
    pub fn issue(&self) -> f64 {
        self.inner.issue().value() as f64
    }

    #[wasm_bindgen(js_name = isCurrent)]
    pub fn is_current(&self, issued: f64) -> bool {
        self.inner.is_current(&Ticket::from(issued as u64))
    }
}
