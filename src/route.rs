use serde::Deserialize;
use serde_json::Value;

use crate::config::EndpointConfig;
use crate::error::PipelineError;
use crate::http::{provider_error_message, Transport};
use crate::types::{CoordinateOrder, GeoPoint, RoutePath};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    route: Option<RouteBody>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    geometry: RouteGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct RouteGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// The `stops` parameter: `lat1,lng1;lat2,lng2`.
pub fn stops(origin: &GeoPoint, destination: &GeoPoint) -> String {
    format!(
        "{},{};{},{}",
        origin.lat(),
        origin.lng(),
        destination.lat(),
        destination.lng()
    )
}

/// Decodes a directions payload into a [`RoutePath`]. A declared error, a missing route
/// or an empty geometry all count as "no route found".
pub fn parse_route(body: &str, order: CoordinateOrder) -> Result<RoutePath, PipelineError> {
    let response: DirectionsResponse = serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse DirectionsResponse. Error: {}. Body: {}", e, body);
        PipelineError::fetch(format!("directions provider returned an unreadable body: {}", e))
    })?;

    if response.error.is_some() {
        let message = provider_error_message(body)
            .unwrap_or_else(|| "directions provider reported an error".to_string());
        return Err(PipelineError::fetch(message));
    }
    let route = response
        .route
        .ok_or_else(|| PipelineError::fetch("No route found in success response"))?;
    if route.geometry.coordinates.is_empty() {
        return Err(PipelineError::fetch("Route has no geometry"));
    }

    let geometry = route
        .geometry
        .coordinates
        .into_iter()
        .map(|pair| order.to_point(pair))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::fetch(format!("Route geometry is invalid: {}", e)))?;

    Ok(RoutePath {
        geometry,
        coordinate_order: order,
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}

pub struct RouteService<T> {
    transport: T,
    url: String,
    api_key: String,
    api_host: String,
    order: CoordinateOrder,
}

impl<T: Transport> RouteService<T> {
    pub fn new(transport: T, config: &EndpointConfig) -> Self {
        RouteService {
            transport,
            url: config.directions_url.clone(),
            api_key: config.rapidapi_key.clone(),
            api_host: config.rapidapi_host.clone(),
            order: config.route_coordinate_order,
        }
    }

    pub async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RoutePath, PipelineError> {
        let url = format!("{}?stops={}", self.url, stops(origin, destination));
        log::debug!("Calling directions provider: {}", url);

        let headers = [
            ("X-RapidAPI-Key", self.api_key.as_str()),
            ("X-RapidAPI-Host", self.api_host.as_str()),
        ];
        let response = self.transport.get(&url, &headers).await?;
        if !response.is_success() {
            return Err(response.status_error("directions provider"));
        }
        let path = parse_route(&response.body, self.order)?;

        log::info!(
            "Route found: {} m, {} s, {} points",
            path.distance_meters,
            path.duration_seconds,
            path.geometry.len()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeTransport;

    const ROUTE_BODY: &str = r#"{
        "route": {
            "distance": 20000,
            "duration": 1800,
            "bounds": {"south": 47.37, "west": 8.54, "north": 47.5, "east": 8.7},
            "geometry": {"coordinates": [[47.3769, 8.5417], [47.45, 8.6], [47.5, 8.7]]}
        }
    }"#;

    fn office() -> GeoPoint {
        GeoPoint::new(47.3769, 8.5417).unwrap()
    }

    fn house() -> GeoPoint {
        GeoPoint::new(47.5, 8.7).unwrap()
    }

    fn config() -> EndpointConfig {
        EndpointConfig {
            rapidapi_key: "key".to_string(),
            rapidapi_host: "trueway-directions2.p.rapidapi.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn stops_are_lat_first() {
        assert_eq!(stops(&office(), &house()), "47.3769,8.5417;47.5,8.7");
    }

    #[tokio::test]
    async fn requests_route_and_decodes_it() {
        let transport = FakeTransport::respond(200, ROUTE_BODY);
        let service = RouteService::new(transport.clone(), &config());

        let path = service.route(&office(), &house()).await.unwrap();
        assert_eq!(path.distance_meters, 20000.0);
        assert_eq!(path.duration_seconds, 1800.0);
        assert_eq!(path.geometry.len(), 3);
        assert_eq!(path.geometry[2], house());

        let requests = transport.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(
            requests[0].url,
            "https://trueway-directions2.p.rapidapi.com/FindDrivingRoute?stops=47.3769,8.5417;47.5,8.7"
        );
        assert_eq!(
            requests[0].headers,
            vec![
                ("X-RapidAPI-Key".to_string(), "key".to_string()),
                (
                    "X-RapidAPI-Host".to_string(),
                    "trueway-directions2.p.rapidapi.com".to_string()
                ),
            ]
        );
    }

    #[test]
    fn lng_first_geometry_keeps_semantic_points() {
        let body = r#"{"route":{"distance":10,"duration":5,"geometry":{"coordinates":[[8.5417,47.3769],[8.7,47.5]]}}}"#;
        let path = parse_route(body, CoordinateOrder::LngLat).unwrap();
        assert_eq!(path.geometry, vec![office(), house()]);
        assert_eq!(path.provider_coordinates(), vec![[8.5417, 47.3769], [8.7, 47.5]]);
    }

    #[test]
    fn declared_error_is_a_fetch_error() {
        let err = parse_route(
            r#"{"error":"NOT_FOUND","message":"Route not found"}"#,
            CoordinateOrder::LatLng,
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::fetch("NOT_FOUND"));
    }

    #[test]
    fn missing_route_is_a_fetch_error() {
        assert!(matches!(
            parse_route("{}", CoordinateOrder::LatLng),
            Err(PipelineError::Fetch { .. })
        ));
    }

    #[test]
    fn empty_geometry_is_not_a_route() {
        let body = r#"{"route":{"distance":0,"duration":0,"geometry":{"coordinates":[]}}}"#;
        assert_eq!(
            parse_route(body, CoordinateOrder::LatLng).unwrap_err(),
            PipelineError::fetch("Route has no geometry")
        );
    }

    #[test]
    fn swapped_axes_are_caught() {
        // lat of 150 only happens if the provider order was misconfigured
        let body = r#"{"route":{"distance":1,"duration":1,"geometry":{"coordinates":[[150.0,45.0]]}}}"#;
        assert!(parse_route(body, CoordinateOrder::LatLng).is_err());
        assert!(parse_route(body, CoordinateOrder::LngLat).is_ok());
    }

    #[tokio::test]
    async fn non_success_status_keeps_provider_message() {
        let transport =
            FakeTransport::respond(403, r#"{"message":"You are not subscribed to this API."}"#);
        let service = RouteService::new(transport, &config());
        assert_eq!(
            service.route(&office(), &house()).await.unwrap_err(),
            PipelineError::fetch(
                "directions provider responded with status 403: You are not subscribed to this API."
            )
        );
    }

    #[tokio::test]
    async fn transport_failure_returns_no_path() {
        let transport = FakeTransport::fail(PipelineError::Network("connection reset".into()));
        let service = RouteService::new(transport, &config());
        assert!(matches!(
            service.route(&office(), &house()).await,
            Err(PipelineError::Network(_))
        ));
    }
}
