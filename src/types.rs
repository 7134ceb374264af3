use serde::{Deserialize, Serialize};

use crate::address::{deserialize_tags, normalize, Tags};
use crate::error::PipelineError;

// ** Coordinates **

/// A validated WGS84 position. Fields are private so every instance went through [`GeoPoint::new`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Where the map starts when the IP lookup fails.
    pub const FALLBACK_CENTER: GeoPoint = GeoPoint { lat: 30.0, lng: 55.0 };

    pub fn new(lat: f64, lng: f64) -> Result<Self, PipelineError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PipelineError::Validation(format!(
                "latitude {} outside [-90, 90]",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(PipelineError::Validation(format!(
                "longitude {} outside [-180, 180]",
                lng
            )));
        }
        Ok(GeoPoint { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let a = haversine_rs::point::Point {
            latitude: self.lat,
            longitude: self.lng,
        };
        let b = haversine_rs::point::Point {
            latitude: other.lat,
            longitude: other.lng,
        };
        haversine_rs::distance(a, b, haversine_rs::units::Unit::Meters)
    }

    // GeoJSON positions are longitude first
    pub(crate) fn to_vec(self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

/// Result of the IP geolocation lookup: a point plus whatever locale fields the provider knew.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IpLocation {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl IpLocation {
    pub fn fallback() -> Self {
        IpLocation {
            point: GeoPoint::FALLBACK_CENTER,
            city: None,
            region: None,
            country: None,
        }
    }

    /// "City, Region, Country", skipping the parts that are missing.
    pub fn label(&self) -> String {
        [&self.city, &self.region, &self.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The office location as the user picked it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedLocation {
    pub point: Option<GeoPoint>,
    pub place_name_localized: Option<String>,
    pub place_name_native: Option<String>,
    pub loaded: bool,
}

impl NamedLocation {
    /// The unset sentinel used before anything is selected.
    pub fn placeholder() -> Self {
        NamedLocation {
            point: None,
            place_name_localized: None,
            place_name_native: None,
            loaded: false,
        }
    }

    pub fn from_ip(location: &IpLocation) -> Self {
        NamedLocation {
            point: Some(location.point),
            place_name_localized: None,
            place_name_native: None,
            loaded: true,
        }
    }

    /// Geocoder results carry their center as `[lng, lat]`.
    pub fn from_geocoder_center(
        center: [f64; 2],
        place_name_localized: Option<String>,
        place_name_native: Option<String>,
    ) -> Result<Self, PipelineError> {
        let [lng, lat] = center;
        Ok(NamedLocation {
            point: Some(GeoPoint::new(lat, lng)?),
            place_name_localized,
            place_name_native,
            loaded: true,
        })
    }

    /// The point to search or route from; fails while the placeholder is still in place.
    pub fn office_point(&self) -> Result<GeoPoint, PipelineError> {
        match (self.loaded, self.point) {
            (true, Some(point)) => Ok(point),
            _ => Err(PipelineError::Validation(
                "no office location selected yet".to_string(),
            )),
        }
    }
}

// ** Building index data **

/// One element of the building index response, kept as close to the wire as possible.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawBuildingRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Tags,
}

impl RawBuildingRecord {
    /// `None` when the record lacks coordinates or they are out of range.
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat?, self.lon?).ok()
    }

    pub fn address(&self) -> NormalizedAddress {
        normalize(self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAddress {
    pub address_line: String,
    pub name: String,
    pub extra_info: Vec<String>,
}

// ** Routes **

/// Axis order the directions provider uses for its geometry pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    #[default]
    LatLng,
    LngLat,
}

impl CoordinateOrder {
    pub fn to_point(self, pair: [f64; 2]) -> Result<GeoPoint, PipelineError> {
        match self {
            CoordinateOrder::LatLng => GeoPoint::new(pair[0], pair[1]),
            CoordinateOrder::LngLat => GeoPoint::new(pair[1], pair[0]),
        }
    }

    pub fn to_pair(self, point: &GeoPoint) -> [f64; 2] {
        match self {
            CoordinateOrder::LatLng => [point.lat(), point.lng()],
            CoordinateOrder::LngLat => [point.lng(), point.lat()],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutePath {
    pub geometry: Vec<GeoPoint>,
    pub coordinate_order: CoordinateOrder,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RoutePath {
    /// Geometry pairs in the provider's own axis order, as the map polyline expects them.
    pub fn provider_coordinates(&self) -> Vec<[f64; 2]> {
        self.geometry
            .iter()
            .map(|point| self.coordinate_order.to_pair(point))
            .collect()
    }

    pub fn to_geojson(&self) -> geojson::Feature {
        let line = self.geometry.iter().map(|point| point.to_vec()).collect();
        let mut properties = serde_json::Map::new();
        properties.insert("distance".to_string(), self.distance_meters.into());
        properties.insert("duration".to_string(), self.duration_seconds.into());
        geojson::Feature {
            geometry: Some(geojson::Geometry::new(geojson::Value::LineString(line))),
            properties: Some(properties),
            ..Default::default()
        }
    }
}
