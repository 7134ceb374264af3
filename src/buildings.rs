//! Prepares raw search results for the map: records without usable coordinates are
//! dropped here, and each building gets its address and a distance ring around the office.

use serde::Serialize;

use crate::types::{GeoPoint, NormalizedAddress, RawBuildingRecord};

pub const CLOSE_RADIUS_METERS: f64 = 2500.0;
pub const MIDDLE_RADIUS_METERS: f64 = 5000.0;
pub const FAR_RADIUS_METERS: f64 = 7500.0;

/// Which of the three rings drawn around the office a building falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBand {
    Close,
    Middle,
    Far,
    Outside,
}

impl DistanceBand {
    pub fn classify(distance_meters: f64) -> Self {
        if distance_meters <= CLOSE_RADIUS_METERS {
            DistanceBand::Close
        } else if distance_meters <= MIDDLE_RADIUS_METERS {
            DistanceBand::Middle
        } else if distance_meters <= FAR_RADIUS_METERS {
            DistanceBand::Far
        } else {
            DistanceBand::Outside
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingListing {
    pub id: Option<u64>,
    pub position: GeoPoint,
    pub address: NormalizedAddress,
    /// Straight-line distance from the office.
    pub distance_meters: f64,
    pub band: DistanceBand,
}

pub fn listing(office: &GeoPoint, record: &RawBuildingRecord) -> Option<BuildingListing> {
    let position = record.position()?;
    let distance_meters = office.distance_meters(&position);
    Some(BuildingListing {
        id: record.id,
        position,
        address: record.address(),
        distance_meters,
        band: DistanceBand::classify(distance_meters),
    })
}

/// One listing per record that has coordinates, in the order the index returned them.
pub fn listings(office: &GeoPoint, records: &[RawBuildingRecord]) -> Vec<BuildingListing> {
    let listings: Vec<_> = records
        .iter()
        .filter_map(|record| listing(office, record))
        .collect();
    if listings.len() < records.len() {
        log::info!(
            "Dropped {} buildings without usable coordinates",
            records.len() - listings.len()
        );
    }
    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, lat: Option<f64>, lon: Option<f64>, tags: &[(&str, &str)]) -> RawBuildingRecord {
        RawBuildingRecord {
            id: Some(id),
            lat,
            lon,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn classifies_by_ring() {
        assert_eq!(DistanceBand::classify(0.0), DistanceBand::Close);
        assert_eq!(DistanceBand::classify(2500.0), DistanceBand::Close);
        assert_eq!(DistanceBand::classify(2500.1), DistanceBand::Middle);
        assert_eq!(DistanceBand::classify(7000.0), DistanceBand::Far);
        assert_eq!(DistanceBand::classify(7600.0), DistanceBand::Outside);
    }

    #[test]
    fn drops_records_without_coordinates_and_keeps_order() {
        let office = GeoPoint::new(0.0, 0.0).unwrap();
        let records = vec![
            record(3, Some(0.01), Some(0.0), &[("addr:street", "Main St"), ("name", "Acme")]),
            record(4, None, Some(0.0), &[]),
            record(1, Some(0.0), Some(0.06), &[("building", "yes")]),
        ];

        let listings = listings(&office, &records);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, Some(3));
        assert_eq!(listings[0].address.address_line, "Main St");
        assert_eq!(listings[0].address.name, "Acme");
        // 0.01 degrees of latitude is roughly 1.1 km
        assert_eq!(listings[0].band, DistanceBand::Close);
        assert!((listings[0].distance_meters - 1112.0).abs() < 5.0);
        // 0.06 degrees of longitude at the equator is roughly 6.7 km
        assert_eq!(listings[1].id, Some(1));
        assert_eq!(listings[1].band, DistanceBand::Far);
    }
}
