use serde::Serialize;

use crate::types::RoutePath;

pub const WORKING_DAYS_PER_YEAR: f64 = 260.0;
/// One trip there and one back per working day.
pub const COMMUTES_PER_YEAR: f64 = WORKING_DAYS_PER_YEAR * 2.0;
pub const LITRES_PER_KM: f64 = 10.0 / 100.0;
pub const FUEL_PRICE_PER_LITRE: f64 = 1.5;
pub const FUEL_COST_PER_KM: f64 = LITRES_PER_KM * FUEL_PRICE_PER_LITRE;
pub const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteMetrics {
    pub yearly_commute_days: u64,
    pub yearly_fuel_cost: u64,
}

/// Yearly fuel cost and whole days spent driving. Both are floored, never rounded up.
pub fn derive(distance_meters: f64, duration_seconds: f64) -> CommuteMetrics {
    let cost = (distance_meters / 1000.0) * FUEL_COST_PER_KM * COMMUTES_PER_YEAR;
    let days = (COMMUTES_PER_YEAR * duration_seconds) / SECONDS_PER_DAY;
    CommuteMetrics {
        yearly_commute_days: days.floor() as u64,
        yearly_fuel_cost: cost.floor() as u64,
    }
}

/// `"H hr M min"`, or just `"M min"` under an hour.
pub fn seconds_to_hms(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    if hours == 0 {
        format!("{} min", minutes)
    } else {
        format!("{} hr {} min", hours, minutes)
    }
}

/// Thousands separated with commas: `1234567` becomes `"1,234,567"`.
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// What the details card shows for a selected building.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteSummary {
    pub distance_km: f64,
    pub travel_time: String,
    pub metrics: CommuteMetrics,
    pub lines: Vec<String>,
}

impl CommuteSummary {
    /// `None` when the route has no distance or no duration; there is nothing to show then.
    pub fn from_route(path: &RoutePath) -> Option<Self> {
        if path.distance_meters == 0.0 || path.duration_seconds == 0.0 {
            return None;
        }
        let distance_km = path.distance_meters / 1000.0;
        let travel_time = seconds_to_hms(path.duration_seconds);
        let metrics = derive(path.distance_meters, path.duration_seconds);
        let lines = vec![
            format!(
                "This house is {} km away from your office. That would take {} each day.",
                distance_km, travel_time
            ),
            format!(
                "That's {} days in your car each year at a cost of ${}.",
                metrics.yearly_commute_days,
                format_grouped(metrics.yearly_fuel_cost)
            ),
        ];
        Some(CommuteSummary {
            distance_km,
            travel_time,
            metrics,
            lines,
        })
    }
}
