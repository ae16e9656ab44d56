use geo::{point, HaversineDistance};

use crate::models::Location;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = point!(x: lon1, y: lat1);
    let to = point!(x: lon2, y: lat2);

    from.haversine_distance(&to) / 1000.0
}

/// Distance in kilometers between two locations
#[inline]
pub fn distance_between(from: Location, to: Location) -> f64 {
    haversine_distance(from.lat, from.lon, to.lat, to.lon)
}
