use crate::model::{coordinate::Coordinate, zone::GeoZone};

/// True when the coordinate lies in the zone, edges included.
///
/// NaN fails every comparison, so a non-finite coordinate is never inside.
pub fn is_inside(coordinate: &Coordinate, zone: &GeoZone) -> bool {
    let lat = coordinate.latitude;
    let lon = coordinate.longitude;

    zone.lat_min() <= lat && lat <= zone.lat_max() && zone.lon_min() <= lon && lon <= zone.lon_max()
}
