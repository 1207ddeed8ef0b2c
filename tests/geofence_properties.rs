use hrm_attendance::is_inside;
use hrm_attendance::model::coordinate::Coordinate;
use hrm_attendance::model::zone::{DEFAULT_ZONE, GeoZone};
use proptest::prelude::*;

fn zone_strategy() -> impl Strategy<Value = GeoZone> {
    (-80.0f64..80.0, 0.001f64..5.0, -170.0f64..170.0, 0.001f64..5.0).prop_map(
        |(lat_min, lat_span, lon_min, lon_span)| {
            GeoZone::new(
                lat_min,
                lat_min + lat_span,
                lon_min,
                lon_min + lon_span,
                "generated",
            )
            .unwrap()
        },
    )
}

fn at(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude, 10.0)
}

#[test]
fn office_example() {
    let zone = GeoZone::new(33.60, 33.70, 72.95, 73.25, "office").unwrap();
    assert!(is_inside(&at(33.643, 73.184), &zone));
    assert!(!is_inside(&at(33.50, 73.184), &zone));
    assert_eq!(zone.lat_min(), DEFAULT_ZONE.lat_min());
}

proptest! {
    #[test]
    fn edges_are_inside(zone in zone_strategy(), t in 0.0f64..=1.0) {
        let lat = zone.lat_min() + t * (zone.lat_max() - zone.lat_min());
        let lon = zone.lon_min() + t * (zone.lon_max() - zone.lon_min());
        let lat = lat.clamp(zone.lat_min(), zone.lat_max());
        let lon = lon.clamp(zone.lon_min(), zone.lon_max());

        prop_assert!(is_inside(&at(zone.lat_min(), lon), &zone));
        prop_assert!(is_inside(&at(zone.lat_max(), lon), &zone));
        prop_assert!(is_inside(&at(lat, zone.lon_min()), &zone));
        prop_assert!(is_inside(&at(lat, zone.lon_max()), &zone));
    }

    #[test]
    fn beyond_any_bound_is_outside(
        zone in zone_strategy(),
        t in 0.0f64..=1.0,
        gap in 1e-6f64..10.0,
    ) {
        let lat = (zone.lat_min() + t * (zone.lat_max() - zone.lat_min()))
            .clamp(zone.lat_min(), zone.lat_max());
        let lon = (zone.lon_min() + t * (zone.lon_max() - zone.lon_min()))
            .clamp(zone.lon_min(), zone.lon_max());

        prop_assert!(!is_inside(&at(zone.lat_min() - gap, lon), &zone));
        prop_assert!(!is_inside(&at(zone.lat_max() + gap, lon), &zone));
        prop_assert!(!is_inside(&at(lat, zone.lon_min() - gap), &zone));
        prop_assert!(!is_inside(&at(lat, zone.lon_max() + gap), &zone));
    }

    #[test]
    fn evaluation_is_deterministic(
        zone in zone_strategy(),
        lat in -90.0f64..90.0,
        lon in -180.0f64..180.0,
    ) {
        let coordinate = at(lat, lon);
        prop_assert_eq!(is_inside(&coordinate, &zone), is_inside(&coordinate, &zone));
    }

    #[test]
    fn accuracy_never_matters(
        lat in 33.60f64..=33.70,
        lon in 72.95f64..=73.25,
        accuracy in 0.0f64..10_000.0,
    ) {
        prop_assert!(is_inside(&Coordinate::new(lat, lon, accuracy), &DEFAULT_ZONE));
    }

    #[test]
    fn nan_is_never_inside(zone in zone_strategy(), lon in -180.0f64..180.0) {
        prop_assert!(!is_inside(&at(f64::NAN, lon), &zone));
        prop_assert!(!is_inside(&at(lon.clamp(-90.0, 90.0), f64::NAN), &zone));
    }
}
