// core/src/geo.rs
use crate::models::{Fix, Sample};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0; // jordradius (m)

/// Storsirkel-avstand (Haversine) mellom to punkter, i meter.
/// Ingen spesialbehandling av antimeridian/poler – treningsbaner er lokale.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Avstand mellom to fixer, i meter. Ikke-finite input gir 0.
pub fn fix_distance_m(a: &Fix, b: &Fix) -> f64 {
    let d = haversine_m(a.lat, a.lng, b.lat, b.lng);
    if d.is_finite() {
        d
    } else {
        0.0
    }
}

/// Sum av avstand over påfølgende par. Én eller null samples gir 0.
pub fn cumulative_distance_m(samples: &[Sample]) -> f64 {
    samples
        .windows(2)
        .map(|w| fix_distance_m(&w[0].fix, &w[1].fix))
        .sum()
}

/// Snittfart i km/t. 0 når forløpt tid er 0 (unngår deling på null).
pub fn average_speed_kmh(distance_m: f64, elapsed_min: f64) -> f64 {
    if elapsed_min <= 0.0 {
        return 0.0;
    }
    (distance_m / 1000.0) / (elapsed_min / 60.0)
}

/// Fart mellom to fixer i km/t, utledet av avstand og tidsdifferanse.
/// `None` når dt ≤ 0 (retransmisjon eller usortert tidsstempel).
pub fn speed_between_kmh(prev: &Fix, next: &Fix) -> Option<f64> {
    let dt_ms = next.timestamp_ms - prev.timestamp_ms;
    if dt_ms <= 0 {
        return None;
    }
    let v_ms = fix_distance_m(prev, next) / (dt_ms as f64 / 1000.0);
    Some(v_ms * 3.6)
}
