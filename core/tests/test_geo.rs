use equigraph_core::geo::{average_speed_kmh, cumulative_distance_m, haversine_m};
use equigraph_core::models::{Fix, FixSource, Sample};

fn sample(lat: f64, lng: f64, t_ms: i64) -> Sample {
    Sample {
        fix: Fix {
            lat,
            lng,
            accuracy_m: 5.0,
            source: FixSource::Sensor,
            timestamp_ms: t_ms,
            speed_ms: None,
        },
        speed_kmh: None,
    }
}

#[test]
fn haversine_is_symmetric() {
    let d_ab = haversine_m(59.91, 10.75, 60.39, 5.32);
    let d_ba = haversine_m(60.39, 5.32, 59.91, 10.75);
    assert!((d_ab - d_ba).abs() < 1e-6);
}

#[test]
fn haversine_of_identical_points_is_zero() {
    assert_eq!(haversine_m(59.91, 10.75, 59.91, 10.75), 0.0);
}

#[test]
fn one_degree_latitude_is_about_111_km() {
    // 1 breddegrad ≈ 111 km (±1 %)
    let d = haversine_m(59.0, 10.0, 60.0, 10.0);
    let expected = 111_195.0;
    assert!(
        (d - expected).abs() / expected < 0.01,
        "fikk {d} m, forventet ca {expected} m"
    );
}

#[test]
fn cumulative_distance_of_short_sequences_is_zero() {
    assert_eq!(cumulative_distance_m(&[]), 0.0);
    assert_eq!(cumulative_distance_m(&[sample(59.91, 10.75, 0)]), 0.0);
}

#[test]
fn cumulative_distance_sums_consecutive_pairs() {
    let samples = vec![
        sample(59.910, 10.750, 0),
        sample(59.911, 10.750, 1_000),
        sample(59.912, 10.750, 2_000),
    ];
    let total = cumulative_distance_m(&samples);
    let step = haversine_m(59.910, 10.750, 59.911, 10.750);
    assert!((total - 2.0 * step).abs() < 1e-6);
}

#[test]
fn average_speed_is_zero_for_zero_elapsed() {
    assert_eq!(average_speed_kmh(5_000.0, 0.0), 0.0);
}

#[test]
fn average_speed_normal_case() {
    // 5 km på 30 min = 10 km/t
    let v = average_speed_kmh(5_000.0, 30.0);
    assert!((v - 10.0).abs() < 1e-9);
}
