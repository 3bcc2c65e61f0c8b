use chrono::DateTime;

use equigraph_core::gpx::to_gpx;
use equigraph_core::models::{Fix, FixSource, Sample};

fn sample(lat: f64, lng: f64, t_ms: i64, speed_kmh: Option<f64>) -> Sample {
    Sample {
        fix: Fix {
            lat,
            lng,
            accuracy_m: 5.0,
            source: FixSource::Sensor,
            timestamp_ms: t_ms,
            speed_ms: None,
        },
        speed_kmh,
    }
}

/// Plukk ut alle verdier for et attributt, f.eks. `lat="..."`.
fn attr_values(doc: &str, key: &str) -> Vec<String> {
    let pat = format!("{key}=\"");
    let mut out = Vec::new();
    let mut rest = doc;
    while let Some(i) = rest.find(&pat) {
        let after = &rest[i + pat.len()..];
        let end = after.find('"').expect("lukket attributt");
        out.push(after[..end].to_string());
        rest = &after[end..];
    }
    out
}

fn tag_values(doc: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut rest = doc;
    while let Some(i) = rest.find(&open) {
        let after = &rest[i + open.len()..];
        let end = after.find(&close).expect("lukket tag");
        out.push(after[..end].to_string());
        rest = &after[end..];
    }
    out
}

#[test]
fn three_point_round_trip_recovers_exact_values() {
    let t0 = 1_700_000_000_000_i64;
    let samples = vec![
        sample(59.9139, 10.7522, t0, None),
        sample(59.914, 10.7525, t0 + 1_000, Some(9.0)),
        sample(59.9142, 10.753, t0 + 2_500, Some(12.5)),
    ];

    let doc = to_gpx(&samples, "Kveldstur");

    // Ett spor, ett segment
    assert_eq!(doc.matches("<trk>").count(), 1);
    assert_eq!(doc.matches("<trkseg>").count(), 1);
    assert_eq!(doc.matches("<trkpt ").count(), 3);

    // lat/lon rundtripper eksakt
    let lats = attr_values(&doc, "lat");
    let lngs = attr_values(&doc, "lon");
    for (i, s) in samples.iter().enumerate() {
        assert_eq!(lats[i].parse::<f64>().unwrap(), s.fix.lat);
        assert_eq!(lngs[i].parse::<f64>().unwrap(), s.fix.lng);
    }

    // tid i ISO-8601 UTC rundtripper eksakt
    let times = tag_values(&doc, "time");
    assert_eq!(times.len(), 3);
    for (i, s) in samples.iter().enumerate() {
        let parsed = DateTime::parse_from_rfc3339(&times[i]).expect("gyldig ISO-8601");
        assert_eq!(parsed.timestamp_millis(), s.fix.timestamp_ms);
    }
}

#[test]
fn output_is_byte_for_byte_deterministic() {
    let samples = vec![
        sample(59.9139, 10.7522, 1_700_000_000_000, Some(4.0)),
        sample(59.9141, 10.7523, 1_700_000_001_000, None),
    ];
    let a = to_gpx(&samples, "Tur");
    let b = to_gpx(&samples, "Tur");
    assert_eq!(a, b);
}

#[test]
fn speed_extension_only_when_speed_is_known() {
    let samples = vec![
        sample(59.9139, 10.7522, 1_700_000_000_000, Some(3.6)),
        sample(59.914, 10.7523, 1_700_000_001_000, None),
    ];
    let doc = to_gpx(&samples, "Tur");

    assert_eq!(doc.matches("<extensions><speed>").count(), 1);
    // 3.6 km/t = 1 m/s
    assert!(doc.contains("<speed>1.000</speed>"));
}

#[test]
fn session_name_is_xml_escaped() {
    let samples = vec![sample(59.9139, 10.7522, 1_700_000_000_000, None)];
    let doc = to_gpx(&samples, "Tur & <test>");
    assert!(doc.contains("Tur &amp; &lt;test&gt;"));
    assert!(!doc.contains("<name>Tur & <test></name>"));
}
