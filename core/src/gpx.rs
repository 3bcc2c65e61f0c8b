// core/src/gpx.rs
use chrono::{DateTime, TimeZone, Utc};

use crate::models::Sample;

/// Bygg et GPX 1.1-dokument av en sample-serie: ett `<trk>` med ett
/// `<trkseg>` og ett `<trkpt>` per sample. Byte-for-byte deterministisk
/// for samme input – ingen veggklokke, kun øktens egne tidsstempler.
pub fn to_gpx(samples: &[Sample], name: &str) -> String {
    let mut out = String::with_capacity(256 + samples.len() * 160);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<gpx version=\"1.1\" creator=\"EquiGraph\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );
    let esc = escape_xml(name);
    out.push_str(&format!("  <metadata><name>{esc}</name></metadata>\n"));
    out.push_str(&format!("  <trk>\n    <name>{esc}</name>\n    <trkseg>\n"));

    for s in samples {
        // f64 Display er korteste form som rundtripper eksakt
        out.push_str(&format!(
            "      <trkpt lat=\"{}\" lon=\"{}\">\n",
            s.fix.lat, s.fix.lng
        ));
        out.push_str(&format!(
            "        <time>{}</time>\n",
            iso8601_ms(s.fix.timestamp_ms)
        ));
        if let Some(kmh) = s.speed_kmh {
            // speed i m/s
            out.push_str(&format!(
                "        <extensions><speed>{:.3}</speed></extensions>\n",
                kmh / 3.6
            ));
        }
        out.push_str("      </trkpt>\n");
    }

    out.push_str("    </trkseg>\n  </trk>\n</gpx>\n");
    out
}

/// ISO-8601 UTC med millisekundpresisjon, f.eks. 2026-08-06T10:00:00.000Z
fn iso8601_ms(ms: i64) -> String {
    let dt: DateTime<Utc> = Utc.timestamp_millis_opt(ms).single().unwrap_or_default();
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
