// core/src/cli.rs
use crate::models::SessionSummary;

/// Enkel tekstrapport for en fullført økt.
pub fn print_session_report(summary: &SessionSummary) {
    println!("--- Øktrapport ---");
    println!("Økt: {} (hest {})", summary.session_id, summary.horse_id);
    println!("Start: {}", summary.started_at);
    println!("Varighet: {} s", summary.duration_s);
    println!("Distanse: {:.0} m", summary.distance_m);
    println!(
        "Fart: snitt {:.1} km/t, maks {:.1} km/t",
        summary.avg_speed_kmh, summary.max_speed_kmh
    );
    for (gait, secs) in &summary.gait_breakdown_s {
        println!("  {:?}: {} s", gait, secs);
    }
    if !summary.notes.is_empty() {
        println!("Notater: {}", summary.notes);
    }
}
