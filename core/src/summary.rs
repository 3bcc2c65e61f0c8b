// core/src/summary.rs
use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use ordered_float::OrderedFloat;

use crate::gait::GaitClassifier;
use crate::geo;
use crate::models::{Sample, SessionSummary, SessionType};
use crate::session::LiveSession;

/// Prosjekterer en fullført økt til det persisterbare sammendraget.
///
/// Idempotent: bygger kun på øktens egne registrerte tidsstempler,
/// aldri på veggklokken – to kall på samme økt gir identisk resultat.
pub fn build_summary(session: &LiveSession, notes: &str) -> SessionSummary {
    let stats = session.stats();
    let ended_ms = session.ended_at_ms().unwrap_or(session.wall_start_ms());

    let gait_breakdown_s: BTreeMap<_, _> = stats
        .gait_ms
        .iter()
        .map(|(g, ms)| (*g, ms / 1000))
        .collect();

    SessionSummary {
        session_id: session.id().to_string(),
        // launch-porten garanterer hest; tom streng kan bare oppstå for
        // en økt som aldri ble startet
        horse_id: session.config().horse_id.clone().unwrap_or_default(),
        session_type: session.config().session_type,
        started_at: ms_to_utc(session.wall_start_ms()),
        ended_at: ms_to_utc(ended_ms),
        duration_s: stats.elapsed_ms / 1000,
        distance_m: stats.distance_m,
        avg_speed_kmh: stats.avg_speed_kmh,
        max_speed_kmh: stats.max_speed_kmh,
        gait_breakdown_s,
        notes: notes.to_string(),
    }
}

/// Post-hoc sammendrag av en rå sample-serie (import/host-app-stien).
/// Bruker samme klassifiserer som live-økten, slik at etiketter aldri
/// spriker mellom live og etterberegning.
pub fn summarize_track(
    samples: &[Sample],
    session_id: &str,
    horse_id: &str,
    session_type: SessionType,
    notes: &str,
) -> SessionSummary {
    let start_ms = samples.first().map(|s| s.fix.timestamp_ms).unwrap_or(0);
    let end_ms = samples.last().map(|s| s.fix.timestamp_ms).unwrap_or(start_ms);
    let elapsed_ms = (end_ms - start_ms).max(0);

    let distance_m = geo::cumulative_distance_m(samples);
    let avg_speed_kmh = geo::average_speed_kmh(distance_m, elapsed_ms as f64 / 60_000.0);

    let mut classifier = GaitClassifier::new();
    let mut gait_ms: BTreeMap<_, i64> = BTreeMap::new();
    for w in samples.windows(2) {
        let dt_ms = (w[1].fix.timestamp_ms - w[0].fix.timestamp_ms).max(0);
        let speed = w[1]
            .speed_kmh
            .or_else(|| geo::speed_between_kmh(&w[0].fix, &w[1].fix));
        if let Some(v) = speed {
            let label = classifier.update(v);
            *gait_ms.entry(label).or_insert(0) += dt_ms;
        }
    }

    let max_speed_kmh = samples
        .iter()
        .filter_map(|s| s.speed_kmh)
        .map(OrderedFloat)
        .max()
        .map(|v| v.into_inner())
        .unwrap_or(0.0);

    SessionSummary {
        session_id: session_id.to_string(),
        horse_id: horse_id.to_string(),
        session_type,
        started_at: ms_to_utc(start_ms),
        ended_at: ms_to_utc(end_ms),
        duration_s: elapsed_ms / 1000,
        distance_m,
        avg_speed_kmh,
        max_speed_kmh,
        gait_breakdown_s: gait_ms.iter().map(|(g, ms)| (*g, ms / 1000)).collect(),
        notes: notes.to_string(),
    }
}

fn ms_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
