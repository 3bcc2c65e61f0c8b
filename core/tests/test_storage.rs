use std::collections::BTreeMap;
use std::fs;

use chrono::{TimeZone, Utc};

use equigraph_core::models::{Gait, SessionSummary, SessionType};
use equigraph_core::{load_summary, save_summary};

#[test]
fn test_save_and_load_summary() {
    let path = "tests/tmp_summary.json";

    // lag et dummy-sammendrag
    let mut gait_breakdown_s = BTreeMap::new();
    gait_breakdown_s.insert(Gait::Walk, 300_i64);
    gait_breakdown_s.insert(Gait::Trot, 240_i64);

    let summary = SessionSummary {
        session_id: "okt-1700000000000".to_string(),
        horse_id: "hest-1".to_string(),
        session_type: SessionType::Trail,
        started_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        ended_at: Utc.timestamp_millis_opt(1_700_000_540_000).unwrap(),
        duration_s: 540,
        distance_m: 2_150.0,
        avg_speed_kmh: 14.3,
        max_speed_kmh: 27.9,
        gait_breakdown_s,
        notes: "rolig tur i skogen".to_string(),
    };

    // lagre til disk
    save_summary(&summary, path).expect("kunne ikke lagre sammendrag");

    // les tilbake
    let loaded = load_summary(path).expect("kunne ikke laste sammendrag");

    assert_eq!(loaded, summary);
    assert_eq!(loaded.gait_breakdown_s.get(&Gait::Walk), Some(&300));

    // rydde opp
    fs::remove_file(path).ok();
}

#[test]
fn load_missing_file_is_an_error() {
    assert!(load_summary("tests/finnes_ikke.json").is_err());
}
