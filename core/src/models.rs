use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hvor en posisjon kommer fra. `NetworkFallback` brukes når sensoren
/// er utilgjengelig (avslått tillatelse, timeout, maskinvarefeil).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
    Sensor,
    NetworkFallback,
}

/// Én rapportert posisjon fra sensoren. Immutabel etter utsendelse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
    pub source: FixSource,
    pub timestamp_ms: i64,
    /// Momentanfart fra sensoren (m/s), hvis rapportert.
    #[serde(default)]
    pub speed_ms: Option<f64>,
}

/// Fix pluss avledet momentanfart i km/t. Samples er append-only og
/// endres aldri etter at de er lagt til en økt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sample {
    pub fix: Fix,
    pub speed_kmh: Option<f64>,
}

/// Gangart, utledet fra fart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gait {
    Idle,
    Walk,
    Trot,
    Canter,
    Gallop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Dressage,
    Jumping,
    Trail,
    Lunging,
    Other,
}

/// Valgfritt mål for økten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    DurationSec(u32),
    DistanceM(f64),
}

/// Øktkonfigurasjon. Settes i PREP og er uforanderlig etter launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub horse_id: Option<String>,
    pub session_type: SessionType,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub auto_pause: bool,
    #[serde(default = "default_true")]
    pub gait_detection: bool,
    #[serde(default)]
    pub safety_sharing: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            horse_id: None,
            session_type: SessionType::Other,
            goal: None,
            auto_pause: false,
            gait_detection: true,
            safety_sharing: false,
        }
    }
}

/// Løpende statistikk for en økt. Erstattes atomisk per fix/tick,
/// leses av UI, persisteres aldri underveis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub elapsed_ms: i64,
    pub distance_m: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    /// Tid per gangart i millisekunder. BTreeMap gir stabil
    /// serialiseringsrekkefølge.
    pub gait_ms: BTreeMap<Gait, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Prep,
    Running,
    Paused,
    Completed,
    Saved,
    Discarded,
}

impl SessionState {
    /// SAVED og DISCARDED er terminale: ingen overgang tilbake.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Saved | SessionState::Discarded)
    }
}

/// Det persisterbare sammendraget av en fullført økt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub horse_id: String,
    pub session_type: SessionType,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_s: i64,
    pub distance_m: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub gait_breakdown_s: BTreeMap<Gait, i64>,
    pub notes: String,
}

/// Hest fra Horse Directory-samarbeidspartneren (kun lesetilgang herfra).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseRef {
    pub id: String,
    pub name: String,
}
