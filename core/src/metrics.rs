// core/src/metrics.rs
use once_cell::sync::Lazy;
use prometheus::{IntCounter, Registry};

/// Tellere for sensor- og øktflyt. Registreres én gang i et felles
/// registry og deles via `global()`.
pub struct Metrics {
    pub registry: Registry,
    pub fixes_received: IntCounter,
    pub fallback_fixes: IntCounter,
    pub sensor_timeouts: IntCounter,
    pub sessions_started: IntCounter,
    pub sessions_saved: IntCounter,
    pub save_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let fixes_received = IntCounter::new(
            "equigraph_fixes_received_total",
            "Antall posisjonsfixer mottatt fra sensoren",
        )
        .expect("gyldig counter-navn");
        let fallback_fixes = IntCounter::new(
            "equigraph_fallback_fixes_total",
            "Antall syntetiske fallback-fixer utstedt",
        )
        .expect("gyldig counter-navn");
        let sensor_timeouts = IntCounter::new(
            "equigraph_sensor_timeouts_total",
            "Antall first-fix-timeouts",
        )
        .expect("gyldig counter-navn");
        let sessions_started = IntCounter::new(
            "equigraph_sessions_started_total",
            "Antall økter startet (PREP -> RUNNING)",
        )
        .expect("gyldig counter-navn");
        let sessions_saved = IntCounter::new(
            "equigraph_sessions_saved_total",
            "Antall økter lagret (COMPLETED -> SAVED)",
        )
        .expect("gyldig counter-navn");
        let save_failures = IntCounter::new(
            "equigraph_save_failures_total",
            "Antall mislykkede lagringsforsøk mot session store",
        )
        .expect("gyldig counter-navn");

        for c in [
            fixes_received.clone(),
            fallback_fixes.clone(),
            sensor_timeouts.clone(),
            sessions_started.clone(),
            sessions_saved.clone(),
            save_failures.clone(),
        ] {
            registry
                .register(Box::new(c))
                .expect("counter registreres kun én gang");
        }

        Self {
            registry,
            fixes_received,
            fallback_fixes,
            sensor_timeouts,
            sessions_started,
            sessions_saved,
            save_failures,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<Metrics> = Lazy::new(Metrics::new);

pub fn global() -> &'static Metrics {
    &GLOBAL
}

pub fn fixes_received_total(m: &Metrics) -> &IntCounter {
    &m.fixes_received
}

pub fn fallback_fixes_total(m: &Metrics) -> &IntCounter {
    &m.fallback_fixes
}
