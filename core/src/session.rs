// core/src/session.rs
use std::sync::Arc;

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::clock::Clock;
use crate::gait::GaitClassifier;
use crate::geo;
use crate::metrics;
use crate::models::{Fix, Sample, SessionConfig, SessionState, SessionStats, SessionSummary};
use crate::store::{SessionStore, StoreError};
use crate::watcher::{FixWatcher, ACCURACY_GATE_M};

pub const TICK_MS: i64 = 1_000; // periodisk klokke, leser kun tilstand

// Auto-pause: sammenhengende stillstand før pause, og fartsgrense for
// å gjenoppta en auto-pauset økt. Manuelle pauser gjenopptas aldri
// automatisk.
const AUTO_PAUSE_BELOW_KMH: f64 = 0.5;
const AUTO_PAUSE_AFTER: u32 = 5;
const AUTO_RESUME_ABOVE_KMH: f64 = 2.0;

/// Avvist launch: listen over uoppfylte forutsetninger, avledet direkte
/// av portbetingelsene. Aldri en exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRejection {
    pub unmet: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("ugyldig overgang fra {from:?}: {attempted}")]
    InvalidTransition {
        from: SessionState,
        attempted: &'static str,
    },
}

/// Feil fra `save`. Store-feil lar økten stå i COMPLETED slik at
/// lagring kan prøves på nytt uten å miste data.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("økten er ikke fullført (tilstand {0:?})")]
    NotCompleted(SessionState),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Livssyklusmaskinen for én treningsøkt.
///
/// Eier konfigurasjonen, sample-bufferet og statistikken, og
/// orkestrerer watcher + klassifisering + geodesi. `push_fix` og
/// `tick` er de eneste skrivestiene; hver av dem produserer én
/// konsistent erstatning av stats/samples, aldri delvis mutasjon.
pub struct LiveSession {
    id: String,
    state: SessionState,
    config: SessionConfig,
    samples: Vec<Sample>,
    stats: SessionStats,
    classifier: GaitClassifier,
    watcher: FixWatcher,
    clock: Arc<dyn Clock>,
    /// Pausejustert startreferanse: skyves frem ved resume slik at
    /// forløpt tid er kontinuerlig og ekskluderer pauser.
    started_at_ms: i64,
    /// Faktisk starttidspunkt (til sammendraget).
    wall_start_ms: i64,
    ended_at_ms: Option<i64>,
    paused_at_ms: Option<i64>,
    auto_paused: bool,
    still_streak: u32,
}

impl LiveSession {
    /// Ny økt i PREP. Watcheren injiseres av den som konstruerer økten
    /// og startes/stoppes kun herfra.
    pub fn new(config: SessionConfig, watcher: FixWatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: String::new(),
            state: SessionState::Prep,
            config,
            samples: Vec::new(),
            stats: SessionStats::default(),
            classifier: GaitClassifier::new(),
            watcher,
            clock,
            started_at_ms: 0,
            wall_start_ms: 0,
            ended_at_ms: None,
            paused_at_ms: None,
            auto_paused: false,
            still_streak: 0,
        }
    }

    /// Uoppfylte launch-forutsetninger, menneskelesbare. Tom liste
    /// betyr at `launch` vil lykkes.
    pub fn launch_blockers(&self) -> Vec<String> {
        let mut unmet = Vec::new();
        if self.config.horse_id.is_none() {
            unmet.push("ingen hest valgt".to_string());
        }
        if !self.watcher.can_start() {
            unmet.push("venter på GPS (ikke klar)".to_string());
        }
        let accuracy_ok = self
            .watcher
            .latest()
            .map(|f| f.accuracy_m <= ACCURACY_GATE_M)
            .unwrap_or(false);
        if !accuracy_ok {
            unmet.push(format!("GPS-nøyaktighet dårligere enn {ACCURACY_GATE_M:.0} m"));
        }
        unmet
    }

    /// PREP → RUNNING. No-op med avvisningsliste hvis porten ikke er
    /// oppfylt; økten blir stående i PREP.
    pub fn launch(&mut self) -> Result<(), LaunchRejection> {
        if self.state != SessionState::Prep {
            return Err(LaunchRejection {
                unmet: vec!["økten er allerede startet".to_string()],
            });
        }
        let unmet = self.launch_blockers();
        if !unmet.is_empty() {
            debug!("launch avvist: {:?}", unmet);
            return Err(LaunchRejection { unmet });
        }

        let now = self.clock.now_ms();
        self.id = format!("okt-{now}");
        self.wall_start_ms = now;
        self.started_at_ms = now;
        self.state = SessionState::Running;
        self.classifier.reset();
        metrics::global().sessions_started.inc();
        info!("økt {} startet", self.id);

        // Første sample: siste fix fra watcheren (porten garanterer at
        // den finnes og er god nok)
        if let Some(fix) = self.watcher.latest().copied() {
            let sample = Sample {
                fix,
                speed_kmh: fix.speed_ms.map(|v| v * 3.6),
            };
            self.samples.push(sample);
        }
        Ok(())
    }

    /// Dren watcheren og rut fixene inn i maskinen. I PREP holder dette
    /// bare forhåndsvisningen oppdatert.
    pub fn pump(&mut self) {
        let fixes = self.watcher.poll();
        for fix in fixes {
            self.push_fix(fix);
        }
    }

    /// Én innkommende fix. Eneste vei inn i sample-bufferet: samples
    /// prosesseres strengt i ankomstrekkefølge og reordnes aldri.
    pub fn push_fix(&mut self, fix: Fix) {
        match self.state {
            SessionState::Running => {}
            SessionState::Paused => {
                // Kun auto-pausede økter våkner av bevegelse
                let speed = self.derive_speed_kmh(&fix);
                if self.auto_paused && speed.map(|v| v >= AUTO_RESUME_ABOVE_KMH).unwrap_or(false) {
                    if self.resume().is_ok() {
                        self.accept_fix(fix);
                    }
                }
                return;
            }
            _ => return,
        }
        self.accept_fix(fix);
    }

    /// RUNNING → PAUSED. Husk pausetidspunktet.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(self.invalid("pause"));
        }
        let now = self.clock.now_ms();
        self.paused_at_ms = Some(now);
        self.stats.elapsed_ms = now - self.started_at_ms;
        self.state = SessionState::Paused;
        debug!("økt {} pauset", self.id);
        Ok(())
    }

    /// PAUSED → RUNNING. Skyv startreferansen frem med pauselengden.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            return Err(self.invalid("resume"));
        }
        let now = self.clock.now_ms();
        if let Some(paused_at) = self.paused_at_ms.take() {
            self.started_at_ms += now - paused_at;
        }
        self.auto_paused = false;
        self.still_streak = 0;
        self.state = SessionState::Running;
        debug!("økt {} gjenopptatt", self.id);
        Ok(())
    }

    /// RUNNING|PAUSED → COMPLETED. Fryser samlingen, beregner endelig
    /// statistikk og frigjør sensoren synkront.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return Err(self.invalid("stop"));
        }
        let now = self.clock.now_ms();
        if let Some(paused_at) = self.paused_at_ms.take() {
            self.started_at_ms += now - paused_at;
        }
        self.ended_at_ms = Some(now);
        self.stats.elapsed_ms = now - self.started_at_ms;
        self.stats.avg_speed_kmh =
            geo::average_speed_kmh(self.stats.distance_m, self.stats.elapsed_ms as f64 / 60_000.0);
        self.stats.max_speed_kmh = self
            .samples
            .iter()
            .filter_map(|s| s.speed_kmh)
            .map(OrderedFloat)
            .max()
            .map(|v| v.into_inner())
            .unwrap_or(0.0);
        self.state = SessionState::Completed;
        self.watcher.stop();
        info!(
            "økt {} fullført: {:.0} m på {} s",
            self.id,
            self.stats.distance_m,
            self.stats.elapsed_ms / 1000
        );
        Ok(())
    }

    /// PREP|RUNNING|PAUSED → DISCARDED. Ingen sammendrag, ingen lagring.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !matches!(
            self.state,
            SessionState::Prep | SessionState::Running | SessionState::Paused
        ) {
            return Err(self.invalid("cancel"));
        }
        self.watcher.stop();
        self.samples.clear();
        self.stats = SessionStats::default();
        self.state = SessionState::Discarded;
        info!("økt avbrutt");
        Ok(())
    }

    /// COMPLETED → SAVED. Sammendraget + notater overleveres til
    /// session store; feiler lagringen blir økten stående i COMPLETED
    /// og kan lagres på nytt uten tap av data.
    pub fn save(
        &mut self,
        notes: &str,
        store: &dyn SessionStore,
    ) -> Result<SessionSummary, SaveError> {
        if self.state != SessionState::Completed {
            return Err(SaveError::NotCompleted(self.state));
        }
        let summary = crate::summary::build_summary(self, notes);
        if let Err(e) = store.save_session(&summary) {
            metrics::global().save_failures.inc();
            warn!("lagring feilet for økt {}: {e}", self.id);
            return Err(SaveError::Store(e));
        }
        self.state = SessionState::Saved;
        metrics::global().sessions_saved.inc();
        info!("økt {} lagret", self.id);
        Ok(summary)
    }

    /// COMPLETED → DISCARDED. Dropper alt uten å kalle store.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Completed {
            return Err(self.invalid("discard"));
        }
        self.samples.clear();
        self.state = SessionState::Discarded;
        info!("økt {} forkastet", self.id);
        Ok(())
    }

    /// Periodisk tick (1 s): oppdaterer forløpt tid og snittfart.
    /// Leser bare klokken, konkurrerer aldri med fix-håndteringen.
    pub fn tick(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.stats.elapsed_ms = self.clock.now_ms() - self.started_at_ms;
        self.stats.avg_speed_kmh =
            geo::average_speed_kmh(self.stats.distance_m, self.stats.elapsed_ms as f64 / 60_000.0);
    }

    // ── lesbare flater for UI ────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn current_gait(&self) -> crate::models::Gait {
        self.classifier.current()
    }

    pub fn watcher(&self) -> &FixWatcher {
        &self.watcher
    }

    pub fn watcher_mut(&mut self) -> &mut FixWatcher {
        &mut self.watcher
    }

    pub fn wall_start_ms(&self) -> i64 {
        self.wall_start_ms
    }

    pub fn ended_at_ms(&self) -> Option<i64> {
        self.ended_at_ms
    }

    // ── intern flyt ──────────────────────────────────────────────────

    fn accept_fix(&mut self, fix: Fix) {
        let speed_kmh = self.derive_speed_kmh(&fix);
        let prev = self.samples.last().copied();

        // Avstand beregnes alltid mot sist tillagte sample, aldri
        // reordnet etter tidsstempel; identiske koordinater gir 0.
        if let Some(prev) = &prev {
            let d = geo::fix_distance_m(&prev.fix, &fix);
            self.stats.distance_m += d;
        }

        let dt_ms = prev
            .map(|p| (fix.timestamp_ms - p.fix.timestamp_ms).max(0))
            .unwrap_or(0);

        if self.config.gait_detection {
            if let Some(v) = speed_kmh {
                let label = self.classifier.update(v);
                *self.stats.gait_ms.entry(label).or_insert(0) += dt_ms;
            }
        }

        if let Some(v) = speed_kmh {
            if v > self.stats.max_speed_kmh {
                self.stats.max_speed_kmh = v;
            }
        }

        self.samples.push(Sample { fix, speed_kmh });

        let now = self.clock.now_ms();
        self.stats.elapsed_ms = now - self.started_at_ms;
        self.stats.avg_speed_kmh =
            geo::average_speed_kmh(self.stats.distance_m, self.stats.elapsed_ms as f64 / 60_000.0);

        self.maybe_auto_pause(speed_kmh);
    }

    /// Momentanfart: sensorens egen måling hvis den finnes, ellers
    /// utledet av avstand/tid mot forrige sample. `None` ved dt ≤ 0.
    fn derive_speed_kmh(&self, fix: &Fix) -> Option<f64> {
        fix.speed_ms.map(|v| v * 3.6).or_else(|| {
            self.samples
                .last()
                .and_then(|p| geo::speed_between_kmh(&p.fix, fix))
        })
    }

    fn maybe_auto_pause(&mut self, speed_kmh: Option<f64>) {
        if !self.config.auto_pause || self.state != SessionState::Running {
            return;
        }
        match speed_kmh {
            Some(v) if v < AUTO_PAUSE_BELOW_KMH => {
                self.still_streak += 1;
                if self.still_streak >= AUTO_PAUSE_AFTER {
                    self.still_streak = 0;
                    if self.pause().is_ok() {
                        self.auto_paused = true;
                        info!("auto-pause etter {AUTO_PAUSE_AFTER} stillestående fixer");
                    }
                }
            }
            _ => self.still_streak = 0,
        }
    }

    fn invalid(&self, attempted: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            from: self.state,
            attempted,
        }
    }
}
