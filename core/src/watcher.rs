// core/src/watcher.rs
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::clock::Clock;
use crate::metrics;
use crate::models::{Fix, FixSource};

pub const ACCURACY_GATE_M: f64 = 25.0;       // krav for `ready`
pub const FIRST_FIX_TIMEOUT_MS: i64 = 15_000;
pub const MAX_REFRESH: u32 = 3;
pub const FALLBACK_ACCURACY_M: f64 = 100.0;
// Referansekoordinat for fallback-fix (Oslo sentrum)
pub const FALLBACK_LAT: f64 = 59.9139;
pub const FALLBACK_LNG: f64 = 10.7522;

const FIX_QUEUE_CAP: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    PermissionCheck,
    Acquiring,
    Ready,
    Denied,
    Timeout,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Feil rapportert fra sensor-laget. Absorberes til watcher-tilstand,
/// kastes aldri videre til kalleren.
#[derive(Debug, Clone, Error)]
pub enum SensorFailure {
    #[error("posisjonstillatelse mangler eller er trukket tilbake")]
    PermissionRevoked,
    #[error("sensor utilgjengelig: {0}")]
    Unavailable(String),
}

/// Hendelser sensoren dytter inn i køen.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    Fix(Fix),
    Failure(SensorFailure),
}

/// Seam mot plattformens posisjonssensor. Implementasjonen pusher
/// hendelser inn i senderen den får ved `start`; watcheren er eneste
/// eier av abonnementet (start/stop går alltid via watcheren).
pub trait LocationSource {
    fn permission_status(&self) -> PermissionStatus;
    fn start(&mut self, tx: SyncSender<SensorEvent>) -> Result<(), SensorFailure>;
    fn stop(&mut self);
}

/// Fix Acquisition Controller: eier sensorabonnementet og eksponerer
/// en tilstandsmaskin over tillatelse/nøyaktighet/timeout. Push-drevet
/// sensor-callback er gjort om til en avgrenset kø som `poll()` tømmer,
/// slik at all muteringsflyt går gjennom én skriver.
pub struct FixWatcher {
    state: WatcherState,
    source: Box<dyn LocationSource>,
    clock: Arc<dyn Clock>,
    rx: Option<Receiver<SensorEvent>>,
    latest: Option<Fix>,
    deadline_ms: Option<i64>,
    refreshes: u32,
    got_fix: bool,
}

impl FixWatcher {
    pub fn new(source: Box<dyn LocationSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: WatcherState::Idle,
            source,
            clock,
            rx: None,
            latest: None,
            deadline_ms: None,
            refreshes: 0,
            got_fix: false,
        }
    }

    /// Start innhenting: sjekk tillatelse, abonner, arm first-fix-timeout.
    /// Avslått tillatelse gir fallback-fix og `denied` – aldri feil.
    pub fn start(&mut self) -> Option<Fix> {
        self.state = WatcherState::PermissionCheck;
        if self.source.permission_status() == PermissionStatus::Denied {
            warn!("posisjonstillatelse avslått – bruker fallback");
            return Some(self.degrade(WatcherState::Denied));
        }
        self.begin_acquisition()
    }

    /// Restart innhenting, maks `MAX_REFRESH` ganger. Over budsjettet er
    /// refresh en no-op som lar watcheren stå i gjeldende tilstand.
    pub fn refresh(&mut self) -> Option<Fix> {
        if self.refreshes >= MAX_REFRESH {
            warn!("refresh-budsjett brukt opp ({MAX_REFRESH}) – ignorerer");
            return None;
        }
        self.refreshes += 1;
        debug!("refresh {}/{}", self.refreshes, MAX_REFRESH);
        self.source.stop();
        self.rx = None;
        self.got_fix = false;
        self.start()
    }

    /// Frigjør sensorressursene synkront.
    pub fn stop(&mut self) {
        self.source.stop();
        self.rx = None;
        self.deadline_ms = None;
        self.state = WatcherState::Idle;
    }

    /// Tøm hendelseskøen og håndter timeout. Returnerer fixene som ble
    /// utstedt i dette kallet (inkludert en eventuell fallback-fix).
    pub fn poll(&mut self) -> Vec<Fix> {
        let mut out = Vec::new();
        if !matches!(self.state, WatcherState::Acquiring | WatcherState::Ready) {
            return out;
        }

        // Drener køen først, muter tilstand etterpå (unngår lånekonflikt)
        let mut events = Vec::new();
        let mut disconnected = false;
        if let Some(rx) = &self.rx {
            loop {
                match rx.try_recv() {
                    Ok(ev) => events.push(ev),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        for ev in events {
            match ev {
                SensorEvent::Fix(fix) => {
                    metrics::global().fixes_received.inc();
                    // Første fix kansellerer timeouten (én gang)
                    self.deadline_ms = None;
                    self.got_fix = true;
                    self.latest = Some(fix);
                    if self.state == WatcherState::Acquiring && fix.accuracy_m <= ACCURACY_GATE_M {
                        info!("fix med {:.0} m nøyaktighet – klar", fix.accuracy_m);
                        self.state = WatcherState::Ready;
                    }
                    out.push(fix);
                }
                SensorEvent::Failure(f) => {
                    let to = match f {
                        SensorFailure::PermissionRevoked => WatcherState::Denied,
                        SensorFailure::Unavailable(_) => WatcherState::Error,
                    };
                    warn!("sensorfeil: {f}");
                    out.push(self.degrade(to));
                    return out;
                }
            }
        }

        if disconnected && !self.got_fix {
            out.push(self.degrade(WatcherState::Error));
            return out;
        }

        // First-fix-timeout: ingen fix innen fristen
        if self.state == WatcherState::Acquiring && !self.got_fix {
            if let Some(deadline) = self.deadline_ms {
                if self.clock.now_ms() >= deadline {
                    metrics::global().sensor_timeouts.inc();
                    warn!("ingen fix innen {} ms – timeout", FIRST_FIX_TIMEOUT_MS);
                    out.push(self.degrade(WatcherState::Timeout));
                }
            }
        }

        out
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn latest(&self) -> Option<&Fix> {
        self.latest.as_ref()
    }

    /// Launch-porten: klar OG siste fix innenfor nøyaktighetskravet.
    pub fn can_start(&self) -> bool {
        self.state == WatcherState::Ready
            && self
                .latest
                .map(|f| f.accuracy_m <= ACCURACY_GATE_M)
                .unwrap_or(false)
    }

    pub fn refreshes_used(&self) -> u32 {
        self.refreshes
    }

    fn begin_acquisition(&mut self) -> Option<Fix> {
        let (tx, rx) = sync_channel(FIX_QUEUE_CAP);
        if let Err(f) = self.source.start(tx) {
            warn!("kunne ikke starte sensor: {f}");
            let to = match f {
                SensorFailure::PermissionRevoked => WatcherState::Denied,
                SensorFailure::Unavailable(_) => WatcherState::Error,
            };
            return Some(self.degrade(to));
        }
        self.rx = Some(rx);
        self.deadline_ms = Some(self.clock.now_ms() + FIRST_FIX_TIMEOUT_MS);
        self.state = WatcherState::Acquiring;
        debug!("innhenting startet, frist om {} ms", FIRST_FIX_TIMEOUT_MS);
        None
    }

    /// Degrader til gitt tilstand og utsted fallback-fixen, slik at
    /// konsumenter alltid har *noe* å vise.
    fn degrade(&mut self, to: WatcherState) -> Fix {
        self.source.stop();
        self.rx = None;
        self.deadline_ms = None;
        self.state = to;
        let fix = fallback_fix(self.clock.now_ms());
        metrics::global().fallback_fixes.inc();
        self.latest = Some(fix);
        fix
    }
}

/// Syntetisk fix brukt når sensoren ikke leverer.
pub fn fallback_fix(now_ms: i64) -> Fix {
    Fix {
        lat: FALLBACK_LAT,
        lng: FALLBACK_LNG,
        accuracy_m: FALLBACK_ACCURACY_M,
        source: FixSource::NetworkFallback,
        timestamp_ms: now_ms,
        speed_ms: None,
    }
}
