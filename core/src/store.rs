// core/src/store.rs
use log::{info, warn};
use thiserror::Error;

use crate::models::{HorseRef, SessionSummary};

/// Horse Directory-samarbeidspartneren: fyller PREP-konfigurasjonen.
/// Kjernen har ingen skrivetilgang.
pub trait HorseDirectory {
    fn list_horses(&self) -> Vec<HorseRef>;
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store avviste økt: {0}")]
    Rejected(String),
    #[error("transportfeil: {0}")]
    Transport(String),
}

/// Session Persistence-samarbeidspartneren. Kalles høyst én gang per
/// fullført økt (lagring nøkles på økt-id hos mottakeren).
pub trait SessionStore {
    fn save_session(&self, summary: &SessionSummary) -> Result<(), StoreError>;
}

/// HTTP-basert session store – enkel blocking-versjon (ureq)
pub struct HttpSessionStore {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpSessionStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(10))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }
}

impl SessionStore for HttpSessionStore {
    fn save_session(&self, summary: &SessionSummary) -> Result<(), StoreError> {
        // PUT på økt-id gjør kallet idempotent hos mottakeren
        let url = format!("{}/sessions/{}", self.base_url, summary.session_id);
        let body = serde_json::to_value(summary)
            .map_err(|e| StoreError::Transport(format!("serialisering: {e}")))?;

        match self.agent.put(&url).send_json(body) {
            Ok(_) => {
                info!("økt {} synket til {}", summary.session_id, self.base_url);
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => {
                warn!("store svarte {} for økt {}", code, summary.session_id);
                Err(StoreError::Rejected(format!("http {code}")))
            }
            Err(e) => Err(StoreError::Transport(e.to_string())),
        }
    }
}
