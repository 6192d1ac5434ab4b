use crate::backend::BackendClient;
use crate::config::Config;
use crate::escalation::{EscalationBus, EscalationView, SharedEscalation};
use crate::session::{Session, SessionSnapshot};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<Mutex<Session>>,
    pub escalation: SharedEscalation,
    pub bus: EscalationBus,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: Config, session: Session) -> Self {
        let backend = BackendClient::new(config.backend_url.clone(), config.network_retries);
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            escalation: Arc::new(Mutex::new(EscalationView::default())),
            bus: EscalationBus::new(),
            backend,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let escalation = self.escalation.lock().await.clone();
        self.session.lock().await.snapshot(escalation)
    }
}
