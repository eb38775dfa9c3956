use crate::exchanges::FuturesData;
use crate::refresh::RefreshOrchestrator;
use crate::store::PairStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One-shot message shown on the next rendered index page.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Shared state behind every handler.
pub struct AppState {
    pub exchange: Arc<dyn FuturesData>,
    pub store: PairStore,
    pub orchestrator: RefreshOrchestrator,
    // held for the whole refresh so two triggers never interleave their transactions
    refresh_lock: Mutex<()>,
    // process-wide, there is a single operator
    flashes: Mutex<Vec<Flash>>,
}

impl AppState {
    pub fn new(exchange: Arc<dyn FuturesData>, store: PairStore) -> Self {
        let orchestrator = RefreshOrchestrator::new(Arc::clone(&exchange), store.clone());
        Self {
            exchange,
            store,
            orchestrator,
            refresh_lock: Mutex::new(()),
            flashes: Mutex::new(Vec::new()),
        }
    }

    pub async fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.lock().await.push(Flash {
            level,
            message: message.into(),
        });
    }

    pub async fn take_flashes(&self) -> Vec<Flash> {
        std::mem::take(&mut *self.flashes.lock().await)
    }

    pub fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }
}
