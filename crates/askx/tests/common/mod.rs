//! Common test utilities.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use askx::config::EngineConfig;
use askx::engine::{
    Dispatcher, Identity, MessageBody, Notice, Notifier, Orchestrator, QuestionPool, SessionState,
    SessionStore, TokenLedger,
};

/// Notifier that records every notice for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Identity, Notice)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, to: &Identity, notice: Notice) {
        self.sent
            .lock()
            .expect("mutex poisoned")
            .push((to.clone(), notice));
    }
}

impl RecordingNotifier {
    /// Notices sent to one identity, in order.
    pub fn sent_to(&self, identity: &Identity) -> Vec<Notice> {
        self.sent
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|(to, _)| to == identity)
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().expect("mutex poisoned").clear();
    }
}

/// A full engine wired to a recording notifier, driven through the
/// dispatcher exactly like gateway traffic.
pub struct TestEngine {
    pub dispatcher: Dispatcher,
    pub notifier: Arc<RecordingNotifier>,
    pub pool: Arc<QuestionPool>,
    pub ledger: Arc<TokenLedger>,
    pub store: SessionStore,
}

pub fn engine() -> TestEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> TestEngine {
    let pool = Arc::new(QuestionPool::new());
    let ledger = Arc::new(TokenLedger::new(config.starting_balance));
    let store = SessionStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let orchestrator = Orchestrator::new(
        config,
        pool.clone(),
        ledger.clone(),
        store.clone(),
        notifier.clone(),
    );
    let dispatcher = Dispatcher::new(orchestrator, store.clone(), notifier.clone());
    TestEngine {
        dispatcher,
        notifier,
        pool,
        ledger,
        store,
    }
}

impl TestEngine {
    /// Deliver one text message from `identity`.
    pub async fn text(&self, identity: &Identity, text: &str) {
        self.dispatcher
            .dispatch(identity.clone(), MessageBody::Text(text.to_string()))
            .await;
    }

    /// Deliver one non-text message from `identity`.
    pub async fn media(&self, identity: &Identity) {
        self.dispatcher
            .dispatch(identity.clone(), MessageBody::Unsupported)
            .await;
    }

    pub async fn state_of(&self, identity: &Identity) -> SessionState {
        let session = self.store.get_or_create(identity);
        let session = session.lock().await;
        session.state
    }
}
