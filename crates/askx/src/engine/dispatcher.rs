//! Event dispatch and the fault boundary.

use std::sync::Arc;

use tracing::error;

use super::Identity;
use super::notify::{MessageBody, Notice, Notifier};
use super::orchestrator::Orchestrator;
use super::session::SessionStore;

/// Entry point for inbound events.
///
/// Events for one identity run strictly one at a time behind that identity's
/// session lock; independent identities proceed concurrently. Any error from
/// a transition stops here: it is logged, answered with a generic fault
/// notice, and never reaches another identity's session.
pub struct Dispatcher {
    orchestrator: Orchestrator,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        orchestrator: Orchestrator,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            notifier,
        }
    }

    /// Handle one inbound event end to end.
    pub async fn dispatch(&self, identity: Identity, body: MessageBody) {
        let session = self.store.get_or_create(&identity);
        let outcome = {
            let mut session = session.lock().await;
            self.orchestrator
                .handle(&identity, &mut session, body)
                .await
        };

        // The answerer's lock is gone; now the asker's side can be settled.
        match outcome {
            Ok(Some(expired)) => self.orchestrator.reconcile_expired(expired).await,
            Ok(None) => {}
            Err(error) => {
                error!(identity = %identity, %error, "event handling failed");
                self.notifier.notify(&identity, Notice::Fault).await;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
