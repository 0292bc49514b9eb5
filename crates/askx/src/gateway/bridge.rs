//! Glue between the gateway protocol and the engine.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use askx_gateway_protocol::{GatewayCommand, GatewayEvent, MessagePayload};

use crate::engine::{Dispatcher, Identity, MessageBody, Notice, Notifier};
use crate::texts::Texts;

/// Notifier that renders notices and hands them to the transport.
pub struct ChannelNotifier {
    texts: Texts,
    commands: mpsc::Sender<GatewayCommand>,
}

impl ChannelNotifier {
    pub fn new(texts: Texts, commands: mpsc::Sender<GatewayCommand>) -> Self {
        Self { texts, commands }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, to: &Identity, notice: Notice) {
        // The command menu keyboard rides along with greetings only.
        let menu_keyboard = matches!(notice, Notice::Hello { .. });
        let command = GatewayCommand::SendMessage {
            chat_id: to.as_str().to_string(),
            text: self.texts.render(&notice),
            menu_keyboard,
        };
        if self.commands.send(command).await.is_err() {
            warn!(identity = %to, "gateway command channel closed, dropping notice");
        }
    }
}

/// Pump gateway events into the dispatcher until the gateway shuts down.
///
/// Each inbound message runs on its own task; per-identity ordering comes
/// from the session locks, not from this loop, so one slow conversation
/// never stalls the rest.
pub async fn run_event_loop(mut events: mpsc::Receiver<GatewayEvent>, dispatcher: Arc<Dispatcher>) {
    while let Some(event) = events.recv().await {
        match event {
            GatewayEvent::Ready { gateway, version } => {
                info!(gateway = %gateway, version = %version, "gateway ready");
            }
            GatewayEvent::MessageReceived { chat_id, payload } => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let body = match payload {
                        MessagePayload::Text { text } => MessageBody::Text(text),
                        MessagePayload::NonText => MessageBody::Unsupported,
                    };
                    dispatcher.dispatch(Identity::from(chat_id), body).await;
                });
            }
            GatewayEvent::Shutdown { reason } => {
                info!(reason = %reason, "gateway shut down");
                break;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{Orchestrator, QuestionPool, SessionStore, TokenLedger};

    fn dispatcher(notifier: Arc<dyn Notifier>) -> Arc<Dispatcher> {
        let config = EngineConfig::default();
        let pool = Arc::new(QuestionPool::new());
        let ledger = Arc::new(TokenLedger::new(config.starting_balance));
        let store = SessionStore::new();
        let orchestrator = Orchestrator::new(config, pool, ledger, store.clone(), notifier.clone());
        Arc::new(Dispatcher::new(orchestrator, store, notifier))
    }

    #[tokio::test]
    async fn inbound_text_produces_a_rendered_greeting_with_menu() {
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let notifier = Arc::new(ChannelNotifier::new(Texts::default(), command_tx));
        let loop_handle = tokio::spawn(run_event_loop(event_rx, dispatcher(notifier)));

        event_tx
            .send(GatewayEvent::MessageReceived {
                chat_id: "42".to_string(),
                payload: MessagePayload::Text {
                    text: "hello".to_string(),
                },
            })
            .await
            .unwrap();

        match command_rx.recv().await.unwrap() {
            GatewayCommand::SendMessage {
                chat_id,
                text,
                menu_keyboard,
            } => {
                assert_eq!(chat_id, "42");
                assert!(menu_keyboard);
                assert!(text.contains("Tokens: 1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        event_tx
            .send(GatewayEvent::Shutdown {
                reason: "test over".to_string(),
            })
            .await
            .unwrap();
        loop_handle.await.unwrap();
    }

    #[tokio::test]
    async fn non_text_payload_is_rejected_without_menu() {
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let notifier = Arc::new(ChannelNotifier::new(Texts::default(), command_tx));
        tokio::spawn(run_event_loop(event_rx, dispatcher(notifier)));

        event_tx
            .send(GatewayEvent::MessageReceived {
                chat_id: "42".to_string(),
                payload: MessagePayload::NonText,
            })
            .await
            .unwrap();

        match command_rx.recv().await.unwrap() {
            GatewayCommand::SendMessage {
                text,
                menu_keyboard,
                ..
            } => {
                assert_eq!(text, Texts::default().only_text_allowed);
                assert!(!menu_keyboard);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
