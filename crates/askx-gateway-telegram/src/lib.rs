//! Telegram gateway for Askx using teloxide.
//!
//! Runs long polling against the Bot API, forwards every inbound message as
//! a [`GatewayEvent`] and delivers [`GatewayCommand`]s back to chats. The
//! engine stays transport-agnostic; this crate owns everything
//! Telegram-specific, including the reply-keyboard menu attached to
//! greetings.

use askx_gateway_protocol::{GatewayCommand, GatewayEvent, MessagePayload};
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, MediaKind, MessageKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the Telegram gateway.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Telegram bot token from BotFather.
    pub bot_token: String,
}

impl TelegramConfig {
    /// Create a new config with the given bot token.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
        }
    }
}

// ============================================================================
// Telegram Gateway
// ============================================================================

/// Telegram gateway that bridges the Bot API with the Askx engine.
pub struct TelegramGateway {
    config: TelegramConfig,
}

impl TelegramGateway {
    /// Create a new Telegram gateway.
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }

    /// Start the gateway and communicate via the provided channels.
    ///
    /// This method blocks until shutdown is requested.
    pub async fn start(
        self,
        event_tx: mpsc::Sender<GatewayEvent>,
        mut command_rx: mpsc::Receiver<GatewayCommand>,
    ) {
        // Configure HTTP client with timeout longer than polling timeout
        let client = teloxide::net::default_reqwest_settings()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        let bot = Bot::with_client(&self.config.bot_token, client);

        let ready_event = GatewayEvent::Ready {
            gateway: "telegram".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        if event_tx.send(ready_event).await.is_err() {
            error!("Failed to send ready event");
            return;
        }

        info!("Telegram gateway starting");

        // Build dispatcher and get shutdown token for graceful shutdown
        let message_handler = Update::filter_message().endpoint({
            let event_tx = event_tx.clone();
            move |msg: Message| {
                let event_tx = event_tx.clone();
                async move {
                    if let Err(e) = forward_message(&msg, &event_tx).await {
                        warn!(error = %e, "Failed to forward message");
                    }
                    respond(())
                }
            }
        });

        let mut dispatcher = Dispatcher::builder(bot.clone(), message_handler).build();
        let shutdown_token = dispatcher.shutdown_token();

        let bot_for_commands = bot.clone();
        let event_tx_for_commands = event_tx.clone();

        // Spawn command handler
        let command_handle = tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                match command {
                    GatewayCommand::SendMessage {
                        chat_id,
                        text,
                        menu_keyboard,
                    } => {
                        if let Err(e) =
                            send_message(&bot_for_commands, &chat_id, &text, menu_keyboard).await
                        {
                            warn!(chat_id = %chat_id, error = %e, "Failed to send message");
                        }
                    }

                    GatewayCommand::Shutdown => {
                        info!("Telegram gateway received shutdown command");
                        match shutdown_token.shutdown() {
                            Ok(wait) => wait.await,
                            Err(e) => warn!(error = %e, "Dispatcher was not running"),
                        }
                        let _ = event_tx_for_commands
                            .send(GatewayEvent::Shutdown {
                                reason: "shutdown requested".to_string(),
                            })
                            .await;
                        break;
                    }
                }
            }
            debug!("Command handler stopped");
        });

        // Configure long polling with appropriate timeout
        let polling = teloxide::update_listeners::Polling::builder(bot)
            .timeout(std::time::Duration::from_secs(30))
            .build();

        // Start the dispatcher (this blocks until shutdown)
        dispatcher
            .dispatch_with_listener(
                polling,
                teloxide::error_handlers::LoggingErrorHandler::with_custom_text(
                    "Telegram polling error (will retry)",
                ),
            )
            .await;

        command_handle.abort();
        info!("Telegram gateway stopped");
    }
}

// ============================================================================
// Message Handling
// ============================================================================

async fn forward_message(
    msg: &Message,
    event_tx: &mpsc::Sender<GatewayEvent>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = GatewayEvent::MessageReceived {
        chat_id: msg.chat.id.0.to_string(),
        payload: extract_payload(msg),
    };
    event_tx.send(event).await?;
    Ok(())
}

/// Reduce a Telegram message to the engine's text / non-text distinction.
fn extract_payload(msg: &Message) -> MessagePayload {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(text) => MessagePayload::Text {
                text: text.text.clone(),
            },
            _ => MessagePayload::NonText,
        },
        _ => MessagePayload::NonText,
    }
}

// ============================================================================
// Command Execution
// ============================================================================

async fn send_message(
    bot: &Bot,
    chat_id: &str,
    text: &str,
    menu_keyboard: bool,
) -> Result<(), String> {
    let chat_id: i64 = chat_id.parse().map_err(|_| "invalid chat_id".to_string())?;

    let mut request = bot.send_message(ChatId(chat_id), text);
    if menu_keyboard {
        request = request.reply_markup(build_menu_keyboard());
    }

    request.await.map_err(|e| e.to_string())?;
    Ok(())
}

/// The persistent command menu shown with greetings.
fn build_menu_keyboard() -> KeyboardMarkup {
    let rows = vec![
        vec![KeyboardButton::new("/ask"), KeyboardButton::new("/answer")],
        vec![KeyboardButton::new("/start")],
        vec![KeyboardButton::new("/stop")],
    ];
    let mut keyboard = KeyboardMarkup::new(rows);
    keyboard.resize_keyboard = true;
    keyboard
}
