//! Gateway protocol types for communication between the Askx engine and
//! chat-transport gateways.
//!
//! The protocol is bidirectional:
//!
//! - **Commands** (engine → gateway): messages to deliver to a chat.
//! - **Events** (gateway → engine): inbound chat traffic and lifecycle
//!   notifications.
//!
//! Both sides are plain serde-tagged enums carried over in-process channels;
//! the JSON representation is stable so a gateway can also run out of
//! process and speak JSON Lines.

use serde::{Deserialize, Serialize};

// ============================================================================
// Commands (engine → gateway)
// ============================================================================

/// Commands sent from the engine to a gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayCommand {
    /// Deliver a text message to a chat.
    SendMessage {
        chat_id: String,
        text: String,
        /// Attach the command menu reply keyboard (greetings only).
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        menu_keyboard: bool,
    },

    /// Request graceful shutdown.
    Shutdown,
}

// ============================================================================
// Events (gateway → engine)
// ============================================================================

/// Events sent from a gateway to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// The gateway is connected and polling.
    Ready { gateway: String, version: String },

    /// One inbound chat message.
    MessageReceived {
        chat_id: String,
        payload: MessagePayload,
    },

    /// The gateway stopped.
    Shutdown { reason: String },
}

/// Body of one inbound message.
///
/// The engine only distinguishes text from everything else; media, stickers
/// and service messages all collapse into [`MessagePayload::NonText`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePayload {
    Text { text: String },
    NonText,
}

// ============================================================================
// Tests
// ============================================================================
