//! Gateway system: the chat-transport side of the engine.
//!
//! A gateway owns one chat platform connection and speaks the gateway
//! protocol over in-process channels: [`GatewayEvent`]s flow in (inbound
//! messages, lifecycle), [`GatewayCommand`]s flow out (messages to
//! deliver). The [`bridge`] turns those events into engine dispatches and
//! engine notices into commands, so the engine itself never sees a chat
//! platform type.

pub mod bridge;

// Re-export protocol types from the protocol crate
pub use askx_gateway_protocol::{GatewayCommand, GatewayEvent, MessagePayload};

// Re-export the Telegram gateway from its crate
pub use askx_gateway_telegram::{TelegramConfig, TelegramGateway};

pub use bridge::{ChannelNotifier, run_event_loop};
