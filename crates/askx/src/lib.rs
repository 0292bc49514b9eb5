//! Askx: anonymous Q&A matching over a chat transport.
//!
//! The bot pairs people who want to ask a question with people willing to
//! answer one, without revealing who is who. Asking costs tokens, answering
//! earns them, and questions expire after a while so the pool never fills
//! with dead weight.
//!
//! Layout:
//!
//! - [`engine`]: the matching and session engine, with the per-identity
//!   state machines, the question pool, the token ledger, and dispatch.
//! - [`texts`]: user-facing message templates with config overrides.
//! - [`config`]: YAML configuration with environment-variable expansion.
//! - [`gateway`]: the bridge between the engine and a chat gateway.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod texts;
