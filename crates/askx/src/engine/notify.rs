//! Inbound/outbound message boundary.

use async_trait::async_trait;

use super::Identity;

/// Body of one inbound chat message.
///
/// The engine only distinguishes text from everything else; media, stickers
/// and service messages arrive as [`MessageBody::Unsupported`] and are
/// rejected uniformly regardless of state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Unsupported,
}

/// One outbound notice addressed to a single identity.
///
/// The engine decides *what* to say; rendering to user-facing text happens
/// at the transport boundary (see `crate::texts`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Greeting and menu, with the current balance.
    Hello { balance: u32 },
    /// Generic failure notice for the acting identity.
    Fault,
    /// Prompt to type the question text.
    InputQuestion,
    /// A pooled question shown to a prospective answerer.
    Question { text: String },
    NoQuestions,
    QuestionCreated,
    /// An incoming answer, forwarded to the asker.
    Answer { text: String },
    AnswerSent,
    QuestionStopped,
    /// Reminder that /stop withdraws the pending question.
    QuestionStopHelp,
    OnlyTextAllowed,
    NoTokens,
    /// Balance and population report.
    Info {
        balance: u32,
        identity: Identity,
        identity_count: usize,
        question_count: usize,
    },
    /// Free tokens granted so the identity can afford its own question.
    GiftToken,
    /// The identity's question expired and was reclaimed.
    QuestionExpired,
}

/// Outbound delivery boundary, implemented by the gateway bridge.
///
/// Fire and forget: implementations log delivery failures; the engine never
/// observes them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &Identity, notice: Notice);
}

// ============================================================================
// Test Support
// ============================================================================
