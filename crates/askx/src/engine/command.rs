//! Inbound text parsing.

/// A parsed inbound text message.
///
/// Parsing happens exactly once per event so the state machine matches on a
/// closed enum instead of re-testing strings. Matching is a case-sensitive
/// prefix check: `/ask me anything` triggers [`Command::Ask`], which absorbs
/// the transport's habit of appending bot mentions and arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Ask,
    Answer,
    Info,
    /// Anything that does not start with a recognized command.
    Free,
}

impl Command {
    /// Parse one inbound text message.
    pub fn parse(text: &str) -> Self {
        if text.starts_with("/start") {
            Self::Start
        } else if text.starts_with("/stop") {
            Self::Stop
        } else if text.starts_with("/info") {
            Self::Info
        } else if text.starts_with("/ask") {
            Self::Ask
        } else if text.starts_with("/answer") {
            Self::Answer
        } else {
            Self::Free
        }
    }
}
