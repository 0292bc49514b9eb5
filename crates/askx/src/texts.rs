//! User-facing message templates.
//!
//! The engine emits [`Notice`] values; this module turns them into the
//! strings a chat user actually sees. Every template can be overridden from
//! the config file, individually, with `{placeholder}` markers substituted
//! at render time.

use serde::Deserialize;

use crate::engine::Notice;

/// Template set, one entry per notice kind.
///
/// Placeholders by template: `{balance}` in `hello` and `info`; `{text}` in
/// `question` and `answer`; `{identity}`, `{identities}` and `{questions}`
/// in `info`. Unknown markers pass through untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub hello: String,
    pub fault: String,
    pub input_question: String,
    pub question: String,
    pub no_questions: String,
    pub question_created: String,
    pub answer: String,
    pub answer_sent: String,
    pub question_stopped: String,
    pub question_stop_help: String,
    pub only_text_allowed: String,
    pub no_tokens: String,
    pub info: String,
    pub gift_token: String,
    pub question_expired: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            hello: "Hello! Ask the crowd anonymously, or answer someone else.\n\n\
                    /ask - post your own question\n\
                    /answer - answer a random question\n\
                    /info - your balance and stats\n\n\
                    Tokens: {balance}"
                .to_string(),
            fault: "Something went wrong. Send /start to continue.".to_string(),
            input_question: "Type your question as one message.".to_string(),
            question: "Someone asks:\n\n{text}\n\nType your answer as one message.".to_string(),
            no_questions: "No questions are waiting right now. Come back later, or /ask your own."
                .to_string(),
            question_created:
                "Your question is in the pool. Answers will arrive here anonymously. \
                 /stop withdraws it."
                    .to_string(),
            answer: "You received an answer:\n\n{text}".to_string(),
            answer_sent: "Your answer was delivered. You earned a token.".to_string(),
            question_stopped: "Your question was withdrawn from the pool.".to_string(),
            question_stop_help:
                "Your question is still collecting answers. Send /stop to withdraw it."
                    .to_string(),
            only_text_allowed: "Only plain text messages work here.".to_string(),
            no_tokens: "Not enough tokens to ask. Answer questions with /answer to earn more."
                .to_string(),
            info: "Balance: {balance}\n\
                   Your id: {identity}\n\
                   People here: {identities}\n\
                   Questions in pool: {questions}"
                .to_string(),
            gift_token: "Topped up your tokens so you can /ask a question of your own."
                .to_string(),
            question_expired: "Your question expired and left the pool. /ask to post a new one."
                .to_string(),
        }
    }
}

impl Texts {
    /// Render one notice to its user-facing string.
    pub fn render(&self, notice: &Notice) -> String {
        match notice {
            Notice::Hello { balance } => self.hello.replace("{balance}", &balance.to_string()),
            Notice::Fault => self.fault.clone(),
            Notice::InputQuestion => self.input_question.clone(),
            Notice::Question { text } => self.question.replace("{text}", text),
            Notice::NoQuestions => self.no_questions.clone(),
            Notice::QuestionCreated => self.question_created.clone(),
            Notice::Answer { text } => self.answer.replace("{text}", text),
            Notice::AnswerSent => self.answer_sent.clone(),
            Notice::QuestionStopped => self.question_stopped.clone(),
            Notice::QuestionStopHelp => self.question_stop_help.clone(),
            Notice::OnlyTextAllowed => self.only_text_allowed.clone(),
            Notice::NoTokens => self.no_tokens.clone(),
            Notice::Info {
                balance,
                identity,
                identity_count,
                question_count,
            } => self
                .info
                .replace("{balance}", &balance.to_string())
                .replace("{identity}", identity.as_str())
                .replace("{identities}", &identity_count.to_string())
                .replace("{questions}", &question_count.to_string()),
            Notice::GiftToken => self.gift_token.clone(),
            Notice::QuestionExpired => self.question_expired.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
