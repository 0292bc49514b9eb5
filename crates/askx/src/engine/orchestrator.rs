//! The per-identity state machine.
//!
//! One inbound event is parsed into a [`Command`], matched against the
//! session's current [`SessionState`], and handled while the dispatcher
//! holds that identity's session lock. Transitions touch the shared pool
//! and ledger directly; everything user-visible leaves through the
//! [`Notifier`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::EngineConfig;

use super::Identity;
use super::command::Command;
use super::error::{EngineError, Result};
use super::ledger::TokenLedger;
use super::notify::{MessageBody, Notice, Notifier};
use super::pool::{QuestionId, QuestionPool};
use super::session::{MatchSnapshot, Session, SessionState, SessionStore};

/// Deferred cleanup order: a delivered answer targeted a question whose
/// lifetime had already run out.
///
/// Produced under the answerer's session lock, executed by the dispatcher
/// after that lock is released, so no event ever holds two session locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredMatch {
    pub asker: Identity,
    pub question_id: QuestionId,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns every state transition of the engine.
pub struct Orchestrator {
    config: EngineConfig,
    pool: Arc<QuestionPool>,
    ledger: Arc<TokenLedger>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    pub fn new(
        config: EngineConfig,
        pool: Arc<QuestionPool>,
        ledger: Arc<TokenLedger>,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            pool,
            ledger,
            store,
            notifier,
        }
    }

    /// Handle one inbound event for `identity`.
    ///
    /// The caller holds this identity's session lock for the whole call.
    /// `/start`, `/stop` and `/info` are honored in every state; `/ask` and
    /// `/answer` only in Idle, so while a session is composing they pass
    /// through as ordinary text. A returned [`ExpiredMatch`] must be settled
    /// via [`Orchestrator::reconcile_expired`] once the lock is gone.
    pub async fn handle(
        &self,
        identity: &Identity,
        session: &mut Session,
        body: MessageBody,
    ) -> Result<Option<ExpiredMatch>> {
        let text = match body {
            MessageBody::Text(text) => text,
            MessageBody::Unsupported => {
                self.notifier.notify(identity, Notice::OnlyTextAllowed).await;
                return Ok(None);
            }
        };

        match (Command::parse(&text), session.state) {
            (Command::Start, _) => {
                self.reset(identity, session, true).await;
            }
            (Command::Stop, SessionState::AwaitingReplies) => {
                // Withdrawal only, no greeting.
                self.reset(identity, session, false).await;
            }
            (Command::Stop, _) => {
                self.reset(identity, session, true).await;
            }
            (Command::Info, _) => {
                self.send_info(identity).await;
            }
            (_, SessionState::AwaitingQuestionText) => {
                self.accept_question_text(identity, session, &text).await;
            }
            (_, SessionState::AwaitingAnswerText) => {
                return self.accept_answer_text(identity, session, &text).await;
            }
            (Command::Ask, SessionState::Idle) => {
                self.start_ask(identity, session).await?;
            }
            (Command::Answer, SessionState::Idle) => {
                self.start_answer(identity, session).await;
            }
            (Command::Free, SessionState::Idle) => {
                let balance = self.ledger.balance(identity);
                self.notifier.notify(identity, Notice::Hello { balance }).await;
            }
            (_, SessionState::AwaitingReplies) => {
                self.notifier.notify(identity, Notice::QuestionStopHelp).await;
            }
        }

        Ok(None)
    }

    /// Settle an [`ExpiredMatch`] against the asker's session.
    ///
    /// Runs under the asker's own lock. The stale question is only reclaimed
    /// if the asker is still waiting on that exact id; an asker that reset,
    /// withdrew, or re-asked in the meantime is left alone.
    pub async fn reconcile_expired(&self, expired: ExpiredMatch) {
        let Some(session) = self.store.get(&expired.asker) else {
            return;
        };
        let mut session = session.lock().await;
        if session.state != SessionState::AwaitingReplies
            || session.own_question != Some(expired.question_id)
        {
            return;
        }

        self.pool.remove(expired.question_id);
        session.state = SessionState::Idle;
        session.clear_transient();
        info!(
            identity = %expired.asker,
            question_id = %expired.question_id,
            "expired question reclaimed"
        );
        self.notifier
            .notify(&expired.asker, Notice::QuestionExpired)
            .await;
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Return to Idle, withdrawing any pooled question on the way.
    async fn reset(&self, identity: &Identity, session: &mut Session, greet: bool) {
        session.state = SessionState::Idle;
        if let Some(question_id) = session.own_question {
            self.pool.remove(question_id);
            info!(identity = %identity, question_id = %question_id, "question withdrawn");
            self.notifier.notify(identity, Notice::QuestionStopped).await;
        }
        session.clear_transient();

        if greet {
            let balance = self.ledger.balance(identity);
            self.notifier.notify(identity, Notice::Hello { balance }).await;
        }
    }

    async fn send_info(&self, identity: &Identity) {
        let notice = Notice::Info {
            balance: self.ledger.balance(identity),
            identity: identity.clone(),
            identity_count: self.store.len(),
            question_count: self.pool.len(),
        };
        self.notifier.notify(identity, notice).await;
    }

    /// Idle + `/ask`: pay up front, then wait for the question text.
    async fn start_ask(&self, identity: &Identity, session: &mut Session) -> Result<()> {
        if !self.ledger.can_afford(identity, self.config.question_cost) {
            self.notifier.notify(identity, Notice::NoTokens).await;
            return Ok(());
        }

        self.ledger.charge(identity, self.config.question_cost)?;
        session.state = SessionState::AwaitingQuestionText;
        self.notifier.notify(identity, Notice::InputQuestion).await;
        Ok(())
    }

    /// Idle + `/answer`: draw a random question, or console an empty pool.
    async fn start_answer(&self, identity: &Identity, session: &mut Session) {
        let Some(question) = self.pool.pick_random() else {
            self.notifier.notify(identity, Notice::NoQuestions).await;
            if !self.ledger.can_afford(identity, self.config.question_cost) {
                // Top up to the asking price, not beyond it.
                self.ledger
                    .grant_if_below(identity, self.config.question_cost);
                self.notifier.notify(identity, Notice::GiftToken).await;
            }
            return;
        };

        session.state = SessionState::AwaitingAnswerText;
        session.answer_target = Some(question.asker.clone());
        session.matched = Some(MatchSnapshot {
            question_id: question.id,
            expires_at: question.expires_at(self.config.question_lifetime()),
        });
        debug!(identity = %identity, question_id = %question.id, "matched with question");
        self.notifier
            .notify(identity, Notice::Question { text: question.text })
            .await;
    }

    async fn accept_question_text(&self, identity: &Identity, session: &mut Session, text: &str) {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > self.config.question_max_chars {
            self.notifier.notify(identity, Notice::Fault).await;
            return;
        }

        let question_id = self.pool.add(text, identity.clone());
        session.state = SessionState::AwaitingReplies;
        session.own_question = Some(question_id);
        info!(identity = %identity, question_id = %question_id, "question pooled");
        self.notifier.notify(identity, Notice::QuestionCreated).await;
    }

    /// Forward the answer, pay the reward, and judge the match's age.
    ///
    /// Late answers still count for both sides; what expires is the asker's
    /// wait, settled afterwards by the dispatcher.
    async fn accept_answer_text(
        &self,
        identity: &Identity,
        session: &mut Session,
        text: &str,
    ) -> Result<Option<ExpiredMatch>> {
        let Some(asker) = session.answer_target.clone() else {
            return Err(EngineError::MissingAnswerTarget(identity.clone()));
        };
        let matched = session.matched;

        self.notifier
            .notify(
                &asker,
                Notice::Answer {
                    text: text.to_string(),
                },
            )
            .await;
        self.ledger.credit(identity, self.config.answer_reward);
        self.notifier.notify(identity, Notice::AnswerSent).await;
        debug!(identity = %identity, asker = %asker, "answer delivered");

        session.state = SessionState::Idle;
        session.clear_transient();

        Ok(matched
            .filter(|snapshot| Utc::now() > snapshot.expires_at)
            .map(|snapshot| ExpiredMatch {
                asker,
                question_id: snapshot.question_id,
            }))
    }
}

// ============================================================================
// Tests
// ============================================================================
