//! Inbound reply routing: matches free-text replies to the open check-in
//! and persists them.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use checkin_model::{ChatId, NewResponse, UserProfile};

use crate::conversation::ConversationTable;
use crate::store::ResponseStore;
use crate::transport::{Command, InboundEvent, Transport};

const WELCOME_TEXT: &str = "👋 Welcome to the Book Reading Check-in Bot!\n\n\
    I will send you questions about your reading progress every 5 minutes.\n\
    Simply reply to my questions, and your responses will be recorded.\n\n\
    Commands:\n\
    /start - Show this welcome message\n\
    /status - Check bot status";
const STATUS_TEXT: &str =
    "✅ Bot is active and running!\nNext check-in question coming soon...";
const RECORDED_TEXT: &str = "✅ Thank you! Your response has been recorded.";
const STORE_FAILED_TEXT: &str =
    "❌ Sorry, there was an error saving your response. Please try again.";

/// Result of routing one inbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Recorded,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Empty,
    NotAwaiting,
    StoreFailed,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::Empty => write!(f, "empty"),
            IgnoreReason::NotAwaiting => write!(f, "not-awaiting"),
            IgnoreReason::StoreFailed => write!(f, "store-error"),
        }
    }
}

/// Routes inbound events against the conversation state and the store.
pub struct ReplyRouter {
    conversations: Arc<ConversationTable>,
    store: Arc<dyn ResponseStore>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ReplyRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyRouter").finish_non_exhaustive()
    }
}

impl ReplyRouter {
    pub fn new(
        conversations: Arc<ConversationTable>,
        store: Arc<dyn ResponseStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            conversations,
            store,
            transport,
        }
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::Text {
                chat,
                profile,
                text,
            } => {
                let outcome = self.handle_text(&chat, &profile, &text).await;
                debug!(user = %profile.id, ?outcome, "routed inbound text");
            }
            InboundEvent::Command { chat, command, .. } => {
                self.handle_command(&chat, command).await;
            }
        }
    }

    /// Matches one free-text reply to the question it answers.
    ///
    /// Side effects are strictly: one state mutation, one store write on
    /// the success path, one outbound acknowledgement.
    pub async fn handle_text(
        &self,
        chat: &ChatId,
        profile: &UserProfile,
        text: &str,
    ) -> Outcome {
        if text.trim().is_empty() {
            return Outcome::Ignored(IgnoreReason::Empty);
        }

        let Some(pending) = self.conversations.claim(profile.id) else {
            return Outcome::Ignored(IgnoreReason::NotAwaiting);
        };

        let new = NewResponse::from_profile(profile, &pending.question, text);
        match self.store.insert(new).await {
            Ok(saved) => {
                info!(user = %saved.username, id = %saved.id, "saved check-in response");
                self.reply(chat, RECORDED_TEXT).await;
                Outcome::Recorded
            }
            Err(err) => {
                // Leave the user awaiting so the reply is not lost; they
                // are told to resend.
                self.conversations.reopen(profile.id, pending.seq);
                error!(error = %err, user = %profile.id, "failed to save check-in response");
                self.reply(chat, STORE_FAILED_TEXT).await;
                Outcome::Ignored(IgnoreReason::StoreFailed)
            }
        }
    }

    async fn handle_command(&self, chat: &ChatId, command: Command) {
        let reply = match command {
            Command::Start => WELCOME_TEXT,
            Command::Status => STATUS_TEXT,
        };
        self.reply(chat, reply).await;
    }

    /// Acknowledgements are best-effort: a failed send never undoes a
    /// stored row.
    async fn reply(&self, chat: &ChatId, text: &str) {
        if let Err(err) = self.transport.send_message(chat, text).await {
            warn!(error = %err, chat = %chat, "failed to send reply");
        }
    }
}
