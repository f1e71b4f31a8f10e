//! Outbound messaging port and inbound event types.
//!
//! The engine talks to the chat platform through [`Transport`]; the
//! concrete Telegram Bot API client lives in [`telegram`].

pub mod telegram;

use async_trait::async_trait;

use checkin_model::{ChatId, UserProfile};

use crate::error::TransportError;

pub use telegram::TelegramTransport;

/// Outbound message delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat: &ChatId, text: &str) -> Result<(), TransportError>;
}

/// Commands the bot answers with static help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
}

impl Command {
    /// Parses a leading bot command, tolerating the `@BotName` suffix
    /// Telegram appends in group chats. Unknown commands return `None`
    /// and flow through as plain text, as they always have.
    pub fn parse(text: &str) -> Option<Command> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Command::Start),
            "status" => Some(Command::Status),
            _ => None,
        }
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Text {
        chat: ChatId,
        profile: UserProfile,
        text: String,
    },
    Command {
        chat: ChatId,
        profile: UserProfile,
        command: Command,
    },
}
