//! Core library for the reading check-in service.
//!
//! Implements the conversation-state and scheduling engine behind the bot:
//!
//! - [`catalog::QuestionCatalog`]: the fixed question rotation
//! - [`broadcast::Broadcaster`]: the timer-driven question broadcaster
//! - [`conversation::ConversationTable`]: per-user awaiting state
//! - [`router::ReplyRouter`]: matches inbound replies to open check-ins
//! - [`store`]: durable response log with derived statistics
//! - [`transport`]: outbound messaging port and the Telegram implementation

pub mod broadcast;
pub mod catalog;
pub mod conversation;
pub mod error;
pub mod router;
pub mod store;
pub mod transport;

pub use broadcast::Broadcaster;
pub use catalog::QuestionCatalog;
pub use conversation::{ConversationTable, PendingQuestion};
pub use error::{StoreError, TransportError};
pub use router::{IgnoreReason, Outcome, ReplyRouter};
pub use store::{InMemoryResponseStore, PgResponseStore, ResponseStore};
pub use transport::{Command, InboundEvent, Transport};

/// Embedded schema migrations, applied by the server at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
