//! Timer-driven question broadcaster.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, interval_at};
use tracing::{error, info, warn};

use checkin_model::ChatId;

use crate::catalog::QuestionCatalog;
use crate::conversation::ConversationTable;
use crate::transport::Transport;

/// Formats the outbound check-in message for one question.
pub fn format_checkin(question: &str) -> String {
    format!("📚 Reading Check-in Time!\n\n{question}\n\nPlease reply with your answer.")
}

/// Sends the next catalog question to the configured channel on a fixed
/// period and opens the matching check-in state.
///
/// The rotation cursor only advances after a successful dispatch, so a
/// failed send retries the same question on the next scheduled tick.
/// Without a configured destination every tick degrades to a logged
/// no-op.
pub struct Broadcaster {
    catalog: QuestionCatalog,
    conversations: Arc<ConversationTable>,
    transport: Arc<dyn Transport>,
    destination: Option<ChatId>,
    period: Duration,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("catalog_len", &self.catalog.len())
            .field("destination", &self.destination)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

impl Broadcaster {
    pub fn new(
        catalog: QuestionCatalog,
        conversations: Arc<ConversationTable>,
        transport: Arc<dyn Transport>,
        destination: Option<ChatId>,
        period: Duration,
    ) -> Self {
        Self {
            catalog,
            conversations,
            transport,
            destination,
            period,
        }
    }

    /// Read access for diagnostics and tests; the cursor itself is only
    /// ever mutated by [`Broadcaster::tick`].
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// One broadcast attempt.
    pub async fn tick(&mut self) {
        let Some(destination) = self.destination.clone() else {
            warn!("no destination channel configured; skipping check-in broadcast");
            return;
        };

        let question = self.catalog.current();
        let message = format_checkin(&question.text);
        match self.transport.send_message(&destination, &message).await {
            Ok(()) => {
                let seq = self.conversations.open_checkin(&question.text);
                self.catalog.advance();
                info!(
                    position = question.position,
                    seq,
                    question = %question.text,
                    "broadcast check-in question"
                );
            }
            Err(err) => {
                error!(
                    error = %err,
                    question = %question.text,
                    "failed to broadcast check-in question; retrying on next tick"
                );
            }
        }
    }

    /// Runs until `shutdown` flips. The first broadcast fires one full
    /// period after startup; an in-flight tick always completes before
    /// the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        info!(period = ?self.period, "check-in broadcaster started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            self.tick().await;
        }
        info!("check-in broadcaster stopped");
    }
}
