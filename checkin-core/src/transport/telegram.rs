//! Telegram Bot API client: outbound sends plus a long-polling update
//! stream in the shape the rest of the engine consumes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use checkin_model::{ChatId, UserId, UserProfile};

use super::{Command, InboundEvent, Transport};
use crate::error::TransportError;

const API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(15);
const POLL_TIMEOUT_SECS: u64 = 25;
const POLL_RETRY_BACKOFF: Duration = Duration::from_secs(5);
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramTransport {
    http: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // base_url embeds the bot token; keep it out of logs.
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: format!("{API_BASE}/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Duration,
    ) -> Result<T, TransportError> {
        let envelope: ApiEnvelope<T> = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(&params)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(TransportError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed without description")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Api(format!("{method} returned no result")))
    }

    /// Verifies the bot token. A rejection here is startup-fatal for the
    /// server: the process must not come up with a credential the
    /// platform refuses.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", json!({}), SEND_TIMEOUT).await
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
            // Request timeout must outlive the server-side long poll.
            Duration::from_secs(POLL_TIMEOUT_SECS + 10),
        )
        .await
    }

    /// Spawns the long-polling loop and returns the decoded event stream.
    ///
    /// Poll failures are logged and retried after a bounded backoff. The
    /// loop exits once `shutdown` flips; events already queued drain
    /// before the stream ends, and dropping the stream also stops it.
    pub fn subscribe(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ReceiverStream<InboundEvent> {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let transport = Arc::clone(self);
        tokio::spawn(async move {
            let mut offset = 0i64;
            loop {
                let polled = tokio::select! {
                    _ = shutdown.changed() => break,
                    polled = transport.get_updates(offset) => polled,
                };
                match polled {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(event) = classify(update) {
                                if tx.send(event).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "polling for updates failed; backing off");
                        tokio::select! {
                            _ = shutdown.changed() => break,
                            _ = sleep(POLL_RETRY_BACKOFF) => {}
                        }
                    }
                }
            }
            debug!("update polling stopped");
        });
        ReceiverStream::new(rx)
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(&self, chat: &ChatId, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({ "chat_id": chat.0, "text": text }),
                SEND_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}

/// Decodes one update into an engine event. Non-text messages and
/// messages without a sender are dropped.
fn classify(update: Update) -> Option<InboundEvent> {
    let message = update.message?;
    let text = message.text?;
    let from = message.from?;
    let chat = ChatId::from(message.chat.id);
    let profile = UserProfile {
        id: UserId(from.id),
        username: from.username,
        first_name: if from.first_name.is_empty() {
            "Unknown".to_string()
        } else {
            from.first_name
        },
        last_name: from.last_name,
    };
    match Command::parse(&text) {
        Some(command) => Some(InboundEvent::Command {
            chat,
            profile,
            command,
        }),
        None => Some(InboundEvent::Text {
            chat,
            profile,
            text,
        }),
    }
}
