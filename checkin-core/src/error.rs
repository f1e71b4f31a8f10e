use thiserror::Error;

/// Persistence failures surfaced by [`crate::store::ResponseStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("response store unavailable: {0}")]
    Unavailable(String),
}

/// Send/receive failures surfaced by [`crate::transport::Transport`].
///
/// Never retried immediately: a failed broadcast waits for the next
/// scheduled tick, a failed poll backs off before the next poll.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat platform rejected the request: {0}")]
    Api(String),
}
