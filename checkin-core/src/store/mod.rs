//! Durable response log: write/query port plus its implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use checkin_model::{NewResponse, Response, ResponseStats, UserId};

use crate::error::StoreError;

pub use memory::InMemoryResponseStore;
pub use postgres::PgResponseStore;

/// Append-only log of answered check-ins.
///
/// The store owns id and timestamp generation; callers never supply them.
/// There is no dedup: two structurally identical responses are both
/// retained. Statistics are computed fresh per call, so back-to-back
/// calls may observe different snapshots under concurrent inserts.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn insert(&self, new: NewResponse) -> Result<Response, StoreError>;

    /// Full scan, newest first. Unbounded.
    async fn list_all(&self) -> Result<Vec<Response>, StoreError>;

    /// Single-user scan, newest first.
    async fn list_by_user(&self, user: UserId) -> Result<Vec<Response>, StoreError>;

    async fn stats(&self) -> Result<ResponseStats, StoreError>;
}
