use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use checkin_model::{NewResponse, Response, ResponseStats, UserId};

use super::ResponseStore;
use crate::error::StoreError;

/// In-memory [`ResponseStore`] for tests and local development.
///
/// Rows are kept in insertion order; queries sort newest first with ties
/// resolved toward the later insert, matching the database ordering.
#[derive(Debug, Default)]
pub struct InMemoryResponseStore {
    rows: Mutex<Vec<Response>>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut rows: Vec<Response>) -> Vec<Response> {
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn insert(&self, new: NewResponse) -> Result<Response, StoreError> {
        let response = Response {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            question: new.question,
            answer: new.answer,
            created_at: Utc::now(),
        };
        self.rows.lock().push(response.clone());
        Ok(response)
    }

    async fn list_all(&self) -> Result<Vec<Response>, StoreError> {
        Ok(Self::newest_first(self.rows.lock().clone()))
    }

    async fn list_by_user(&self, user: UserId) -> Result<Vec<Response>, StoreError> {
        let rows = self
            .rows
            .lock()
            .iter()
            .filter(|row| row.user_id == user)
            .cloned()
            .collect();
        Ok(Self::newest_first(rows))
    }

    async fn stats(&self) -> Result<ResponseStats, StoreError> {
        let rows = self.rows.lock();
        let unique_users = rows
            .iter()
            .map(|row| row.user_id)
            .collect::<HashSet<_>>()
            .len();
        Ok(ResponseStats {
            total_responses: rows.len() as i64,
            unique_users: unique_users as i64,
        })
    }
}
