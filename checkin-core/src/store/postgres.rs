use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use checkin_model::{NewResponse, Response, ResponseStats, UserId};

use super::ResponseStore;
use crate::error::StoreError;

const SELECT_COLUMNS: &str =
    "id, user_id, username, first_name, last_name, question, answer, created_at";

/// PostgreSQL-backed implementation of the [`ResponseStore`] port.
#[derive(Clone)]
pub struct PgResponseStore {
    pool: PgPool,
}

impl PgResponseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl std::fmt::Debug for PgResponseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgResponseStore")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl ResponseStore for PgResponseStore {
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

        sqlx::query(
            "INSERT INTO responses \
             (id, user_id, username, first_name, last_name, question, answer, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(response.id)
        .bind(response.user_id)
        .bind(&response.username)
        .bind(&response.first_name)
        .bind(&response.last_name)
        .bind(&response.question)
        .bind(&response.answer)
        .bind(response.created_at)
        .execute(self.pool())
        .await?;

        Ok(response)
    }

    async fn list_all(&self) -> Result<Vec<Response>, StoreError> {
        let rows = sqlx::query_as::<_, Response>(&format!(
            "SELECT {SELECT_COLUMNS} FROM responses ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn list_by_user(&self, user: UserId) -> Result<Vec<Response>, StoreError> {
        let rows = sqlx::query_as::<_, Response>(&format!(
            "SELECT {SELECT_COLUMNS} FROM responses \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn stats(&self) -> Result<ResponseStats, StoreError> {
        let stats = sqlx::query_as::<_, ResponseStats>(
            "SELECT COUNT(*) AS total_responses, \
             COUNT(DISTINCT user_id) AS unique_users FROM responses",
        )
        .fetch_one(self.pool())
        .await?;
        Ok(stats)
    }
}
