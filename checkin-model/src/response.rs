use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::UserId;

/// Sentinel recorded when the chat platform exposes no username.
pub const UNKNOWN_USERNAME: &str = "unknown";

/// Identity fields delivered with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// A recorded answer to a broadcast check-in question.
///
/// Rows are append-only; `question` is a denormalized copy of the text at
/// send time, so the catalog can rotate or change without invalidating
/// history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Response {
    pub id: Uuid,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// An answer ready to persist. The store assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponse {
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub question: String,
    pub answer: String,
}

impl NewResponse {
    /// Builds a response from a profile, filling the optional fields the
    /// same way the bot always has: missing username becomes the
    /// `"unknown"` sentinel, missing last name becomes empty.
    pub fn from_profile(profile: &UserProfile, question: &str, answer: &str) -> Self {
        Self {
            user_id: profile.id,
            username: profile
                .username
                .clone()
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone().unwrap_or_default(),
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}

/// Aggregate counters derived from the response log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ResponseStats {
    pub total_responses: i64,
    pub unique_users: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(username: Option<&str>, last_name: Option<&str>) -> UserProfile {
        UserProfile {
            id: UserId(42),
            username: username.map(str::to_string),
            first_name: "Jo".to_string(),
            last_name: last_name.map(str::to_string),
        }
    }

    #[test]
    fn from_profile_keeps_known_fields() {
        let new = NewResponse::from_profile(&profile(Some("abc"), Some("Reader")), "Q1", "42 pages");
        assert_eq!(new.user_id, UserId(42));
        assert_eq!(new.username, "abc");
        assert_eq!(new.last_name, "Reader");
        assert_eq!(new.question, "Q1");
        assert_eq!(new.answer, "42 pages");
    }

    #[test]
    fn from_profile_defaults_missing_fields() {
        let new = NewResponse::from_profile(&profile(None, None), "Q1", "yes");
        assert_eq!(new.username, UNKNOWN_USERNAME);
        assert_eq!(new.last_name, "");
    }
}
