//! Fake collaborators for exercising the engine without a chat platform
//! or a database.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use checkin_core::error::{StoreError, TransportError};
use checkin_core::store::ResponseStore;
use checkin_core::transport::Transport;
use checkin_model::{ChatId, NewResponse, Response, ResponseStats, UserId, UserProfile};

/// Records every send attempt; optionally fails the next N of them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    attempts: Mutex<Vec<(ChatId, String)>>,
    fail_remaining: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, sends: usize) {
        self.fail_remaining.store(sends, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<(ChatId, String)> {
        self.attempts.lock().clone()
    }

    pub fn attempted_texts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, chat: &ChatId, text: &str) -> Result<(), TransportError> {
        self.attempts.lock().push((chat.clone(), text.to_string()));
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::Api("injected send failure".to_string()));
        }
        Ok(())
    }
}

/// A store whose writes always fail, for the insert-failure path.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl ResponseStore for FailingStore {
    async fn insert(&self, _new: NewResponse) -> Result<Response, StoreError> {
        Err(StoreError::Unavailable("injected store failure".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Response>, StoreError> {
        Err(StoreError::Unavailable("injected store failure".to_string()))
    }

    async fn list_by_user(&self, _user: UserId) -> Result<Vec<Response>, StoreError> {
        Err(StoreError::Unavailable("injected store failure".to_string()))
    }

    async fn stats(&self) -> Result<ResponseStats, StoreError> {
        Err(StoreError::Unavailable("injected store failure".to_string()))
    }
}

pub fn profile(id: i64, username: Option<&str>, first_name: &str) -> UserProfile {
    UserProfile {
        id: UserId(id),
        username: username.map(str::to_string),
        first_name: first_name.to_string(),
        last_name: None,
    }
}
