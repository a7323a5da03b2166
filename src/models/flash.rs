use std::time::{Duration, Instant};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub id: String,
    pub kind: FlashKind,
    pub message: String,
    pub expires_at: Instant,
}

impl FlashMessage {
    pub fn new(kind: FlashKind, message: impl Into<String>, ttl: Duration) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            id: id[..8].to_string(),
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        }
    }
}
