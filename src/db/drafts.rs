use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use crate::error::Result;

/// Identifies whose unsaved content a draft holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DraftKey {
    /// The create form.
    New,
    Article(String),
}

impl DraftKey {
    pub fn storage_key(&self) -> String {
        match self {
            DraftKey::New => "new".to_string(),
            DraftKey::Article(uid) => format!("article:{uid}"),
        }
    }
}

/// Unsaved editor content, persisted so a half written article survives a restart.
#[derive(Clone)]
pub struct DraftStore {
    conn: Connection,
}

impl DraftStore {
    pub(super) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub async fn load(&self, key: &DraftKey) -> Result<Option<String>> {
        let key = key.storage_key();
        let content = self
            .conn
            .call(move |conn| {
                let content = conn
                    .query_row(
                        "SELECT content FROM drafts WHERE draft_key = ?1",
                        params![key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(content)
            })
            .await?;
        Ok(content)
    }

    /// Stores `content` for `key`; an empty string clears the draft.
    pub async fn save(&self, key: &DraftKey, content: &str) -> Result<()> {
        if content.is_empty() {
            return self.clear(key).await;
        }

        let key = key.storage_key();
        let content = content.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO drafts (draft_key, content) VALUES (?1, ?2)
                       ON CONFLICT(draft_key) DO UPDATE SET
                           content = excluded.content,
                           saved_at = datetime('now')"#,
                    params![key, content],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn clear(&self, key: &DraftKey) -> Result<()> {
        let key = key.storage_key();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM drafts WHERE draft_key = ?1", params![key])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}
