use std::str::FromStr;

use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

/// Recipient sentinel for messages addressed to the whole room.
pub const EVERYONE: &str = "everyone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub last_seen: i64,

    // unique: id
    // unique: name
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Status,
    Message,
    PrivateMessage,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        use MessageKind::*;
        match self {
            Status => "status",
            Message => "message",
            PrivateMessage => "private_message",
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(MessageKind::Status),
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            other => Err(format!("unknown message kind {other:?}")),
        }
    }
}

/// A chat event as clients see it. `from`/`to` are plain names, not references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

/// Handle to the backing database, cloned into every component that needs it.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Self::migrated(pool).await
    }

    /// Private database living as long as the returned store. A single
    /// connection that never idles out, since each in-memory connection is
    /// its own database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
