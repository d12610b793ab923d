use std::sync::Arc;

use sqlx::Row;
use uuid::Uuid;

use crate::{
    clock::Clock,
    db::{MessageKind, Participant, Store, EVERYONE},
    message_log::MessageLog,
    ChatError, ChatResult,
};

pub const JOIN_TEXT: &str = "entra na sala...";

/// Who is currently in the room. Names are looked up through the unique
/// index on `participants.name`.
#[derive(Clone)]
pub struct Directory {
    store: Store,
    log: MessageLog,
    clock: Arc<dyn Clock>,
}

impl Directory {
    pub fn new(store: Store, log: MessageLog, clock: Arc<dyn Clock>) -> Self {
        Self { store, log, clock }
    }

    /// Adds `name` to the room and announces it. The insert and the
    /// announcement are separate writes; a failure between them leaves a
    /// participant without a join message.
    pub async fn register(&self, name: &str) -> ChatResult<Participant> {
        if !self.lookup(name).await?.is_empty() {
            return Err(ChatError::Conflict(name.to_owned()));
        }

        let participant = Participant {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            last_seen: self.clock.now_ms(),
        };

        let inserted = sqlx::query("INSERT INTO participants (id,name,last_seen) VALUES (?,?,?)")
            .bind(participant.id.to_string())
            .bind(&participant.name)
            .bind(participant.last_seen)
            .execute(self.store.pool())
            .await;
        match inserted {
            Ok(_) => {}
            // lost a race with a concurrent register of the same name
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(ChatError::Conflict(name.to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(name, id = %participant.id, "participant joined");

        self.log.append(name, EVERYONE, JOIN_TEXT, MessageKind::Status).await?;

        Ok(participant)
    }

    /// Exactly one active participant called `name`, or an error. More than
    /// one match is reported, never resolved by picking one.
    pub async fn resolve(&self, name: &str) -> ChatResult<Participant> {
        let mut found = self.lookup(name).await?;
        match found.len() {
            0 => Err(ChatError::NotFound(name.to_owned())),
            1 => Ok(found.remove(0)),
            matches => Err(ChatError::Ambiguous { name: name.to_owned(), matches }),
        }
    }

    /// Heartbeat. `last_seen` never moves backwards.
    pub async fn touch(&self, name: &str) -> ChatResult<Participant> {
        let mut participant = self.resolve(name).await?;
        if !self.refresh(&mut participant).await? {
            // evicted between resolve and update
            return Err(ChatError::NotFound(name.to_owned()));
        }
        Ok(participant)
    }

    /// Heartbeat for an already resolved participant, by id. Returns false
    /// when the row is gone, which is not an error: the reaper may have won.
    pub async fn refresh(&self, participant: &mut Participant) -> ChatResult<bool> {
        let now = self.clock.now_ms();

        let updated = sqlx::query("UPDATE participants SET last_seen = MAX(last_seen, ?) WHERE id = ?")
            .bind(now)
            .bind(participant.id.to_string())
            .execute(self.store.pool())
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        participant.last_seen = participant.last_seen.max(now);
        Ok(true)
    }

    pub async fn list(&self) -> ChatResult<Vec<String>> {
        let names: Vec<(String,)> = sqlx::query_as("SELECT name FROM participants")
            .fetch_all(self.store.pool())
            .await?;
        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Every participant with its last heartbeat, as one read.
    pub async fn snapshot(&self) -> ChatResult<Vec<Participant>> {
        let rows = sqlx::query("SELECT id,name,last_seen FROM participants")
            .fetch_all(self.store.pool())
            .await?;
        rows.iter().map(participant_from_row).collect()
    }

    /// Deletes the given participants in one statement, returning how many
    /// were still there.
    pub async fn evict(&self, ids: &[Uuid]) -> ChatResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("DELETE FROM participants WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        Ok(query.execute(self.store.pool()).await?.rows_affected())
    }

    async fn lookup(&self, name: &str) -> ChatResult<Vec<Participant>> {
        let rows = sqlx::query("SELECT id,name,last_seen FROM participants WHERE name = ?")
            .bind(name)
            .fetch_all(self.store.pool())
            .await?;
        rows.iter().map(participant_from_row).collect()
    }
}

fn participant_from_row(row: &sqlx::sqlite::SqliteRow) -> ChatResult<Participant> {
    let id: String = row.try_get("id")?;
    Ok(Participant {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        name: row.try_get("name")?,
        last_seen: row.try_get("last_seen")?,
    })
}
