use std::sync::Arc;

use sqlx::Row;

use crate::{
    clock::Clock,
    db::{Message, MessageKind, Participant, Store},
    ChatResult,
};

pub const DEFAULT_LIMIT: u32 = 100;

/// How many messages a reader asked for. Anything that is not a positive
/// integer falls back to [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u32);

impl Limit {
    pub fn new(n: i64) -> Self {
        if n <= 0 {
            return Self::default();
        }
        Self(u32::try_from(n).unwrap_or(u32::MAX))
    }

    /// Reads the leading integer of a query value, so `"12abc"` is 12.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::default();
        };

        let sign_len = usize::from(raw.starts_with(['-', '+']));
        let digits_len = raw[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();

        match raw[..sign_len + digits_len].parse::<i64>() {
            Ok(n) => Self::new(n),
            // overflow on a long digit run is still a large positive request
            Err(_) if digits_len > 0 && !raw.starts_with('-') => Self(u32::MAX),
            Err(_) => Self::default(),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

/// Append-only record of chat events.
#[derive(Clone)]
pub struct MessageLog {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl MessageLog {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stamps and stores a message, returning it as readers will see it.
    pub async fn append(&self, from: &str, to: &str, text: &str, kind: MessageKind) -> ChatResult<Message> {
        let time = self.clock.display_time();
        sqlx::query("INSERT INTO messages (from_name,to_name,text,kind,time) VALUES (?,?,?,?,?)")
            .bind(from)
            .bind(to)
            .bind(text)
            .bind(kind.as_str())
            .bind(&time)
            .execute(self.store.pool())
            .await?;

        Ok(Message {
            from: from.to_owned(),
            to: to.to_owned(),
            text: text.to_owned(),
            kind,
            time,
        })
    }

    /// The newest `limit` messages `viewer` may see, oldest first. Taking a
    /// resolved [`Participant`] means the caller already proved the viewer
    /// exists exactly once.
    pub async fn query(&self, viewer: &Participant, limit: Limit) -> ChatResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT from_name,to_name,text,kind,time FROM messages
             WHERE kind IN ('message','status')
                OR (kind = 'private_message' AND (to_name = ?1 OR from_name = ?1))
             ORDER BY seq DESC
             LIMIT ?2",
        )
        .bind(&viewer.name)
        .bind(i64::from(limit.get()))
        .fetch_all(self.store.pool())
        .await?;

        let mut messages = rows
            .iter()
            .map(|row| -> Result<Message, sqlx::Error> {
                let kind: String = row.try_get("kind")?;
                Ok(Message {
                    from: row.try_get("from_name")?,
                    to: row.try_get("to_name")?,
                    text: row.try_get("text")?,
                    kind: kind
                        .parse()
                        .map_err(|e: String| sqlx::Error::Decode(e.into()))?,
                    time: row.try_get("time")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        messages.reverse();
        Ok(messages)
    }
}
