//! Postgres-backed collaborators
//!
//! Messages live in the `messages` table, accounts in `users`. Interest in a
//! user's presence is derived from shared conversations.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::store::{
    InterestResolver, MessageStore, StoreError, StoreResult, UserDirectory,
};
use crate::shared::{DeliveryState, Message, UserId};

const MESSAGE_COLUMNS: &str =
    "id, sender_id, recipient_id, body, created_at, delivery_state";

/// Message store, directory and interest resolver over a Postgres pool
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, body, created_at, delivery_state)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET delivery_state = EXCLUDED.delivery_state
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id.as_uuid())
        .bind(message.recipient_id.as_uuid())
        .bind(&message.body)
        .bind(message.created_at)
        .bind(message.delivery_state.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn message_from_row(row: &PgRow) -> StoreResult<Message> {
    let id: Uuid = row.try_get("id")?;
    let state: String = row.try_get("delivery_state")?;
    let delivery_state = DeliveryState::parse(&state).ok_or_else(|| StoreError::Corrupt {
        id,
        reason: format!("unknown delivery state '{}'", state),
    })?;

    Ok(Message {
        id,
        sender_id: UserId(row.try_get("sender_id")?),
        recipient_id: UserId(row.try_get("recipient_id")?),
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
        delivery_state,
    })
}

fn messages_from_rows(rows: Vec<PgRow>) -> StoreResult<Vec<Message>> {
    rows.iter().map(message_from_row).collect()
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn persist_undelivered(&self, message: &Message) -> StoreResult<()> {
        self.insert(message).await
    }

    async fn record_delivered(&self, message: &Message) -> StoreResult<()> {
        self.insert(message).await
    }

    async fn fetch_history(&self, user: UserId, since: DateTime<Utc>) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender_id = $1 OR recipient_id = $1) AND created_at >= $2
            ORDER BY created_at ASC
            "#
        ))
        .bind(user.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        messages_from_rows(rows)
    }

    async fn fetch_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC
            "#
        ))
        .bind(a.as_uuid())
        .bind(b.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        messages_from_rows(rows)
    }

    async fn undelivered_for(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE recipient_id = $1 AND delivery_state = $2
            ORDER BY created_at ASC
            "#
        ))
        .bind(user.as_uuid())
        .bind(DeliveryState::PersistedUndelivered.as_str())
        .fetch_all(&self.pool)
        .await?;

        messages_from_rows(rows)
    }

    async fn mark_delivered(&self, ids: &[Uuid]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            UPDATE messages
            SET delivery_state = $1
            WHERE id = ANY($2) AND delivery_state = $3
            "#,
        )
        .bind(DeliveryState::Delivered.as_str())
        .bind(ids)
        .bind(DeliveryState::PersistedUndelivered.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PgMessageStore {
    async fn user_exists(&self, user: UserId) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl InterestResolver for PgMessageStore {
    async fn interested_parties(&self, user: UserId) -> StoreResult<HashSet<UserId>> {
        let peers: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END
            FROM messages
            WHERE (sender_id = $1 OR recipient_id = $1) AND sender_id <> recipient_id
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(peers.into_iter().map(UserId).filter(|p| *p != user).collect())
    }
}
