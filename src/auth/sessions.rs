use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;
use axum::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

const TOKEN_LEN: usize = 48;

/// Server-side session state keyed by an opaque cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for the user and return the token to hand to the
    /// client.
    async fn insert(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<String>;
    /// Resolve a token to its user, ignoring expired sessions.
    async fn lookup(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
    async fn revoke(&self, token: &str) -> anyhow::Result<()>;
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Sessions persisted in the `sessions` table. Expired rows are left in
/// place and filtered out on lookup.
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<String> {
        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + ttl;
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.db)
            .await
            .context("insert session")?;
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()")
                .bind(token)
                .fetch_optional(&self.db)
                .await
                .context("lookup session")?;
        Ok(row.map(|(user_id,)| user_id))
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.db)
            .await
            .context("revoke session")?;
        Ok(())
    }
}

/// In-memory store used by `AppState::fake()` and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (Uuid, OffsetDateTime)>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<String> {
        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + ttl;
        self.sessions
            .lock()
            .expect("session map poisoned")
            .insert(token.clone(), (user_id, expires_at));
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > OffsetDateTime::now_utc())
            .map(|(user_id, _)| *user_id))
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .remove(token);
        Ok(())
    }
}
