//! Postgres implementation of the core `UserStore` port.
//!
//! All statements are single-row and runtime-bound so the crate builds
//! without a live database. The counter increment is one atomic UPDATE;
//! there is deliberately no read-modify-write here (see DESIGN.md on the
//! quota race).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use bfb_core::{
    domain::{ChatTurn, Plan, Role, Subscription, UserId},
    ports::UserStore,
    Error, Result,
};

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(store_err)?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("migration failed: {e}")))
    }
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    user_id: i64,
    plan: String,
    is_active: bool,
    expires_at: DateTime<Utc>,
    transaction_id: Option<String>,
    payment_method: Option<String>,
}

impl SubscriptionRow {
    fn into_domain(self) -> Result<Subscription> {
        let plan = Plan::parse(&self.plan)
            .ok_or_else(|| Error::Store(format!("unknown subscription plan: {}", self.plan)))?;

        Ok(Subscription {
            user_id: UserId(self.user_id),
            plan,
            is_active: self.is_active,
            expires_at: self.expires_at,
            transaction_id: self.transaction_id,
            payment_method: self.payment_method,
        })
    }
}

#[async_trait]
impl UserStore for Db {
    async fn upsert_user(&self, user_id: UserId) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, requests_today) VALUES ($1, 0) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn get_requests_today(&self, user_id: UserId) -> Result<u32> {
        let row = sqlx::query("SELECT requests_today FROM users WHERE user_id = $1")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(0);
        };
        let n: i32 = row.try_get("requests_today").map_err(store_err)?;
        Ok(n.max(0) as u32)
    }

    async fn increment_requests(&self, user_id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET requests_today = requests_today + 1 WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn reset_all_requests(&self) -> Result<()> {
        let res = sqlx::query("UPDATE users SET requests_today = 0")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        tracing::info!(rows = res.rows_affected(), "daily counters reset");
        Ok(())
    }

    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT user_id, plan, is_active, expires_at, transaction_id, payment_method \
             FROM subscriptions WHERE user_id = $1 AND is_active",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(SubscriptionRow::into_domain).transpose()
    }

    async fn append_dialog_turn(&self, user_id: UserId, role: Role, content: &str) -> Result<()> {
        sqlx::query("INSERT INTO dialog_turns (user_id, role, content) VALUES ($1, $2, $3)")
            .bind(user_id.0)
            .bind(role.as_str())
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_recent_dialog(&self, user_id: UserId, limit: u32) -> Result<Vec<ChatTurn>> {
        // Newest-first to bound the scan, then reversed back to
        // chronological order for the model context.
        let rows = sqlx::query(
            "SELECT role, content FROM dialog_turns \
             WHERE user_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(user_id.0)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows {
            let role: String = row.try_get("role").map_err(store_err)?;
            let content: String = row.try_get("content").map_err(store_err)?;
            let role = Role::parse(&role)
                .ok_or_else(|| Error::Store(format!("unknown dialog role: {role}")))?;
            turns.push(ChatTurn { role, content });
        }
        turns.reverse();
        Ok(turns)
    }

    async fn log_usage(&self, user_id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO usage_log (user_id) VALUES ($1)")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
