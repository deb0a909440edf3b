mod accounts;
mod appointments;

use actix_web::{rt, web};
use anyhow::Context;
use chrono::{Duration, Utc};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;
use std::sync::Arc;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;
type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

pub fn build_pool(conn_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<MysqlConnection>::new(conn_url);
    r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create pool")
}

/// MySQL backed implementation of both store traits.
#[derive(Clone)]
pub struct MysqlStore {
    pool: DbPool,
}

impl MysqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> anyhow::Result<DbConn> {
        self.pool.get().context("DB connection")
    }
}

/// Days kept in `slot_locks` behind today, so a late booking for yesterday still finds its row.
const SLOT_LOCK_GRACE_DAYS: i64 = 1;

/// Prunes past `slot_locks` rows now and then once a day. Must be called from within an actix
/// system.
pub fn start_slot_lock_pruning(store: Arc<MysqlStore>) {
    rt::spawn(async move {
        let mut ticks = rt::time::interval(std::time::Duration::from_secs(24 * 3600));
        loop {
            ticks.tick().await;
            let before = Utc::now().naive_utc().date() - Duration::days(SLOT_LOCK_GRACE_DAYS);
            let store = store.clone();
            match web::block(move || store.prune_slot_locks(before)).await {
                Ok(removed) => tracing::info!(removed, %before, "pruned slot locks"),
                Err(err) => tracing::error!(error = ?err, "failed to prune slot locks"),
            }
        }
    });
}
