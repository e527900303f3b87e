//! sqlx data access. Functions taking `&mut MySqlConnection` are meant to run
//! inside the caller's transaction; row locks last until it ends.

pub mod accounts;
pub mod holidays;
pub mod requests;

use sqlx::{MySql, MySqlPool, Transaction};

use crate::error::LedgerResult;

/// Opens a transaction whose row-lock waits give up after `lock_wait_secs`.
pub async fn begin(pool: &MySqlPool, lock_wait_secs: u64) -> LedgerResult<Transaction<'static, MySql>> {
    let mut tx = pool.begin().await?;
    sqlx::query(&format!(
        "SET SESSION innodb_lock_wait_timeout = {}",
        lock_wait_secs.max(1)
    ))
    .execute(&mut *tx)
    .await?;
    Ok(tx)
}
