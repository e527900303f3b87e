//! Transactional operations over the ledger.
//!
//! Each public method opens one transaction, locks the rows it reads
//! (request row first, then the employee row and its credits), applies the
//! pure ledger logic, writes back and commits. An early return drops the
//! transaction, which rolls everything back.

pub mod intake;
pub mod processor;
mod queries;

use chrono::{NaiveDate, Utc};
use sqlx::MySqlPool;

use crate::utils::holiday_cache::HolidayCache;
use crate::utils::notification_bus::NotificationBus;

#[derive(Clone)]
pub struct LedgerService {
    pool: MySqlPool,
    holidays: HolidayCache,
    bus: NotificationBus,
    lock_wait_secs: u64,
}

impl LedgerService {
    pub fn new(
        pool: MySqlPool,
        holidays: HolidayCache,
        bus: NotificationBus,
        lock_wait_secs: u64,
    ) -> Self {
        LedgerService {
            pool,
            holidays,
            bus,
            lock_wait_secs,
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
