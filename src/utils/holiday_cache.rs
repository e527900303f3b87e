use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use sqlx::MySqlPool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::HolidayCalendar;
use crate::model::tenant::TenantId;
use crate::store::holidays::fetch_holidays;

/// (tenant, location, year)
type CalendarKey = (String, String, i32);

/// Holiday lookups cached per tenant, location and calendar year.
#[derive(Clone)]
pub struct HolidayCache {
    pool: MySqlPool,
    cache: Cache<CalendarKey, Arc<HashSet<NaiveDate>>>,
}

fn years_spanned(start: NaiveDate, end: NaiveDate) -> std::ops::RangeInclusive<i32> {
    start.year()..=end.year()
}

impl HolidayCache {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        HolidayCache {
            pool,
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Holidays at `location` that fall inside `[start, end]`.
    pub async fn calendar(
        &self,
        tenant: &TenantId,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<HolidayCalendar> {
        let mut holidays = Vec::new();
        for year in years_spanned(start, end) {
            let observed = self.year(tenant, location, year).await?;
            holidays.extend(observed.iter().filter(|d| **d >= start && **d <= end).copied());
        }
        Ok(HolidayCalendar::new(location, holidays))
    }

    async fn year(
        &self,
        tenant: &TenantId,
        location: &str,
        year: i32,
    ) -> LedgerResult<Arc<HashSet<NaiveDate>>> {
        let (first, last) = NaiveDate::from_ymd_opt(year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(year, 12, 31))
            .ok_or_else(|| LedgerError::validation(format!("Year {} out of range", year)))?;

        let key = (tenant.as_str().to_string(), location.to_string(), year);
        self.cache
            .try_get_with(key, async {
                let days = fetch_holidays(&self.pool, tenant, location, first, last).await?;
                tracing::debug!(tenant_id = %tenant, location, year, holidays = days.len(), "Holiday calendar loaded");
                Ok::<_, sqlx::Error>(Arc::new(days.into_iter().collect()))
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, tenant_id = %tenant, location, year, "Failed to load holidays");
                LedgerError::Transaction(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_across_new_year_loads_both_years() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(years_spanned(start, end).collect::<Vec<_>>(), vec![2024, 2025]);
    }
}
