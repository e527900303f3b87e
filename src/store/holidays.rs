use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::tenant::TenantId;

pub async fn fetch_holidays(
    pool: &MySqlPool,
    tenant: &TenantId,
    location: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>(
        r#"
        SELECT holiday_date
        FROM holidays
        WHERE tenant_id = ? AND location = ? AND holiday_date BETWEEN ? AND ?
        "#,
    )
    .bind(tenant.as_str())
    .bind(location)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}
