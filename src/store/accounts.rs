use chrono::NaiveDate;
use sqlx::{MySqlConnection, MySqlPool};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{CompOffLedger, EmployeeAccount};
use crate::model::comp_off::{CompOffCredit, CreditStatus};
use crate::model::employee::EmployeeRow;
use crate::model::tenant::TenantId;

/// Locks the employee row and its credit rows, then builds the account.
///
/// Every writer goes through here, so two actions on the same employee
/// serialize on the employee row instead of overwriting each other.
pub async fn lock_account(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    employee_id: u64,
    include_expired: bool,
) -> LedgerResult<EmployeeAccount> {
    let row = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, location, leaves_remaining
        FROM employees
        WHERE id = ? AND tenant_id = ?
        FOR UPDATE
        "#,
    )
    .bind(employee_id)
    .bind(tenant.as_str())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| LedgerError::not_found("Employee not found"))?;

    let expired_filter = if include_expired {
        ""
    } else {
        " AND status <> 'expired'"
    };
    let credits = sqlx::query_as::<_, CompOffCredit>(&format!(
        r#"
        SELECT id, employee_id, earned_date, valid_from, expiry_date, status, reserved_by
        FROM comp_off_credits
        WHERE tenant_id = ? AND employee_id = ?{}
        ORDER BY id
        FOR UPDATE
        "#,
        expired_filter
    ))
    .bind(tenant.as_str())
    .bind(employee_id)
    .fetch_all(&mut *conn)
    .await?;

    tracing::debug!(
        tenant_id = %tenant,
        employee_id,
        credits = credits.len(),
        "Employee account locked"
    );

    Ok(EmployeeAccount::new(row, CompOffLedger::new(employee_id, credits)))
}

/// Writes back the quota and every credit the account touched.
pub async fn save_account(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    account: &EmployeeAccount,
) -> LedgerResult<()> {
    if account.quota_changed() {
        sqlx::query(
            r#"
            UPDATE employees
            SET leaves_remaining = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(account.leaves_remaining())
        .bind(account.employee_id)
        .bind(tenant.as_str())
        .execute(&mut *conn)
        .await?;
    }

    for credit in account.ledger.changed() {
        match credit.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE comp_off_credits
                    SET status = ?, reserved_by = ?
                    WHERE id = ? AND tenant_id = ?
                    "#,
                )
                .bind(credit.status)
                .bind(credit.reserved_by)
                .bind(id)
                .bind(tenant.as_str())
                .execute(&mut *conn)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO comp_off_credits
                        (tenant_id, employee_id, earned_date, valid_from, expiry_date, status, reserved_by)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(tenant.as_str())
                .bind(credit.employee_id)
                .bind(credit.earned_date)
                .bind(credit.valid_from)
                .bind(credit.expiry_date)
                .bind(credit.status)
                .bind(credit.reserved_by)
                .execute(&mut *conn)
                .await?;
            }
        }
    }
    Ok(())
}

/// Maintenance sweep across every tenant: `available` credits past expiry
/// become `expired`. Readers also sweep their own account on load.
pub async fn sweep_expired(pool: &MySqlPool, today: NaiveDate) -> LedgerResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE comp_off_credits
        SET status = ?
        WHERE status = ? AND expiry_date < ?
        "#,
    )
    .bind(CreditStatus::Expired)
    .bind(CreditStatus::Available)
    .bind(today)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Unlocked read of the employee's location, used to resolve the holiday
/// calendar before a transaction starts.
pub async fn employee_location(
    pool: &MySqlPool,
    tenant: &TenantId,
    employee_id: u64,
) -> LedgerResult<String> {
    sqlx::query_scalar::<_, String>("SELECT location FROM employees WHERE id = ? AND tenant_id = ?")
        .bind(employee_id)
        .bind(tenant.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LedgerError::not_found("Employee not found"))
}
