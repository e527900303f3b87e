use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySqlConnection, MySqlPool};

use crate::error::{LedgerError, LedgerResult};
use crate::model::attendance::{AttendanceKind, AttendanceRequest};
use crate::model::leave_request::{LeaveRequest, LeaveType};
use crate::model::request::RequestStatus;
use crate::model::tenant::TenantId;

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, start_date, end_date, leave_type, status, total_days, reason,
    manager_id, manager_notes, approved_on, rejected_on, revoked_on, created_at
"#;

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, kind, date, start_date, end_date, reason, status,
    manager_id, manager_notes, approved_on, rejected_on, created_at
"#;

pub struct NewLeave<'a> {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub total_days: i32,
    pub reason: &'a str,
    pub manager_id: Option<u64>,
}

pub struct NewAttendance<'a> {
    pub employee_id: u64,
    pub kind: AttendanceKind,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: &'a str,
}

/// Manager decision written onto a request row.
pub struct Decision<'a> {
    pub status: RequestStatus,
    pub manager_id: u64,
    pub manager_notes: Option<&'a str>,
    pub at: NaiveDateTime,
}

impl Decision<'_> {
    fn timestamp_column(&self) -> &'static str {
        match self.status {
            RequestStatus::Approved => "approved_on",
            RequestStatus::Revoked => "revoked_on",
            _ => "rejected_on",
        }
    }
}

/* =========================
Leave requests
========================= */

pub async fn lock_leave(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    leave_id: u64,
) -> LedgerResult<LeaveRequest> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {} FROM leave_requests WHERE id = ? AND tenant_id = ? FOR UPDATE",
        LEAVE_COLUMNS
    ))
    .bind(leave_id)
    .bind(tenant.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| LedgerError::not_found("Leave request not found"))
}

pub async fn find_leave(
    pool: &MySqlPool,
    tenant: &TenantId,
    leave_id: u64,
) -> LedgerResult<Option<LeaveRequest>> {
    let leave = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {} FROM leave_requests WHERE id = ? AND tenant_id = ?",
        LEAVE_COLUMNS
    ))
    .bind(leave_id)
    .bind(tenant.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(leave)
}

/// Pending or approved leave of `employee_id` intersecting `[start, end]`.
pub async fn leave_overlaps(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM leave_requests
            WHERE tenant_id = ? AND employee_id = ?
            AND status IN (?, ?)
            AND start_date <= ? AND end_date >= ?
        )
        "#,
    )
    .bind(tenant.as_str())
    .bind(employee_id)
    .bind(RequestStatus::Pending)
    .bind(RequestStatus::Approved)
    .bind(end)
    .bind(start)
    .fetch_one(conn)
    .await?;
    Ok(exists != 0)
}

pub async fn insert_leave(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    leave: &NewLeave<'_>,
) -> LedgerResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (tenant_id, employee_id, start_date, end_date, leave_type, status, total_days, reason, manager_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tenant.as_str())
    .bind(leave.employee_id)
    .bind(leave.start_date)
    .bind(leave.end_date)
    .bind(leave.leave_type)
    .bind(RequestStatus::Pending)
    .bind(leave.total_days)
    .bind(leave.reason)
    .bind(leave.manager_id)
    .execute(conn)
    .await?;
    Ok(result.last_insert_id())
}

pub async fn decide_leave(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    leave_id: u64,
    decision: &Decision<'_>,
) -> LedgerResult<()> {
    sqlx::query(&format!(
        r#"
        UPDATE leave_requests
        SET status = ?, manager_id = ?, manager_notes = ?, {} = ?
        WHERE id = ? AND tenant_id = ?
        "#,
        decision.timestamp_column()
    ))
    .bind(decision.status)
    .bind(decision.manager_id)
    .bind(decision.manager_notes)
    .bind(decision.at)
    .bind(leave_id)
    .bind(tenant.as_str())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete_leave(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    leave_id: u64,
) -> LedgerResult<()> {
    sqlx::query("DELETE FROM leave_requests WHERE id = ? AND tenant_id = ?")
        .bind(leave_id)
        .bind(tenant.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

pub struct LeaveFilter<'a> {
    pub employee_id: Option<u64>,
    pub status: Option<RequestStatus>,
    pub page: u64,
    pub per_page: u64,
    pub tenant: &'a TenantId,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Status(RequestStatus),
}

/// One page of leave requests plus the total matching count.
pub async fn list_leaves(
    pool: &MySqlPool,
    filter: &LeaveFilter<'_>,
) -> LedgerResult<(Vec<LeaveRequest>, i64)> {
    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut args: Vec<FilterValue> = vec![FilterValue::Str(filter.tenant.as_str())];

    if let Some(emp_id) = filter.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = filter.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Status(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Status(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {} FROM leave_requests{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        LEAVE_COLUMNS, where_sql
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Status(s) => data_q.bind(s),
        };
    }

    let offset = (filter.page.max(1) - 1) * filter.per_page;
    let leaves = data_q
        .bind(filter.per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((leaves, total))
}

/* =========================
Attendance / comp-off earning requests
========================= */

pub async fn lock_attendance(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    request_id: u64,
) -> LedgerResult<AttendanceRequest> {
    sqlx::query_as::<_, AttendanceRequest>(&format!(
        "SELECT {} FROM attendance_requests WHERE id = ? AND tenant_id = ? FOR UPDATE",
        ATTENDANCE_COLUMNS
    ))
    .bind(request_id)
    .bind(tenant.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| LedgerError::not_found("Attendance request not found"))
}

/// Any non-rejected attendance request of `employee_id` touching `[start, end]`.
pub async fn attendance_overlaps(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM attendance_requests
            WHERE tenant_id = ? AND employee_id = ?
            AND status <> ?
            AND COALESCE(start_date, date) <= ?
            AND COALESCE(end_date, date) >= ?
        )
        "#,
    )
    .bind(tenant.as_str())
    .bind(employee_id)
    .bind(RequestStatus::Rejected)
    .bind(end)
    .bind(start)
    .fetch_one(conn)
    .await?;
    Ok(exists != 0)
}

pub async fn insert_attendance(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    request: &NewAttendance<'_>,
) -> LedgerResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance_requests
            (tenant_id, employee_id, kind, date, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tenant.as_str())
    .bind(request.employee_id)
    .bind(request.kind)
    .bind(request.date)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.reason)
    .bind(RequestStatus::Pending)
    .execute(conn)
    .await?;
    Ok(result.last_insert_id())
}

pub async fn decide_attendance(
    conn: &mut MySqlConnection,
    tenant: &TenantId,
    request_id: u64,
    decision: &Decision<'_>,
) -> LedgerResult<()> {
    sqlx::query(&format!(
        r#"
        UPDATE attendance_requests
        SET status = ?, manager_id = ?, manager_notes = ?, {} = ?
        WHERE id = ? AND tenant_id = ?
        "#,
        decision.timestamp_column()
    ))
    .bind(decision.status)
    .bind(decision.manager_id)
    .bind(decision.manager_notes)
    .bind(decision.at)
    .bind(request_id)
    .bind(tenant.as_str())
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn decision(status: RequestStatus) -> Decision<'static> {
        Decision {
            status,
            manager_id: 12,
            manager_notes: None,
            at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn each_decision_stamps_its_own_column() {
        assert_eq!(decision(RequestStatus::Approved).timestamp_column(), "approved_on");
        assert_eq!(decision(RequestStatus::Rejected).timestamp_column(), "rejected_on");
        assert_eq!(decision(RequestStatus::Revoked).timestamp_column(), "revoked_on");
    }
}
