use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{LedgerService, today};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::approval::MAX_EARNING_DAYS;
use crate::ledger::{business_dates, count_business_days};
use crate::ledger::reservation::{FundedBy, reserve_for_leave, unwind_reservation};
use crate::model::attendance::{AttendanceKind, AttendanceRequest};
use crate::model::employee::EmployeeBalance;
use crate::model::leave_request::{LeaveRequest, LeaveType};
use crate::model::request::RequestStatus;
use crate::model::tenant::TenantId;
use crate::store;
use crate::store::requests::{NewAttendance, NewLeave};

pub struct LeaveSubmission {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: String,
    pub manager_id: Option<u64>,
}

pub struct AttendanceSubmission {
    pub kind: AttendanceKind,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmittedLeave {
    pub leave: LeaveRequest,
    #[schema(example = "mixed")]
    pub funded_by: FundedBy,
    /// Days drawn from the quota; the rest is covered by comp-off credits.
    #[schema(example = 2)]
    pub quota_days: i32,
    #[schema(example = 1)]
    pub credits_reserved: usize,
}

/// Longest calendar span one leave request may cover.
const MAX_LEAVE_SPAN_DAYS: i64 = 366;

fn validate_leave(sub: &LeaveSubmission) -> LedgerResult<()> {
    if sub.start_date > sub.end_date {
        return Err(LedgerError::validation("start_date cannot be after end_date"));
    }
    if (sub.end_date - sub.start_date).num_days() + 1 > MAX_LEAVE_SPAN_DAYS {
        return Err(LedgerError::validation(format!(
            "A leave request may cover at most {} days",
            MAX_LEAVE_SPAN_DAYS
        )));
    }
    if sub.reason.trim().is_empty() {
        return Err(LedgerError::validation("reason is required"));
    }
    Ok(())
}

/// Checks the shape of an attendance-table submission and returns the
/// inclusive date span it covers.
fn validate_attendance(
    sub: &AttendanceSubmission,
    today: NaiveDate,
) -> LedgerResult<(NaiveDate, NaiveDate)> {
    if sub.reason.trim().is_empty() {
        return Err(LedgerError::validation("reason is required"));
    }

    let (start, end) = match (sub.kind, sub.date, sub.start_date, sub.end_date) {
        (_, Some(date), None, None) => (date, date),
        (AttendanceKind::CompOff, None, Some(start), Some(end)) => (start, end),
        (AttendanceKind::General, _, _, _) => {
            return Err(LedgerError::validation(
                "Attendance regularization takes a single date",
            ));
        }
        _ => {
            return Err(LedgerError::validation(
                "Provide either date or both start_date and end_date",
            ));
        }
    };

    if start > end {
        return Err(LedgerError::validation("start_date cannot be after end_date"));
    }
    if end > today {
        return Err(LedgerError::validation("Cannot submit attendance for a future date"));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_EARNING_DAYS as i64 {
        return Err(LedgerError::validation(format!(
            "A request may cover at most {} days",
            MAX_EARNING_DAYS
        )));
    }
    Ok((start, end))
}

impl LedgerService {
    /// Creates a pending leave request and funds it from comp-off credits and
    /// quota, all in one transaction.
    pub async fn submit_leave(
        &self,
        tenant: &TenantId,
        employee_id: u64,
        sub: &LeaveSubmission,
    ) -> LedgerResult<SubmittedLeave> {
        validate_leave(sub)?;

        let location = store::accounts::employee_location(&self.pool, tenant, employee_id).await?;
        let mut calendar = self
            .holidays
            .calendar(tenant, &location, sub.start_date, sub.end_date)
            .await?;

        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;
        let mut account = store::accounts::lock_account(&mut tx, tenant, employee_id, false).await?;
        account.sweep_expired(today());

        if account.location != calendar.location {
            // moved between the unlocked read and the lock
            calendar = self
                .holidays
                .calendar(tenant, &account.location, sub.start_date, sub.end_date)
                .await?;
        }

        let total_days = count_business_days(sub.start_date, sub.end_date, &calendar)?;
        if total_days == 0 {
            return Err(LedgerError::validation("Leave range contains no business days"));
        }

        if store::requests::leave_overlaps(&mut tx, tenant, employee_id, sub.start_date, sub.end_date)
            .await?
        {
            return Err(LedgerError::conflict("Leave overlaps an existing request"));
        }

        let leave_id = store::requests::insert_leave(
            &mut tx,
            tenant,
            &NewLeave {
                employee_id,
                start_date: sub.start_date,
                end_date: sub.end_date,
                leave_type: sub.leave_type,
                total_days,
                reason: sub.reason.trim(),
                manager_id: sub.manager_id,
            },
        )
        .await?;

        let days = business_dates(sub.start_date, sub.end_date, calendar.holidays())?;
        let reservation = reserve_for_leave(&mut account, leave_id, &days)?;
        store::accounts::save_account(&mut tx, tenant, &account).await?;
        let leave = store::requests::lock_leave(&mut tx, tenant, leave_id).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant,
            employee_id,
            leave_id,
            total_days = leave.total_days,
            quota_days = reservation.quota_days,
            leaves_remaining = account.leaves_remaining(),
            "Leave request submitted"
        );

        Ok(SubmittedLeave {
            leave,
            funded_by: reservation.funded_by,
            quota_days: reservation.quota_days,
            credits_reserved: reservation.credits.len(),
        })
    }

    /// Lets an employee take back a leave request nobody has acted on yet.
    /// The reservation is unwound before the row is removed so no credit is
    /// left pointing at a deleted request.
    pub async fn withdraw_leave(
        &self,
        tenant: &TenantId,
        employee_id: u64,
        leave_id: u64,
    ) -> LedgerResult<()> {
        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;
        let leave = store::requests::lock_leave(&mut tx, tenant, leave_id).await?;

        if leave.employee_id != employee_id {
            return Err(LedgerError::forbidden("Only the applicant can withdraw a leave request"));
        }
        if leave.status != RequestStatus::Pending {
            return Err(LedgerError::conflict(format!(
                "Leave request is already {}",
                leave.status.as_str()
            )));
        }

        let mut account = store::accounts::lock_account(&mut tx, tenant, employee_id, false).await?;
        let unwind = unwind_reservation(&mut account, leave.id, leave.status, leave.total_days)?;
        account.sweep_expired(today());
        store::accounts::save_account(&mut tx, tenant, &account).await?;
        store::requests::delete_leave(&mut tx, tenant, leave_id).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant,
            employee_id,
            leave_id,
            credits_returned = unwind.credits_returned,
            quota_refunded = unwind.quota_refunded,
            "Leave request withdrawn"
        );
        Ok(())
    }

    /// Records a regularization or comp-off earning request.
    pub async fn submit_attendance(
        &self,
        tenant: &TenantId,
        employee_id: u64,
        sub: &AttendanceSubmission,
    ) -> LedgerResult<AttendanceRequest> {
        let (start, end) = validate_attendance(sub, today())?;

        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;
        // serializes submissions of the same employee
        store::accounts::lock_account(&mut tx, tenant, employee_id, false).await?;

        if store::requests::attendance_overlaps(&mut tx, tenant, employee_id, start, end).await? {
            return Err(LedgerError::conflict("Attendance already submitted for this date"));
        }
        if store::requests::leave_overlaps(&mut tx, tenant, employee_id, start, end).await? {
            return Err(LedgerError::conflict("Date falls on a full-day leave"));
        }

        let (date, start_date, end_date) = match sub.date {
            Some(date) => (Some(date), None, None),
            None => (None, Some(start), Some(end)),
        };
        let request_id = store::requests::insert_attendance(
            &mut tx,
            tenant,
            &NewAttendance {
                employee_id,
                kind: sub.kind,
                date,
                start_date,
                end_date,
                reason: sub.reason.trim(),
            },
        )
        .await?;
        let request = store::requests::lock_attendance(&mut tx, tenant, request_id).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant,
            employee_id,
            request_id,
            kind = ?sub.kind,
            "Attendance request submitted"
        );
        Ok(request)
    }

    /// Current quota and credits, sweeping expired credits on the way.
    pub async fn ledger_view(
        &self,
        tenant: &TenantId,
        employee_id: u64,
        include_expired: bool,
    ) -> LedgerResult<EmployeeBalance> {
        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;
        let mut account =
            store::accounts::lock_account(&mut tx, tenant, employee_id, include_expired).await?;

        let swept = account.sweep_expired(today());
        if swept > 0 {
            store::accounts::save_account(&mut tx, tenant, &account).await?;
            tracing::info!(tenant_id = %tenant, employee_id, swept, "Expired comp-off credits");
        }
        tx.commit().await?;

        Ok(account.balance(include_expired))
    }

    /// Admin top-up of the leave quota.
    pub async fn grant_quota(
        &self,
        tenant: &TenantId,
        employee_id: u64,
        days: i32,
        granted_by: u64,
    ) -> LedgerResult<EmployeeBalance> {
        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;
        let mut account = store::accounts::lock_account(&mut tx, tenant, employee_id, false).await?;
        account.grant_quota(days)?;
        account.sweep_expired(today());
        store::accounts::save_account(&mut tx, tenant, &account).await?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant,
            employee_id,
            days,
            granted_by,
            leaves_remaining = account.leaves_remaining(),
            "Leave quota granted"
        );
        Ok(account.balance(false))
    }

    pub async fn sweep_all_expired(&self) -> LedgerResult<u64> {
        store::accounts::sweep_expired(&self.pool, today()).await
    }
}
