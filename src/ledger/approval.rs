use serde::Serialize;
use utoipa::ToSchema;

use super::account::EmployeeAccount;
use super::reservation::unwind_reservation;
use crate::error::{LedgerError, LedgerResult};
use crate::model::attendance::{AttendanceKind, AttendanceRequest};
use crate::model::comp_off::CreditStatus;
use crate::model::leave_request::LeaveRequest;
use crate::model::request::{RequestSource, RequestStatus};

/// Longest comp-off earning range accepted in one request.
pub const MAX_EARNING_DAYS: usize = 31;

/// Ledger and quota movement caused by one approval action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct LedgerEffect {
    pub credits_consumed: i32,
    pub credits_returned: i32,
    pub credits_created: i32,
    pub quota_refunded: i32,
}

/// Guards every approval action. Leave requests may be approved or
/// rejected while pending and revoked once approved; the other kinds only
/// leave `pending` once.
pub fn next_status(
    source: RequestSource,
    current: RequestStatus,
    target: RequestStatus,
) -> LedgerResult<RequestStatus> {
    use RequestStatus::*;

    if target == Pending {
        return Err(LedgerError::conflict("Requests cannot be moved back to pending"));
    }
    if target == Revoked && source != RequestSource::Leave {
        return Err(LedgerError::conflict("Only approved leave can be revoked"));
    }

    match (current, target) {
        (Pending, Approved) | (Pending, Rejected) => Ok(target),
        (Approved, Revoked) => Ok(target),
        _ => Err(LedgerError::conflict(format!(
            "Request is already {}, cannot be {}",
            current.as_str(),
            target.as_str()
        ))),
    }
}

fn ensure_owner(account: &EmployeeAccount, employee_id: u64) -> LedgerResult<()> {
    if account.employee_id != employee_id {
        return Err(LedgerError::conflict("Request does not belong to this ledger"));
    }
    Ok(())
}

/// Applies a manager decision on a leave request to the employee account.
///
/// Approval consumes every credit the request holds; the quota already paid
/// at submission. Rejection and revocation hand the credits back and refund
/// `total_days` minus the days those credits covered.
pub fn apply_leave_decision(
    account: &mut EmployeeAccount,
    leave: &LeaveRequest,
    target: RequestStatus,
) -> LedgerResult<LedgerEffect> {
    ensure_owner(account, leave.employee_id)?;
    let target = next_status(RequestSource::Leave, leave.status, target)?;

    let mut effect = LedgerEffect::default();
    match target {
        RequestStatus::Approved => {
            for slot in account.ledger.reserved_by(leave.id) {
                let pending = account
                    .ledger
                    .get(slot)
                    .map(|c| c.status == CreditStatus::Pending)
                    .unwrap_or(false);
                if pending {
                    account.ledger.consume(slot, leave.id)?;
                    effect.credits_consumed += 1;
                }
            }
        }
        RequestStatus::Rejected | RequestStatus::Revoked => {
            let unwind = unwind_reservation(account, leave.id, leave.status, leave.total_days)?;
            effect.credits_returned = unwind.credits_returned;
            effect.quota_refunded = unwind.quota_refunded;
        }
        RequestStatus::Pending => {
            return Err(LedgerError::conflict("Requests cannot be moved back to pending"));
        }
    }
    Ok(effect)
}

/// Applies a decision on an attendance-table request. Approving a comp-off
/// earning request credits one day per calendar day worked, holidays
/// included; regularization approval has no ledger effect.
pub fn apply_attendance_decision(
    account: &mut EmployeeAccount,
    request: &AttendanceRequest,
    target: RequestStatus,
) -> LedgerResult<LedgerEffect> {
    ensure_owner(account, request.employee_id)?;
    let source = match request.kind {
        AttendanceKind::CompOff => RequestSource::Compoff,
        AttendanceKind::General => RequestSource::Attendance,
    };
    let target = next_status(source, request.status, target)?;

    let mut effect = LedgerEffect::default();
    if request.kind == AttendanceKind::CompOff && target == RequestStatus::Approved {
        let worked = request.covered_dates();
        if worked.is_empty() || worked.len() > MAX_EARNING_DAYS {
            return Err(LedgerError::validation(format!(
                "Comp-off earning request must cover 1 to {} days",
                MAX_EARNING_DAYS
            )));
        }
        for day in worked {
            account.ledger.credit(day)?;
            effect.credits_created += 1;
        }
    }
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::comp_off::{CompOffLedger, expiry_for, valid_from_for};
    use crate::ledger::reservation::reserve_for_leave;
    use crate::model::comp_off::CompOffCredit;
    use crate::model::employee::EmployeeRow;
    use crate::model::leave_request::LeaveType;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn account(quota: i32, credits: Vec<CompOffCredit>) -> EmployeeAccount {
        EmployeeAccount::new(
            EmployeeRow {
                id: 1000,
                location: "India".into(),
                leaves_remaining: quota,
            },
            CompOffLedger::new(1000, credits),
        )
    }

    fn credit_valid_on(id: u64, earned: &str) -> CompOffCredit {
        let earned = d(earned);
        CompOffCredit {
            id: Some(id),
            employee_id: 1000,
            earned_date: earned,
            valid_from: valid_from_for(earned).unwrap(),
            expiry_date: expiry_for(earned).unwrap(),
            status: CreditStatus::Available,
            reserved_by: None,
        }
    }

    fn leave(id: u64, start: &str, end: &str, total_days: i32) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: 1000,
            start_date: d(start),
            end_date: d(end),
            leave_type: LeaveType::Annual,
            status: RequestStatus::Pending,
            total_days,
            reason: "vacation".into(),
            manager_id: Some(12),
            manager_notes: None,
            approved_on: None,
            rejected_on: None,
            revoked_on: None,
            created_at: None,
        }
    }

    fn submit(acct: &mut EmployeeAccount, req: &LeaveRequest) {
        let dates =
            crate::ledger::business_dates(req.start_date, req.end_date, &HashSet::new()).unwrap();
        reserve_for_leave(acct, req.id, &dates).unwrap();
    }

    fn earning(id: u64, start: &str, end: &str) -> AttendanceRequest {
        AttendanceRequest {
            id,
            employee_id: 1000,
            kind: AttendanceKind::CompOff,
            date: None,
            start_date: Some(d(start)),
            end_date: Some(d(end)),
            reason: "release weekend".into(),
            status: RequestStatus::Pending,
            manager_id: None,
            manager_notes: None,
            approved_on: None,
            rejected_on: None,
            created_at: None,
        }
    }

    #[test]
    fn transition_table() {
        use RequestSource::*;
        use RequestStatus::*;

        assert_eq!(next_status(Leave, Pending, Approved).unwrap(), Approved);
        assert_eq!(next_status(Leave, Pending, Rejected).unwrap(), Rejected);
        assert_eq!(next_status(Leave, Approved, Revoked).unwrap(), Revoked);
        assert!(matches!(next_status(Leave, Approved, Rejected), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Leave, Approved, Approved), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Leave, Pending, Revoked), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Leave, Revoked, Revoked), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Compoff, Approved, Revoked), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Compoff, Pending, Revoked), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Attendance, Pending, Pending), Err(LedgerError::Conflict(_))));
        assert!(matches!(next_status(Attendance, Rejected, Approved), Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn comp_off_funded_leave_approve_then_revoke() {
        let mut acct = account(10, vec![credit_valid_on(1, "2025-05-02")]);
        let mut req = leave(7, "2025-06-10", "2025-06-10", 1);
        submit(&mut acct, &req);
        assert_eq!(acct.ledger.credits()[0].status, CreditStatus::Pending);
        assert_eq!(acct.leaves_remaining(), 10);

        let effect = apply_leave_decision(&mut acct, &req, RequestStatus::Approved).unwrap();
        assert_eq!(effect.credits_consumed, 1);
        assert_eq!(acct.ledger.credits()[0].status, CreditStatus::Used);
        assert_eq!(acct.leaves_remaining(), 10);
        req.status = RequestStatus::Approved;

        // rejecting an approved request is guarded
        assert!(apply_leave_decision(&mut acct, &req, RequestStatus::Rejected).is_err());
        assert_eq!(acct.ledger.credits()[0].status, CreditStatus::Used);

        let effect = apply_leave_decision(&mut acct, &req, RequestStatus::Revoked).unwrap();
        assert_eq!(effect.credits_returned, 1);
        assert_eq!(effect.quota_refunded, 0);
        let credit = &acct.ledger.credits()[0];
        assert_eq!(credit.status, CreditStatus::Available);
        assert_eq!(credit.reserved_by, None);
        assert_eq!(acct.leaves_remaining(), 10);
    }

    #[test]
    fn revoke_refunds_only_days_not_covered_by_credits() {
        let mut acct = account(10, vec![credit_valid_on(1, "2025-05-02")]);
        let mut req = leave(7, "2025-06-10", "2025-06-12", 3);
        submit(&mut acct, &req);
        assert_eq!(acct.leaves_remaining(), 8);

        apply_leave_decision(&mut acct, &req, RequestStatus::Approved).unwrap();
        req.status = RequestStatus::Approved;
        let effect = apply_leave_decision(&mut acct, &req, RequestStatus::Revoked).unwrap();

        assert_eq!(effect.quota_refunded, 2);
        assert_eq!(acct.leaves_remaining(), 10);
    }

    #[test]
    fn reject_releases_pending_credit() {
        let mut acct = account(4, vec![credit_valid_on(1, "2025-05-02")]);
        let req = leave(7, "2025-06-10", "2025-06-11", 2);
        submit(&mut acct, &req);

        let effect = apply_leave_decision(&mut acct, &req, RequestStatus::Rejected).unwrap();
        assert_eq!(effect, LedgerEffect { credits_returned: 1, quota_refunded: 1, ..Default::default() });
        assert_eq!(acct.leaves_remaining(), 4);
        assert_eq!(acct.ledger.available_count(), 1);
    }

    #[test]
    fn two_leaves_never_share_a_credit() {
        let mut acct = account(10, vec![credit_valid_on(1, "2025-05-02")]);
        let first = leave(7, "2025-06-10", "2025-06-10", 1);
        let second = leave(8, "2025-06-11", "2025-06-11", 1);
        submit(&mut acct, &first);
        submit(&mut acct, &second);

        assert_eq!(acct.ledger.reserved_by(7).len(), 1);
        assert!(acct.ledger.reserved_by(8).is_empty());
        assert_eq!(acct.leaves_remaining(), 9);

        apply_leave_decision(&mut acct, &first, RequestStatus::Approved).unwrap();
        apply_leave_decision(&mut acct, &second, RequestStatus::Approved).unwrap();
        assert_eq!(acct.leaves_remaining(), 9);
    }

    #[test]
    fn approving_three_day_earning_creates_three_credits() {
        let mut acct = account(0, Vec::new());
        let req = earning(3, "2025-03-01", "2025-03-03");

        let effect = apply_attendance_decision(&mut acct, &req, RequestStatus::Approved).unwrap();
        assert_eq!(effect.credits_created, 3);

        let earned: Vec<NaiveDate> = acct.ledger.credits().iter().map(|c| c.earned_date).collect();
        assert_eq!(earned, vec![d("2025-03-01"), d("2025-03-02"), d("2025-03-03")]);
        assert!(acct.ledger.credits().iter().all(|c| c.id.is_none()));
        assert!(acct.ledger.credits().iter().all(|c| c.status == CreditStatus::Available));
    }

    #[test]
    fn rejected_earning_creates_nothing() {
        let mut acct = account(0, Vec::new());
        let req = earning(3, "2025-03-01", "2025-03-03");
        let effect = apply_attendance_decision(&mut acct, &req, RequestStatus::Rejected).unwrap();
        assert_eq!(effect, LedgerEffect::default());
        assert!(acct.ledger.credits().is_empty());
    }

    #[test]
    fn regularization_has_no_ledger_effect() {
        let mut acct = account(5, Vec::new());
        let mut req = earning(4, "2025-03-01", "2025-03-01");
        req.kind = AttendanceKind::General;

        let effect = apply_attendance_decision(&mut acct, &req, RequestStatus::Approved).unwrap();
        assert_eq!(effect, LedgerEffect::default());
        assert!(!acct.has_changes());
    }

    #[test]
    fn foreign_request_is_refused() {
        let mut acct = account(5, Vec::new());
        let mut req = leave(7, "2025-06-10", "2025-06-10", 1);
        req.employee_id = 2000;
        assert!(apply_leave_decision(&mut acct, &req, RequestStatus::Approved).is_err());
    }
}
