use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::account::EmployeeAccount;
use super::comp_off::CreditSlot;
use crate::error::{LedgerError, LedgerResult};
use crate::model::comp_off::CreditStatus;
use crate::model::request::RequestStatus;

/// How a submitted leave was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FundedBy {
    CompOff,
    Quota,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub funded_by: FundedBy,
    pub credits: Vec<CreditSlot>,
    pub quota_days: i32,
}

/// What unwinding a request handed back to the employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unwind {
    pub credits_returned: i32,
    pub quota_refunded: i32,
}

/// Funds a new leave day by day.
///
/// Each business day takes the earliest usable comp-off credit whose window
/// covers that day; days left uncovered are drawn from the quota. Nothing on
/// the account changes unless the whole request can be funded.
pub fn reserve_for_leave(
    account: &mut EmployeeAccount,
    request_id: u64,
    business_days: &[NaiveDate],
) -> LedgerResult<Reservation> {
    let mut ledger = account.ledger.clone();
    let mut credits = Vec::new();

    for day in business_days {
        if let Some(slot) = ledger.find_usable_credit(*day) {
            ledger.reserve(slot, request_id)?;
            credits.push(slot);
        }
    }

    let quota_days = business_days.len() as i32 - credits.len() as i32;
    account.debit_quota(quota_days)?;
    account.ledger = ledger;

    let funded_by = match (credits.is_empty(), quota_days) {
        (true, _) => FundedBy::Quota,
        (false, 0) => FundedBy::CompOff,
        (false, _) => FundedBy::Mixed,
    };

    tracing::info!(
        employee_id = account.employee_id,
        request_id,
        total_days = business_days.len(),
        credits_reserved = credits.len(),
        quota_days,
        "Leave reservation made"
    );

    Ok(Reservation {
        funded_by,
        credits,
        quota_days,
    })
}

/// Hands back everything `request_id` holds and refunds the quota part:
/// `total_days - credits returned`, the mirror image of [`reserve_for_leave`].
///
/// `status` is the request's status before the unwind. Pending requests
/// hold `pending` credits which are released; approved requests being
/// revoked hold `used` credits which are reinstated.
pub fn unwind_reservation(
    account: &mut EmployeeAccount,
    request_id: u64,
    status: RequestStatus,
    total_days: i32,
) -> LedgerResult<Unwind> {
    let held = match status {
        RequestStatus::Pending => CreditStatus::Pending,
        RequestStatus::Approved => CreditStatus::Used,
        other => {
            return Err(LedgerError::conflict(format!(
                "Nothing to unwind for a {} request",
                other.as_str()
            )));
        }
    };

    let mut returned = 0;
    for slot in account.ledger.reserved_by(request_id) {
        let is_held = account
            .ledger
            .get(slot)
            .map(|c| c.status == held)
            .unwrap_or(false);
        if !is_held {
            continue;
        }
        match held {
            CreditStatus::Pending => account.ledger.release(slot, request_id)?,
            _ => account.ledger.reinstate(slot, request_id)?,
        }
        returned += 1;
    }

    let refund = (total_days - returned).max(0);
    account.refund_quota(refund);

    tracing::info!(
        employee_id = account.employee_id,
        request_id,
        credits_returned = returned,
        quota_refunded = refund,
        "Leave reservation unwound"
    );

    Ok(Unwind {
        credits_returned: returned,
        quota_refunded: refund,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::comp_off::{CompOffLedger, expiry_for, valid_from_for};
    use crate::model::comp_off::CompOffCredit;
    use crate::model::employee::EmployeeRow;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn credit(id: u64, earned: &str) -> CompOffCredit {
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

    fn days(list: &[&str]) -> Vec<NaiveDate> {
        list.iter().map(|s| d(s)).collect()
    }

    #[test]
    fn quota_funded_leave_round_trips_on_reject() {
        let mut acct = account(10, Vec::new());
        let res = reserve_for_leave(&mut acct, 7, &days(&["2025-06-10", "2025-06-11", "2025-06-12"]))
            .unwrap();
        assert_eq!(res.funded_by, FundedBy::Quota);
        assert_eq!(acct.leaves_remaining(), 7);

        let unwind = unwind_reservation(&mut acct, 7, RequestStatus::Pending, 3).unwrap();
        assert_eq!(unwind.quota_refunded, 3);
        assert_eq!(acct.leaves_remaining(), 10);
    }

    #[test]
    fn comp_off_covers_single_day_without_touching_quota() {
        let mut acct = account(10, vec![credit(1, "2025-05-02")]);
        let res = reserve_for_leave(&mut acct, 7, &days(&["2025-06-10"])).unwrap();

        assert_eq!(res.funded_by, FundedBy::CompOff);
        assert_eq!(res.quota_days, 0);
        assert_eq!(acct.leaves_remaining(), 10);
        let held = acct.ledger.get(res.credits[0]).unwrap();
        assert_eq!(held.status, CreditStatus::Pending);
        assert_eq!(held.reserved_by, Some(7));
    }

    #[test]
    fn partial_cover_draws_the_rest_from_quota() {
        let mut acct = account(10, vec![credit(1, "2025-05-02")]);
        let res = reserve_for_leave(&mut acct, 7, &days(&["2025-06-10", "2025-06-11", "2025-06-12"]))
            .unwrap();

        assert_eq!(res.funded_by, FundedBy::Mixed);
        assert_eq!(res.quota_days, 2);
        assert_eq!(acct.leaves_remaining(), 8);

        let unwind = unwind_reservation(&mut acct, 7, RequestStatus::Pending, 3).unwrap();
        assert_eq!(unwind, Unwind { credits_returned: 1, quota_refunded: 2 });
        assert_eq!(acct.leaves_remaining(), 10);
        assert_eq!(acct.ledger.credits()[0].status, CreditStatus::Available);
    }

    #[test]
    fn credits_are_matched_to_the_day_they_cover() {
        // first credit valid Jun..Sep, second valid Jul..Oct
        let mut acct = account(5, vec![credit(1, "2025-05-20"), credit(2, "2025-06-20")]);
        let res = reserve_for_leave(&mut acct, 9, &days(&["2025-06-30", "2025-07-01"])).unwrap();

        assert_eq!(res.credits.len(), 2);
        assert_eq!(res.quota_days, 0);
    }

    #[test]
    fn insufficient_quota_leaves_account_untouched() {
        let mut acct = account(1, vec![credit(1, "2025-05-02")]);
        let err = reserve_for_leave(&mut acct, 7, &days(&["2025-06-10", "2025-06-11", "2025-06-12"]))
            .unwrap_err();

        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(acct.leaves_remaining(), 1);
        assert_eq!(acct.ledger.credits()[0].status, CreditStatus::Available);
        assert!(!acct.has_changes());
    }

    #[test]
    fn submit_reject_cycles_conserve_quota() {
        let mut acct = account(10, vec![credit(1, "2025-05-02")]);
        let range = days(&["2025-06-10", "2025-06-11"]);

        for request_id in 1..=5 {
            reserve_for_leave(&mut acct, request_id, &range).unwrap();
            unwind_reservation(&mut acct, request_id, RequestStatus::Pending, 2).unwrap();
        }
        assert_eq!(acct.leaves_remaining(), 10);
        assert_eq!(acct.ledger.available_count(), 1);
    }

    #[test]
    fn rejected_requests_have_nothing_to_unwind() {
        let mut acct = account(10, Vec::new());
        assert!(unwind_reservation(&mut acct, 7, RequestStatus::Rejected, 2).is_err());
        assert_eq!(acct.leaves_remaining(), 10);
    }
}
