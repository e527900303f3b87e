use chrono::NaiveDate;

use super::comp_off::CompOffLedger;
use crate::error::{LedgerError, LedgerResult};
use crate::model::comp_off::CreditStatus;
use crate::model::employee::{EmployeeBalance, EmployeeRow};

/// Employee quota plus comp-off ledger, loaded under the employee row lock.
#[derive(Debug, Clone)]
pub struct EmployeeAccount {
    pub employee_id: u64,
    pub location: String,
    leaves_remaining: i32,
    quota_changed: bool,
    pub ledger: CompOffLedger,
}

impl EmployeeAccount {
    pub fn new(row: EmployeeRow, ledger: CompOffLedger) -> Self {
        EmployeeAccount {
            employee_id: row.id,
            location: row.location,
            leaves_remaining: row.leaves_remaining,
            quota_changed: false,
            ledger,
        }
    }

    pub fn leaves_remaining(&self) -> i32 {
        self.leaves_remaining
    }

    pub fn quota_changed(&self) -> bool {
        self.quota_changed
    }

    /// Draws `days` from the quota. The quota never goes below zero.
    pub fn debit_quota(&mut self, days: i32) -> LedgerResult<()> {
        if days < 0 {
            return Err(LedgerError::validation("Cannot debit a negative number of days"));
        }
        if days > self.leaves_remaining {
            return Err(LedgerError::conflict(format!(
                "Insufficient leave balance: {} requested, {} remaining",
                days, self.leaves_remaining
            )));
        }
        if days > 0 {
            self.leaves_remaining -= days;
            self.quota_changed = true;
        }
        Ok(())
    }

    /// Returns `days` previously drawn by a request that is being unwound.
    pub fn refund_quota(&mut self, days: i32) {
        if days > 0 {
            self.leaves_remaining += days;
            self.quota_changed = true;
        }
    }

    /// Explicit admin grant; the only way quota grows outside of refunds.
    pub fn grant_quota(&mut self, days: i32) -> LedgerResult<()> {
        if days <= 0 {
            return Err(LedgerError::validation("Granted days must be positive"));
        }
        self.leaves_remaining += days;
        self.quota_changed = true;
        Ok(())
    }

    pub fn sweep_expired(&mut self, today: NaiveDate) -> usize {
        self.ledger.sweep_expired(today)
    }

    pub fn has_changes(&self) -> bool {
        self.quota_changed || self.ledger.has_changes()
    }

    pub fn balance(&self, include_expired: bool) -> EmployeeBalance {
        EmployeeBalance {
            employee_id: self.employee_id,
            leaves_remaining: self.leaves_remaining,
            available_comp_off: self.ledger.available_count(),
            credits: self
                .ledger
                .credits()
                .iter()
                .filter(|c| include_expired || c.status != CreditStatus::Expired)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(quota: i32) -> EmployeeAccount {
        EmployeeAccount::new(
            EmployeeRow {
                id: 1000,
                location: "India".into(),
                leaves_remaining: quota,
            },
            CompOffLedger::new(1000, Vec::new()),
        )
    }

    #[test]
    fn debit_beyond_balance_is_refused_untouched() {
        let mut acct = account(2);
        let err = acct.debit_quota(3).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(acct.leaves_remaining(), 2);
        assert!(!acct.has_changes());
    }

    #[test]
    fn zero_day_debit_is_not_a_change() {
        let mut acct = account(2);
        acct.debit_quota(0).unwrap();
        assert!(!acct.quota_changed());
    }

    #[test]
    fn grant_must_be_positive() {
        let mut acct = account(0);
        assert!(acct.grant_quota(0).is_err());
        acct.grant_quota(5).unwrap();
        assert_eq!(acct.leaves_remaining(), 5);
    }
}
