use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use crate::error::{LedgerError, LedgerResult};
use crate::model::comp_off::{CompOffCredit, CreditStatus};

/// Months after the earning month during which a credit stays usable.
const VALIDITY_MONTHS: i32 = 4;

/// Handle to one credit inside a loaded [`CompOffLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreditSlot(usize);

fn first_of_month(month_index: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(month_index.div_euclid(12), month_index.rem_euclid(12) as u32 + 1, 1)
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// First day of the month following `earned`.
pub fn valid_from_for(earned: NaiveDate) -> Option<NaiveDate> {
    first_of_month(month_index(earned) + 1)
}

/// Last day of the fourth month after `earned`'s month.
pub fn expiry_for(earned: NaiveDate) -> Option<NaiveDate> {
    first_of_month(month_index(earned) + VALIDITY_MONTHS + 1)?.pred_opt()
}

/// Per-employee comp-off credits, kept in insertion (earliest-earned) order.
///
/// Mutations go through the lifecycle methods below and mark the touched
/// slot dirty; the store only writes dirty slots back.
#[derive(Debug, Clone, Default)]
pub struct CompOffLedger {
    employee_id: u64,
    credits: Vec<CompOffCredit>,
    dirty: BTreeSet<usize>,
}

impl CompOffLedger {
    pub fn new(employee_id: u64, credits: Vec<CompOffCredit>) -> Self {
        CompOffLedger {
            employee_id,
            credits,
            dirty: BTreeSet::new(),
        }
    }

    pub fn credits(&self) -> &[CompOffCredit] {
        &self.credits
    }

    pub fn get(&self, slot: CreditSlot) -> Option<&CompOffCredit> {
        self.credits.get(slot.0)
    }

    pub fn available_count(&self) -> usize {
        self.credits
            .iter()
            .filter(|c| c.status == CreditStatus::Available)
            .count()
    }

    /// Credits written or created since load.
    pub fn changed(&self) -> impl Iterator<Item = &CompOffCredit> + '_ {
        self.dirty.iter().filter_map(|i| self.credits.get(*i))
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Earliest-earned `available` credit whose validity window covers `date`.
    pub fn find_usable_credit(&self, date: NaiveDate) -> Option<CreditSlot> {
        self.credits
            .iter()
            .position(|c| c.status == CreditStatus::Available && c.covers(date))
            .map(CreditSlot)
    }

    /// Slots held by `request_id`, in ledger order.
    pub fn reserved_by(&self, request_id: u64) -> Vec<CreditSlot> {
        self.credits
            .iter()
            .enumerate()
            .filter(|(_, c)| c.reserved_by == Some(request_id))
            .map(|(i, _)| CreditSlot(i))
            .collect()
    }

    fn slot_mut(&mut self, slot: CreditSlot) -> LedgerResult<&mut CompOffCredit> {
        self.dirty.insert(slot.0);
        self.credits
            .get_mut(slot.0)
            .ok_or_else(|| LedgerError::not_found("Comp-off credit not found"))
    }

    fn transition(
        &mut self,
        slot: CreditSlot,
        request_id: u64,
        from: CreditStatus,
        to: CreditStatus,
    ) -> LedgerResult<()> {
        let employee_id = self.employee_id;
        let credit = self
            .credits
            .get(slot.0)
            .ok_or_else(|| LedgerError::not_found("Comp-off credit not found"))?;

        if credit.status != from {
            return Err(LedgerError::conflict(format!(
                "Comp-off credit is {}, expected {}",
                credit.status.as_str(),
                from.as_str()
            )));
        }
        if from != CreditStatus::Available && credit.reserved_by != Some(request_id) {
            return Err(LedgerError::conflict(
                "Comp-off credit is held by another request",
            ));
        }

        let credit = self.slot_mut(slot)?;
        credit.status = to;
        credit.reserved_by = match to {
            CreditStatus::Pending | CreditStatus::Used => Some(request_id),
            CreditStatus::Available | CreditStatus::Expired => None,
        };

        tracing::debug!(
            employee_id,
            request_id,
            credit_id = ?credit.id,
            ?from,
            ?to,
            "Comp-off credit transition"
        );
        Ok(())
    }

    /// `available → pending`, held by `request_id`.
    pub fn reserve(&mut self, slot: CreditSlot, request_id: u64) -> LedgerResult<()> {
        self.transition(slot, request_id, CreditStatus::Available, CreditStatus::Pending)
    }

    /// `pending → available`; only the holding request may release.
    pub fn release(&mut self, slot: CreditSlot, request_id: u64) -> LedgerResult<()> {
        self.transition(slot, request_id, CreditStatus::Pending, CreditStatus::Available)
    }

    /// `pending → used` on approval of the holding request.
    pub fn consume(&mut self, slot: CreditSlot, request_id: u64) -> LedgerResult<()> {
        self.transition(slot, request_id, CreditStatus::Pending, CreditStatus::Used)
    }

    /// `used → available`, reachable only by revoking the approved request
    /// that consumed the credit.
    pub fn reinstate(&mut self, slot: CreditSlot, request_id: u64) -> LedgerResult<()> {
        self.transition(slot, request_id, CreditStatus::Used, CreditStatus::Available)
    }

    /// Marks every `available` credit with `expiry_date < today` as expired.
    /// Returns how many flipped; running it twice is a no-op.
    pub fn sweep_expired(&mut self, today: NaiveDate) -> usize {
        let expired: Vec<usize> = self
            .credits
            .iter()
            .enumerate()
            .filter(|(_, c)| c.status == CreditStatus::Available && c.expiry_date < today)
            .map(|(i, _)| i)
            .collect();

        for i in &expired {
            self.credits[*i].status = CreditStatus::Expired;
            self.dirty.insert(*i);
        }
        expired.len()
    }

    /// Appends a fresh `available` credit earned on `earned_date`.
    pub fn credit(&mut self, earned_date: NaiveDate) -> LedgerResult<CreditSlot> {
        let out_of_range = || LedgerError::validation(format!("Earned date {} out of range", earned_date));
        let credit = CompOffCredit {
            id: None,
            employee_id: self.employee_id,
            earned_date,
            valid_from: valid_from_for(earned_date).ok_or_else(out_of_range)?,
            expiry_date: expiry_for(earned_date).ok_or_else(out_of_range)?,
            status: CreditStatus::Available,
            reserved_by: None,
        };

        self.credits.push(credit);
        let idx = self.credits.len() - 1;
        self.dirty.insert(idx);
        Ok(CreditSlot(idx))
    }
}
