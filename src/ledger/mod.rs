//! Leave and comp-off balance ledger.
//!
//! Everything in here is pure: it works on an [`EmployeeAccount`] that the
//! service layer loaded under a row lock, and records what changed so the
//! store can write back exactly those rows inside the same transaction.

pub mod account;
pub mod approval;
pub mod business_days;
pub mod comp_off;
pub mod reservation;

pub use account::EmployeeAccount;
pub use business_days::{HolidayCalendar, business_dates, count_business_days};
pub use comp_off::CompOffLedger;
