pub mod approval;
pub mod attendance;
pub mod leave_request;
pub mod ledger;
