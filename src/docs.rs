use crate::api::approval::ActOnRequest;
use crate::api::attendance::{EarnCompOff, RegularizeAttendance};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::ledger::GrantQuota;
use crate::ledger::approval::LedgerEffect;
use crate::ledger::reservation::FundedBy;
use crate::model::attendance::{AttendanceKind, AttendanceRequest};
use crate::model::comp_off::{CompOffCredit, CreditStatus};
use crate::model::employee::EmployeeBalance;
use crate::model::leave_request::{LeaveRequest, LeaveType};
use crate::model::request::{RequestSource, RequestStatus};
use crate::service::intake::SubmittedLeave;
use crate::service::processor::ActionOutcome;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "0.1.0",
        description = r#"
## Leave and Comp-off Ledger

Tracks each employee's leave quota and compensatory-off credits and keeps
them consistent while requests move through approval.

### 🔹 Key Features
- **Leave**
  - Apply for leave; credits and quota are reserved at submission
  - Withdraw a pending request
- **Comp-off**
  - Claim credits for worked non-business days, one credit per day
  - Credits become usable the next month and expire after four months
- **Approval**
  - Approve, reject or revoke; the ledger effect commits with the status
- **Ledger**
  - Balance and credit history; admin quota grants

### 🔐 Security
Every endpoint needs a **JWT Bearer** access token issued by the identity
service. The token's tenant scopes all reads and writes.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::withdraw_leave,

        crate::api::attendance::submit_attendance,
        crate::api::attendance::submit_compoff,

        crate::api::approval::act_on_request,

        crate::api::ledger::get_ledger,
        crate::api::ledger::grant_quota
    ),
    components(
        schemas(
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRequest,
            LeaveType,
            SubmittedLeave,
            FundedBy,
            RegularizeAttendance,
            EarnCompOff,
            AttendanceRequest,
            AttendanceKind,
            ActOnRequest,
            ActionOutcome,
            LedgerEffect,
            RequestSource,
            RequestStatus,
            GrantQuota,
            EmployeeBalance,
            CompOffCredit,
            CreditStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave requests"),
        (name = "Attendance", description = "Regularization and comp-off earning"),
        (name = "Approval", description = "Manager decisions"),
        (name = "Ledger", description = "Quota and comp-off balances"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/leave",
            "/api/leave/{leave_id}",
            "/api/attendance",
            "/api/compoff",
            "/api/requests/{request_id}",
            "/api/ledger/{employee_id}",
            "/api/ledger/{employee_id}/grant",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
