use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::{LedgerService, today};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::approval::{LedgerEffect, apply_attendance_decision, apply_leave_decision};
use crate::model::attendance::AttendanceKind;
use crate::model::notification::NotificationEvent;
use crate::model::request::{RequestSource, RequestStatus};
use crate::model::tenant::TenantId;
use crate::store;
use crate::store::requests::Decision;

/// Who is acting on a request.
#[derive(Debug, Clone, Copy)]
pub struct Approver {
    pub employee_id: u64,
    /// HR and admins may act on any request; managers only on requests
    /// addressed to them or to nobody.
    pub any_request: bool,
}

pub struct RequestAction {
    pub source: RequestSource,
    pub status: RequestStatus,
    pub manager_notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionOutcome {
    #[schema(example = "Leave request approved")]
    pub message: String,
    #[schema(example = 7)]
    pub request_id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "approved")]
    pub status: RequestStatus,
    pub effect: LedgerEffect,
}

fn authorize(
    approver: &Approver,
    applicant: u64,
    assigned_manager: Option<u64>,
) -> LedgerResult<()> {
    if approver.employee_id == applicant {
        return Err(LedgerError::forbidden("You cannot act on your own request"));
    }
    if !approver.any_request && assigned_manager.is_some_and(|m| m != approver.employee_id) {
        return Err(LedgerError::forbidden("Request is assigned to another manager"));
    }
    Ok(())
}

fn kind_label(source: RequestSource) -> &'static str {
    match source {
        RequestSource::Leave => "Leave request",
        RequestSource::Compoff => "Comp-off request",
        RequestSource::Attendance => "Attendance regularization",
    }
}

fn describe(source: RequestSource, status: RequestStatus) -> String {
    format!("{} {}", kind_label(source), status.as_str())
}

/// Text shown to the applicant, e.g. "Your leave request from 2025-06-10 to
/// 2025-06-12 was approved".
fn applicant_notice(source: RequestSource, status: RequestStatus, detail: &str) -> String {
    let mut text = format!("Your {}", kind_label(source).to_lowercase());
    if !detail.is_empty() {
        text.push(' ');
        text.push_str(detail);
    }
    text.push_str(" was ");
    text.push_str(status.as_str());
    text
}

impl LedgerService {
    /// Approves, rejects or revokes a request and applies its ledger effect
    /// in one transaction. After commit, one notification is queued for the
    /// applicant; that step cannot fail the action.
    pub async fn act_on_request(
        &self,
        tenant: &TenantId,
        approver: &Approver,
        request_id: u64,
        action: &RequestAction,
    ) -> LedgerResult<ActionOutcome> {
        let decision = Decision {
            status: action.status,
            manager_id: approver.employee_id,
            manager_notes: action.manager_notes.as_deref(),
            at: Utc::now().naive_utc(),
        };

        let mut tx = store::begin(&self.pool, self.lock_wait_secs).await?;

        let (employee_id, effect, detail) = match action.source {
            RequestSource::Leave => {
                let leave = store::requests::lock_leave(&mut tx, tenant, request_id).await?;
                authorize(approver, leave.employee_id, leave.manager_id)?;

                let mut account =
                    store::accounts::lock_account(&mut tx, tenant, leave.employee_id, false).await?;
                account.sweep_expired(today());
                let effect = apply_leave_decision(&mut account, &leave, action.status)?;
                // reinstated credits may already be past expiry
                account.sweep_expired(today());

                store::accounts::save_account(&mut tx, tenant, &account).await?;
                store::requests::decide_leave(&mut tx, tenant, request_id, &decision).await?;

                let detail = format!("from {} to {}", leave.start_date, leave.end_date);
                (leave.employee_id, effect, detail)
            }
            RequestSource::Compoff | RequestSource::Attendance => {
                let request = store::requests::lock_attendance(&mut tx, tenant, request_id).await?;
                let expected = match action.source {
                    RequestSource::Compoff => AttendanceKind::CompOff,
                    _ => AttendanceKind::General,
                };
                if request.kind != expected {
                    return Err(LedgerError::validation(format!(
                        "Request {} is a {} request",
                        request_id,
                        request.kind.as_str()
                    )));
                }
                authorize(approver, request.employee_id, None)?;

                let mut account =
                    store::accounts::lock_account(&mut tx, tenant, request.employee_id, false)
                        .await?;
                account.sweep_expired(today());
                let effect = apply_attendance_decision(&mut account, &request, action.status)?;

                store::accounts::save_account(&mut tx, tenant, &account).await?;
                store::requests::decide_attendance(&mut tx, tenant, request_id, &decision).await?;

                let dates = request.covered_dates();
                let detail = match (dates.first(), dates.last()) {
                    (Some(first), Some(last)) if first != last => format!("for {} to {}", first, last),
                    (Some(first), _) => format!("for {}", first),
                    _ => String::new(),
                };
                (request.employee_id, effect, detail)
            }
        };

        tx.commit().await?;

        let message = describe(action.source, action.status);
        tracing::info!(
            tenant_id = %tenant,
            request_id,
            employee_id,
            source = ?action.source,
            status = ?action.status,
            manager_id = approver.employee_id,
            credits_consumed = effect.credits_consumed,
            credits_returned = effect.credits_returned,
            credits_created = effect.credits_created,
            quota_refunded = effect.quota_refunded,
            "Request decided"
        );

        self.bus.publish(NotificationEvent::new(
            tenant.as_str(),
            format!("{}_{}", action.source.as_str(), action.status.as_str()),
            employee_id,
            request_id,
            applicant_notice(action.source, action.status, &detail),
        ));

        Ok(ActionOutcome {
            message,
            request_id,
            employee_id,
            status: action.status,
            effect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approvers_cannot_decide_their_own_requests() {
        let hr = Approver { employee_id: 5, any_request: true };
        assert!(matches!(authorize(&hr, 5, None), Err(LedgerError::Forbidden(_))));
        assert!(authorize(&hr, 6, Some(9)).is_ok());
    }

    #[test]
    fn managers_only_decide_requests_addressed_to_them() {
        let manager = Approver { employee_id: 9, any_request: false };
        assert!(authorize(&manager, 6, Some(9)).is_ok());
        assert!(authorize(&manager, 6, None).is_ok());
        assert!(authorize(&manager, 6, Some(10)).is_err());
    }

    #[test]
    fn messages_name_the_request_kind() {
        assert_eq!(describe(RequestSource::Leave, RequestStatus::Revoked), "Leave request revoked");
        assert_eq!(describe(RequestSource::Compoff, RequestStatus::Approved), "Comp-off request approved");
    }

    #[test]
    fn applicant_notice_reads_naturally() {
        assert_eq!(
            applicant_notice(RequestSource::Leave, RequestStatus::Approved, "from 2025-06-10 to 2025-06-12"),
            "Your leave request from 2025-06-10 to 2025-06-12 was approved"
        );
        assert_eq!(
            applicant_notice(RequestSource::Attendance, RequestStatus::Rejected, ""),
            "Your attendance regularization was rejected"
        );
    }
}
