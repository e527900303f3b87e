use crate::auth::auth::AuthUser;
use crate::error::LedgerError;
use crate::model::leave_request::{LeaveRequest, LeaveType};
use crate::model::request::RequestStatus;
use crate::service::LedgerService;
use crate::service::intake::LeaveSubmission;
use crate::store::requests;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2025-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "Family visit")]
    pub reason: String,
    /// Manager who should decide the request
    #[schema(example = 12)]
    pub manager_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 1000)]
    /// Filter by employee ID; ignored for plain employees
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<RequestStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

/* =========================
Create leave request
========================= */
/// Submit a leave request. Comp-off credits covering the dates are reserved
/// first, the rest is debited from the leave quota.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = crate::service::intake::SubmittedLeave),
        (status = 400, description = "Invalid dates or no business days in range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Overlapping leave or insufficient balance", body = Object, example = json!({
            "message": "Insufficient leave balance: 3 requested, 1 remaining"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    let submitted = service
        .submit_leave(
            &auth.tenant_id,
            employee_id,
            &LeaveSubmission {
                start_date: payload.start_date,
                end_date: payload.end_date,
                leave_type: payload.leave_type,
                reason: payload.reason,
                manager_id: payload.manager_id,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(submitted))
}

/* =========================
Withdraw pending leave (owner)
========================= */
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to withdraw")
    ),
    responses(
        (status = 200, description = "Leave withdrawn, reservation returned", body = Object, example = json!({
            "message": "Leave request withdrawn"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the applicant"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn withdraw_leave(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let leave_id = path.into_inner();

    service
        .withdraw_leave(&auth.tenant_id, employee_id, leave_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request withdrawn"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let leave = service.get_leave(&auth.tenant_id, leave_id).await?;

    if !auth.can_view(leave.employee_id) {
        return Err(LedgerError::forbidden("Not your leave request").into());
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // employees only ever see their own requests
    let employee_id = if auth.role.can_approve() {
        query.employee_id
    } else {
        Some(auth.require_employee()?)
    };

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let (leaves, total) = service
        .list_leaves(&requests::LeaveFilter {
            employee_id,
            status: query.status,
            page,
            per_page,
            tenant: &auth.tenant_id,
        })
        .await?;

    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
