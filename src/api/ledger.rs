use crate::auth::auth::AuthUser;
use crate::error::LedgerError;
use crate::service::LedgerService;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct LedgerQuery {
    /// Also list credits that already expired
    pub include_expired: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct GrantQuota {
    #[schema(example = 5)]
    pub days: i32,
}

/// Leave quota and comp-off credits of an employee
#[utoipa::path(
    get,
    path = "/api/ledger/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose ledger to show"),
        LedgerQuery
    ),
    responses(
        (status = 200, description = "Current balance", body = crate::model::employee::EmployeeBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ledger"
)]
pub async fn get_ledger(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    path: web::Path<u64>,
    query: web::Query<LedgerQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if !auth.can_view(employee_id) {
        return Err(LedgerError::forbidden("Not your ledger").into());
    }

    let balance = service
        .ledger_view(
            &auth.tenant_id,
            employee_id,
            query.include_expired.unwrap_or(false),
        )
        .await?;

    Ok(HttpResponse::Ok().json(balance))
}

/// Top up an employee's leave quota (Admin)
#[utoipa::path(
    put,
    path = "/api/ledger/{employee_id}/grant",
    params(
        ("employee_id" = u64, Path, description = "Employee receiving the days")
    ),
    request_body = GrantQuota,
    responses(
        (status = 200, description = "Quota granted", body = crate::model::employee::EmployeeBalance),
        (status = 400, description = "Days must be positive"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ledger"
)]
pub async fn grant_quota(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    path: web::Path<u64>,
    payload: web::Json<GrantQuota>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    let balance = service
        .grant_quota(&auth.tenant_id, employee_id, payload.days, auth.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(balance))
}
