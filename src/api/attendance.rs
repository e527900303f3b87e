use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceKind;
use crate::service::LedgerService;
use crate::service::intake::AttendanceSubmission;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegularizeAttendance {
    #[schema(example = "2025-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Forgot to punch in")]
    pub reason: String,
}

/// Either `date`, or both `start_date` and `end_date`.
#[derive(Deserialize, ToSchema)]
pub struct EarnCompOff {
    #[schema(example = "2025-03-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Release weekend")]
    pub reason: String,
}

/// Attendance regularization request
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RegularizeAttendance,
    responses(
        (status = 201, description = "Regularization request recorded", body = crate::model::attendance::AttendanceRequest),
        (status = 400, description = "Invalid or future date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Date already requested or on leave", body = Object, example = json!({
            "message": "Attendance already submitted for this date"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    payload: web::Json<RegularizeAttendance>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    let request = service
        .submit_attendance(
            &auth.tenant_id,
            employee_id,
            &AttendanceSubmission {
                kind: AttendanceKind::General,
                date: Some(payload.date),
                start_date: None,
                end_date: None,
                reason: payload.reason,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(request))
}

/// Comp-off earning request for worked non-business days
#[utoipa::path(
    post,
    path = "/api/compoff",
    request_body = EarnCompOff,
    responses(
        (status = 201, description = "Comp-off earning request recorded", body = crate::model::attendance::AttendanceRequest),
        (status = 400, description = "Invalid date shape, future date or range too long"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Dates already requested or on leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_compoff(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    payload: web::Json<EarnCompOff>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    let request = service
        .submit_attendance(
            &auth.tenant_id,
            employee_id,
            &AttendanceSubmission {
                kind: AttendanceKind::CompOff,
                date: payload.date,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(request))
}
