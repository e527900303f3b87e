use crate::auth::auth::AuthUser;
use crate::model::request::{RequestSource, RequestStatus};
use crate::service::LedgerService;
use crate::service::processor::RequestAction;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ActOnRequest {
    /// Table the request id belongs to
    #[schema(example = "leave")]
    pub source: RequestSource,
    /// approved, rejected or revoked (leave only)
    #[schema(example = "approved")]
    pub status: RequestStatus,
    #[schema(example = "Enjoy the break")]
    pub manager_notes: Option<String>,
}

/* =========================
Approve / reject / revoke (manager, HR, admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/requests/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the leave, comp-off or attendance request")
    ),
    request_body = ActOnRequest,
    responses(
        (status = 200, description = "Request decided and ledger updated", body = crate::service::processor::ActionOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to act on this request"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed or transition not allowed for this kind", body = Object, example = json!({
            "message": "Request is already rejected, cannot be approved"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Approval"
)]
pub async fn act_on_request(
    auth: AuthUser,
    service: web::Data<LedgerService>,
    path: web::Path<u64>,
    payload: web::Json<ActOnRequest>,
) -> actix_web::Result<impl Responder> {
    let approver = auth.approver()?;
    let request_id = path.into_inner();
    let payload = payload.into_inner();

    let outcome = service
        .act_on_request(
            &auth.tenant_id,
            &approver,
            request_id,
            &RequestAction {
                source: payload.source,
                status: payload.status,
                manager_notes: payload.manager_notes.filter(|n| !n.trim().is_empty()),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}
