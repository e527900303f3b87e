use crate::auth::jwt::{Claims, verify_token};
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::model::{role::Role, tenant::TenantId};
use crate::service::processor::Approver;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub tenant_id: TenantId,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Result<Self, &'static str> {
        let role = Role::from_id(claims.role).ok_or("Invalid role")?;
        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
            tenant_id: TenantId::new(claims.tenant_id),
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::from_claims(claims).map_err(ErrorUnauthorized))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> LedgerResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(LedgerError::forbidden("Admin only"))
        }
    }

    /// Employee id of the caller; ledger operations on one's own record need it.
    pub fn require_employee(&self) -> LedgerResult<u64> {
        self.employee_id
            .ok_or_else(|| LedgerError::forbidden("No employee profile"))
    }

    /// Approvers act under their employee id so they can be recorded as the
    /// deciding manager and kept off their own requests.
    pub fn approver(&self) -> LedgerResult<Approver> {
        if !self.role.can_approve() {
            return Err(LedgerError::forbidden("Only managers, HR or admins can act on requests"));
        }
        Ok(Approver {
            employee_id: self.require_employee()?,
            any_request: matches!(self.role, Role::Admin | Role::Hr),
        })
    }

    /// Whether the caller may read another employee's ledger or requests.
    pub fn can_view(&self, employee_id: u64) -> bool {
        self.role.can_approve() || self.employee_id == Some(employee_id)
    }
}
