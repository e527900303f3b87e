use crate::{
    api::{approval, attendance, leave_request, ledger},
    auth::middleware::auth_middleware,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit of {} per minute", requests_per_min))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &LimiterConfig) {
    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::delete().to(leave_request::withdraw_leave)),
                    ),
            )
            .service(
                web::resource("/attendance").route(web::post().to(attendance::submit_attendance)),
            )
            .service(web::resource("/compoff").route(web::post().to(attendance::submit_compoff)))
            // /requests/{id}
            .service(
                web::resource("/requests/{id}").route(web::put().to(approval::act_on_request)),
            )
            .service(
                web::scope("/ledger")
                    // /ledger/{employee_id}
                    .service(
                        web::resource("/{employee_id}").route(web::get().to(ledger::get_ledger)),
                    )
                    // /ledger/{employee_id}/grant
                    .service(
                        web::resource("/{employee_id}/grant")
                            .route(web::put().to(ledger::grant_quota)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_accepts_any_rate() {
        assert!(build_limiter(1000).is_ok());
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(120_000).is_ok());
    }
}
