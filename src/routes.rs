use crate::{
    api::{absence, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/absences")
                    // literal segments before /{id}
                    .service(
                        web::resource("").route(web::post().to(absence::create_absence)),
                    )
                    .service(
                        web::resource("/me").route(web::get().to(absence::list_my_absences)),
                    )
                    .service(
                        web::resource("/pending").route(web::get().to(absence::list_pending)),
                    )
                    .service(
                        web::resource("/accepted").route(web::get().to(absence::list_accepted)),
                    )
                    .service(
                        web::resource("/rejected").route(web::get().to(absence::list_rejected)),
                    )
                    .service(
                        web::resource("/{id}/accept")
                            .route(web::patch().to(absence::accept_absence)),
                    )
                    .service(
                        web::resource("/{id}/decline")
                            .route(web::post().to(absence::decline_absence)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(absence::delete_absence)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/{id}/absences")
                            .route(web::get().to(absence::list_user_absences)),
                    ),
            ),
    );
}
