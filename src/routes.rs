use crate::{
    api::{dashboard, employee, presence, salary, scanner},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

/// Per-scope limiter, `requests_per_min` sustained with the same burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // both values are non-zero
        .expect("valid governor config");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let screen_limiter = Arc::new(build_limiter(config.rate_screen_per_min));

    cfg.service(
        web::scope(&config.kiosk_prefix)
            // scanner routes, kept on their own budget
            .service(
                web::scope("/scanner")
                    .wrap(scan_limiter)
                    // /scanner/session
                    .service(
                        web::resource("/session")
                            .route(web::get().to(scanner::session_status))
                            .route(web::post().to(scanner::start_session))
                            .route(web::delete().to(scanner::stop_session)),
                    )
                    // /scanner/session/manual
                    .service(
                        web::resource("/session/manual")
                            .route(web::post().to(scanner::manual_entry)),
                    )
                    .service(web::resource("/upload").route(web::post().to(scanner::upload)))
                    .service(web::resource("/pointage").route(web::post().to(scanner::pointage)))
                    .service(web::resource("/notices").route(web::get().to(scanner::notices))),
            )
            // screen routes
            .service(
                web::scope("")
                    .wrap(screen_limiter)
                    .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
                    // /employees
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/employees/{id}/qrcode")
                            .route(web::get().to(employee::employee_qrcode)),
                    )
                    .service(
                        web::resource("/employees/{id}/qrcode/base64")
                            .route(web::get().to(employee::employee_qrcode_base64)),
                    )
                    // /presences
                    .service(
                        web::resource("/presences")
                            .route(web::get().to(presence::list_presences))
                            .route(web::post().to(presence::create_presence)),
                    )
                    .service(
                        web::resource("/presences/stats")
                            .route(web::get().to(presence::presence_stats)),
                    )
                    // /salaries
                    .service(web::resource("/salaries").route(web::get().to(salary::list_bulletins)))
                    .service(
                        web::resource("/salaries/stats").route(web::get().to(salary::salary_stats)),
                    )
                    .service(
                        web::resource("/salaries/calculate-all")
                            .route(web::post().to(salary::calculate_all)),
                    )
                    .service(
                        web::resource("/salaries/generate/{employee_id}")
                            .route(web::post().to(salary::generate_bulletin)),
                    )
                    .service(
                        web::resource("/salaries/{id}/pdf").route(web::get().to(salary::bulletin_pdf)),
                    )
                    .service(
                        web::resource("/salaries/{id}/send-email")
                            .route(web::post().to(salary::send_bulletin)),
                    ),
            ),
    );
}
