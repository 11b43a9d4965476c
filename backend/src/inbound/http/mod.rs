//! HTTP inbound adapter exposing the REST surface under `/api/v1`.

pub mod admin;
pub mod deliveries;
pub mod error;
pub mod health;
pub mod postcards;
pub mod secrets;
pub mod session;
pub mod session_config;
pub mod stamps;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::sign_up)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::search_users)
        .service(postcards::send_postcard)
        .service(postcards::inbox)
        .service(postcards::contacts)
        .service(stamps::shop)
        .service(stamps::collected)
        .service(stamps::collect)
        .service(stamps::submit_request)
        .service(admin::list_stamps)
        .service(admin::create_stamp)
        .service(admin::pending_requests)
        .service(admin::approve_request)
        .service(admin::reject_request)
        .service(admin::promote_request)
        .service(deliveries::run_sweep);
}

/// Extractor settings that turn malformed input into `invalid_request`.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(error::json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
    .app_data(web::PathConfig::default().error_handler(error::path_error_handler));
}
