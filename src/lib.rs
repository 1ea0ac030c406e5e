pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod utils;

use actix_web::{error, web, HttpRequest};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::errors::AppError;

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query parameters: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
}

/// Registers the API routes. The caller provides `web::Data<dyn WorkoutStore>`
/// and `web::Data<JwtKeys>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Authentication middleware
    let auth = HttpAuthentication::with_fn(crate::utils::jwt::validator);

    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::resource("/v1/workouts")
                .wrap(auth.clone())
                .route(web::get().to(handlers::workout::get_workouts))
                .route(web::post().to(handlers::workout::create_workout)),
        )
        .service(
            web::resource("/v1/workouts/{id}")
                .wrap(auth.clone())
                .route(web::get().to(handlers::workout::get_workout)),
        )
        .service(
            web::resource("/v1/workouts/{id}/log-today")
                .wrap(auth.clone())
                .route(web::post().to(handlers::workout_log::log_today)),
        )
        .service(
            web::resource("/v1/workout-logs")
                .wrap(auth.clone())
                .route(web::get().to(handlers::workout_log::get_logged_dates))
                .route(web::post().to(handlers::workout_log::create_workout_log)),
        )
        .service(
            web::resource("/v1/workout-logs/by-date")
                .wrap(auth)
                .route(web::get().to(handlers::workout_log::get_logs_by_date)),
        );
}
