pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use actix_web::web;

use crate::errors::AppError;

/// Registers extractor error handlers and every route. Callers provide the
/// `EmployeeService`, `AdminCredentials` and `TokenKeys` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
    )
    .route("/", web::get().to(handlers::index))
    .service(
        web::scope("/api")
            .route("/login", web::post().to(handlers::auth::admin_login))
            .service(
                web::scope("/employee")
                    .route("/create", web::post().to(handlers::employee::create_employee))
                    .route("/list", web::get().to(handlers::employee::get_employees))
                    .route("/list/{id}", web::get().to(handlers::employee::get_employee))
                    .route("/update/{id}", web::put().to(handlers::employee::update_employee))
                    .route("/delete/{id}", web::delete().to(handlers::employee::delete_employee)),
            ),
    );
}
