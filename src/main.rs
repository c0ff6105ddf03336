use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use ems_backend::config::Config;
use ems_backend::media::S3Uploader;
use ems_backend::services::employee::EmployeeService;
use ems_backend::store::PgEmployeeStore;
use ems_backend::utils::jwt::TokenKeys;
use ems_backend::{configure, db};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| startup_error("Invalid configuration", err))?;

    let pool = db::create_pool(&config.database_url)
        .await
        .map_err(|err| startup_error("Failed to connect to the database", err))?;
    db::run_migrations(&pool)
        .await
        .map_err(|err| startup_error("Failed to run migrations", err))?;

    let uploader = S3Uploader::from_config(&config.media).await;
    let service = web::Data::new(EmployeeService::new(
        Arc::new(PgEmployeeStore::new(pool)),
        Arc::new(uploader),
        config.max_image_bytes,
    ));
    let admin = web::Data::new(config.admin.clone());
    let keys = web::Data::new(TokenKeys::new(&config.jwt_secret));

    let bind_addr = (config.host.clone(), config.port);
    info!("Starting server at {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(service.clone())
            .app_data(admin.clone())
            .app_data(keys.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
