pub mod auth;
pub mod employee;

use actix_web::HttpResponse;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Welcome to the API!")
}
