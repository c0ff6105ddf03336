use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::AdminCredentials;
use crate::errors::AppError;
use crate::utils::jwt::TokenKeys;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    success: bool,
    token: String,
}

pub async fn admin_login(
    req: web::Json<LoginRequest>,
    admin: web::Data<AdminCredentials>,
    keys: web::Data<TokenKeys>,
) -> Result<HttpResponse, AppError> {
    if !admin.verify(&req.email, &req.password) {
        log::warn!("Failed admin login for '{}'", req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = keys
        .generate_admin_token(admin.email())
        .map_err(|err| AppError::InternalServerError(format!("Token generation error: {}", err)))?;

    log::info!("Admin {} logged in", admin.email());
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
    }))
}
