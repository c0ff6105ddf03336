use actix_web::dev::Payload;
use actix_web::{http, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::errors::AppError;
use crate::utils::jwt::{Claims, TokenKeys, ADMIN_ROLE};

/// Claims of a request carrying a valid admin token.
///
/// Taking this as a handler argument gates the route: a missing, malformed,
/// badly signed or expired token is rejected with 401, a valid token for any
/// other role with 403. On success the claims are also stored in the request
/// extensions.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| {
            let mut parts = auth.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                    Some(token)
                }
                _ => None,
            }
        })
}

pub fn authenticate(req: &HttpRequest) -> Result<Claims, AppError> {
    let keys = req
        .app_data::<web::Data<TokenKeys>>()
        .ok_or_else(|| AppError::InternalServerError("Token keys are not configured".to_string()))?;

    let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let claims = keys.validate_token(token).map_err(|err| {
        log::warn!("Rejected token on '{}': {}", req.path(), err);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    if claims.role != ADMIN_ROLE {
        log::warn!("Non-admin token for {} on '{}'", claims.email, req.path());
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    req.extensions_mut().insert(claims.clone());
    Ok(claims)
}

impl FromRequest for AdminClaims {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AdminClaims))
    }
}
