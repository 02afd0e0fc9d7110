//! Bearer-token authentication.
//!
//! Token issuance belongs to the storefront's auth subsystem; this service
//! only verifies the shared-secret signature and extracts the caller's
//! identity and role.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, errors::ErrorKind, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::order::Requester;
use crate::errors::AppError;
use crate::AppState;

pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: String,
    pub exp: i64,
}

/// Authenticated caller extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Требуются права администратора".to_string(),
            ))
        }
    }

    pub fn to_requester(&self) -> Requester {
        Requester {
            user_id: self.id,
            is_admin: self.is_admin(),
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Требуется авторизация".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Токен не предоставлен".to_string()))?;

    let data = decode::<Claims>(token, &state.jwt_decoding_key, &Validation::default())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized("Токен истек".to_string()),
            _ => AppError::Unauthorized("Недействительный токен".to_string()),
        })?;

    Ok(AuthUser {
        id: data.claims.id,
        role: data.claims.role,
    })
}
