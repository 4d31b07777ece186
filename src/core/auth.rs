use crate::core::{AppError, AppState};
use crate::entities::User;
use crate::repositories::Read;
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const TOKEN_LIFETIME_HOURS: i64 = 24;

// content of the jwt token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i64,
    pub email: String,
}

#[instrument(skip(secret), fields(email = %email, id = %id))]
pub fn encode_jwt(email: String, id: i64, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp = (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims { exp, iat, id, email };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded for user {}", data.claims.id);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Resolves the bearer token into a [`User`] and stores it in the request extensions.
/// Missing header is 403, an invalid or expired token is 401.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Header otorisasi tidak valid")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden("Silakan masuk terlebih dahulu"));
        }
    };

    let mut parts = auth_header.split_whitespace();
    let token = match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Token tidak valid"));
        }
    };

    let token_data = decode_jwt(token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Sesi Anda telah berakhir, silakan masuk kembali"))?;

    // the account may have been deleted after the token was issued
    let current_user = match state.user.read(&token_data.claims.id).await? {
        Some(user) => user,
        None => {
            warn!("User {} in token no longer exists", token_data.claims.id);
            return Err(AppError::unauthorized("Akun tidak ditemukan"));
        }
    };

    debug!("User authenticated: {}", current_user.user_id);
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Runs after [`authentication_middleware`], lets only admins through
#[instrument(skip(req, next))]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = current_user(&req)?;
    require_admin(current_user)?;
    Ok(next.run(req).await)
}

/// Checks that the current user takes part in the chat session named in the path and
/// stores their [`ChatParticipant`] row in the request extensions
#[instrument(skip(state, req, next))]
pub async fn session_participant_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    // 1. current user, inserted by authentication_middleware
    let user_id = current_user(&req)?.user_id;

    // 2. session id is the first numeric path segment
    let session_id: i64 = req
        .uri()
        .path()
        .split('/')
        .find_map(|segment| segment.parse::<i64>().ok())
        .ok_or_else(|| {
            warn!("Session id not found in path: {}", req.uri().path());
            AppError::bad_request("Sesi chat tidak valid")
        })?;

    // 3. membership
    let participant = state
        .session
        .read(&(session_id, user_id))
        .await?
        .ok_or_else(|| {
            warn!("User {} is not part of session {}", user_id, session_id);
            AppError::forbidden("Anda bukan peserta sesi chat ini")
        })?;

    info!("User {} verified in session {}", user_id, session_id);
    req.extensions_mut().insert(participant);

    Ok(next.run(req).await)
}

fn current_user(req: &Request) -> Result<&User, AppError> {
    req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("Silakan masuk terlebih dahulu")
    })
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if !user.is_admin() {
        warn!("User {} tried to reach an admin route", user.user_id);
        return Err(AppError::forbidden("Hanya admin yang dapat mengakses fitur ini"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let token = encode_jwt("siti@warung.id".to_string(), 42, "secret").unwrap();
        let data = decode_jwt(&token, "secret").unwrap();
        assert_eq!(data.claims.id, 42);
        assert_eq!(data.claims.email, "siti@warung.id");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let token = encode_jwt("siti@warung.id".to_string(), 42, "secret").unwrap();
        assert!(decode_jwt(&token, "another").is_err());
    }
}
