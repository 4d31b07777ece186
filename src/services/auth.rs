//! Auth services - Registration and login

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, RegisterDTO, TokenDTO, UserDTO};
use crate::entities::{User, UserRole};
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Same answer for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Email atau kata sandi salah";

fn token_response(state: &AppState, user: User) -> Result<(HeaderMap, TokenDTO), AppError> {
    let token = encode_jwt(user.email.clone(), user.user_id, &state.jwt_secret)?;

    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AppError::internal_server_error("Gagal membuat token"))?;
    headers.insert(header::AUTHORIZATION, bearer);

    Ok((
        headers,
        TokenDTO {
            token,
            user: UserDTO::from(user),
        },
    ))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. validate the form
    body.validate()?;

    // 2. one account per email
    if state.user.find_by_email(&body.email).await?.is_some() {
        warn!("Email already registered");
        return Err(AppError::conflict("Email sudah terdaftar"));
    }

    // 3. hash the password
    let password = User::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Gagal memproses kata sandi"))?;

    // 4. configured emails become admins
    let role = if state.is_admin_email(&body.email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let created = state
        .user
        .create(&CreateUserDTO {
            email: body.email,
            display_name: body.display_name,
            business_name: body
                .business_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            password,
            role,
        })
        .await?;
    info!("User {} registered as {:?}", created.user_id, created.role);

    // 5. log the new user in right away
    let (headers, body) = token_response(&state, created)?;
    Ok((StatusCode::CREATED, headers, Json(body)))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. fail fast on an empty password, before touching the database
    if body.password.is_empty() {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    // 2. look the user up
    let Some(user) = state.user.find_by_email(&body.email).await? else {
        warn!("Login for unknown email");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    // 3. check the password against the stored hash
    if !user.verify_password(&body.password) {
        warn!("Wrong password for user {}", user.user_id);
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    info!("User {} logged in", user.user_id);
    let (headers, body) = token_response(&state, user)?;
    Ok((StatusCode::OK, headers, Json(body)))
}
