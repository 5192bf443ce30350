use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use mongodb::bson::doc;

use crate::dtos::{AuthResponse, LoginRequest, SignupRequest, UserPayload};
use crate::error::AppError;
use crate::models::User;
use crate::utils::{password, ValidatedJson};
use crate::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing = state
        .db
        .users()
        .find_one(doc! { "email": &req.email }, None)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(anyhow::anyhow!("User already exists")));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = User::new(req.email, password_hash, req.name);
    state.db.users().insert_one(&user, None).await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = state.jwt.issue_token(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserPayload::from(&user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .users()
        .find_one(doc! { "email": &req.email }, None)
        .await?
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Invalid credentials")))?;

    password::verify_password(&req.password, &user.password_hash)
        .map_err(|_| AppError::AuthError(anyhow::anyhow!("Invalid credentials")))?;

    let token = state.jwt.issue_token(&user)?;
    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user: UserPayload::from(&user),
        }),
    ))
}
