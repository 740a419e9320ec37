//! User handlers: registration and login.

use actix_web::{HttpResponse, web};

use blog_core::DomainError;
use blog_core::domain::User;
use blog_core::ports::{AuthError, BaseRepository};
use blog_shared::ApiResponse;
use blog_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        created_at: user.created_at.to_rfc3339(),
    }
}

fn require_credentials(username: &str, password: &str) -> AppResult<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide username and password".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/user/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    require_credentials(&req.username, &req.password)?;

    let username = req.username.trim().to_string();
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(DomainError::Duplicate("Username is already taken".to_string()).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state.users.insert(User::new(username, password_hash)).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        user_response(&user),
        "User registered successfully",
    )))
}

/// POST /api/v1/user/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    require_credentials(&req.username, &req.password)?;

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %user.username, "Login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = state.tokens.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        user: user_response(&user),
    }))
}
