use crate::{
    auth::{service, AdminUser, LoginRequest, LoginResponse, SignupRequest},
    error::AppError,
    models::Role,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Register a new user
///
/// Creates a `user` account. Responds 201, or 400 when a field is missing or the
/// email is taken.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let user = service::signup(&state, &signup_data).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": user
    })))
}

/// Login user
///
/// Returns a bearer token and the account's role. Unknown emails yield 404,
/// wrong passwords 400.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (user, token) = service::login(&state, &login_data).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        role: user.role,
        user_id: user.id,
    }))
}

/// Promote a user to admin
///
/// Admin only. Promoting an existing admin succeeds without change.
#[post("/promote-to-admin/{id}")]
pub async fn promote_to_admin(
    admin: AdminUser,
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let mut user = state
        .store
        .find_user(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.role != Role::Admin {
        user.role = Role::Admin;
        state.store.save_user(&user).await?;
        log::info!("user {} promoted to admin by {}", user.id, admin.0.sub);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User promoted to admin successfully",
        "user": user
    })))
}
