use crate::{
    auth::{service, AdminUser, AuthenticatedUser, SignupRequest},
    error::AppError,
    models::{Role, User, UserUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

async fn load_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
    state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Lists every account. Password hashes are never part of the response.
#[get("/users")]
pub async fn list_users(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let users = state.store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Changes the role and/or status of a user; absent fields are left unchanged.
#[put("/user/{id}")]
pub async fn update_user(
    admin: AdminUser,
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    let mut user = load_user(&state, user_id.into_inner()).await?;
    update.apply(&mut user);
    state.store.save_user(&user).await?;
    log::info!(
        "user {} updated by {}: role={} status={:?}",
        user.id,
        admin.0.sub,
        user.role.as_str(),
        user.status
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully",
        "user": user
    })))
}

#[delete("/user/{id}")]
pub async fn delete_user(
    admin: AdminUser,
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if !state.store.delete_user(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    log::info!("user {} deleted by {}", user_id, admin.0.sub);

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

/// Creates an account with an explicit role. The role is mandatory here.
#[post("/users")]
pub async fn create_user(
    _admin: AdminUser,
    state: web::Data<AppState>,
    user_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let role = user_data
        .role
        .ok_or_else(|| AppError::BadRequest("Invalid role. Must be admin or user.".into()))?;
    let user = service::create_account(&state, &user_data, role).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": user
    })))
}

#[post("/admins")]
pub async fn create_admin(
    _admin: AdminUser,
    state: web::Data<AppState>,
    admin_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let user = service::create_account(&state, &admin_data, Role::Admin).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Admin created successfully",
        "admin": user
    })))
}

/// Downgrades a user to the `user` role.
#[post("/users/{id}/remove-controls")]
pub async fn remove_controls(
    admin: AdminUser,
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let mut user = load_user(&state, user_id.into_inner()).await?;
    user.role = Role::User;
    state.store.save_user(&user).await?;
    log::info!("admin controls removed from {} by {}", user.id, admin.0.sub);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User controls removed successfully",
        "user": user
    })))
}

/// Upgrades a user to admin. Unlike `promote-to-admin`, upgrading an existing
/// admin is rejected.
#[patch("/users/{id}/upgrade")]
pub async fn upgrade_user(
    admin: AdminUser,
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let mut user = load_user(&state, user_id.into_inner()).await?;
    if user.is_admin() {
        return Err(AppError::Conflict("User is already an Admin.".into()));
    }
    user.role = Role::Admin;
    state.store.save_user(&user).await?;
    log::info!("user {} upgraded to admin by {}", user.id, admin.0.sub);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User upgraded to Admin successfully",
        "user": user
    })))
}
