//! Account creation and credential checks shared by the signup, login and
//! admin routes.

use validator::Validate;

use super::{
    hash_password, normalize_email, verify_password, Claims, LoginRequest, SignupRequest,
};
use crate::config::BootstrapAdmin;
use crate::error::AppError;
use crate::models::{Role, User, UserStatus};
use crate::state::AppState;

/// Validates the request, rejects a taken email and persists a new account
/// with a bcrypt hash of the password.
pub async fn create_account(
    state: &AppState,
    request: &SignupRequest,
    role: Role,
) -> Result<User, AppError> {
    request.validate()?;
    let email = normalize_email(&request.email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&request.password, state.bcrypt_cost)?;
    let user = User::new(request.full_name.trim().to_string(), email, password_hash, role);
    // The store enforces email uniqueness again, closing the race between the
    // lookup above and this insert.
    state.store.insert_user(&user).await?;

    log::info!("created {} account {} ({})", role.as_str(), user.id, user.email);
    Ok(user)
}

/// Public self-registration. Always yields a `user` account.
pub async fn signup(state: &AppState, request: &SignupRequest) -> Result<User, AppError> {
    if request.role == Some(Role::Admin) {
        return Err(AppError::Forbidden(
            "Admin accounts can only be created by an administrator".into(),
        ));
    }
    create_account(state, request, Role::User).await
}

/// Checks the credentials and issues a bearer token.
pub async fn login(state: &AppState, request: &LoginRequest) -> Result<(User, String), AppError> {
    request.validate()?;
    let email = normalize_email(&request.email);

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        log::warn!("failed login for {}", user.email);
        return Err(AppError::InvalidCredentials);
    }

    if user.status == UserStatus::Inactive {
        return Err(AppError::Forbidden("Account is inactive".into()));
    }

    let token = state.tokens.issue(&user)?;
    log::info!("user {} logged in", user.id);
    Ok((user, token))
}

/// Loads the account behind verified claims. A token can outlive its account,
/// so callers that write the caller's id into a record check this first.
pub async fn current_user(state: &AppState, claims: &Claims) -> Result<User, AppError> {
    state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))
}

/// Creates the configured administrator unless the email is already registered.
/// Returns whether an account was created.
pub async fn ensure_bootstrap_admin(
    state: &AppState,
    admin: &BootstrapAdmin,
) -> Result<bool, AppError> {
    let email = normalize_email(&admin.email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    let request = SignupRequest {
        full_name: admin.full_name.clone(),
        email,
        password: admin.password.clone(),
        role: Some(Role::Admin),
    };
    create_account(state, &request, Role::Admin).await?;
    Ok(true)
}
