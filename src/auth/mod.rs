pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{not_blank, Role};

// Re-export necessary items
pub use extractors::{AdminUser, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

lazy_static! {
    // Printable characters only; angle brackets are rejected so names can be rendered verbatim.
    static ref FULL_NAME_REGEX: regex::Regex = regex::Regex::new(r"^[^\x00-\x1F\x7F<>]+$").unwrap();
}

/// Payload for `POST /api/auth/login`.
///
/// Missing fields deserialize as empty strings and are reported by validation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for `POST /api/auth/signup` and the admin account-creation routes.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"),
        regex(path = "FULL_NAME_REGEX", message = "Full name contains invalid characters"),
        custom = "not_blank"
    )]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        custom = "fits_bcrypt_limit"
    )]
    pub password: String,
    pub role: Option<Role>,
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    /// The JWT for session authentication.
    pub token: String,
    pub role: Role,
    pub user_id: Uuid,
}

/// Counted in bytes; a multibyte password hits the limit before 72 characters.
fn fits_bcrypt_limit(password: &str) -> Result<(), ValidationError> {
    if password.len() > password::MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("Password must be at most 72 bytes".into());
        return Err(err);
    }
    Ok(())
}

/// Emails are matched case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
