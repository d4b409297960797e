use std::env;
use std::str::FromStr;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 5002;
const DEFAULT_TOKEN_MINUTES: i64 = 60;
const DEFAULT_BCRYPT_COST: u32 = 10;
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Credentials for an administrator account created at startup when the email
/// is not yet registered.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Runtime configuration, built once in `main` and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".into()))?;
        if jwt_secret.trim().is_empty() {
            return Err(AppError::InternalServerError(
                "JWT_SECRET must not be empty".into(),
            ));
        }

        let bcrypt_cost = parse_var("BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(AppError::InternalServerError(format!(
                "BCRYPT_COST must be between {} and {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            )));
        }

        let token_ttl_minutes = parse_var("JWT_EXPIRATION_MINUTES", DEFAULT_TOKEN_MINUTES)?;
        if token_ttl_minutes <= 0 {
            return Err(AppError::InternalServerError(
                "JWT_EXPIRATION_MINUTES must be positive".into(),
            ));
        }

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                full_name: env::var("BOOTSTRAP_ADMIN_NAME")
                    .unwrap_or_else(|_| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port: parse_var("SERVER_PORT", DEFAULT_PORT)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_minutes,
            bcrypt_cost,
            bootstrap_admin,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}
