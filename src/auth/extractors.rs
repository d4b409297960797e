use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The verified claims of the caller.
///
/// Populated by `AuthMiddleware`; if the middleware did not run for this route
/// the extractor fails with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_of(req).map(AuthenticatedUser).map_err(Into::into))
    }
}

/// Like [`AuthenticatedUser`] but additionally requires the `admin` role (403 otherwise).
///
/// List it before body extractors so the role check runs first.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = claims_of(req).and_then(|claims| {
            if claims.is_admin() {
                Ok(AdminUser(claims))
            } else {
                log::warn!(
                    "user {} denied admin access to {} {}",
                    claims.sub,
                    req.method(),
                    req.path()
                );
                Err(AppError::Forbidden("Access denied. Admins only.".into()))
            }
        });
        ready(result.map_err(Into::into))
    }
}

fn claims_of(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authorization required".into()))
}
