pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::error::AppError;

/// Registers every `/api` route. Mount inside `web::scope("/api")` wrapped in
/// `AuthMiddleware`.
///
/// `/auth` carries the routes the web client calls; the remaining administrative
/// routes sit directly under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::signup)
                .service(auth::login)
                .service(auth::promote_to_admin)
                .service(users::list_users)
                .service(users::update_user)
                .service(users::delete_user)
                .service(tasks::create_task)
                .service(tasks::get_tasks)
                .service(tasks::get_task)
                .service(tasks::update_task_status)
                .service(tasks::add_comment),
        )
        .service(users::create_user)
        .service(users::create_admin)
        .service(users::remove_controls)
        .service(users::upgrade_user)
        .service(teams::create_team)
        .service(teams::add_member)
        .service(teams::list_teams);
}

/// Malformed or mistyped JSON bodies become a 400 with the parser's message.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(err.to_string()).into()
    })
}

/// An id that does not parse cannot name an existing record.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err: error::PathError, _req: &HttpRequest| {
        AppError::NotFound("Resource not found".into()).into()
    })
}
