#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use taskdesk::auth::{service, AuthMiddleware, LoginResponse, SignupRequest, TokenService};
use taskdesk::models::Role;
use taskdesk::routes::{self, health};
use taskdesk::store::MemoryStore;
use taskdesk::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new(TEST_SECRET, 60),
        4,
    ))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

fn parse(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(body).into_owned())
        })
    }
}

/// Sends a request and returns status and JSON body. Errors raised by
/// middleware are rendered the same way the HTTP server would render them.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match app.call(req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, parse(&body))
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = to_bytes(resp.into_body()).await.unwrap_or_default();
            (status, parse(&body))
        }
    }
}

pub fn with_token(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token))),
        None => req,
    }
}

pub async fn post<S, B>(app: &S, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::post().uri(uri), token)
        .set_json(&body)
        .to_request();
    send(app, req).await
}

pub async fn put<S, B>(app: &S, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::put().uri(uri), token)
        .set_json(&body)
        .to_request();
    send(app, req).await
}

pub async fn patch<S, B>(app: &S, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::patch().uri(uri), token)
        .set_json(&body)
        .to_request();
    send(app, req).await
}

pub async fn get<S, B>(app: &S, uri: &str, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::get().uri(uri), token).to_request();
    send(app, req).await
}

pub async fn delete<S, B>(app: &S, uri: &str, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::delete().uri(uri), token).to_request();
    send(app, req).await
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Signs a user up through the API and logs them in.
pub async fn signup_and_login<S, B>(app: &S, full_name: &str, email: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = post(
        app,
        "/api/auth/signup",
        None,
        json!({ "fullName": full_name, "email": email, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    login(app, email, password).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = post(
        app,
        "/api/auth/login",
        None,
        json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    let response: LoginResponse = serde_json::from_value(body).expect("login response");
    TestUser {
        id: response.user_id.to_string(),
        token: response.token,
    }
}

/// Creates an admin directly in the store (signup cannot grant admin) and logs in.
pub async fn create_admin<S, B>(state: &web::Data<AppState>, app: &S, email: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = SignupRequest {
        full_name: "Admin".to_string(),
        email: email.to_string(),
        password: "admin-password".to_string(),
        role: Some(Role::Admin),
    };
    service::create_account(state, &request, Role::Admin)
        .await
        .expect("create admin");
    login(app, email, "admin-password").await
}
