mod common;

use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{create_admin, get, init_app, post, signup_and_login, test_state};

#[actix_rt::test]
async fn test_create_team_uses_default_permissions() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let admin = create_admin(&state, &app, "admin@x.com").await;
    let user = signup_and_login(&app, "Ada", "ada@x.com", "pw").await;

    let (status, body) = post(&app, "/api/teams", Some(&user.token), json!({ "name": "Core" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admins only.");

    let (status, body) = post(&app, "/api/teams", Some(&admin.token), json!({ "name": "Core" })).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Team created successfully");

    let team = &body["team"];
    assert_eq!(team["name"], "Core");
    assert_eq!(team["members"], json!([]));
    assert_eq!(team["permissions"]["Member"], json!(["viewTasks", "uploadFiles"]));
    assert_eq!(team["permissions"]["Manager"].as_array().unwrap().len(), 7);
    assert_eq!(team["permissions"]["Manager"], team["permissions"]["Admin"]);

    for blank in ["", "   "] {
        let (status, _) = post(&app, "/api/teams", Some(&admin.token), json!({ "name": blank })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name {:?}", blank);
    }
}

#[actix_rt::test]
async fn test_deleted_admin_cannot_create_team() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let admin = create_admin(&state, &app, "admin@x.com").await;
    let departing = create_admin(&state, &app, "departing@x.com").await;

    let (status, _) = common::delete(
        &app,
        &format!("/api/auth/user/{}", departing.id),
        Some(&admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(&app, "/api/teams", Some(&departing.token), json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = get(&app, "/api/teams", Some(&admin.token)).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_create_team_with_custom_permissions() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let admin = create_admin(&state, &app, "admin@x.com").await;

    let permissions = json!({ "Member": ["viewTasks"] });
    let (status, body) = post(
        &app,
        "/api/teams",
        Some(&admin.token),
        json!({ "name": "Ops", "permissions": permissions }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["team"]["permissions"], permissions);
}

#[actix_rt::test]
async fn test_add_member() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let admin = create_admin(&state, &app, "admin@x.com").await;
    let user = signup_and_login(&app, "Ada", "ada@x.com", "pw").await;

    let (_, body) = post(&app, "/api/teams", Some(&admin.token), json!({ "name": "Core" })).await;
    let uri = format!("/api/teams/{}/members", body["team"]["id"].as_str().unwrap());

    let (status, body) = post(
        &app,
        &uri,
        Some(&admin.token),
        json!({ "userId": user.id, "role": "Manager" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "User added to team");
    assert_eq!(
        body["team"]["members"],
        json!([{ "user": user.id, "role": "Manager" }])
    );

    let (status, body) = post(&app, &uri, Some(&admin.token), json!({ "userId": user.id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User is already a member of this team.");

    let (status, body) = post(
        &app,
        &uri,
        Some(&admin.token),
        json!({ "userId": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let missing_team = format!("/api/teams/{}/members", uuid::Uuid::new_v4());
    let (status, body) = post(&app, &missing_team, Some(&admin.token), json!({ "userId": user.id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Team not found");

    let (status, _) = post(&app, &uri, Some(&user.token), json!({ "userId": user.id })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_list_teams_expands_members() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let admin = create_admin(&state, &app, "admin@x.com").await;
    let user = signup_and_login(&app, "Ada", "ada@x.com", "pw").await;

    let (_, body) = post(&app, "/api/teams", Some(&admin.token), json!({ "name": "Core" })).await;
    let uri = format!("/api/teams/{}/members", body["team"]["id"].as_str().unwrap());
    post(&app, &uri, Some(&admin.token), json!({ "userId": user.id })).await;
    post(&app, "/api/teams", Some(&admin.token), json!({ "name": "Empty" })).await;

    let (status, _) = get(&app, "/api/teams", Some(&user.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/api/teams", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let teams = body.as_array().expect("array of teams");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0]["name"], "Core");
    assert_eq!(teams[1]["members"], json!([]));

    let member = &teams[0]["members"][0];
    assert_eq!(member["role"], "Member");
    assert_eq!(member["user"]["id"], user.id.as_str());
    assert_eq!(member["user"]["fullName"], "Ada");
    assert_eq!(member["user"]["email"], "ada@x.com");
    assert!(member["user"].get("passwordHash").is_none());
}
