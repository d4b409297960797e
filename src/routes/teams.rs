use crate::{
    auth::{service, AdminUser},
    error::AppError,
    models::{AddMemberInput, Team, TeamInput, TeamMember},
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Creates a team. Without `permissions` the default role matrix is used.
#[post("/teams")]
pub async fn create_team(
    admin: AdminUser,
    state: web::Data<AppState>,
    team_data: web::Json<TeamInput>,
) -> Result<impl Responder, AppError> {
    team_data.validate()?;
    service::current_user(&state, &admin.0).await?;
    let input = team_data.into_inner();

    let team = Team::new(input.name.trim().to_string(), input.permissions, admin.0.sub);
    state.store.insert_team(&team).await?;
    log::info!("team {} ({}) created by {}", team.id, team.name, admin.0.sub);

    Ok(HttpResponse::Created().json(json!({
        "message": "Team created successfully",
        "team": team
    })))
}

/// Adds a user to a team. 404 for an unknown team or user, 400 for a duplicate.
#[post("/teams/{id}/members")]
pub async fn add_member(
    admin: AdminUser,
    state: web::Data<AppState>,
    team_id: web::Path<Uuid>,
    member_data: web::Json<AddMemberInput>,
) -> Result<impl Responder, AppError> {
    let input = member_data.into_inner();
    let team = state
        .store
        .add_team_member(
            team_id.into_inner(),
            TeamMember {
                user: input.user_id,
                role: input.role,
            },
        )
        .await?;
    log::info!(
        "user {} added to team {} as {} by {}",
        input.user_id,
        team.id,
        input.role.as_str(),
        admin.0.sub
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "User added to team",
        "team": team
    })))
}

/// Lists every team with members expanded.
#[get("/teams")]
pub async fn list_teams(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let teams = state.store.list_teams().await?;
    Ok(HttpResponse::Ok().json(teams))
}
