use crate::{
    auth::{service, AuthenticatedUser},
    error::AppError,
    models::{Comment, CommentInput, Task, TaskInput, TaskStatusUpdate},
    state::AppState,
};
use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Creates a task assigned to an existing user.
///
/// ## Request Body:
/// - `title`, `description`, `assignedTo`, `dueDate`: required.
/// - `status` (optional): defaults to `Pending`.
///
/// ## Responses:
/// - `201 Created`: `{message, task}`.
/// - `400 Bad Request`: a required field is missing or blank, or the assignee does not exist.
/// - `401 Unauthorized`: no valid bearer token, or the caller's account was deleted.
#[post("/task")]
pub async fn create_task(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let fields = task_data.into_inner().into_fields()?;
    service::current_user(&state, &caller.0).await?;

    if state.store.find_user(fields.assigned_to).await?.is_none() {
        return Err(AppError::BadRequest("Assigned user does not exist".into()));
    }

    let task = Task::new(fields, caller.0.sub);
    state.store.insert_task(&task).await?;
    log::info!("task {} created by {}", task.id, caller.0.sub);

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": task
    })))
}

/// Lists all tasks with the assignee expanded to `{id, fullName, email, role}`.
#[get("/tasks")]
pub async fn get_tasks(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let tasks = state.store.list_tasks().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/task/{id}")]
pub async fn get_task(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state
        .store
        .find_task(task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(task))
}

/// Moves a task to another status.
///
/// Only the assignee, the creator or an admin may do this (403 otherwise).
#[patch("/task/{id}/status")]
pub async fn update_task_status(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    update: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let existing = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let caller_id = caller.0.sub;
    let is_assignee = existing.assigned_to.as_ref().map(|a| a.id) == Some(caller_id);
    let is_creator = existing.created_by == Some(caller_id);
    if !(is_assignee || is_creator || caller.0.is_admin()) {
        return Err(AppError::Forbidden(
            "Only the assignee, the creator or an admin can change the status".into(),
        ));
    }

    let task = state
        .store
        .update_task_status(task_id, update.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    log::info!("task {} moved to {:?} by {}", task.id, task.status, caller_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task status updated successfully",
        "task": task
    })))
}

#[post("/task/{id}/comments")]
pub async fn add_comment(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    service::current_user(&state, &caller.0).await?;
    let comment = Comment::new(comment_data.into_inner().comment, caller.0.sub);

    let task = state
        .store
        .add_comment(task_id.into_inner(), &comment)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Comment added successfully",
        "task": task
    })))
}
