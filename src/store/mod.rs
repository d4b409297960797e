//! Persistence for users, tasks and teams.
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] backs a deployment with
//! PostgreSQL; [`MemoryStore`] keeps everything in process and is used by the
//! test suite and when no `DATABASE_URL` is configured.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    Comment, Task, TaskDetails, TaskStatus, Team, TeamDetails, TeamMember, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Persists the mutable fields (role, status) of an existing user.
    /// Fails with `NotFound` when the id is unknown.
    async fn save_user(&self, user: &User) -> Result<(), AppError>;

    /// Returns `false` when no user had this id. Tasks and comments keep their
    /// rows with the reference cleared; team memberships are removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<TaskDetails>, AppError>;

    /// All tasks, oldest first, with assignees expanded.
    async fn list_tasks(&self) -> Result<Vec<TaskDetails>, AppError>;

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError>;

    /// Appends a comment; `None` when the task does not exist.
    async fn add_comment(&self, task_id: Uuid, comment: &Comment)
        -> Result<Option<Task>, AppError>;

    async fn insert_team(&self, team: &Team) -> Result<(), AppError>;

    /// Adds a member in one atomic step. Fails with `NotFound` when the team or
    /// the user is missing and with `Conflict` when the user is already a member.
    async fn add_team_member(&self, team_id: Uuid, member: TeamMember)
        -> Result<Team, AppError>;

    /// All teams, oldest first, with members expanded.
    async fn list_teams(&self) -> Result<Vec<TeamDetails>, AppError>;
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::Conflict("User already exists".into())
}

pub(crate) fn duplicate_member() -> AppError {
    AppError::Conflict("User is already a member of this team.".into())
}

/// Connects to PostgreSQL and applies migrations when `DATABASE_URL` is set;
/// otherwise falls back to an empty in-memory store.
pub async fn from_config(config: &Config) -> Result<Arc<dyn Store>, AppError> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            store.migrate().await?;
            log::info!("using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
