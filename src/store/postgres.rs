use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{duplicate_email, duplicate_member, Store};
use crate::error::AppError;
use crate::models::{
    Comment, PermissionMatrix, Role, Task, TaskDetails, TaskStatus, Team, TeamDetails,
    TeamMember, TeamMemberDetails, TeamRole, User, UserSummary,
};

const MAX_CONNECTIONS: u32 = 10;
const FOREIGN_KEY_VIOLATION: &str = "23503";

const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, status, created_at";

const TASK_SELECT: &str = "SELECT t.id, t.title, t.description, t.assigned_to, t.due_date, \
     t.status, t.created_by, t.created_at, \
     u.full_name AS assignee_name, u.email AS assignee_email, u.role AS assignee_role \
     FROM tasks t LEFT JOIN users u ON u.id = t.assigned_to";

/// A row that references a user deleted concurrently fails its foreign key.
fn missing_reference(error: sqlx::Error, message: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            AppError::NotFound(message.into())
        }
        _ => AppError::from(error),
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    assigned_to: Option<Uuid>,
    due_date: DateTime<Utc>,
    status: TaskStatus,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    assignee_name: Option<String>,
    assignee_email: Option<String>,
    assignee_role: Option<Role>,
}

impl TaskRow {
    fn into_task(self, comments: Vec<Comment>) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
            status: self.status,
            comments,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }

    fn into_details(self, comments: Vec<Comment>) -> TaskDetails {
        let assignee = match (
            self.assigned_to,
            self.assignee_name.clone(),
            self.assignee_email.clone(),
            self.assignee_role,
        ) {
            (Some(id), Some(full_name), Some(email), Some(role)) => Some(UserSummary {
                id,
                full_name,
                email,
                role,
            }),
            _ => None,
        };
        self.into_task(comments).with_assignee(assignee)
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    task_id: Uuid,
    user_id: Option<Uuid>,
    comment: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    permissions: Json<PermissionMatrix>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct MemberRow {
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
    full_name: String,
    email: String,
    user_role: Role,
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn comments_for(&self, task_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Comment>>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, task_id, user_id, comment, created_at FROM task_comments \
             WHERE task_id = ANY($1) ORDER BY seq",
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_task: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in rows {
            by_task.entry(row.task_id).or_default().push(Comment {
                id: row.id,
                comment: row.comment,
                user: row.user_id,
                date: row.created_at,
            });
        }
        Ok(by_task)
    }

    async fn load_task(&self, id: Uuid) -> Result<Option<TaskRow>, AppError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{} WHERE t.id = $1", TASK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn load_plain_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        match self.load_task(id).await? {
            Some(row) => {
                let mut comments = self.comments_for(&[id]).await?;
                Ok(Some(row.into_task(comments.remove(&id).unwrap_or_default())))
            }
            None => Ok(None),
        }
    }

    async fn load_team(&self, id: Uuid) -> Result<Team, AppError> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, permissions, created_by, created_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

        let members = sqlx::query_as::<_, (Uuid, TeamRole)>(
            "SELECT user_id, role FROM team_members WHERE team_id = $1 ORDER BY seq",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(user, role)| TeamMember { user, role })
        .collect();

        Ok(Team {
            id: row.id,
            name: row.name,
            permissions: row.permissions.0,
            members,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, role, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => duplicate_email(),
            other => other,
        })?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET role = $1, status = $2 WHERE id = $3")
            .bind(user.role)
            .bind(user.status)
            .bind(user.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, assigned_to, due_date, status, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to)
        .bind(task.due_date)
        .bind(task.status)
        .bind(task.created_by)
        .bind(task.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "User not found"))?;
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<TaskDetails>, AppError> {
        match self.load_task(id).await? {
            Some(row) => {
                let mut comments = self.comments_for(&[id]).await?;
                Ok(Some(row.into_details(comments.remove(&id).unwrap_or_default())))
            }
            None => Ok(None),
        }
    }

    async fn list_tasks(&self) -> Result<Vec<TaskDetails>, AppError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!("{} ORDER BY t.created_at", TASK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut comments = self.comments_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let task_comments = comments.remove(&row.id).unwrap_or_default();
                row.into_details(task_comments)
            })
            .collect())
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError> {
        let result = sqlx::query("UPDATE tasks SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.load_plain_task(id).await
    }

    async fn add_comment(
        &self,
        task_id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Task>, AppError> {
        let inserted = sqlx::query(
            "INSERT INTO task_comments (id, task_id, user_id, comment, created_at) \
             SELECT $1, t.id, $3, $4, $5 FROM tasks t WHERE t.id = $2",
        )
        .bind(comment.id)
        .bind(task_id)
        .bind(comment.user)
        .bind(&comment.comment)
        .bind(comment.date)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "User not found"))?;
        if inserted.rows_affected() == 0 {
            return Ok(None);
        }
        self.load_plain_task(task_id).await
    }

    async fn insert_team(&self, team: &Team) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO teams (id, name, permissions, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(team.id)
        .bind(&team.name)
        .bind(Json(&team.permissions))
        .bind(team.created_by)
        .bind(team.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, "User not found"))?;
        Ok(())
    }

    async fn add_team_member(
        &self,
        team_id: Uuid,
        member: TeamMember,
    ) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let team_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?;
        if team_exists.is_none() {
            return Err(AppError::NotFound("Team not found".into()));
        }

        let user_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(member.user)
            .fetch_optional(&mut *tx)
            .await?;
        if user_exists.is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        let inserted = sqlx::query(
            "INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3) \
             ON CONFLICT (team_id, user_id) DO NOTHING",
        )
        .bind(team_id)
        .bind(member.user)
        .bind(member.role)
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, "User not found"))?;
        if inserted.rows_affected() == 0 {
            return Err(duplicate_member());
        }

        tx.commit().await?;
        self.load_team(team_id).await
    }

    async fn list_teams(&self) -> Result<Vec<TeamDetails>, AppError> {
        let teams = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, permissions, created_by, created_at FROM teams ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, MemberRow>(
            "SELECT m.team_id, m.user_id, m.role, u.full_name, u.email, u.role AS user_role \
             FROM team_members m JOIN users u ON u.id = m.user_id ORDER BY m.seq",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_team: HashMap<Uuid, Vec<TeamMemberDetails>> = HashMap::new();
        for row in members {
            by_team.entry(row.team_id).or_default().push(TeamMemberDetails {
                user: UserSummary {
                    id: row.user_id,
                    full_name: row.full_name,
                    email: row.email,
                    role: row.user_role,
                },
                role: row.role,
            });
        }

        Ok(teams
            .into_iter()
            .map(|team| TeamDetails {
                members: by_team.remove(&team.id).unwrap_or_default(),
                id: team.id,
                name: team.name,
                permissions: team.permissions.0,
                created_by: team.created_by,
                created_at: team.created_at,
            })
            .collect())
    }
}
