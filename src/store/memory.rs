use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_email, duplicate_member, Store};
use crate::error::AppError;
use crate::models::{
    Comment, Task, TaskDetails, TaskStatus, Team, TeamDetails, TeamMember, TeamMemberDetails,
    User, UserSummary,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    tasks: Vec<Task>,
    teams: Vec<Team>,
}

impl State {
    fn summary(&self, id: Option<Uuid>) -> Option<UserSummary> {
        let id = id?;
        self.users.iter().find(|u| u.id == id).map(User::summary)
    }

    fn details(&self, task: &Task) -> TaskDetails {
        let assignee = self.summary(task.assigned_to);
        task.clone().with_assignee(assignee)
    }
}

/// Process-local store. Every write holds the single lock for its whole
/// duration, so each trait method is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.read().await.users.clone())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.role = user.role;
        stored.status = user.status;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(false);
        }

        for task in state.tasks.iter_mut() {
            if task.assigned_to == Some(id) {
                task.assigned_to = None;
            }
            if task.created_by == Some(id) {
                task.created_by = None;
            }
            for comment in task.comments.iter_mut().filter(|c| c.user == Some(id)) {
                comment.user = None;
            }
        }
        for team in state.teams.iter_mut() {
            team.members.retain(|m| m.user != id);
            if team.created_by == Some(id) {
                team.created_by = None;
            }
        }
        Ok(true)
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        self.state.write().await.tasks.push(task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<TaskDetails>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| state.details(t)))
    }

    async fn list_tasks(&self) -> Result<Vec<TaskDetails>, AppError> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().map(|t| state.details(t)).collect())
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.tasks.iter_mut().find(|t| t.id == id).map(|task| {
            task.status = status;
            task.clone()
        }))
    }

    async fn add_comment(
        &self,
        task_id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.tasks.iter_mut().find(|t| t.id == task_id).map(|task| {
            task.comments.push(comment.clone());
            task.clone()
        }))
    }

    async fn insert_team(&self, team: &Team) -> Result<(), AppError> {
        self.state.write().await.teams.push(team.clone());
        Ok(())
    }

    async fn add_team_member(
        &self,
        team_id: Uuid,
        member: TeamMember,
    ) -> Result<Team, AppError> {
        let mut state = self.state.write().await;
        if !state.teams.iter().any(|t| t.id == team_id) {
            return Err(AppError::NotFound("Team not found".into()));
        }
        if !state.users.iter().any(|u| u.id == member.user) {
            return Err(AppError::NotFound("User not found".into()));
        }

        let team = state
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| AppError::NotFound("Team not found".into()))?;
        if team.has_member(member.user) {
            return Err(duplicate_member());
        }
        team.members.push(member);
        Ok(team.clone())
    }

    async fn list_teams(&self) -> Result<Vec<TeamDetails>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .iter()
            .map(|team| TeamDetails {
                id: team.id,
                name: team.name.clone(),
                permissions: team.permissions.clone(),
                members: team
                    .members
                    .iter()
                    .filter_map(|m| {
                        state.summary(Some(m.user)).map(|user| TeamMemberDetails {
                            user,
                            role: m.role,
                        })
                    })
                    .collect(),
                created_by: team.created_by,
                created_at: team.created_at,
            })
            .collect())
    }
}
