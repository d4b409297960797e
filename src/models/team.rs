use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use super::user::UserSummary;

/// Permission names keyed by team-role name.
pub type PermissionMatrix = BTreeMap<String, Vec<String>>;

const FULL_ACCESS: [&str; 7] = [
    "manageTasks",
    "manageFiles",
    "createReports",
    "assignTasks",
    "viewUsers",
    "manageSettings",
    "approveRequests",
];
const MEMBER_ACCESS: [&str; 2] = ["viewTasks", "uploadFiles"];

lazy_static! {
    static ref DEFAULT_PERMISSIONS: PermissionMatrix = {
        let full: Vec<String> = FULL_ACCESS.iter().map(|p| p.to_string()).collect();
        let mut matrix = BTreeMap::new();
        matrix.insert(TeamRole::Manager.as_str().to_string(), full.clone());
        matrix.insert(TeamRole::Admin.as_str().to_string(), full);
        matrix.insert(
            TeamRole::Member.as_str().to_string(),
            MEMBER_ACCESS.iter().map(|p| p.to_string()).collect(),
        );
        matrix
    };
}

/// Permission matrix assigned to teams created without one.
pub fn default_permissions() -> PermissionMatrix {
    DEFAULT_PERMISSIONS.clone()
}

/// Role of a user inside one team. Independent of the account-level `Role`.
/// Corresponds to the `team_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "team_role")]
pub enum TeamRole {
    Manager,
    Admin,
    #[default]
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Manager => "Manager",
            TeamRole::Admin => "Admin",
            TeamRole::Member => "Member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: Uuid,
    pub role: TeamRole,
}

/// A team as stored: members are user references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub permissions: PermissionMatrix,
    pub members: Vec<TeamMember>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(name: String, permissions: Option<PermissionMatrix>, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            permissions: permissions.unwrap_or_else(default_permissions),
            members: Vec::new(),
            created_by: Some(created_by),
            created_at: Utc::now(),
        }
    }

    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user == user_id)
    }
}

/// A team member with the user expanded to profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberDetails {
    pub user: UserSummary,
    pub role: TeamRole,
}

/// A team with members expanded, as returned by `GET /teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    pub id: Uuid,
    pub name: String,
    pub permissions: PermissionMatrix,
    pub members: Vec<TeamMemberDetails>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /teams`.
#[derive(Debug, Deserialize, Validate)]
pub struct TeamInput {
    #[validate(
        length(min = 1, max = 100, message = "Team name must be 1 to 100 characters"),
        custom = "super::not_blank"
    )]
    pub name: String,
    pub permissions: Option<PermissionMatrix>,
}

/// Request body for `POST /teams/{id}/members`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: TeamRole,
}
