pub mod task;
pub mod team;
pub mod user;

use validator::ValidationError;

pub use task::{
    Comment, CommentInput, Task, TaskDetails, TaskFields, TaskInput, TaskStatus, TaskStatusUpdate,
};
pub use team::{
    AddMemberInput, PermissionMatrix, Team, TeamDetails, TeamInput, TeamMember,
    TeamMemberDetails, TeamRole,
};
pub use user::{Role, User, UserStatus, UserSummary, UserUpdate};

/// Rejects strings that are empty once surrounding whitespace is trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}
