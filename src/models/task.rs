use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::UserSummary;
use crate::error::AppError;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    /// Task is completed.
    Completed,
}

/// A comment left on a task. Comments keep their insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub comment: String,
    /// Author; `None` once the author's account has been deleted.
    pub user: Option<Uuid>,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(comment: String, user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            comment,
            user: Some(user),
            date: Utc::now(),
        }
    }
}

/// Request body for `POST /task`.
///
/// Every field is optional at the serde level so that a missing field, an empty
/// string and a `null` are all reported the same way by [`TaskInput::into_fields`].
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub assigned_to: Option<String>,

    pub due_date: Option<String>,

    pub status: Option<TaskStatus>,
}

/// A `TaskInput` whose required fields are all present and well-formed.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
}

impl TaskInput {
    pub fn into_fields(self) -> Result<TaskFields, AppError> {
        let (title, description, assigned_to, due_date) = match (
            non_blank(self.title),
            non_blank(self.description),
            non_blank(self.assigned_to),
            non_blank(self.due_date),
        ) {
            (Some(t), Some(d), Some(a), Some(due)) => (t, d, a, due),
            _ => return Err(AppError::BadRequest("All fields are required".into())),
        };

        let assigned_to = Uuid::parse_str(assigned_to.trim())
            .map_err(|_| AppError::BadRequest("assignedTo must be a valid user id".into()))?;
        let due_date = parse_due_date(&due_date).ok_or_else(|| {
            AppError::BadRequest("dueDate must be an RFC 3339 timestamp or YYYY-MM-DD".into())
        })?;

        Ok(TaskFields {
            title,
            description,
            assigned_to,
            due_date,
            status: self.status.unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts a full RFC 3339 timestamp or a bare calendar date (midnight UTC),
/// which is what HTML date inputs submit.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Request body for `PATCH /task/{id}/status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

/// Request body for `POST /task/{id}/comments`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1 to 1000 characters"))]
    pub comment: String,
}

/// Represents a task entity as stored and as returned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// `None` once the assignee's account has been deleted.
    pub assigned_to: Option<Uuid>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub comments: Vec<Comment>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(fields: TaskFields, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            assigned_to: Some(fields.assigned_to),
            due_date: fields.due_date,
            status: fields.status,
            comments: Vec::new(),
            created_by: Some(created_by),
            created_at: Utc::now(),
        }
    }

    pub fn with_assignee(self, assignee: Option<UserSummary>) -> TaskDetails {
        TaskDetails {
            id: self.id,
            title: self.title,
            description: self.description,
            assigned_to: assignee,
            due_date: self.due_date,
            status: self.status,
            comments: self.comments,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// A task with its assignee expanded to profile fields, as returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<UserSummary>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub comments: Vec<Comment>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_input() -> TaskInput {
        TaskInput {
            title: Some("Write report".to_string()),
            description: Some("Quarterly numbers".to_string()),
            assigned_to: Some(Uuid::new_v4().to_string()),
            due_date: Some("2030-01-15".to_string()),
            status: None,
        }
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let fields = full_input().into_fields().unwrap();
        assert_eq!(fields.status, TaskStatus::Pending);

        let task = Task::new(fields, Uuid::new_v4());
        assert!(task.comments.is_empty());
        assert_eq!(task.due_date.to_rfc3339(), "2030-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        for missing in 0..4 {
            let mut input = full_input();
            match missing {
                0 => input.title = None,
                1 => input.description = Some("   ".to_string()),
                2 => input.assigned_to = Some(String::new()),
                _ => input.due_date = None,
            }
            match input.into_fields() {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "All fields are required"),
                other => panic!("expected BadRequest, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_assignee_and_date() {
        let mut input = full_input();
        input.assigned_to = Some("not-a-uuid".to_string());
        assert!(matches!(input.into_fields(), Err(AppError::BadRequest(_))));

        let mut input = full_input();
        input.due_date = Some("next tuesday".to_string());
        assert!(matches!(input.into_fields(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_parse_due_date_formats() {
        let ts = parse_due_date("2030-01-15T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2030-01-15T08:30:00+00:00");
        assert!(parse_due_date("2030-02-30").is_none());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "In Progress"
        );
        let parsed: TaskStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }

    #[test]
    fn test_task_input_validation() {
        let mut input = full_input();
        input.title = Some("a".repeat(201));
        assert!(input.validate().is_err());
        assert!(full_input().validate().is_ok());

        let comment = CommentInput {
            comment: String::new(),
        };
        assert!(comment.validate().is_err());
    }
}
