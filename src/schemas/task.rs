use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::to_rfc3339;
use crate::db::models::Task;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TaskCreate {
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: String,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub(crate) max_points: i32,
    /// Optional back-reference; when present it must name the route's sheet.
    #[serde(default)]
    pub(crate) exam_sheet: Option<String>,
}

/// Used for both `PUT` and `PATCH`; omitted fields keep their value.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TaskUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub(crate) max_points: Option<i32>,
    #[serde(default)]
    pub(crate) exam_sheet: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskResponse {
    pub(crate) id: String,
    pub(crate) question: String,
    pub(crate) max_points: i32,
    pub(crate) exam_sheet: String,
    pub(crate) created_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            question: task.question,
            max_points: task.max_points,
            exam_sheet: task.exam_sheet_id,
            created_at: to_rfc3339(task.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskWriteResponse {
    #[serde(flatten)]
    pub(crate) task: TaskResponse,
    pub(crate) sheet_max_points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_max_points_reports_field() {
        let payload = TaskCreate {
            question: "2 + 2?".to_string(),
            max_points: -1,
            exam_sheet: None,
        };
        let errors = payload.validate().unwrap_err();
        let messages = &errors.field_errors()["max_points"];
        assert_eq!(
            messages[0].message.as_deref(),
            Some("Ensure this value is greater than or equal to 0.")
        );
    }

    #[test]
    fn partial_update_validates_present_fields_only() {
        let payload: TaskUpdate =
            serde_json::from_value(serde_json::json!({"max_points": 3})).expect("payload");
        assert!(payload.validate().is_ok());
        assert!(payload.question.is_none());

        let payload: TaskUpdate =
            serde_json::from_value(serde_json::json!({"max_points": -3})).expect("payload");
        assert!(payload.validate().is_err());
    }
}
