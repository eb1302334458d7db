use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::to_rfc3339;
use crate::db::models::ExamSheet;

/// `max_points` is derived; a client-supplied value is ignored.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSheetCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSheetUpdate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSheetResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) owner: String,
    pub(crate) max_points: i64,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<ExamSheet> for ExamSheetResponse {
    fn from(sheet: ExamSheet) -> Self {
        Self {
            id: sheet.id,
            title: sheet.title,
            owner: sheet.owner_id,
            max_points: sheet.max_points,
            created_at: to_rfc3339(sheet.created_at),
            updated_at: to_rfc3339(sheet.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_supplied_max_points_is_ignored() {
        let payload: ExamSheetCreate =
            serde_json::from_value(serde_json::json!({"title": "Algebra", "max_points": 99}))
                .expect("payload");
        assert_eq!(payload.title, "Algebra");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let payload = ExamSheetCreate { title: String::new() };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }
}
