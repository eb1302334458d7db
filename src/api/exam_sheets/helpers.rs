use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::ExamSheet;
use crate::repositories;
use crate::services::authorization::{check_task_sheet_reference, Decision};
use crate::services::errors::FieldErrors;

/// Resolves the route's sheet; a missing root is 404 before any permission
/// check.
pub(super) async fn load_sheet(state: &AppState, sheet_id: &str) -> Result<ExamSheet, ApiError> {
    repositories::ownership::resolve_sheet(state.db(), sheet_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam sheet"))?
        .ok_or_else(|| ApiError::NotFound("Exam sheet not found".to_string()))
}

/// Field checks for a task payload, run once the route owner check passed.
/// All field problems are reported together.
pub(super) fn check_task_payload(
    route_sheet_id: &str,
    submitted_sheet_id: Option<&str>,
    validation: Result<(), validator::ValidationErrors>,
) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    if let Err(validation_errors) = validation {
        errors.merge(FieldErrors::from(validation_errors));
    }
    if let Decision::Invalid(reference_errors) =
        check_task_sheet_reference(route_sheet_id, submitted_sheet_id)
    {
        errors.merge(reference_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
