use axum::http::Method;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::repositories;
use crate::repositories::ownership::ExamChain;
use crate::services::authorization::{Operation, Target};

pub(super) async fn load_exam(state: &AppState, exam_id: &str) -> Result<ExamChain, ApiError> {
    repositories::ownership::resolve_exam(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(super) fn exam_target(chain: &ExamChain) -> Target<'_> {
    Target::Exam { candidate_id: &chain.candidate_id, sheet_owner_id: &chain.sheet_owner_id }
}

pub(super) fn answer_target(chain: &ExamChain) -> Target<'_> {
    Target::Answer { candidate_id: &chain.candidate_id, sheet_owner_id: &chain.sheet_owner_id }
}

pub(super) fn write_operation(method: &Method) -> Operation {
    match *method {
        Method::POST => Operation::Create,
        Method::DELETE => Operation::Delete,
        _ => Operation::Update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_methods_map_to_operations() {
        assert_eq!(write_operation(&Method::POST), Operation::Create);
        assert_eq!(write_operation(&Method::PUT), Operation::Update);
        assert_eq!(write_operation(&Method::PATCH), Operation::Update);
        assert_eq!(write_operation(&Method::DELETE), Operation::Delete);
    }
}
