mod handlers;
mod helpers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_exams).post(handlers::start_exam))
        .route("/:exam_id", get(handlers::get_exam).delete(handlers::delete_exam))
        .route("/:exam_id/consistency", get(handlers::exam_consistency))
        .route(
            "/:exam_id/tasks",
            get(handlers::list_exam_tasks).post(handlers::reject_exam_task_write),
        )
        .route(
            "/:exam_id/tasks/:task_id",
            get(handlers::get_exam_task)
                .put(handlers::reject_exam_task_item_write)
                .patch(handlers::reject_exam_task_item_write)
                .delete(handlers::reject_exam_task_item_write),
        )
        .route("/:exam_id/answers", get(handlers::list_answers).post(handlers::create_answer))
        .route(
            "/:exam_id/answers/:answer_id",
            get(handlers::get_answer)
                .patch(handlers::update_answer)
                .delete(handlers::delete_answer),
        )
}
