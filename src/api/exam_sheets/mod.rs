mod handlers;
mod helpers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sheets).post(handlers::create_sheet))
        .route(
            "/:sheet_id",
            get(handlers::get_sheet).patch(handlers::update_sheet).delete(handlers::delete_sheet),
        )
        .route("/:sheet_id/consistency", get(handlers::sheet_consistency))
        .route("/:sheet_id/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/:sheet_id/tasks/:task_id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
}
