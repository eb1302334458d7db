use crate::repositories;
use crate::test_support;
use axum::http::{Method, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn me_returns_current_actor() {
    let ctx = test_support::setup_test_context().await;

    let examinator = test_support::insert_examinator(ctx.state.db(), "teacher").await;
    let token = test_support::bearer_token(&examinator.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users/me", Some(&token), None))
        .await
        .expect("me");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["id"], examinator.id);
    assert_eq!(body["username"], "teacher");
    assert_eq!(body["is_examinator"], true);
}

#[tokio::test]
async fn inactive_or_unknown_users_are_unauthorized() {
    let ctx = test_support::setup_test_context().await;

    let candidate = test_support::insert_candidate(ctx.state.db(), "student").await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(&candidate.id)
        .execute(ctx.state.db())
        .await
        .expect("deactivate");
    let inactive_token = test_support::bearer_token(&candidate.id, ctx.state.settings());
    let unknown_token = test_support::bearer_token("no-such-user", ctx.state.settings());

    for token in [inactive_token, unknown_token] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/users/me",
                Some(&token),
                None,
            ))
            .await
            .expect("me");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let stored = repositories::users::find_by_id(ctx.state.db(), &candidate.id)
        .await
        .expect("lookup")
        .expect("user");
    assert!(!stored.is_active);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/me",
            Some("not-a-jwt"),
            None,
        ))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
