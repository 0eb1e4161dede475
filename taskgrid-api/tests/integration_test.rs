/// Integration tests for the taskgrid API
///
/// Exercises the router end-to-end: identity resolution with
/// auto-provisioning, project and task flows, and error mapping.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

fn identified(ctx: &TestContext, builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder
        .header("x-identity-subject", ctx.subject.as_str())
        .header("x-identity-email", ctx.email.as_str())
        .header("x-identity-name", "Integration Tester")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let Some(ctx) = TestContext::new().await else { return };

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_missing_identity_headers_is_unauthorized() {
    let Some(ctx) = TestContext::new().await else { return };

    let request = Request::builder()
        .method("GET")
        .uri("/v1/users/me")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_identity_auto_provisions_and_me_returns_it() {
    let Some(ctx) = TestContext::new().await else { return };

    let request = identified(&ctx, Request::builder().method("GET").uri("/v1/users/me"))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], ctx.email);
    assert_eq!(body["name"], "Integration Tester");
    assert!(body["id"].is_string());

    // Second request resolves the same record.
    let request = identified(&ctx, Request::builder().method("GET").uri("/v1/users/me"))
        .body(Body::empty())
        .unwrap();
    let again = body_json(ctx.app.clone().call(request).await.unwrap()).await;
    assert_eq!(again["id"], body["id"]);
}

#[tokio::test]
async fn test_project_task_comment_flow() {
    let Some(ctx) = TestContext::new().await else { return };
    let mut app = ctx.app.clone();

    // Create a project.
    let request = identified(&ctx, Request::builder().method("POST").uri("/v1/projects"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "API Flow",
                "start_date": "2024-03-04",
                "status": "active"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await;
    let project_id = project["id"].as_str().unwrap().to_string();
    assert_eq!(project["status"], "active");

    // The creator shows up as an OWNER member.
    let request = identified(
        &ctx,
        Request::builder()
            .method("GET")
            .uri(format!("/v1/projects/{}/members", project_id)),
    )
    .body(Body::empty())
    .unwrap();
    let members = body_json(app.call(request).await.unwrap()).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["user_name"], "Integration Tester");

    // Create a task with defaults.
    let request = identified(&ctx, Request::builder().method("POST").uri("/v1/tasks"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "title": "First task",
                "project_id": project_id
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "medium");
    let task_id = task["id"].as_str().unwrap().to_string();

    // Comment on it; content comes back trimmed.
    let request = identified(
        &ctx,
        Request::builder()
            .method("POST")
            .uri(format!("/v1/tasks/{}/comments", task_id)),
    )
    .header("content-type", "application/json")
    .body(Body::from(json!({ "content": "  looks good  " }).to_string()))
    .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let comment = body_json(response).await;
    assert_eq!(comment["content"], "looks good");

    // Empty-after-trim content is rejected by the route layer.
    let request = identified(
        &ctx,
        Request::builder()
            .method("POST")
            .uri(format!("/v1/tasks/{}/comments", task_id)),
    )
    .header("content-type", "application/json")
    .body(Body::from(json!({ "content": "   " }).to_string()))
    .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let Some(ctx) = TestContext::new().await else { return };

    let request = identified(
        &ctx,
        Request::builder()
            .method("GET")
            .uri("/v1/tasks/550e8400-e29b-41d4-a716-446655440000"),
    )
    .body(Body::empty())
    .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}
