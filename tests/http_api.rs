//! Router-level tests driving the HTTP boundary with `tower::oneshot`

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskgrove::domain::DEFAULT_ID_LENGTH;
use taskgrove::{server, Store};

fn app() -> Router {
    app_with_default_limit(None)
}

fn app_with_default_limit(default_limit: Option<usize>) -> Router {
    let store = Arc::new(Store::new(Vec::new(), Vec::new(), DEFAULT_ID_LENGTH));
    server::router(store, default_limit)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn end_to_end_group_task_statistics_flow() {
    let app = app();

    let (status, work) = send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Work", "parent_id": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(work["group_id"], 1);

    let (status, report) = send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Report", "parent_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["group_id"], 2);

    let (status, task) = send(
        &app,
        "POST",
        "/tasks/new",
        Some(json!({"task": "Draft", "group_id": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["task_id"], "23d33");
    assert_eq!(task["completed"], false);

    let (status, done) = send(&app, "PUT", "/tasks/23d33?finished=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["completed"], true);
    assert!(done["completed_at"].is_string());

    let (status, stats) = send(&app, "GET", "/stat/today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["completed"], 1);
}

#[tokio::test]
async fn group_listing_sorts_and_limits() {
    let app = app();
    for name in ["Zeta", "Alpha", "Mid"] {
        let (status, _) = send(
            &app,
            "POST",
            "/groups/new",
            Some(json!({"group_name": name, "parent_id": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, groups) = send(&app, "GET", "/groups?sort=name&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["group_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Mid"]);

    // An unparsable limit means no limit when no default is configured.
    let (_, groups) = send(&app, "GET", "/groups?limit=lots", None).await;
    assert_eq!(groups.as_array().unwrap().len(), 3);

    let (_, roots) = send(&app, "GET", "/groups/top_parents", None).await;
    assert_eq!(roots[0]["group_name"], "Alpha");
}

#[tokio::test]
async fn configured_default_limit_applies_when_request_has_none() {
    let app = app_with_default_limit(Some(1));
    for name in ["Zeta", "Alpha"] {
        send(
            &app,
            "POST",
            "/groups/new",
            Some(json!({"group_name": name, "parent_id": 0})),
        )
        .await;
    }

    let (_, groups) = send(&app, "GET", "/groups", None).await;
    assert_eq!(groups.as_array().unwrap().len(), 1);

    // An explicit limit still wins over the default.
    let (_, groups) = send(&app, "GET", "/groups?limit=2", None).await;
    assert_eq!(groups.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_keywords_are_404() {
    let app = app();

    let (status, body) = send(&app, "GET", "/stat/fortnight", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("fortnight"));

    let (status, _) = send(&app, "GET", "/groups?sort=depth", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/tasks?type=done", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_and_conflict_status_codes() {
    let app = app();

    // Empty group name.
    let (status, _) = send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "", "parent_id": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown parent.
    let (status, _) = send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Orphan", "parent_id": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Work", "parent_id": 0})),
    )
    .await;
    send(
        &app,
        "POST",
        "/tasks/new",
        Some(json!({"task": "Draft", "group_id": 1})),
    )
    .await;

    // Identical text collides.
    let (status, body) = send(
        &app,
        "POST",
        "/tasks/new",
        Some(json!({"task": "Draft", "group_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("23d33"));

    // Deleting a group with tasks is blocked.
    let (status, _) = send(&app, "DELETE", "/groups/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Completing twice is a no-op transition.
    send(&app, "PUT", "/tasks/23d33?finished=true", None).await;
    let (status, _) = send(&app, "PUT", "/tasks/23d33?finished=true", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Malformed transition parameter.
    let (status, _) = send(&app, "PUT", "/tasks/23d33?finished=banana", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Malformed body.
    let (status, _) = send(&app, "POST", "/tasks/new", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_edit_preserves_lifecycle_fields() {
    let app = app();
    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Work", "parent_id": 0})),
    )
    .await;
    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Home", "parent_id": 0})),
    )
    .await;
    let (_, task) = send(
        &app,
        "POST",
        "/tasks/new",
        Some(json!({"task": "Draft", "group_id": 1})),
    )
    .await;
    send(&app, "PUT", "/tasks/23d33?finished=true", None).await;

    let (status, edited) = send(
        &app,
        "PUT",
        "/tasks/23d33",
        Some(json!({"task": "Draft report", "group_id": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["task_id"], "b4f89"); // truncated sha1("Draft report")
    assert_eq!(edited["group_id"], 2);
    assert_eq!(edited["completed"], true);
    assert_eq!(edited["created_at"], task["created_at"]);

    // The old id is gone, the new one resolves.
    let (status, _) = send(&app, "GET", "/tasks/23d33", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, fetched) = send(&app, "GET", "/tasks/b4f89", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["task"], "Draft report");
}

#[tokio::test]
async fn group_children_and_group_tasks_routes() {
    let app = app();
    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Work", "parent_id": 0})),
    )
    .await;
    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Report", "parent_id": 1})),
    )
    .await;
    send(
        &app,
        "POST",
        "/tasks/new",
        Some(json!({"task": "Draft", "group_id": 2})),
    )
    .await;

    let (status, children) = send(&app, "GET", "/groups/children/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(children[0]["group_name"], "Report");

    // Childless group answers 400, unknown group 404.
    let (status, _) = send(&app, "GET", "/groups/children/2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/groups/children/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, tasks) = send(&app, "GET", "/tasks/group/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    // No completed tasks yet: the filtered view is an error, not empty.
    let (status, _) = send(&app, "GET", "/tasks/group/2?type=completed", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_listing_sorts_then_filters() {
    let app = app();
    send(
        &app,
        "POST",
        "/groups/new",
        Some(json!({"group_name": "Work", "parent_id": 0})),
    )
    .await;
    for text in ["charlie", "bravo", "alpha"] {
        send(
            &app,
            "POST",
            "/tasks/new",
            Some(json!({"task": text, "group_id": 1})),
        )
        .await;
    }
    // Complete "bravo".
    let bravo = taskgrove::domain::derive_task_id("bravo", DEFAULT_ID_LENGTH);
    send(&app, "PUT", &format!("/tasks/{bravo}?finished=true"), None).await;

    let (status, tasks) = send(&app, "GET", "/tasks?sort=name&type=working", None).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["alpha", "charlie"]);
}
