//! Error mapping tests: actor extraction, validation errors, constraint
//! conflicts, and not-found paths, all asserted against the JSON error
//! envelope.

mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, get_as, patch_json, post_json, post_json_as, seed_person};
use greenlight_core::roles::OrgRole;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Actor extraction
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_actor_header_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/segments",
        json!({"title": "Ep", "production_date": "2099-06-15", "seats": []}),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_actor_header_is_bad_request(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/api/v1/approvals/pending")
        .header("x-actor-id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_actor_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_as(app, "/api/v1/approvals/pending", 424_242).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Validation and conflicts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_maps_to_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({"display_name": "Ada", "email": "ada@example.com"});
    let response = post_json(app.clone(), "/api/v1/people", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app, "/api/v1/people", body).await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_pool_name_maps_to_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({"name": "Editors", "role_key": "script_editor"});
    post_json(app.clone(), "/api/v1/pools", body.clone()).await;
    let response = post_json(app, "/api/v1/pools", body).await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_role_key_in_pool_filter_is_validation_error(pool: PgPool) {
    let person = seed_person(&pool, "Ada", OrgRole::Member).await;
    let _ = person;
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/pools?role_key=wizard").await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_person_name_is_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/people",
        json!({"display_name": "  ", "email": "a@example.com"}),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_segment_title_is_validation_error(pool: PgPool) {
    let owner = seed_person(&pool, "Olive", OrgRole::Member).await;
    let app = common::build_test_app(pool);
    let response = post_json_as(
        app,
        "/api/v1/segments",
        json!({"title": "  ", "production_date": "2099-06-15", "seats": []}),
        owner,
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Not found
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_segment_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/segments/999999").await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("Segment"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_step_patch_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/api/v1/steps/999999",
        json!({"due_date": "2099-06-15"}),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_pool_member_removal_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::delete(app, "/api/v1/pools/1/members/2").await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
