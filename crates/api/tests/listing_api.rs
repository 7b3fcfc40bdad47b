//! HTTP-level integration tests for the listing endpoints: pagination
//! envelope, filters, summaries over the full filtered set, and the
//! error mapping for malformed filter arguments.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, get_auth, post_json_auth};
use estato_db::models::member::CreateMember;
use estato_db::repositories::MemberRepo;
use sqlx::PgPool;

async fn seed_members(pool: &PgPool, count: usize) {
    for i in 0..count {
        MemberRepo::create(
            pool,
            &CreateMember {
                membership_no: format!("M-{i:04}"),
                name: format!("Member {i:04}"),
                cnic: format!("35202-00000{i:02}-5"),
                phone: format!("0300-11100{i:02}"),
                email: None,
                address: None,
            },
            None,
        )
        .await
        .unwrap();
    }
}

async fn clerk_token(pool: &PgPool) -> String {
    let (_user, password) = create_test_user(pool, "lister", "clerk").await;
    let app = common::build_test_app(pool.clone());
    common::login(app, "lister", &password).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_listing_returns_page_envelope(pool: PgPool) {
    seed_members(&pool, 25).await;
    let token = clerk_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/members?page=3&limit=10", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["records"].as_array().unwrap().len(), 5);
    assert_eq!(data["pagination"]["page"], 3);
    assert_eq!(data["pagination"]["limit"], 10);
    assert_eq!(data["pagination"]["total"], 25);
    assert_eq!(data["pagination"]["pages"], 3);
    assert_eq!(data["summary"]["total"], 25);
    assert_eq!(data["summary"]["by_status"]["active"], 25);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_paging_is_clamped_not_rejected(pool: PgPool) {
    seed_members(&pool, 3).await;
    let token = clerk_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/members?page=-2&limit=5000", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["page"], 1);
    assert_eq!(json["data"]["pagination"]["limit"], 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_sort_field_falls_back_to_the_default(pool: PgPool) {
    seed_members(&pool, 2).await;
    let token = clerk_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/members?sort_by=password_hash", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_filter_narrows_records_and_summary(pool: PgPool) {
    seed_members(&pool, 4).await;
    let token = clerk_token(&pool).await;

    // Suspend one member through the API.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/members?search=M-0002", &token).await;
    let id = body_json(response).await["data"]["records"][0]["id"]
        .as_i64()
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = app
        .oneshot(put_json(
            &format!("/api/v1/members/{id}"),
            &token,
            serde_json::json!({ "status": "suspended" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/members?status=suspended", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["total"], 1);
    assert_eq!(json["data"]["summary"]["by_status"]["suspended"], 1);
    assert!(json["data"]["summary"]["by_status"]["active"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_reference_id_maps_to_400(pool: PgPool) {
    let token = clerk_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/bills?member_id=not-an-id", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_ARGUMENT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_member_then_duplicate_conflicts(pool: PgPool) {
    let token = clerk_token(&pool).await;

    let body = serde_json::json!({
        "membership_no": "M-9001",
        "name": "Fresh Member",
        "cnic": "35202-5555555-5",
        "phone": "0355-5555555",
    });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/members", &token, body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/members", &token, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Local helpers
// ---------------------------------------------------------------------------

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use tower::ServiceExt;

fn put_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}
