//! HTTP boundary tests: routing, status codes and error bodies

mod common;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use common::{database::*, fixtures::*};
use fakeso::notifications::{LiveNotifier, NullNotifier};
use serde_json::{json, Value};
use std::sync::Arc;

macro_rules! init_app {
    ($db:expr) => {{
        let notifier: Arc<dyn LiveNotifier> = Arc::new(NullNotifier);
        test::init_service(
            App::new()
                .app_data(Data::new($db.clone()))
                .app_data(Data::new(notifier))
                .configure(fakeso::web::configure),
        )
        .await
    }};
}

fn report_body(community_id: i32, reporter: &str, reported: &str) -> Value {
    json!({
        "communityId": community_id,
        "reportedUser": reported,
        "reporterUser": reporter,
        "reason": "Spam in every answer",
        "category": "spam"
    })
}

#[actix_rt::test]
async fn test_create_report_status_codes() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    let community_id = create_test_community(&db).await.unwrap();
    let app = init_app!(db);

    let cases = [
        (report_body(community_id, "user1", "user2"), StatusCode::OK),
        (report_body(community_id, "user1", "user2"), StatusCode::CONFLICT),
        (report_body(community_id, "user1", "user1"), StatusCode::BAD_REQUEST),
        (report_body(community_id, "outsider", "user1"), StatusCode::FORBIDDEN),
        (report_body(9999, "user1", "user2"), StatusCode::NOT_FOUND),
        (report_body(community_id, "", "user2"), StatusCode::BAD_REQUEST),
    ];

    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/report/create")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "body: {}", body);
    }
}

#[actix_rt::test]
async fn test_error_body_shape() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    let community_id = create_test_community(&db).await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/report/create")
        .set_json(report_body(community_id, "user1", "user1"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "error": "You cannot report yourself" }));

    // Malformed JSON
    let req = test::TestRequest::post()
        .uri("/api/report/create")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_create_report_response() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    let community_id = create_test_community(&db).await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/report/create")
        .set_json(report_body(community_id, "user1", "user2"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["report"]["reporterUser"], "user1");
    assert_eq!(body["report"]["status"], "pending");
    assert_eq!(body["banApplied"], json!({ "banned": false }));
}

#[actix_rt::test]
async fn test_review_flow_over_http() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    let community_id = create_test_community(&db).await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/report/create")
        .set_json(report_body(community_id, "user1", "user2"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let report_id = created["report"]["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/report/pending/{}", community_id))
        .to_request();
    let pending: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/report/updateStatus")
        .set_json(json!({ "reportId": report_id, "status": "reviewed", "reviewedBy": MODERATOR }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "reviewed");
    assert_eq!(updated["reviewedBy"], MODERATOR);

    let req = test::TestRequest::post()
        .uri("/api/report/updateStatus")
        .set_json(json!({ "reportId": 9999, "status": "dismissed", "reviewedBy": MODERATOR }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/report/getByUser")
        .set_json(json!({ "communityId": community_id, "username": "user2" }))
        .to_request();
    let by_user: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(by_user.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/report/pending/{}", community_id))
        .to_request();
    let pending: Value = test::call_and_read_body_json(&app, req).await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_notification_endpoints() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    let community_id = create_test_community(&db).await.unwrap();
    let app = init_app!(db);

    for reporter in REPORTERS {
        let req = test::TestRequest::post()
            .uri("/api/report/create")
            .set_json(report_body(community_id, reporter, "user1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/notification/{}?limit=5", ADMIN))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["type"], "community");
    assert_eq!(listed[0]["title"], "Member auto-banned in Test Community");

    let req = test::TestRequest::post()
        .uri("/api/notification/clear")
        .set_json(json!({ "username": ADMIN, "type": "community" }))
        .to_request();
    let flags: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(flags, json!({ "communityNotifs": false, "messageNotifs": false }));

    let req = test::TestRequest::post()
        .uri("/api/notification/clear")
        .set_json(json!({ "username": "nobody", "type": "community" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Banned users may appeal
    let req = test::TestRequest::post()
        .uri("/api/appeal/create")
        .set_json(json!({
            "communityId": community_id,
            "username": "user1",
            "description": "Please reconsider"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/appeal/create")
        .set_json(json!({
            "communityId": community_id,
            "username": "user2",
            "description": "I was never banned"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/appeal/{}", community_id))
        .to_request();
    let appeals: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(appeals.as_array().unwrap().len(), 1);
}
