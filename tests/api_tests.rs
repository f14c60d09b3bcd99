//! Domain API tests against a mock Partner API.

use gupshup_partner_sdk::api::{DateRange, TemplateKind, TemplateMessage};
use gupshup_partner_sdk::{GupshupError, GupshupPartner};
use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_ID: &str = "app-1";

async fn setup() -> (MockServer, GupshupPartner) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/partner/account/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "PT" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/partner/app/{}/token/", APP_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": { "token": "AT" } })),
        )
        .mount(&server)
        .await;

    let partner = GupshupPartner::builder()
        .email("partner@example.com")
        .password("secret")
        .base_url(server.uri())
        .build()
        .unwrap();

    (server, partner)
}

// ============================================================
// Apps
// ============================================================

#[tokio::test]
async fn test_list_apps() {
    let (server, partner) = setup().await;
    Mock::given(method("GET"))
        .and(path("/partner/account/api/partnerApps"))
        .and(header("authorization", "PT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "partnerAppsList": [
                { "id": "app-1", "name": "Shop", "live": true },
                { "id": "app-2", "name": "Support" }
            ]
        })))
        .mount(&server)
        .await;

    let list = partner.apps().list().await.unwrap();
    assert_eq!(list.apps.len(), 2);
    assert_eq!(list.apps[1].name, "Support");

    let app = partner.apps().get("app-2").await.unwrap();
    assert_eq!(app.id, "app-2");

    let err = partner.apps().get("app-9").await.unwrap_err();
    assert!(matches!(err, GupshupError::AppNotFound { ref app_id } if app_id == "app-9"));
}

#[tokio::test]
async fn test_app_scoped_call_sends_apikey() {
    let (server, partner) = setup().await;
    Mock::given(method("GET"))
        .and(path("/partner/app/app-1/profile"))
        .and(header("authorization", "PT"))
        .and(header("apikey", "AT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "about": "hi" })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = partner.apps().profile(APP_ID).await.unwrap();
    assert_eq!(profile["about"], "hi");
}

#[tokio::test]
async fn test_toggle_template_messaging() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/toggleTemplateMessaging"))
        .and(body_string_contains("appId=app-1"))
        .and(body_string_contains("enable=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = partner
        .apps()
        .toggle_template_messaging(APP_ID, false)
        .await
        .unwrap();
    assert_eq!(result["status"], "success");
}

#[tokio::test]
async fn test_ice_breakers_rejected_before_io() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let partner = GupshupPartner::builder()
        .email("partner@example.com")
        .password("secret")
        .base_url(server.uri())
        .build()
        .unwrap();

    let err = partner
        .apps()
        .set_ice_breakers(APP_ID, &["a", "b", "c", "d", "e"])
        .await
        .unwrap_err();
    assert!(matches!(err, GupshupError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_ice_breakers_sent_as_json() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/app-1/icebreakers"))
        .and(body_string_contains("iceBreakers=%5B%22Hi%22%5D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    partner
        .apps()
        .set_ice_breakers(APP_ID, &["Hi"])
        .await
        .unwrap();
}

// ============================================================
// Templates
// ============================================================

#[tokio::test]
async fn test_create_carousel_template_caller_data_wins() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/template"))
        .and(header("apikey", "AT"))
        .and(body_string_contains("templateType=CAROUSEL"))
        .and(body_string_contains("carouselType=VIDEO"))
        .and(body_string_contains("elementName=spring_sale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "template": { "id": "t-1" } })))
        .expect(1)
        .mount(&server)
        .await;

    let data = json!({ "elementName": "spring_sale", "carouselType": "VIDEO" });
    let created = partner
        .templates()
        .create(APP_ID, TemplateKind::CarouselImage, data.as_object().unwrap())
        .await
        .unwrap();
    assert_eq!(created["template"]["id"], "t-1");
}

#[tokio::test]
async fn test_template_status_filters() {
    let (server, partner) = setup().await;
    Mock::given(method("GET"))
        .and(path("/partner/app/template/list"))
        .and(query_param("appId", APP_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "templates": [
                { "id": "1", "status": "APPROVED", "category": "MARKETING" },
                { "id": "2", "status": "rejected", "category": "UTILITY" },
                { "id": "3", "status": "Approved", "category": "utility" },
                { "id": "4", "status": "PENDING" }
            ]
        })))
        .mount(&server)
        .await;

    let approved = partner.templates().approved(APP_ID).await.unwrap();
    let ids: Vec<_> = approved.iter().map(|t| t["id"].clone()).collect();
    assert_eq!(ids, vec![json!("1"), json!("3")]);

    assert_eq!(partner.templates().rejected(APP_ID).await.unwrap().len(), 1);
    assert_eq!(
        partner
            .templates()
            .filter_by_category(APP_ID, "UTILITY")
            .await
            .unwrap()
            .len(),
        2
    );
}

// ============================================================
// Messages
// ============================================================

#[tokio::test]
async fn test_send_template_with_image() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/message/send"))
        .and(header("apikey", "AT"))
        .and(body_string_contains("destination=5511999999999"))
        .and(body_string_contains("templateId=order_update"))
        .and(body_string_contains("params=%5B%22%231234%22%5D"))
        .and(body_string_contains(
            "imageUrl=https%3A%2F%2Fcdn.example.com%2Fbox.png",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messageId": "m-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let message = TemplateMessage::new("5511999999999", "order_update")
        .params(["#1234"])
        .image_url("https://cdn.example.com/box.png");
    let sent = partner
        .messages()
        .send_template(APP_ID, &message)
        .await
        .unwrap();
    assert_eq!(sent["messageId"], "m-1");
}

// ============================================================
// Analytics
// ============================================================

async fn mount_stat(server: &MockServer, name: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/partner/app/analytics/{}", name)))
        .and(query_param("startDate", "2024-05-01"))
        .and(query_param("endDate", "2024-05-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_summary_metrics() {
    let (server, partner) = setup().await;
    mount_stat(&server, "delivery", json!({ "total": 90 })).await;
    mount_stat(&server, "read", json!({ "total": "45" })).await;
    mount_stat(&server, "failed", json!({ "total": 10 })).await;

    let range = DateRange::parse("2024-05-01", "2024-05-31").unwrap();
    let metrics = partner
        .analytics()
        .summary_metrics(APP_ID, &range)
        .await
        .unwrap();

    assert_eq!(metrics.total_sent, 100);
    assert_eq!(metrics.total_read, 45);
    assert!((metrics.delivery_rate - 90.0).abs() < f64::EPSILON);
    assert!((metrics.read_rate - 50.0).abs() < f64::EPSILON);
    assert!((metrics.failure_rate - 10.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_full_report() {
    let (server, partner) = setup().await;
    for name in ["daily", "conversations", "delivery", "read", "failed"] {
        mount_stat(&server, name, json!({ "name": name })).await;
    }
    Mock::given(method("GET"))
        .and(path("/partner/app/logs/inbound"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "inbound" })))
        .mount(&server)
        .await;

    let range = DateRange::parse("2024-05-01", "2024-05-31").unwrap();
    let report = partner
        .analytics()
        .full_report(APP_ID, &range)
        .await
        .unwrap();

    assert_eq!(report.inbound["name"], "inbound");
    assert_eq!(report.daily_usage["name"], "daily");
    assert_eq!(report.failed["name"], "failed");

    let serialized = serde_json::to_value(&report).unwrap();
    assert!(serialized.get("dailyUsage").is_some());
}

#[tokio::test]
async fn test_full_report_propagates_first_failure() {
    let (server, partner) = setup().await;
    for name in ["daily", "conversations", "delivery", "read"] {
        mount_stat(&server, name, json!({})).await;
    }
    Mock::given(method("GET"))
        .and(path("/partner/app/analytics/failed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/partner/app/logs/inbound"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let range = DateRange::parse("2024-05-01", "2024-05-31").unwrap();
    let err = partner
        .analytics()
        .full_report(APP_ID, &range)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

// ============================================================
// Wallet
// ============================================================

#[tokio::test]
async fn test_wallet_calls_do_not_send_apikey() {
    let (server, partner) = setup().await;
    Mock::given(method("GET"))
        .and(path("/partner/wallet/w-1/balance"))
        .and(header("authorization", "PT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": 12.5 })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = partner.wallet().balance("w-1").await.unwrap();
    assert_eq!(balance["balance"], 12.5);

    let requests = server.received_requests().await.unwrap();
    let wallet_request = requests
        .iter()
        .find(|r| r.url.path() == "/partner/wallet/w-1/balance")
        .unwrap();
    assert!(!wallet_request.headers.contains_key("apikey"));
    assert!(requests
        .iter()
        .all(|r| !r.url.path().ends_with("/token/")));
}

#[tokio::test]
async fn test_overdraft_limit_must_be_finite() {
    let (_server, partner) = setup().await;

    let err = partner
        .wallet()
        .set_overdraft_limit("w-1", f64::NAN)
        .await
        .unwrap_err();
    assert!(matches!(err, GupshupError::InvalidArgument(_)));
}

// ============================================================
// Flows
// ============================================================

#[tokio::test]
async fn test_import_from_meta_rejects_invalid_json() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/app-1/flow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = partner
        .flows()
        .import_from_meta(APP_ID, "signup", "{not json")
        .await
        .unwrap_err();
    assert!(matches!(err, GupshupError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_import_from_meta_without_flow_id() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/app-1/flow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = partner
        .flows()
        .import_from_meta(APP_ID, "signup", r#"{"version":"3.1"}"#)
        .await
        .unwrap_err();
    match err {
        GupshupError::Api {
            status_code,
            response_body,
            ..
        } => {
            assert_eq!(status_code, 0);
            assert!(response_body.contains("success"));
        }
        other => panic!("expected Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_import_from_meta_uploads_definition() {
    let (server, partner) = setup().await;
    Mock::given(method("POST"))
        .and(path("/partner/app/app-1/flow"))
        .and(body_string_contains("name=signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "flow": { "id": "f-9" } })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/partner/app/app-1/flow/f-9/json"))
        .and(body_string_contains("json=%7B%22version%22%3A%223.1%22%7D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let result = partner
        .flows()
        .import_from_meta(APP_ID, "signup", r#"{"version":"3.1"}"#)
        .await
        .unwrap();
    assert_eq!(result["success"], true);
}
