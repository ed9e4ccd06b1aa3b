use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_core::Stage;
use tracker_engine::{
    ApiSettings, FailureKind, PipelineAction, ReqwestApi, TrackerApi, UploadRequest,
};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        webhook_url: format!("{}/webhook-test/auto-process", server.uri()),
        ..ApiSettings::default()
    })
    .expect("client builds")
}

async fn mount_items(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/agents/sales/rfps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_items_skips_malformed_rows() {
    let server = MockServer::start().await;
    mount_items(
        &server,
        json!([
            {"id": 1, "title": "Road paint", "client_name": "PWD", "deadline": "2026-11-01",
             "status": "Processed", "extracted_data": {"requirements": {"color": "white"}}},
            {"title": "row without id"},
            {"id": 2, "title": null, "status": null}
        ]),
    )
    .await;

    let items = api_for(&server).list_items().await.expect("list ok");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Road paint");
    assert_eq!(items[0].stage(), Stage::Processed);
    assert_eq!(items[1].title, "");
    assert_eq!(items[1].stage(), Stage::New);
}

#[tokio::test]
async fn fetch_item_filters_the_list() {
    let server = MockServer::start().await;
    mount_items(
        &server,
        json!([{"id": 4, "status": "New"}, {"id": 9, "status": "Pricing Complete"}]),
    )
    .await;
    let api = api_for(&server);

    let found = api.fetch_item(9).await.expect("fetch ok").expect("present");
    assert_eq!(found.stage(), Stage::PricingComplete);
    assert_eq!(api.fetch_item(5).await.expect("fetch ok"), None);
}

#[tokio::test]
async fn error_body_on_success_status_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/technical/3/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "RFP not found"})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .run_action(3, PipelineAction::Analyze)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Rejected);
    assert_eq!(err.to_string(), "RFP not found");
}

#[tokio::test]
async fn action_uses_its_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/pricing/7/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .run_action(7, PipelineAction::Price)
        .await
        .expect("price ok");
}

#[tokio::test]
async fn http_status_carries_fastapi_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/main/2/generate-proposal"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No pricing"})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .run_action(2, PipelineAction::GenerateProposal)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "No pricing");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/sales/rfps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(100),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.list_items().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn scan_reports_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/sales/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scanned_count": 3})))
        .mount(&server)
        .await;

    let report = api_for(&server).scan().await.expect("scan ok");
    assert_eq!(report.scanned_count, 3);
}

#[tokio::test]
async fn chat_posts_question_and_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/main/5/chat"))
        .and(body_json(json!({"question": "What is the deadline?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "1 Nov"})))
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .chat(5, "What is the deadline?")
        .await
        .expect("chat ok");
    assert_eq!(reply, "1 Nov");
}

#[tokio::test]
async fn automated_run_passes_id_and_ignores_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook-test/auto-process"))
        .and(query_param("id", "12"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .trigger_auto_run(12)
        .await
        .expect("only transport failures count");
}

#[tokio::test]
async fn automated_run_reports_unreachable_webhook() {
    let api = ReqwestApi::new(ApiSettings {
        webhook_url: "http://127.0.0.1:9/webhook".to_string(),
        connect_timeout: Duration::from_millis(200),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.trigger_auto_run(1).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn upload_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agents/sales/upload"))
        .and(body_string_contains("name=\"title\""))
        .and(body_string_contains("Bridge coating"))
        .and(body_string_contains("filename=\"tender.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rfp_id": 42})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tender.pdf");
    std::fs::write(&file, b"%PDF-1.4 test").unwrap();

    let id = api_for(&server)
        .upload(&UploadRequest {
            file,
            title: "Bridge coating".to_string(),
            client: "NHAI".to_string(),
            deadline: "2026-12-01".to_string(),
        })
        .await
        .expect("upload ok");
    assert_eq!(id, 42);
}

#[tokio::test]
async fn upload_of_missing_file_fails_locally() {
    let server = MockServer::start().await;
    let err = api_for(&server)
        .upload(&UploadRequest {
            file: "/nonexistent/tender.pdf".into(),
            title: "t".to_string(),
            client: "c".to_string(),
            deadline: "d".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn download_returns_artifact_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/main/download/proposal_8.pptx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04deck".to_vec()))
        .mount(&server)
        .await;

    let bytes = api_for(&server).download_artifact(8).await.expect("download ok");
    assert_eq!(bytes, b"PK\x03\x04deck".to_vec());
}

#[tokio::test]
async fn download_respects_size_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/main/download/proposal_8.pptx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        max_download_bytes: 16,
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.download_artifact(8).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestApi::new(ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
