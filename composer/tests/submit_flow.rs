#![allow(clippy::unwrap_used, clippy::expect_used)]

//! A full submit against mocked upload and send interfaces.

use bytes::Bytes;
use huddle_composer::ComposerEvent;
use huddle_composer::ComposerEventSender;
use huddle_composer::ComposerOrchestrator;
use huddle_composer::Draft;
use huddle_composer::NoticeLevel;
use huddle_composer::SubmitOutcome;
use huddle_core::HttpMessageSender;
use huddle_core::PendingFile;
use huddle_core::UploadEndpointClient;
use huddle_core::UploadLimits;
use huddle_protocol::Delta;
use huddle_protocol::DeltaOp;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc::unbounded_channel;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_string_contains;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn file(name: &str, mime_type: &str, len: usize) -> PendingFile {
    PendingFile::new(name, mime_type, Bytes::from(vec![b'x'; len]))
}

#[tokio::test]
async fn uploads_what_it_can_and_sends_the_rest() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"a.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f_a",
            "name": "a.png",
            "url": "https://cdn.example.com/a.png",
            "size": 3,
            "type": "image/png",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"c.txt\""))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to upload file",
            "details": "disk full",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = unbounded_channel();
    let limits = UploadLimits {
        max_file_size: 10,
        ..UploadLimits::default()
    };
    let orchestrator = ComposerOrchestrator::new(
        UploadEndpointClient::new(format!("{}/api/upload", server.uri())),
        HttpMessageSender::new(format!("{}/api/messages", server.uri())),
        limits,
        "alice",
        ComposerEventSender::new(tx),
    );

    let body = Delta {
        ops: vec![DeltaOp::text("look @bob\n")],
    }
    .to_json()
    .unwrap();
    let draft = Draft {
        channel_id: "general".to_string(),
        body,
        files: vec![
            file("a.png", "image/png", 3),
            file("big.png", "image/png", 64),
            file("c.txt", "text/plain", 4),
        ],
        reply: None,
    };

    let outcome = orchestrator.submit(&draft).await.unwrap();
    let SubmitOutcome::Sent(sent) = outcome else {
        panic!("expected the message to be sent, got {outcome:?}");
    };
    assert_eq!(sent.message_id, "m_1");
    assert_eq!(sent.rejections.len(), 1);
    assert_eq!(sent.rejections[0].file_name, "big.png");
    assert_eq!(sent.failed_uploads.len(), 1);
    assert_eq!(sent.failed_uploads[0].file_name, "c.txt");

    let requests = server.received_requests().await.unwrap();
    let send = requests
        .iter()
        .find(|r| r.url.path() == "/api/messages")
        .unwrap();
    let payload: Value = serde_json::from_slice(&send.body).unwrap();
    assert_eq!(payload["content"], "look @bob");
    assert_eq!(payload["userName"], "alice");
    assert_eq!(payload["richContent"]["mentions"], json!(["bob"]));
    assert_eq!(
        payload["richContent"]["attachments"],
        json!([{
            "name": "a.png",
            "size": 3,
            "mimeType": "image/png",
            "url": "https://cdn.example.com/a.png",
        }])
    );

    drop(orchestrator);
    let mut notices = Vec::new();
    while let Some(event) = rx.recv().await {
        if let ComposerEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(notices[0].message.starts_with("big.png:"));
    assert_eq!(
        notices[1].message,
        "1 of 2 files failed to upload; sending the rest"
    );
}
