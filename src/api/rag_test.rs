use super::*;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

// =============================================================
// parsing
// =============================================================

#[test]
fn endpoints_trim_trailing_slash() {
    assert_eq!(ask_endpoint("http://h:8000/"), "http://h:8000/api/rag");
    assert_eq!(uploads_endpoint("http://h:8000"), "http://h:8000/backend-api/files/uploads");
}

#[test]
fn answer_is_extracted() {
    let answer = parse_answer(200, "OK", r#"{"answer":"8GB RAM이 필요합니다."}"#).unwrap();
    assert_eq!(answer, "8GB RAM이 필요합니다.");
}

#[test]
fn missing_answer_falls_back() {
    assert_eq!(parse_answer(200, "OK", "{}").unwrap(), NO_ANSWER);
}

#[test]
fn error_status_prefers_error_field() {
    let err = parse_answer(400, "Bad Request", r#"{"error":"질문이 비어있습니다."}"#).unwrap_err();
    assert_eq!(err.user_message(), "질문이 비어있습니다.");
}

#[test]
fn error_status_without_body_uses_status_text() {
    let err = parse_answer(502, "Bad Gateway", "").unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 502, ref message } if message == "Bad Gateway"));
}

#[test]
fn garbage_success_body_is_parse_error() {
    assert!(matches!(parse_answer(200, "OK", "<html>"), Err(ApiError::Parse(_))));
}

#[test]
fn upload_message_is_optional() {
    assert_eq!(parse_upload(200, "OK", "").unwrap(), None);
    assert_eq!(
        parse_upload(200, "OK", r#"{"success":true,"message":"done"}"#).unwrap().as_deref(),
        Some("done")
    );
    let err = parse_upload(500, "Internal Server Error", r#"{"message":"파일 저장 실패"}"#).unwrap_err();
    assert_eq!(err.user_message(), "파일 저장 실패");
}

// =============================================================
// in-process server
// =============================================================

async fn rag(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let question = body["question"].as_str().unwrap_or_default();
    if question.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "질문이 비어있습니다." })));
    }
    (StatusCode::OK, Json(json!({ "answer": format!("echo: {question}") })))
}

async fn uploads(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("files") {
            names.push(field.file_name().unwrap_or_default().to_owned());
        }
    }
    (StatusCode::OK, Json(json!({ "success": true, "message": names.join(",") })))
}

async fn spawn_client() -> RagClient {
    let router = Router::new()
        .route("/api/rag", post(rag))
        .route("/backend-api/files/uploads", post(uploads));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    RagClient::new(format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn ask_round_trip() {
    let client = spawn_client().await;
    assert_eq!(client.ask("요구사항?").await.unwrap(), "echo: 요구사항?");
    let err = client.ask("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
}

#[tokio::test]
async fn upload_sends_every_file_under_files() {
    let client = spawn_client().await;
    let files = [
        PendingFile::new("a.pdf", "application/pdf", b"%PDF".to_vec()),
        PendingFile::new("b.txt", "text/plain", b"hi".to_vec()),
    ];
    let message = client.upload_files(&files).await.unwrap();
    assert_eq!(message.as_deref(), Some("a.pdf,b.txt"));
}
