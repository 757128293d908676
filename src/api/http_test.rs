use super::*;
use axum::extract::{Multipart, Path, Query};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;

// =============================================================
// endpoint builders
// =============================================================

#[test]
fn endpoints_trim_trailing_slash() {
    assert_eq!(namespaces_endpoint("http://h/api/v1/").unwrap().as_str(), "http://h/api/v1/namespaces");
    assert_eq!(namespace_endpoint("http://h/api/v1", "7").unwrap().as_str(), "http://h/api/v1/namespaces/7");
    assert_eq!(documents_endpoint("http://h/api/v1", "7").unwrap().as_str(), "http://h/api/v1/namespaces/7/documents");
}

#[test]
fn namespace_ids_are_percent_encoded() {
    assert_eq!(namespace_endpoint("http://h/api/v1", "a/b?c").unwrap().as_str(), "http://h/api/v1/namespaces/a%2Fb%3Fc");
    assert_eq!(
        documents_endpoint("http://h/api/v1", "../x").unwrap().as_str(),
        "http://h/api/v1/namespaces/..%2Fx/documents"
    );
}

#[test]
fn invalid_base_url_is_build_error() {
    assert!(matches!(namespaces_endpoint("not a url"), Err(ApiError::HttpClientBuild(_))));
}

// =============================================================
// in-process server
// =============================================================

type Reply = (StatusCode, Json<Value>);

async fn list_namespaces(Query(q): Query<HashMap<String, String>>) -> Reply {
    let user = q.get("userId").cloned().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [{
                "namespace": { "id": 1, "name": format!("user-{user}"), "createdAt": "2025-10-15T00:00:00" },
                "documentTotalCnt": 4
            }]
        })),
    )
}

async fn create_namespace(Json(body): Json<Value>) -> Reply {
    if body["name"] == "dup" {
        return (StatusCode::OK, Json(json!({ "success": false, "message": "duplicate" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "id": 9,
                "name": body["name"],
                "description": body["description"],
                "createdAt": "2025-10-20T12:00:00.5"
            }
        })),
    )
}

async fn delete_namespace(Path(id): Path<String>, Query(q): Query<HashMap<String, String>>) -> Reply {
    if id == "404" || !q.contains_key("userId") {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({ "success": true, "data": null })))
}

async fn list_documents(Path(id): Path<String>) -> Reply {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [
                { "id": 1, "name": "a.pdf", "type": "application/pdf", "size": 10, "uploadedAt": "2025-10-20T00:00:00", "vaultId": id.parse::<u64>().unwrap_or(0) }
            ]
        })),
    )
}

async fn upload_document(Path(id): Path<String>, mut multipart: Multipart) -> Reply {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "file" {
            file_name = field.file_name().map(str::to_owned);
        }
        let bytes = field.bytes().await.unwrap_or_default();
        fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
    }
    let Some(file_name) = file_name else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "success": false, "message": "no file" })));
    };
    if fields.get("namespaceId") != Some(&id) || !fields.contains_key("userId") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "success": false, "message": "bad form" })));
    }
    if file_name == "bad.pdf" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "문서 업로드에 실패했습니다." })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "id": 100, "fileName": file_name, "createdAt": "2025-10-25T10:00:00" }
        })),
    )
}

async fn spawn_api() -> HttpVaultApi {
    let router = Router::new()
        .route("/api/v1/namespaces", get(list_namespaces).post(create_namespace))
        .route("/api/v1/namespaces/{id}", delete(delete_namespace))
        .route("/api/v1/namespaces/{id}/documents", get(list_documents).post(upload_document));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    HttpVaultApi::new(ApiConfig { base_url: format!("http://{addr}/api/v1"), user_id: "42".into() }).unwrap()
}

// =============================================================
// round trips
// =============================================================

#[tokio::test]
async fn list_namespaces_sends_user_id() {
    let api = spawn_api().await;
    let rows = api.list_namespaces().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].namespace.name, "user-42");
    assert_eq!(rows[0].document_total_cnt, 4);
}

#[tokio::test]
async fn create_namespace_returns_server_id() {
    let api = spawn_api().await;
    let ns = api.create_namespace("계약서", Some("2025")).await.unwrap();
    assert_eq!(ns.id, "9");
    assert_eq!(ns.name, "계약서");
    assert_eq!(ns.description.as_deref(), Some("2025"));
}

#[tokio::test]
async fn create_namespace_rejection_carries_message() {
    let api = spawn_api().await;
    let err = api.create_namespace("dup", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "duplicate"));
}

#[tokio::test]
async fn delete_namespace_ok_and_not_found() {
    let api = spawn_api().await;
    api.delete_namespace("3").await.unwrap();
    let err = api.delete_namespace("404").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, ref message } if message == "Not Found"));
}

#[tokio::test]
async fn delete_namespace_keeps_slashed_id_in_one_segment() {
    let api = spawn_api().await;
    api.delete_namespace("7/../../x").await.unwrap();
}

#[tokio::test]
async fn list_documents_maps_vault_id() {
    let api = spawn_api().await;
    let docs = api.list_documents("5").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].vault_id, "5");
}

#[tokio::test]
async fn upload_document_sends_multipart_form() {
    let api = spawn_api().await;
    let file = PendingFile::new("notes.txt", "text/plain", b"hello".to_vec());
    let resp = api.upload_document("5", &file).await.unwrap();
    assert_eq!(resp.id, "100");
    assert_eq!(resp.file_name, "notes.txt");
}

#[tokio::test]
async fn upload_document_server_error_uses_server_message() {
    let api = spawn_api().await;
    let file = PendingFile::new("bad.pdf", "application/pdf", b"%PDF".to_vec());
    let err = api.upload_document("5", &file).await.unwrap_err();
    assert_eq!(err.user_message(), "문서 업로드에 실패했습니다.");
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    let api = HttpVaultApi::new(ApiConfig { base_url: "http://127.0.0.1:1/api/v1".into(), user_id: "1".into() }).unwrap();
    let err = api.list_namespaces().await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
