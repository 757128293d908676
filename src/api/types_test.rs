use super::*;

// =============================================================
// envelope
// =============================================================

#[test]
fn envelope_success_returns_data() {
    let body = r#"{"success":true,"data":[1,2,3]}"#;
    let data: Option<Vec<u32>> = parse_envelope(200, "OK", body).unwrap();
    assert_eq!(data, Some(vec![1, 2, 3]));
}

#[test]
fn envelope_success_with_null_data() {
    let body = r#"{"success":true,"data":null,"timestamp":"2025-10-20T12:00:00"}"#;
    let data: Option<serde_json::Value> = parse_envelope(200, "OK", body).unwrap();
    assert!(data.is_none());
    assert!(expect_data(data).is_err());
}

#[test]
fn envelope_rejected_uses_message() {
    let body = r#"{"success":false,"data":null,"message":"이미 존재하는 네임스페이스입니다."}"#;
    let err = parse_envelope::<serde_json::Value>(200, "OK", body).unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "이미 존재하는 네임스페이스입니다."));
}

#[test]
fn envelope_rejected_falls_back_to_error_info() {
    let body = r#"{"success":false,"error":{"code":"NS_001","message":"not found"}}"#;
    let err = parse_envelope::<serde_json::Value>(200, "OK", body).unwrap_err();
    assert_eq!(err.to_string(), "request rejected: not found");
}

#[test]
fn bad_status_prefers_server_message() {
    let body = r#"{"success":false,"message":"boom"}"#;
    let err = parse_envelope::<serde_json::Value>(500, "Internal Server Error", body).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, ref message } if message == "boom"));
}

#[test]
fn bad_status_without_body_uses_status_text() {
    let err = parse_envelope::<serde_json::Value>(404, "Not Found", "<html>").unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, ref message } if message == "Not Found"));
}

#[test]
fn malformed_success_body_is_parse_error() {
    let err = parse_envelope::<serde_json::Value>(200, "OK", "not json").unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

// =============================================================
// DTOs
// =============================================================

#[test]
fn namespace_list_accepts_numeric_ids_and_naive_timestamps() {
    let body = r#"{
        "success": true,
        "data": [{
            "namespace": {"id": 7, "name": "기본 문서함", "description": "", "createdAt": "2025-10-15T09:30:00.123456"},
            "documentTotalCnt": 2
        }]
    }"#;
    let rows: Vec<NamespaceWithTotalCnt> = expect_data(parse_envelope(200, "OK", body).unwrap()).unwrap();
    let vault: Vault = rows.into_iter().next().unwrap().into();
    assert_eq!(vault.id, "7");
    assert_eq!(vault.document_count, 2);
    assert!(vault.description.is_none());
    assert_eq!(vault.created_at.year(), 2025);
    assert_eq!(vault.created_at.offset(), time::UtcOffset::UTC);
}

#[test]
fn document_row_maps_type_and_vault() {
    let json = r#"{"id":"3","name":"manual.docx","type":"application/vnd.openxmlformats-officedocument.wordprocessingml.document","size":1536000,"uploadedAt":"2025-10-25T00:00:00Z","vaultId":2}"#;
    let row: DocumentQueryResponse = serde_json::from_str(json).unwrap();
    let doc: Document = row.into();
    assert_eq!(doc.vault_id, "2");
    assert_eq!(doc.size, 1_536_000);
    assert!(doc.mime_type.ends_with("wordprocessingml.document"));
    assert!(doc.content.is_none());
}

#[test]
fn upload_response_parses() {
    let json = r#"{"id":11,"fileName":"a.pdf","createdAt":"2025-10-25T10:00:00+09:00","status":"PROCESSING"}"#;
    let resp: DocumentUploadResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, "11");
    assert_eq!(resp.file_name, "a.pdf");
}

#[test]
fn id_rejects_non_integer_values() {
    let json = r#"{"id":1.5,"fileName":"a.pdf","createdAt":"2025-10-25T10:00:00Z"}"#;
    assert!(serde_json::from_str::<DocumentUploadResponse>(json).is_err());
}

#[test]
fn create_request_is_camel_case_and_skips_missing_description() {
    let body = CreateNamespaceRequest { user_id: "1", name: "n", description: None };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "userId": "1", "name": "n" }));
}

#[test]
fn parse_timestamp_variants() {
    assert!(parse_timestamp("2025-10-20T12:34:56Z").is_some());
    assert!(parse_timestamp("2025-10-20T12:34:56").is_some());
    assert!(parse_timestamp("2025-10-20T12:34:56.5").is_some());
    assert!(parse_timestamp("yesterday").is_none());
}
