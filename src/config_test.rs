use super::*;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_guard`] so env mutation is serialized.
unsafe fn clear_docvault_env() {
    unsafe {
        std::env::remove_var("DOCVAULT_API_BASE_URL");
        std::env::remove_var("DOCVAULT_RAG_BASE_URL");
        std::env::remove_var("DOCVAULT_USER_ID");
        std::env::remove_var("DOCVAULT_UPLOAD_POLICY");
        std::env::remove_var("DOCVAULT_MAX_UPLOAD_BYTES");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_guard();
    unsafe { clear_docvault_env() };

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.upload_policy, PolicyKind::Standard);
    assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_guard();
    unsafe {
        clear_docvault_env();
        std::env::set_var("DOCVAULT_API_BASE_URL", "https://vault.example.test/api/v1/");
        std::env::set_var("DOCVAULT_USER_ID", "42");
        std::env::set_var("DOCVAULT_UPLOAD_POLICY", "pdf_only");
        std::env::set_var("DOCVAULT_MAX_UPLOAD_BYTES", "2048");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.api_base_url, "https://vault.example.test/api/v1");
    assert_eq!(cfg.user_id, "42");
    assert_eq!(cfg.upload_policy, PolicyKind::PdfOnly);
    assert_eq!(cfg.max_upload_bytes, 2048);
    assert_eq!(cfg.api_config().user_id, "42");

    unsafe { clear_docvault_env() };
}

#[test]
fn from_env_unknown_policy_errors() {
    let _guard = env_guard();
    unsafe {
        clear_docvault_env();
        std::env::set_var("DOCVAULT_UPLOAD_POLICY", "everything");
    }

    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unknown DOCVAULT_UPLOAD_POLICY"));

    unsafe { clear_docvault_env() };
}

#[test]
fn parse_policy_defaults_to_standard() {
    assert_eq!(parse_policy(None).unwrap(), PolicyKind::Standard);
    assert_eq!(parse_policy(Some("pdf_only")).unwrap(), PolicyKind::PdfOnly);
}
