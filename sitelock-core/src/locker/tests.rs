use super::SiteLocker;
use crate::engine::LockEngine;
use crate::storage::models::{AuthorizedSession, SettingsPatch};
use crate::storage::{KEY_AUTHORIZED_SESSIONS, KEY_BLOCKED_SITES};
use crate::LockerError;
use serde_json::json;

fn locker() -> SiteLocker {
    SiteLocker::in_memory().unwrap()
}

#[test]
fn test_add_and_list_blocked_sites() {
    let locker = locker();
    assert!(locker.blocked_sites().unwrap().is_empty());

    let site = locker
        .add_blocked_site("example.com", Some("Example"))
        .unwrap();
    assert_eq!(site.domain, "example.com");
    assert_eq!(site.name.as_deref(), Some("Example"));
    assert!(site.is_active);

    let sites = locker.blocked_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0], site);
}

#[test]
fn test_add_normalizes_input() {
    let locker = locker();
    let site = locker
        .add_blocked_site("https://WWW.Example.com/some/path", None)
        .unwrap();
    assert_eq!(site.domain, "example.com");
}

#[test]
fn test_add_rejects_invalid_input() {
    let locker = locker();
    assert!(matches!(
        locker.add_blocked_site("", None),
        Err(LockerError::InvalidDomain(_))
    ));
    assert!(matches!(
        locker.add_blocked_site("not a domain", None),
        Err(LockerError::InvalidDomain(_))
    ));
    assert!(locker.blocked_sites().unwrap().is_empty());
}

#[test]
fn test_readding_domain_overwrites_in_place() {
    let locker = locker();
    let first = locker.add_blocked_site("example.com", None).unwrap();
    locker.toggle_blocked_site(&first.id).unwrap();

    let second = locker
        .add_blocked_site("example.com", Some("Example"))
        .unwrap();

    let sites = locker.blocked_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].id, second.id);
    assert!(sites[0].is_active);
}

#[test]
fn test_remove_and_toggle() {
    let locker = locker();
    let site = locker.add_blocked_site("example.com", None).unwrap();

    locker.toggle_blocked_site(&site.id).unwrap();
    assert!(!locker.blocked_sites().unwrap()[0].is_active);
    assert!(!locker.is_url_blocked("https://example.com/").unwrap());

    locker.toggle_blocked_site(&site.id).unwrap();
    assert!(locker.is_url_blocked("https://example.com/").unwrap());

    locker.remove_blocked_site(&site.id).unwrap();
    assert!(locker.blocked_sites().unwrap().is_empty());

    // unknown ids are no-ops
    locker.remove_blocked_site("missing").unwrap();
    locker.toggle_blocked_site("missing").unwrap();
}

#[test]
fn test_url_blocking_covers_subdomains() {
    let locker = locker();
    locker.add_blocked_site("example.com", None).unwrap();

    assert!(locker.is_url_blocked("https://example.com/").unwrap());
    assert!(locker.is_url_blocked("https://www.example.com/").unwrap());
    assert!(locker.is_url_blocked("https://mail.example.com/inbox").unwrap());
    assert!(locker.is_url_blocked("HTTPS://EXAMPLE.COM/").unwrap());

    // lookalike domains are not subdomains
    assert!(!locker.is_url_blocked("https://notexample.com/").unwrap());
    assert!(!locker.is_url_blocked("https://example.com.evil.net/").unwrap());
    assert!(!locker.is_url_blocked("https://other.org/").unwrap());
}

#[test]
fn test_unparseable_url_is_never_blocked() {
    let locker = locker();
    locker.add_blocked_site("example.com", None).unwrap();
    assert!(!locker.is_url_blocked("not a url").unwrap());
    assert!(!locker.is_url_blocked("").unwrap());
}

#[test]
fn test_domain_blocking_legacy_path() {
    let locker = locker();
    locker.add_blocked_site("example.com", None).unwrap();
    assert!(locker.is_domain_blocked("example.com").unwrap());
    assert!(locker.is_domain_blocked("WWW.Example.com").unwrap());
    assert!(locker.is_domain_blocked("sub.example.com").unwrap());
    assert!(!locker.is_domain_blocked("other.org").unwrap());
}

#[test]
fn test_malformed_stored_entries_are_dropped() {
    let locker = locker();
    locker
        .store()
        .set_value(
            KEY_BLOCKED_SITES,
            &json!([
                {"id": "a", "domain": "example.com", "isActive": true, "createdAt": 1},
                {"bogus": true},
                42,
                null
            ]),
        )
        .unwrap();

    let sites = locker.blocked_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].domain, "example.com");
    assert!(locker.is_url_blocked("https://example.com/").unwrap());
}

#[test]
fn test_non_array_blocklist_treated_as_empty() {
    let locker = locker();
    locker
        .store()
        .set_value(KEY_BLOCKED_SITES, &json!({"oops": true}))
        .unwrap();
    assert!(locker.blocked_sites().unwrap().is_empty());
    assert!(!locker.is_url_blocked("https://example.com/").unwrap());
}

#[test]
fn test_password_lifecycle() {
    let locker = locker();
    assert!(!locker.has_password().unwrap());
    assert!(!locker.check_password("abcd").unwrap());

    locker.set_password("abcd").unwrap();
    assert!(locker.has_password().unwrap());
    assert!(locker.check_password("abcd").unwrap());
    assert!(!locker.check_password("abce").unwrap());
    assert!(!locker.check_password("").unwrap());

    locker.set_password("efgh").unwrap();
    assert!(!locker.check_password("abcd").unwrap());
    assert!(locker.check_password("efgh").unwrap());
}

#[test]
fn test_session_scoping_is_exact() {
    let locker = locker();
    locker.authorize_session("example.com").unwrap();

    assert!(locker.is_session_authorized("example.com").unwrap());
    assert!(locker.is_session_authorized("WWW.Example.com").unwrap());
    assert!(!locker.is_session_authorized("sub.example.com").unwrap());

    locker.clear_sessions().unwrap();
    locker.authorize_session("sub.example.com").unwrap();
    assert!(locker.is_session_authorized("sub.example.com").unwrap());
    assert!(!locker.is_session_authorized("example.com").unwrap());
}

#[test]
fn test_session_expiry_from_timeout() {
    let locker = locker();
    locker
        .update_settings(&SettingsPatch {
            session_timeout: Some(45),
            ..Default::default()
        })
        .unwrap();

    let session = locker.authorize_session("example.com").unwrap();
    assert_eq!(
        session.expires_at,
        Some(session.authorized_at + 45 * 60_000)
    );
}

#[test]
fn test_overlong_timeout_falls_back_to_no_expiry() {
    let locker = locker();
    locker
        .update_settings(&SettingsPatch {
            session_timeout: Some(u64::MAX),
            ..Default::default()
        })
        .unwrap();

    let session = locker.authorize_session("example.com").unwrap();
    assert_eq!(session.expires_at, None);
    assert!(locker.is_session_authorized("example.com").unwrap());
}

#[test]
fn test_zero_timeout_means_no_expiry() {
    let locker = locker();
    locker
        .update_settings(&SettingsPatch {
            session_timeout: Some(0),
            ..Default::default()
        })
        .unwrap();

    let session = locker.authorize_session("example.com").unwrap();
    assert_eq!(session.expires_at, None);
    assert!(locker.is_session_authorized("example.com").unwrap());
}

#[test]
fn test_expired_session_purged_on_check() {
    let locker = locker();
    let expired = AuthorizedSession {
        domain: "example.com".to_string(),
        authorized_at: 1_000,
        expires_at: Some(2_000),
    };
    locker
        .store()
        .set_value(KEY_AUTHORIZED_SESSIONS, &json!([expired]))
        .unwrap();

    assert!(!locker.is_session_authorized("example.com").unwrap());
    assert!(locker.authorized_sessions().unwrap().is_empty());
}

#[test]
fn test_reauthorizing_replaces_existing_session() {
    let locker = locker();
    let first = locker.authorize_session("example.com").unwrap();
    let second = locker.authorize_session("example.com").unwrap();

    let sessions = locker.authorized_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].authorized_at >= first.authorized_at);
    assert_eq!(sessions[0].authorized_at, second.authorized_at);
}

#[test]
fn test_remove_and_clear_sessions() {
    let locker = locker();
    locker.authorize_session("example.com").unwrap();
    locker.authorize_session("other.org").unwrap();

    locker.remove_session("example.com").unwrap();
    assert!(!locker.is_session_authorized("example.com").unwrap());
    assert!(locker.is_session_authorized("other.org").unwrap());

    locker.clear_sessions().unwrap();
    assert!(locker.authorized_sessions().unwrap().is_empty());
}

#[test]
fn test_settings_default_and_merge() {
    let locker = locker();
    let settings = locker.settings().unwrap();
    assert_eq!(settings.session_timeout, 30);
    assert!(settings.require_password_on_restart);
    assert!(settings.is_enabled);

    let updated = locker
        .update_settings(&SettingsPatch {
            is_enabled: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert!(!updated.is_enabled);
    assert_eq!(updated.session_timeout, 30);

    let reread = locker.settings().unwrap();
    assert_eq!(reread, updated);
}

#[test]
fn test_garbage_settings_fall_back_to_defaults() {
    let locker = locker();
    locker
        .store()
        .set_value(crate::storage::KEY_SETTINGS, &json!("garbage"))
        .unwrap();
    assert_eq!(locker.settings().unwrap(), Default::default());
}

#[test]
fn test_should_lock_full_flow() {
    let locker = locker();
    locker.set_password("abcd").unwrap();
    locker.add_blocked_site("example.com", None).unwrap();
    let engine = LockEngine::new(locker);

    assert!(engine
        .should_lock("example.com", "https://example.com/")
        .unwrap());
    assert!(!engine.should_lock("other.org", "https://other.org/").unwrap());

    assert!(!engine.verify_password("wrong", "example.com").unwrap());
    assert!(engine
        .should_lock("example.com", "https://example.com/")
        .unwrap());

    assert!(engine.verify_password("abcd", "example.com").unwrap());
    assert!(!engine
        .should_lock("example.com", "https://example.com/")
        .unwrap());

    // the session is exact, so a subdomain page still locks
    assert!(engine
        .should_lock("mail.example.com", "https://mail.example.com/")
        .unwrap());
}

#[test]
fn test_disabled_locker_never_locks() {
    let locker = locker();
    locker.set_password("abcd").unwrap();
    locker.add_blocked_site("example.com", None).unwrap();
    locker
        .update_settings(&SettingsPatch {
            is_enabled: Some(false),
            ..Default::default()
        })
        .unwrap();
    let engine = LockEngine::new(locker);

    assert!(!engine
        .should_lock("example.com", "https://example.com/")
        .unwrap());
    assert_eq!(
        engine
            .lock_due_for_navigation("https://example.com/")
            .unwrap(),
        None
    );
}

#[test]
fn test_verify_without_password_fails_and_mints_no_session() {
    let locker = locker();
    locker.add_blocked_site("example.com", None).unwrap();
    let engine = LockEngine::new(locker);

    assert!(!engine.verify_password("anything", "example.com").unwrap());
    assert!(engine.locker().authorized_sessions().unwrap().is_empty());
    assert!(engine
        .should_lock("example.com", "https://example.com/")
        .unwrap());
}

#[test]
fn test_lock_due_for_navigation() {
    let locker = locker();
    locker.set_password("abcd").unwrap();
    locker.add_blocked_site("example.com", None).unwrap();
    let engine = LockEngine::new(locker);

    assert_eq!(
        engine
            .lock_due_for_navigation("https://www.example.com/a")
            .unwrap(),
        Some("www.example.com".to_string())
    );
    assert_eq!(
        engine.lock_due_for_navigation("https://other.org/").unwrap(),
        None
    );
    assert_eq!(engine.lock_due_for_navigation("not a url").unwrap(), None);
}

#[test]
fn test_startup_clears_sessions_only_when_required() {
    let locker = locker();
    locker.authorize_session("example.com").unwrap();
    let engine = LockEngine::new(locker);

    engine.on_startup().unwrap();
    assert!(engine.locker().authorized_sessions().unwrap().is_empty());

    engine
        .locker()
        .update_settings(&SettingsPatch {
            require_password_on_restart: Some(false),
            ..Default::default()
        })
        .unwrap();
    engine.locker().authorize_session("example.com").unwrap();
    engine.on_startup().unwrap();
    assert_eq!(engine.locker().authorized_sessions().unwrap().len(), 1);

    engine.on_installed().unwrap();
    assert!(engine.locker().authorized_sessions().unwrap().is_empty());
}
