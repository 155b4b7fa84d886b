use std::time::Duration;

use tribuna::identity::{PermissionSet, Principal, SessionManager};
use tribuna::nav;

fn principal(username: &str, permissions: &str) -> Principal {
    Principal {
        username: username.to_string(),
        display_name: username.to_string(),
        role: "Analista".to_string(),
        permissions: PermissionSet::parse(permissions),
    }
}

#[tokio::test]
async fn session_lifecycle_issue_validate_logout() {
    let sm = SessionManager::default();
    let sess = sm.issue(principal("lifecycle_user", "1,4"));
    assert!(!sess.token.is_empty());
    assert_ne!(sess.token, sess.session_id);

    let validated = sm.validate(&sess.token).expect("fresh token validates");
    assert_eq!(validated.username, "lifecycle_user");
    assert!(!validated.permissions.is_global());

    assert!(sm.logout(&sess.token));
    assert!(sm.validate(&sess.token).is_none());
    // Second logout is a no-op, the token is tombstoned
    assert!(!sm.logout(&sess.token));
}

#[tokio::test]
async fn expired_sessions_stop_validating() {
    let sm = SessionManager { ttl: Duration::from_secs(0) };
    let sess = sm.issue(principal("expiry_user", "2"));
    assert!(sm.validate(&sess.token).is_none());
}

#[tokio::test]
async fn revoking_a_user_kills_every_session() {
    let sm = SessionManager::default();
    let a = sm.issue(principal("revoked_user", "0"));
    let b = sm.issue(principal("revoked_user", "0"));
    let other = sm.issue(principal("untouched_user", "3"));

    assert_eq!(sm.revoke_user("revoked_user"), 2);
    assert!(sm.validate(&a.token).is_none());
    assert!(sm.validate(&b.token).is_none());
    assert!(sm.validate(&other.token).is_some());
}

#[tokio::test]
async fn session_permissions_drive_navigation() {
    let sm = SessionManager::default();
    let sess = sm.issue(principal("nav_user", "1,3"));
    let validated = sm.validate(&sess.token).expect("validates");

    let entries = nav::visible_entries(&validated.permissions, "/deportiendas");
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["nav-inicio", "nav-estadio", "nav-deportiendas"]);

    let global = sm.issue(principal("nav_admin", "0"));
    let validated = sm.validate(&global.token).expect("validates");
    assert_eq!(nav::visible_entries(&validated.permissions, "/").len(), 5);
}
