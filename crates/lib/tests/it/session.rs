use std::sync::Arc;
use std::sync::atomic::Ordering;

use sarsync::{
    Clock, FileStorage, FixedClock, Platform, RecordingNavigator, Role, SessionConfig,
    SessionRecord, SessionStore, SessionUpdate, Storage, constants::SESSION_DURATION_MS,
    constants::SESSION_KEY,
};

use crate::helpers::{failing_session_fixture, session_fixture};

fn parent(clock: &FixedClock) -> SessionRecord {
    SessionRecord::new("u1", "efua@sar.edu.gh", "Efua Mensah", Role::Parent, clock.now())
}

#[test]
fn saved_session_reads_back_with_fresh_expiry() {
    let fx = session_fixture();
    assert!(fx.store.save_session(parent(&fx.clock)).is_applied());

    let record = fx.store.get_session().expect("session should be present");
    assert_eq!(record.id, "u1");
    assert_eq!(record.role, Role::Parent);
    assert_eq!(
        record.session_expiry,
        Some(fx.clock.now_millis() + SESSION_DURATION_MS)
    );
}

#[test]
fn past_expiry_clears_slot_and_invalidates() {
    let fx = session_fixture();
    fx.store.save_session(parent(&fx.clock));
    fx.clock.advance(SESSION_DURATION_MS + 1000);

    assert!(fx.store.get_session().is_none());
    assert_eq!(fx.storage.get_item(SESSION_KEY).unwrap(), None);
    assert!(!fx.store.is_session_valid());
}

#[test]
fn record_without_expiry_is_returned_unchanged() {
    let fx = session_fixture();
    let mut record = parent(&fx.clock);
    record.session_expiry = None;
    fx.storage
        .set_item(SESSION_KEY, &serde_json::to_string(&record).unwrap())
        .unwrap();

    fx.clock.advance(10 * SESSION_DURATION_MS);
    assert_eq!(fx.store.get_session(), Some(record));
}

#[test]
fn update_restamps_from_update_instant_and_keeps_other_fields() {
    let fx = session_fixture();
    fx.store.save_session(parent(&fx.clock));
    let before = fx.store.get_session().unwrap();

    fx.clock.advance(3_600_000);
    let outcome = fx
        .store
        .update_session(SessionUpdate::new().name("Efua A. Mensah"));
    assert!(outcome.is_applied());

    let after = fx.store.get_session().unwrap();
    let now = fx.clock.now();
    assert_eq!(after.name, "Efua A. Mensah");
    assert_eq!(after.last_login, now);
    assert_eq!(
        after.session_expiry,
        Some(now.timestamp_millis() + SESSION_DURATION_MS)
    );
    assert_eq!(after.id, before.id);
    assert_eq!(after.email, before.email);
    assert_eq!(after.role, before.role);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn update_without_session_is_a_no_op() {
    let fx = session_fixture();
    assert!(
        fx.store
            .update_session(SessionUpdate::new().email("x@sar.edu.gh"))
            .is_skipped()
    );
    assert!(fx.storage.is_empty());
}

#[test]
fn require_auth_and_logout_navigate() {
    let fx = session_fixture();
    assert!(fx.store.require_auth(Some("/auth/login?next=/grades")).is_none());
    assert_eq!(
        fx.navigator.last_redirect().as_deref(),
        Some("/auth/login?next=/grades")
    );

    fx.store.login(parent(&fx.clock));
    assert!(fx.store.require_auth(None).is_some());
    assert_eq!(fx.navigator.redirects().len(), 1);

    fx.store.logout(None);
    assert_eq!(fx.navigator.last_redirect().as_deref(), Some("/"));
    assert!(fx.store.get_session().is_none());
}

#[test]
fn file_storage_session_survives_new_store() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::default());
    let open = || {
        let storage = FileStorage::open(dir.path()).unwrap();
        SessionStore::new(
            Platform::headless()
                .with_storage(Arc::new(storage))
                .with_navigator(Arc::new(RecordingNavigator::new())),
            clock.clone(),
            SessionConfig::default(),
        )
    };

    let first = open();
    first.login(SessionRecord::new(
        "t7",
        "kofi@sar.edu.gh",
        "Kofi Boateng",
        Role::Teacher,
        clock.now(),
    ));

    let second = open();
    let record = second.get_session().expect("session persisted on disk");
    assert_eq!(record.id, "t7");
    assert_eq!(record.role, Role::Teacher);
}

#[test]
fn unreadable_storage_reads_as_no_session() {
    let (store, storage, clock) = failing_session_fixture();
    assert!(store.save_session(parent(&clock)).is_applied());

    storage.fail_get.store(true, Ordering::SeqCst);
    assert!(store.get_session().is_none());
    assert!(!store.is_session_valid());
    assert!(store.require_auth(None).is_none());

    storage.fail_get.store(false, Ordering::SeqCst);
    assert_eq!(store.get_session().map(|r| r.id), Some("u1".to_string()));
}

#[test]
fn rejected_writes_report_failure() {
    let (store, storage, clock) = failing_session_fixture();
    assert!(store.save_session(parent(&clock)).is_applied());

    storage.fail_set.store(true, Ordering::SeqCst);
    let saved = store.save_session(parent(&clock));
    assert!(saved.is_failed());
    assert!(saved.message().is_some());
    assert!(
        store
            .update_session(SessionUpdate::new().name("Efua A. Mensah"))
            .is_failed()
    );
    assert_eq!(store.get_session().unwrap().name, "Efua Mensah");
}

#[test]
fn failed_eviction_still_reads_as_no_session() {
    let (store, storage, clock) = failing_session_fixture();
    store.save_session(parent(&clock));
    clock.advance(SESSION_DURATION_MS + 1);

    storage.fail_remove.store(true, Ordering::SeqCst);
    assert!(store.get_session().is_none());
    assert!(!store.is_session_valid());
    assert!(store.clear_session().is_failed());
    assert!(storage.inner.get_item(SESSION_KEY).unwrap().is_some());
}
