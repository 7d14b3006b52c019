//! Snapshot persistence round-trips.

use std::sync::Arc;

use nightfall_content::ContentBundle;
use nightfall_core::{PlayerId, TargetId};
use nightfall_runtime::{GameSession, SessionStore};

fn bundle() -> Arc<ContentBundle> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Arc::new(ContentBundle::load().expect("embedded content must load"))
}

fn played_session(content: &Arc<ContentBundle>) -> GameSession {
    let mut session = GameSession::new(content.clone(), 200);
    session
        .add_player(PlayerId(1), "Warrior", "Dwarf", 3, 100)
        .unwrap();
    session
        .add_player(PlayerId(2), "Shadowblade", "Elf", 2, 100)
        .unwrap();

    session
        .submit_action(PlayerId(1), "slash", Some(TargetId::Monster))
        .unwrap();
    session
        .submit_action(PlayerId(2), "poison_blade", Some(TargetId::Player(PlayerId(1))))
        .unwrap();
    session.resolve_round();
    session
}

#[test]
fn snapshot_round_trips_through_the_store() {
    let content = bundle();
    let session = played_session(&content);
    let snapshot = session.snapshot();

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    store.save(&snapshot).unwrap();

    let loaded = store.load(snapshot.round).unwrap().unwrap();
    assert_eq!(loaded, snapshot);

    let restored = GameSession::restore(content.clone(), loaded);
    assert_eq!(restored.round(), session.round());
    assert_eq!(restored.monster(), session.monster());
}

#[test]
fn restored_session_keeps_playing_identically() {
    let content = bundle();
    let mut original = played_session(&content);
    let mut restored = GameSession::restore(content.clone(), original.snapshot());

    for session in [&mut original, &mut restored] {
        session
            .submit_action(PlayerId(1), "slash", Some(TargetId::Monster))
            .unwrap();
    }
    let log_a = original.resolve_round();
    let log_b = restored.resolve_round();

    assert_eq!(log_a, log_b);
    assert_eq!(original.snapshot(), restored.snapshot());
}

#[test]
fn load_latest_returns_the_newest_round() {
    let content = bundle();
    let mut session = played_session(&content);

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    store.save(&session.snapshot()).unwrap();

    session
        .submit_action(PlayerId(1), "slash", Some(TargetId::Monster))
        .unwrap();
    session.resolve_round();
    store.save(&session.snapshot()).unwrap();

    let latest = store.load_latest().unwrap().unwrap();
    assert_eq!(latest.round, session.round());
    assert_eq!(store.list_rounds().unwrap().len(), 2);
}

#[test]
fn missing_round_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    assert!(store.load(42).unwrap().is_none());
    assert!(store.load_latest().unwrap().is_none());
}
