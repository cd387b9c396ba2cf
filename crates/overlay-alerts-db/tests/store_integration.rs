//! Integration tests for the alert store against a real temp-file database.

use overlay_alerts_core::timestamps::now_micros;
use overlay_alerts_core::{Alert, AlertPayload, MessagePosition, OverlaySettings};
use overlay_alerts_db::sqlmodel_core::Value;
use overlay_alerts_db::{AlertStore, DbConn, DbError};

fn temp_store() -> (tempfile::TempDir, AlertStore, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("alerts.db").to_string_lossy().into_owned();
    let store = AlertStore::open(&path).expect("open store");
    (dir, store, path)
}

fn alert(overlay_id: &str, id: &str, created_at: i64) -> Alert {
    Alert {
        id: id.to_string(),
        overlay_id: overlay_id.to_string(),
        created_at,
        payload: AlertPayload {
            amount: Some("3.00".into()),
            currency: Some("USD".into()),
            from_name: Some("Jo".into()),
            ..AlertPayload::default()
        },
        acknowledged: false,
    }
}

#[test]
fn unacknowledged_fetch_orders_oldest_first_with_id_tiebreak() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");

    store.insert_alert(&alert(&overlay, "b", 20)).expect("insert");
    store.insert_alert(&alert(&overlay, "c", 10)).expect("insert");
    store.insert_alert(&alert(&overlay, "a", 10)).expect("insert");

    let fetched = store.fetch_unacknowledged(&overlay).expect("fetch");
    let ids: Vec<&str> = fetched.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a", "c", "b"]);
}

#[test]
fn acknowledged_alerts_are_never_fetched_again() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");
    store.insert_alert(&alert(&overlay, "a", 1)).expect("insert");
    store.insert_alert(&alert(&overlay, "b", 2)).expect("insert");

    store.acknowledge("a").expect("ack");

    let unacked = store.fetch_unacknowledged(&overlay).expect("fetch");
    assert_eq!(unacked.len(), 1);
    assert_eq!(unacked[0].id, "b");

    // The history fetch still sees everything, newest first.
    let all = store.fetch_all(&overlay, None).expect("fetch all");
    let ids: Vec<&str> = all.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert!(all[1].acknowledged);
}

#[test]
fn acknowledge_is_idempotent_and_fails_on_unknown_ids() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");
    store.insert_alert(&alert(&overlay, "a", 1)).expect("insert");

    store.acknowledge("a").expect("first ack");
    store.acknowledge("a").expect("repeat ack is a no-op success");

    let err = store.acknowledge("missing").expect_err("unknown id");
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[test]
fn fetch_all_honors_since_timestamp() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");
    store.insert_alert(&alert(&overlay, "old", 100)).expect("insert");
    store.insert_alert(&alert(&overlay, "new", 200)).expect("insert");

    let recent = store.fetch_all(&overlay, Some(150)).expect("fetch since");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, "new");
}

#[test]
fn fetches_are_scoped_to_one_overlay() {
    let (_dir, store, _path) = temp_store();
    let first = store.create_overlay(Some("o1")).expect("create o1");
    let second = store.create_overlay(Some("o2")).expect("create o2");
    store.insert_alert(&alert(&first, "a", 1)).expect("insert");
    store.insert_alert(&alert(&second, "b", 2)).expect("insert");

    let fetched = store.fetch_unacknowledged(&first).expect("fetch");
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, "a");
}

#[test]
fn duplicate_inserts_and_overlays_are_rejected() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");
    store.insert_alert(&alert(&overlay, "a", 1)).expect("insert");

    let err = store
        .insert_alert(&alert(&overlay, "a", 1))
        .expect_err("duplicate alert id");
    assert!(matches!(err, DbError::Duplicate { .. }));

    let err = store.create_overlay(Some("o1")).expect_err("duplicate overlay");
    assert!(matches!(err, DbError::Duplicate { .. }));
}

#[test]
fn new_overlays_carry_default_settings() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(None).expect("create overlay");
    assert!(!overlay.is_empty());

    let snapshot = store.get_settings(&overlay).expect("settings");
    assert_eq!(snapshot.settings, OverlaySettings::default());
    assert!(snapshot.updated_at > 0);
}

#[test]
fn settings_update_replaces_the_whole_document_and_bumps_revision() {
    let (_dir, store, _path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");
    let before = store.get_settings(&overlay).expect("settings");

    let replacement = OverlaySettings {
        message_duration_secs: 12.0,
        position: MessagePosition::BottomRight,
        ..OverlaySettings::default()
    };
    store
        .update_settings(&overlay, &replacement)
        .expect("update settings");

    let after = store.get_settings(&overlay).expect("settings");
    assert_eq!(after.settings, replacement);
    assert!(after.updated_at > before.updated_at);

    let err = store
        .update_settings("missing", &replacement)
        .expect_err("unknown overlay");
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[test]
fn malformed_payload_rows_fetch_with_defaults() {
    let (_dir, store, path) = temp_store();
    let overlay = store.create_overlay(Some("o1")).expect("create overlay");

    // Simulate a broken webhook row written by another producer.
    let conn = DbConn::open_file(&path).expect("open raw connection");
    conn.execute_sync(
        "INSERT INTO alerts (id, overlay_id, created_at, payload, acknowledged) \
         VALUES (?, ?, ?, ?, 0)",
        &[
            Value::Text("broken".into()),
            Value::Text(overlay.clone()),
            Value::BigInt(now_micros()),
            Value::Text("{definitely not json".into()),
        ],
    )
    .expect("raw insert");
    drop(conn);

    let fetched = store.fetch_unacknowledged(&overlay).expect("fetch");
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, "broken");
    // Best-effort defaults instead of a rejected row.
    assert_eq!(fetched[0].payload, AlertPayload::default());
}
