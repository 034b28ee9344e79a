mod test_support;

use serde_json::json;

use test_support::{core_with, seed_student, StubApi};

#[tokio::test]
async fn online_record_pushes_and_adopts_the_server_id() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, true);
    let sid = seed_student(&core, "Ana").await;

    api.respond(
        "POST /api/presencas",
        200,
        json!({ "id": 42, "AlunoId": sid, "date": "2026-03-02", "present": true }),
    );

    let rec = core
        .recorder
        .record(sid, "2026-03-02", true, None)
        .await
        .expect("record");
    assert_eq!(rec.id, Some(42));
    assert!(rec.synced);
    assert!(rec.last_sync.is_some());
    assert_eq!(core.sync.pending_count().await.expect("pending"), 0);

    // The push body carries no id; the server assigns one.
    let bodies = api.bodies_for("POST /api/presencas");
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("id").is_none());
    assert_eq!(bodies[0].get("AlunoId").and_then(|v| v.as_i64()), Some(sid));
}

#[tokio::test]
async fn rejected_push_leaves_the_record_pending() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, true);
    let sid = seed_student(&core, "Bruno").await;

    api.respond("POST /api/presencas", 500, json!({ "message": "boom" }));

    let rec = core
        .recorder
        .record(sid, "2026-03-02", false, None)
        .await
        .expect("record still succeeds locally");
    assert!(!rec.synced);
    assert!(rec.last_sync.is_none());
    assert_eq!(core.sync.pending_count().await.expect("pending"), 1);
}

#[tokio::test]
async fn echo_without_an_id_still_marks_the_row_synced() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, true);
    let sid = seed_student(&core, "Clara").await;

    // Stub default POST reply is {"ok": true} with no id.
    let rec = core
        .recorder
        .record(sid, "2026-03-02", true, None)
        .await
        .expect("record");
    assert!(rec.synced);
    assert!(rec.id.is_some(), "local rowid is kept");
}
