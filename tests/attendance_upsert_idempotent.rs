mod test_support;

use test_support::{core_with, seed_student, StubApi};

#[tokio::test]
async fn recording_twice_keeps_one_row_and_its_id() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);
    let sid = seed_student(&core, "Ana").await;

    let first = core
        .recorder
        .record(sid, "2026-03-02", true, None)
        .await
        .expect("first record");
    let second = core
        .recorder
        .record(sid, "2026-03-02", true, Some("left early"))
        .await
        .expect("second record");
    assert_eq!(first.id, second.id);

    let rows = core.store.attendance(Some(sid), None).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].present);
    assert_eq!(rows[0].observation.as_deref(), Some("left early"));
}

#[tokio::test]
async fn offline_record_touches_no_network() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);
    let sid = seed_student(&core, "Bruno").await;

    let rec = core
        .recorder
        .record(sid, "2026-03-02", false, None)
        .await
        .expect("record offline");
    assert!(!rec.synced);
    assert_eq!(core.sync.pending_count().await.expect("pending"), 1);
    assert!(api.hits().is_empty());
}

#[tokio::test]
async fn record_rejects_malformed_date() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);
    let sid = seed_student(&core, "Clara").await;

    let err = core
        .recorder
        .record(sid, "02/03/2026", true, None)
        .await
        .expect_err("bad date must fail");
    assert!(err.to_string().contains("02/03/2026"));
    assert!(core
        .store
        .attendance(Some(sid), None)
        .await
        .expect("list")
        .is_empty());
}
