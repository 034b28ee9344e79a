mod test_support;

use std::time::Duration;

use test_support::{core_with, school, StubApi};

async fn settle() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn coming_online_runs_one_sync_cycle() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);
    core.store
        .save_school(&school("Escola A"))
        .await
        .expect("seed school");

    core.connectivity.set_online(true);
    settle().await;

    assert_eq!(api.hit_count("POST /api/escolas/sync"), 1);
    assert_eq!(api.hit_count("GET /api/presencas"), 1);
    let schools = core.store.schools().await.expect("schools");
    assert!(schools[0].synced);
}

#[tokio::test]
async fn repeated_online_reports_do_not_restart_sync() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);

    core.connectivity.set_online(true);
    settle().await;
    // Same level again: no transition, no extra cycle.
    core.connectivity.set_online(true);
    settle().await;
    assert_eq!(api.hit_count("POST /api/escolas/sync"), 1);

    // A real offline/online round trip does trigger another one.
    core.connectivity.set_online(false);
    core.connectivity.set_online(true);
    settle().await;
    assert_eq!(api.hit_count("POST /api/escolas/sync"), 2);
}

#[tokio::test]
async fn going_offline_stays_quiet() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, true);

    core.connectivity.set_online(false);
    settle().await;
    assert!(api.hits().is_empty());
}
