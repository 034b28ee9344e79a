mod test_support;

use serde_json::{json, Value};

use rollbookd::ipc::{self, AppState, Request};
use test_support::{class, core_with, school, StubApi};

async fn call(state: &mut AppState, method: &str, params: Value) -> Value {
    ipc::handle_request(
        state,
        Request {
            id: "t".to_string(),
            method: method.to_string(),
            params,
        },
    )
    .await
}

#[tokio::test]
async fn offline_lists_serve_cached_rows_without_network() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);
    let school_id = core
        .store
        .save_school(&school("Escola A"))
        .await
        .expect("seed school");
    core.store
        .save_school(&school("Escola B"))
        .await
        .expect("seed school");
    core.store
        .save_class(&class("Turma 1", Some(school_id)))
        .await
        .expect("seed class");

    let mut state = AppState {
        workspace: None,
        core: Some(core),
    };

    let resp = call(&mut state, "schools.list", json!({})).await;
    assert_eq!(resp.get("ok"), Some(&json!(true)));
    let schools = resp
        .pointer("/result/schools")
        .and_then(|v| v.as_array())
        .expect("schools array");
    assert_eq!(schools.len(), 2);

    let resp = call(&mut state, "classes.list", json!({ "schoolId": school_id })).await;
    let classes = resp
        .pointer("/result/classes")
        .and_then(|v| v.as_array())
        .expect("classes array");
    assert_eq!(classes.len(), 1);

    assert!(api.hits().is_empty(), "offline reads must not hit the api");
}

#[tokio::test]
async fn online_list_falls_back_to_cache_when_the_fetch_fails() {
    let api = StubApi::spawn().await;
    api.respond("GET /api/escolas", 500, json!({ "message": "boom" }));

    let core = core_with(&api.base_url, true);
    core.store
        .save_school(&school("Escola A"))
        .await
        .expect("seed school");
    let mut state = AppState {
        workspace: None,
        core: Some(core),
    };

    let resp = call(&mut state, "schools.list", json!({})).await;
    assert_eq!(resp.get("ok"), Some(&json!(true)));
    let schools = resp
        .pointer("/result/schools")
        .and_then(|v| v.as_array())
        .expect("schools array");
    assert_eq!(schools.len(), 1);
    assert_eq!(api.hit_count("GET /api/escolas"), 1);
}

#[tokio::test]
async fn online_list_refreshes_the_cache_first() {
    let api = StubApi::spawn().await;
    api.respond(
        "GET /api/escolas",
        200,
        json!([{ "id": 5, "name": "Escola Nova", "address": "Rua 9" }]),
    );

    let core = core_with(&api.base_url, true);
    let mut state = AppState {
        workspace: None,
        core: Some(core),
    };

    let resp = call(&mut state, "schools.list", json!({})).await;
    let schools = resp
        .pointer("/result/schools")
        .and_then(|v| v.as_array())
        .expect("schools array");
    assert_eq!(schools.len(), 1);
    assert_eq!(schools[0].get("id"), Some(&json!(5)));
    assert_eq!(schools[0].get("synced"), Some(&json!(true)));
}
