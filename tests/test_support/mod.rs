#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json};
use axum::Router;
use serde_json::{json, Value};

use rollbookd::config::Config;
use rollbookd::model::{AttendanceRecord, Class, School, Student};
use rollbookd::store::Store;
use rollbookd::Core;

static COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let p = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), n));
    let _ = std::fs::remove_dir_all(&p);
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[derive(Clone, Default)]
struct StubState {
    hits: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
    responses: Arc<Mutex<HashMap<String, (u16, Value)>>>,
    stalls: Arc<Mutex<HashMap<String, u64>>>,
}

/// Catch-all HTTP stub standing in for the school server. Records every
/// request as `"METHOD /path"`, answers canned responses where configured and
/// otherwise replies `200` with an empty list (GET) or `{"ok": true}` (POST).
pub struct StubApi {
    pub base_url: String,
    state: StubState,
}

impl StubApi {
    pub async fn spawn() -> StubApi {
        let state = StubState::default();
        let app = Router::new()
            .fallback(handle_any)
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub api");
        let addr = listener.local_addr().expect("stub api addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub api");
        });
        StubApi {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Canned response for one `"METHOD /path"` key.
    pub fn respond(&self, key: &str, status: u16, body: Value) {
        self.state
            .responses
            .lock()
            .expect("responses lock")
            .insert(key.to_string(), (status, body));
    }

    /// Delay the response for one key, to hold a request in flight.
    pub fn stall(&self, key: &str, millis: u64) {
        self.state
            .stalls
            .lock()
            .expect("stalls lock")
            .insert(key.to_string(), millis);
    }

    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().expect("hits lock").clone()
    }

    pub fn hit_count(&self, key: &str) -> usize {
        self.hits().iter().filter(|h| h.as_str() == key).count()
    }

    /// Request bodies recorded for one key, in arrival order.
    pub fn bodies_for(&self, key: &str) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .expect("bodies lock")
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

async fn handle_any(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let key = format!("{} {}", method, uri.path());
    state.hits.lock().expect("hits lock").push(key.clone());
    if let Ok(v) = serde_json::from_slice::<Value>(&body) {
        state
            .bodies
            .lock()
            .expect("bodies lock")
            .push((key.clone(), v));
    }

    let stall = state
        .stalls
        .lock()
        .expect("stalls lock")
        .get(&key)
        .copied();
    if let Some(millis) = stall {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    let preset = state
        .responses
        .lock()
        .expect("responses lock")
        .get(&key)
        .cloned();
    match preset {
        Some((status, body)) => (
            StatusCode::from_u16(status).expect("stub status"),
            Json(body),
        ),
        None => {
            let body = if method == Method::GET {
                json!([])
            } else {
                json!({ "ok": true })
            };
            (StatusCode::OK, Json(body))
        }
    }
}

/// In-memory core wired against the given stub base URL.
pub fn core_with(base_url: &str, online: bool) -> Core {
    let config = Config {
        api_base_url: base_url.to_string(),
        ..Config::default()
    };
    Core::start(Store::in_memory().expect("open store"), &config, online).expect("start core")
}

pub fn school(name: &str) -> School {
    School {
        id: None,
        name: name.to_string(),
        address: "Rua 1".to_string(),
        synced: false,
        created_at: None,
        updated_at: None,
        last_sync: None,
    }
}

pub fn class(name: &str, school_id: Option<i64>) -> Class {
    Class {
        id: None,
        name: name.to_string(),
        school_id,
        synced: false,
        created_at: None,
        updated_at: None,
        last_sync: None,
    }
}

pub fn student(name: &str, class_id: Option<i64>) -> Student {
    Student {
        id: None,
        name: name.to_string(),
        class_id,
        attendance: Vec::new(),
        synced: false,
        created_at: None,
        updated_at: None,
        last_sync: None,
    }
}

pub fn record(student_id: i64, date: &str, present: bool) -> AttendanceRecord {
    AttendanceRecord {
        id: None,
        student_id,
        date: date.to_string(),
        present,
        observation: None,
        synced: false,
        created_at: None,
        updated_at: None,
        last_sync: None,
    }
}

pub async fn seed_student(core: &Core, name: &str) -> i64 {
    core.store
        .save_student(&student(name, None))
        .await
        .expect("seed student")
}
