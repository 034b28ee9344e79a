use std::path::PathBuf;

use serde_json::json;

use crate::config::Config;
use crate::core::Core;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{core_of, opt_bool, require_bool};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "initialized": state.core.is_some(),
        }),
    )
}

/// Builds the session: store (workspace file when a path is given, in-memory
/// otherwise), remote client, connectivity monitor, sync engine, recorder.
/// The became-online wiring starts here and lives for the session.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let mut config = Config::from_env();
    if let Some(url) = req.params.get("apiBaseUrl").and_then(|v| v.as_str()) {
        config.api_base_url = url.to_string();
    }
    // Offline until the platform reports otherwise; the first
    // `connectivity.set { online: true }` triggers the reconnect sync.
    let online = opt_bool(&req.params, "online").unwrap_or(false);

    let store = match &path {
        Some(p) => Store::open(p),
        None => Store::in_memory(),
    };
    let store = match store {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    match Core::start(store, &config, online) {
        Ok(core) => {
            state.workspace = path.clone();
            // Replacing the previous core tears down its reconnect task.
            state.core = Some(core);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.map(|p| p.to_string_lossy().to_string()),
                    "apiBaseUrl": config.api_base_url,
                    "online": online,
                }),
            )
        }
        Err(e) => err(&req.id, "core_start_failed", format!("{e:?}"), None),
    }
}

fn handle_connectivity_get(state: &AppState, req: &Request) -> serde_json::Value {
    match core_of(state) {
        Ok(core) => ok(&req.id, json!({ "online": core.connectivity.is_online() })),
        Err(e) => e.response(&req.id),
    }
}

fn handle_connectivity_set(state: &AppState, req: &Request) -> serde_json::Value {
    let core = match core_of(state) {
        Ok(core) => core,
        Err(e) => return e.response(&req.id),
    };
    let online = match require_bool(&req.params, "online") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    core.connectivity.set_online(online);
    ok(&req.id, json!({ "online": online }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "connectivity.get" => Some(handle_connectivity_get(state, req)),
        "connectivity.set" => Some(handle_connectivity_set(state, req)),
        _ => None,
    }
}
