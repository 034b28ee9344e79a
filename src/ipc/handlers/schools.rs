use serde_json::json;
use tracing::warn;

use crate::core::Core;
use crate::ipc::error::ok;
use crate::ipc::helpers::{core_of, require_i64, require_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{now_iso, School};

/// Remote first when online, always answering from the local store; a failed
/// fetch degrades to cached rows with a warning, never an error.
async fn list_schools(core: &Core) -> Result<serde_json::Value, HandlerErr> {
    if core.connectivity.is_online() {
        match core.remote.get_json::<Vec<School>>("/api/escolas").await {
            Ok(mut rows) => {
                let stamp = now_iso();
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                core.store
                    .save_schools(&rows)
                    .await
                    .map_err(HandlerErr::db_update)?;
            }
            Err(e) => warn!(error = %e, "school fetch failed, serving local rows"),
        }
    }
    let rows = core.store.schools().await.map_err(HandlerErr::db_query)?;
    Ok(json!({ "schools": rows }))
}

async fn create_school(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = require_str(params, "name")?;
    let address = require_str(params, "address")?;
    let now = now_iso();
    let school = School {
        id: None,
        name,
        address,
        synced: false,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        last_sync: None,
    };
    let id = core
        .store
        .save_school(&school)
        .await
        .map_err(HandlerErr::db_update)?;
    let row = core.store.school(id).await.map_err(HandlerErr::db_query)?;
    Ok(json!({ "school": row }))
}

async fn delete_school(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = require_i64(params, "id")?;
    if core
        .store
        .school(id)
        .await
        .map_err(HandlerErr::db_query)?
        .is_none()
    {
        return Err(HandlerErr::not_found("school"));
    }
    // Classes survive as orphans; only the school row goes away.
    core.store
        .delete_school(id)
        .await
        .map_err(HandlerErr::db_update)?;
    Ok(json!({ "ok": true }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "schools.list" => match core_of(state) {
            Ok(core) => list_schools(core).await,
            Err(e) => Err(e),
        },
        "schools.create" => match core_of(state) {
            Ok(core) => create_school(core, &req.params).await,
            Err(e) => Err(e),
        },
        "schools.delete" => match core_of(state) {
            Ok(core) => delete_school(core, &req.params).await,
            Err(e) => Err(e),
        },
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
