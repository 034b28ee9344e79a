use serde_json::json;
use tracing::warn;

use crate::core::Core;
use crate::ipc::error::ok;
use crate::ipc::helpers::{core_of, opt_i64, require_i64, require_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{now_iso, Class};

async fn list_classes(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let school_id = opt_i64(params, "schoolId");
    if core.connectivity.is_online() {
        let path = match school_id {
            Some(sid) => format!("/api/escolas/{}/turmas", sid),
            None => "/api/turmas".to_string(),
        };
        match core.remote.get_json::<Vec<Class>>(&path).await {
            Ok(mut rows) => {
                let stamp = now_iso();
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                core.store
                    .save_classes(&rows)
                    .await
                    .map_err(HandlerErr::db_update)?;
            }
            Err(e) => warn!(error = %e, "class fetch failed, serving local rows"),
        }
    }
    let rows = core
        .store
        .classes(school_id)
        .await
        .map_err(HandlerErr::db_query)?;
    Ok(json!({ "classes": rows }))
}

async fn create_class(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = require_str(params, "name")?;
    let school_id = opt_i64(params, "schoolId");
    if let Some(sid) = school_id {
        if core
            .store
            .school(sid)
            .await
            .map_err(HandlerErr::db_query)?
            .is_none()
        {
            return Err(HandlerErr::not_found("school"));
        }
    }
    let now = now_iso();
    let class = Class {
        id: None,
        name,
        school_id,
        synced: false,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        last_sync: None,
    };
    let id = core
        .store
        .save_class(&class)
        .await
        .map_err(HandlerErr::db_update)?;
    let row = core.store.class(id).await.map_err(HandlerErr::db_query)?;
    Ok(json!({ "class": row }))
}

async fn delete_class(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = require_i64(params, "id")?;
    if core
        .store
        .class(id)
        .await
        .map_err(HandlerErr::db_query)?
        .is_none()
    {
        return Err(HandlerErr::not_found("class"));
    }
    core.store
        .delete_class(id)
        .await
        .map_err(HandlerErr::db_update)?;
    Ok(json!({ "ok": true }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => match core_of(state) {
            Ok(core) => list_classes(core, &req.params).await,
            Err(e) => Err(e),
        },
        "classes.create" => match core_of(state) {
            Ok(core) => create_class(core, &req.params).await,
            Err(e) => Err(e),
        },
        "classes.delete" => match core_of(state) {
            Ok(core) => delete_class(core, &req.params).await,
            Err(e) => Err(e),
        },
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
