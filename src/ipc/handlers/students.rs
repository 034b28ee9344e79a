use serde_json::json;
use tracing::warn;

use crate::core::Core;
use crate::ipc::error::ok;
use crate::ipc::helpers::{core_of, opt_i64, require_i64, require_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{now_iso, Student};

async fn list_students(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = opt_i64(params, "classId");
    if core.connectivity.is_online() {
        let path = match class_id {
            Some(cid) => format!("/api/turmas/{}/alunos", cid),
            None => "/api/alunos".to_string(),
        };
        match core.remote.get_json::<Vec<Student>>(&path).await {
            Ok(mut rows) => {
                let stamp = now_iso();
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                    // Server-side join; the local projection is rebuilt from
                    // the attendance table on read.
                    row.attendance.clear();
                }
                core.store
                    .save_students(&rows)
                    .await
                    .map_err(HandlerErr::db_update)?;
            }
            Err(e) => warn!(error = %e, "student fetch failed, serving local rows"),
        }
    }
    let rows = core
        .store
        .students(class_id)
        .await
        .map_err(HandlerErr::db_query)?;
    Ok(json!({ "students": rows }))
}

async fn create_student(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = require_str(params, "name")?;
    let class_id = opt_i64(params, "classId");
    if let Some(cid) = class_id {
        if core
            .store
            .class(cid)
            .await
            .map_err(HandlerErr::db_query)?
            .is_none()
        {
            return Err(HandlerErr::not_found("class"));
        }
    }
    let now = now_iso();
    let student = Student {
        id: None,
        name,
        class_id,
        attendance: Vec::new(),
        synced: false,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        last_sync: None,
    };
    let id = core
        .store
        .save_student(&student)
        .await
        .map_err(HandlerErr::db_update)?;
    let row = core.store.student(id).await.map_err(HandlerErr::db_query)?;
    Ok(json!({ "student": row }))
}

async fn delete_student(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = require_i64(params, "id")?;
    if core
        .store
        .student(id)
        .await
        .map_err(HandlerErr::db_query)?
        .is_none()
    {
        return Err(HandlerErr::not_found("student"));
    }
    // Takes the student's attendance history with it.
    core.store
        .delete_student(id)
        .await
        .map_err(HandlerErr::db_update)?;
    Ok(json!({ "ok": true }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => match core_of(state) {
            Ok(core) => list_students(core, &req.params).await,
            Err(e) => Err(e),
        },
        "students.create" => match core_of(state) {
            Ok(core) => create_student(core, &req.params).await,
            Err(e) => Err(e),
        },
        "students.delete" => match core_of(state) {
            Ok(core) => delete_student(core, &req.params).await,
            Err(e) => Err(e),
        },
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
