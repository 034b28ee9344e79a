use serde_json::json;
use tracing::warn;

use crate::core::Core;
use crate::error::StoreError;
use crate::ipc::error::ok;
use crate::ipc::helpers::{core_of, opt_i64, opt_str, require_bool, require_i64, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{now_iso, parse_day, today, AttendanceRecord};

async fn list_attendance(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = opt_i64(params, "studentId");
    let date = match opt_str(params, "date") {
        Some(raw) => Some(
            parse_day(raw).ok_or_else(|| HandlerErr::bad_params("date must be YYYY-MM-DD"))?,
        ),
        None => None,
    };

    if core.connectivity.is_online() {
        let path = match (student_id, date.as_deref()) {
            (Some(sid), Some(day)) => format!("/api/alunos/{}/presencas?date={}", sid, day),
            (Some(sid), None) => format!("/api/alunos/{}/presencas", sid),
            _ => "/api/presencas".to_string(),
        };
        match core.remote.get_json::<Vec<AttendanceRecord>>(&path).await {
            Ok(mut rows) => {
                let stamp = now_iso();
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                core.store
                    .save_attendance_bulk(&rows)
                    .await
                    .map_err(HandlerErr::db_update)?;
            }
            Err(e) => warn!(error = %e, "attendance fetch failed, serving local rows"),
        }
    }

    let rows = core
        .store
        .attendance(student_id, date.as_deref())
        .await
        .map_err(HandlerErr::db_query)?;
    Ok(json!({ "attendance": rows }))
}

async fn record_attendance(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = require_i64(params, "studentId")?;
    let present = require_bool(params, "present")?;
    let date = opt_str(params, "date").map(str::to_string).unwrap_or_else(today);
    let observation = opt_str(params, "observation");

    if core
        .store
        .student(student_id)
        .await
        .map_err(HandlerErr::db_query)?
        .is_none()
    {
        return Err(HandlerErr::not_found("student"));
    }

    let record = core
        .recorder
        .record(student_id, &date, present, observation)
        .await
        .map_err(|e| match e {
            StoreError::InvalidDate(d) => {
                HandlerErr::bad_params(format!("invalid date {:?}, expected YYYY-MM-DD", d))
            }
            other => HandlerErr::db_update(other),
        })?;
    Ok(json!({ "record": record }))
}

async fn delete_attendance(
    core: &Core,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = require_i64(params, "id")?;
    core.store
        .delete_attendance(id)
        .await
        .map_err(HandlerErr::db_update)?;
    Ok(json!({ "ok": true }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.list" => match core_of(state) {
            Ok(core) => list_attendance(core, &req.params).await,
            Err(e) => Err(e),
        },
        "attendance.record" => match core_of(state) {
            Ok(core) => record_attendance(core, &req.params).await,
            Err(e) => Err(e),
        },
        "attendance.delete" => match core_of(state) {
            Ok(core) => delete_attendance(core, &req.params).await,
            Err(e) => Err(e),
        },
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
