use serde_json::json;

use crate::core::Core;
use crate::ipc::error::ok;
use crate::ipc::helpers::{core_of, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::sync::SyncOutcome;

/// Runs one push+pull cycle and hands the re-read store back in full, the
/// reload step that makes the local store the new source of truth for the
/// presentation layer.
async fn run_sync(core: &Core) -> Result<serde_json::Value, HandlerErr> {
    let report = match core.sync.sync_all().await {
        SyncOutcome::Busy => return Err(HandlerErr::sync_busy()),
        SyncOutcome::Report(report) => report,
    };

    let schools = core.store.schools().await.map_err(HandlerErr::db_query)?;
    let classes = core
        .store
        .classes(None)
        .await
        .map_err(HandlerErr::db_query)?;
    let students = core
        .store
        .students(None)
        .await
        .map_err(HandlerErr::db_query)?;
    let attendance = core
        .store
        .attendance(None, None)
        .await
        .map_err(HandlerErr::db_query)?;

    Ok(json!({
        "success": report.success,
        "message": report.message,
        "schools": schools,
        "classes": classes,
        "students": students,
        "attendance": attendance,
    }))
}

async fn sync_status(core: &Core) -> Result<serde_json::Value, HandlerErr> {
    let pending = core
        .sync
        .pending_count()
        .await
        .map_err(HandlerErr::db_query)?;
    Ok(json!({
        "pending": pending,
        "lastSync": core.sync.last_sync_at(),
    }))
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "sync.run" => match core_of(state) {
            Ok(core) => run_sync(core).await,
            Err(e) => Err(e),
        },
        "sync.status" => match core_of(state) {
            Ok(core) => sync_status(core).await,
            Err(e) => Err(e),
        },
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
