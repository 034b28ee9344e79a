use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::model::{now_iso, AttendanceRecord, Class, EntityKind, School, Student};
use crate::remote::RemoteClient;
use crate::store::Store;

/// Result of one completed sync attempt. Partial failure (some entity types
/// synced, some not) reports `success = false` with the per-type errors
/// folded into `message`; the caller keeps working on local data either way.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
}

/// `Busy` is returned immediately when a sync is already in flight; the
/// overlapping call performs no work and issues no requests.
#[derive(Debug)]
pub enum SyncOutcome {
    Report(SyncReport),
    Busy,
}

/// Push-then-pull orchestrator. One instance per session, shared between the
/// reconnect task and the IPC surface; the flag below is the single-flight
/// guard. A started attempt is not cancellable.
pub struct SyncEngine {
    store: Arc<Store>,
    remote: Arc<RemoteClient>,
    in_flight: AtomicBool,
    last_sync: Mutex<Option<String>>,
}

// Clears the in-flight flag on every exit path, early returns and panics
// included.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    pub fn new(store: Arc<Store>, remote: Arc<RemoteClient>) -> Self {
        Self {
            store,
            remote,
            in_flight: AtomicBool::new(false),
            last_sync: Mutex::new(None),
        }
    }

    /// Timestamp of the last fully successful attempt.
    pub fn last_sync_at(&self) -> Option<String> {
        self.last_sync.lock().expect("last_sync lock poisoned").clone()
    }

    /// One full push+pull cycle over all four entity types, parents first.
    /// A failing type is logged and skipped, never aborting the rest; the
    /// pull phase is authoritative for every row the server returns.
    pub async fn sync_all(&self) -> SyncOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in flight, returning busy");
            return SyncOutcome::Busy;
        }
        let _guard = FlightGuard(&self.in_flight);

        info!("sync started");
        let mut failures: Vec<String> = Vec::new();

        for kind in EntityKind::SYNC_ORDER {
            if let Err(e) = self.push(kind).await {
                warn!(collection = kind.collection(), error = %e, "push failed");
                failures.push(format!("push {}: {}", kind.collection(), e));
            }
        }
        for kind in EntityKind::SYNC_ORDER {
            if let Err(e) = self.pull(kind).await {
                warn!(collection = kind.collection(), error = %e, "pull failed, local rows kept");
                failures.push(format!("pull {}: {}", kind.collection(), e));
            }
        }

        let report = if failures.is_empty() {
            let now = now_iso();
            *self.last_sync.lock().expect("last_sync lock poisoned") = Some(now);
            info!("sync completed");
            SyncReport {
                success: true,
                message: "sync completed".to_string(),
            }
        } else {
            SyncReport {
                success: false,
                message: format!("sync finished with errors: {}", failures.join("; ")),
            }
        };
        SyncOutcome::Report(report)
    }

    pub async fn pending_count(&self) -> Result<i64, crate::error::StoreError> {
        self.store.pending_attendance_count().await
    }

    // Full local table for the three parent types, pending subset for
    // attendance. A type is marked synced only after its push succeeded.
    async fn push(&self, kind: EntityKind) -> anyhow::Result<()> {
        let path = kind.sync_path();
        let stamp = now_iso();
        match kind {
            EntityKind::School => {
                let rows = self.store.schools().await?;
                self.remote
                    .post_json_ok(&path, &json!({ "escolas": rows }))
                    .await?;
                self.store.mark_schools_synced(&stamp).await?;
            }
            EntityKind::Class => {
                let rows = self.store.classes(None).await?;
                self.remote
                    .post_json_ok(&path, &json!({ "turmas": rows }))
                    .await?;
                self.store.mark_classes_synced(&stamp).await?;
            }
            EntityKind::Student => {
                let rows = self.store.students(None).await?;
                self.remote
                    .post_json_ok(&path, &json!({ "alunos": rows }))
                    .await?;
                self.store.mark_students_synced(&stamp).await?;
            }
            EntityKind::Attendance => {
                let rows = self.store.pending_attendance().await?;
                self.remote
                    .post_json_ok(&path, &json!({ "presencas": rows }))
                    .await?;
                let ids: Vec<i64> = rows.iter().filter_map(|r| r.id).collect();
                self.store.mark_attendance_ids_synced(&ids, &stamp).await?;
            }
        }
        Ok(())
    }

    // Last-pull-wins: every row the server returns overwrites the local copy
    // and is stamped synced. Rows the server does not know (absent from the
    // pulled set) are untouched and stay pending.
    async fn pull(&self, kind: EntityKind) -> anyhow::Result<()> {
        let path = kind.list_path();
        let stamp = now_iso();
        match kind {
            EntityKind::School => {
                let mut rows: Vec<School> = self.remote.get_json(&path).await?;
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                self.store.save_schools(&rows).await?;
            }
            EntityKind::Class => {
                let mut rows: Vec<Class> = self.remote.get_json(&path).await?;
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                self.store.save_classes(&rows).await?;
            }
            EntityKind::Student => {
                let mut rows: Vec<Student> = self.remote.get_json(&path).await?;
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                    // The embedded attendance list is a server-side join; the
                    // attendance pull below is what updates local rows.
                    row.attendance.clear();
                }
                self.store.save_students(&rows).await?;
            }
            EntityKind::Attendance => {
                let mut rows: Vec<AttendanceRecord> = self.remote.get_json(&path).await?;
                for row in &mut rows {
                    row.synced = true;
                    row.last_sync = Some(stamp.clone());
                }
                self.store.save_attendance_bulk(&rows).await?;
            }
        }
        Ok(())
    }
}
