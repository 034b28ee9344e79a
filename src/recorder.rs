use std::sync::Arc;

use tracing::{debug, warn};

use crate::connectivity::ConnectivityMonitor;
use crate::error::StoreError;
use crate::model::{now_iso, parse_day, AttendanceRecord};
use crate::remote::RemoteClient;
use crate::store::Store;

/// Local-first write path for marking a student present/absent. The store
/// write always happens; the network push is best-effort and its failure is
/// invisible to the caller. The row just stays pending for the next full
/// sync.
pub struct AttendanceRecorder {
    store: Arc<Store>,
    remote: Arc<RemoteClient>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl AttendanceRecorder {
    pub fn new(
        store: Arc<Store>,
        remote: Arc<RemoteClient>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            store,
            remote,
            connectivity,
        }
    }

    /// Upsert the `(student, date)` row, then try one immediate push when
    /// online. Returns the record as re-read from the store, which is the
    /// only source of truth handed back to callers.
    pub async fn record(
        &self,
        student_id: i64,
        date: &str,
        present: bool,
        observation: Option<&str>,
    ) -> Result<AttendanceRecord, StoreError> {
        let date = parse_day(date).ok_or_else(|| StoreError::InvalidDate(date.to_string()))?;
        let now = now_iso();
        let rec = AttendanceRecord {
            id: None,
            student_id,
            date: date.clone(),
            present,
            observation: observation.map(str::to_string),
            synced: false,
            created_at: Some(now.clone()),
            updated_at: Some(now),
            last_sync: None,
        };
        self.store.save_attendance(&rec).await?;

        if self.connectivity.is_online() {
            // Posted without an id: the server upserts by (student, date) and
            // echoes the id it assigned.
            match self
                .remote
                .post_json::<_, serde_json::Value>("/api/presencas", &rec)
                .await
            {
                Ok(echo) => {
                    let server_id = echo.get("id").and_then(|v| v.as_i64());
                    self.store
                        .mark_attendance_synced(student_id, &date, server_id, &now_iso())
                        .await?;
                    debug!(student_id, date = %date, "attendance pushed immediately");
                }
                Err(e) => {
                    warn!(
                        student_id,
                        date = %date,
                        error = %e,
                        "attendance push failed, record stays pending"
                    );
                }
            }
        }

        self.store
            .attendance_by_key(student_id, &date)
            .await?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
