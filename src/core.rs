use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::recorder::AttendanceRecorder;
use crate::remote::RemoteClient;
use crate::store::Store;
use crate::sync::{SyncEngine, SyncOutcome};

/// Composition root: owns the store, remote client, connectivity monitor,
/// sync engine and recorder for one session, and wires the became-online
/// transition to a sync attempt. Built once per `workspace.select`.
pub struct Core {
    pub store: Arc<Store>,
    pub remote: Arc<RemoteClient>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub sync: Arc<SyncEngine>,
    pub recorder: AttendanceRecorder,
    reconnect_task: JoinHandle<()>,
}

impl Core {
    pub fn start(store: Store, config: &Config, initial_online: bool) -> anyhow::Result<Self> {
        let store = Arc::new(store);
        let remote = Arc::new(RemoteClient::new(&config.api_base_url, config.http_timeout)?);
        let connectivity = Arc::new(ConnectivityMonitor::new(initial_online));
        let sync = Arc::new(SyncEngine::new(store.clone(), remote.clone()));
        let recorder =
            AttendanceRecorder::new(store.clone(), remote.clone(), connectivity.clone());
        let reconnect_task = spawn_reconnect_sync(connectivity.subscribe(), sync.clone());
        Ok(Self {
            store,
            remote,
            connectivity,
            sync,
            recorder,
            reconnect_task,
        })
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.reconnect_task.abort();
    }
}

// The one subscription to the monitor. Offline transitions are informational;
// coming back online triggers a sync attempt (the single-flight guard absorbs
// overlap with a manually triggered one).
fn spawn_reconnect_sync(
    mut events: broadcast::Receiver<Transition>,
    sync: Arc<SyncEngine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Transition::Online) => {
                    info!("connectivity restored, starting sync");
                    if let SyncOutcome::Report(report) = sync.sync_all().await {
                        if !report.success {
                            warn!(message = %report.message, "reconnect sync incomplete");
                        }
                    }
                }
                Ok(Transition::Offline) => {
                    info!("connectivity lost, operating on local data");
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
