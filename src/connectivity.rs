use tokio::sync::{broadcast, watch};

/// Edge-triggered connectivity change. Consumers see transitions, never a
/// heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Online,
    Offline,
}

/// Owns the online/offline level and publishes transitions. The platform
/// feed (NetInfo equivalent) arrives through `set_online`; the monitor holds
/// no sync logic. The composition root subscribes once and reacts to
/// `Online` transitions.
pub struct ConnectivityMonitor {
    level: watch::Sender<bool>,
    events: broadcast::Sender<Transition>,
}

impl ConnectivityMonitor {
    pub fn new(initial_online: bool) -> Self {
        let (level, _) = watch::channel(initial_online);
        let (events, _) = broadcast::channel(16);
        Self { level, events }
    }

    pub fn is_online(&self) -> bool {
        *self.level.borrow()
    }

    /// Record the platform-reported state. Publishes an event only on an
    /// actual change of level.
    pub fn set_online(&self, online: bool) {
        let changed = self.level.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
        if changed {
            let transition = if online {
                Transition::Online
            } else {
                Transition::Offline
            };
            // Send only fails with no live receivers, which is fine.
            let _ = self.events.send(transition);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.events.subscribe()
    }

    pub fn watch_level(&self) -> watch::Receiver<bool> {
        self.level.subscribe()
    }
}
