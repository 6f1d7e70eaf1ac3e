// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Online/offline tracking.
//!
//! The current state lives in a `watch` channel. It is flipped by a
//! background TCP probe and by manual toggles; the flow reads it only when
//! a submission is made.

use std::sync::Arc;
use std::time::Duration;

use qadesk_config::model::ConnectivityConfig;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Shared handle to the online flag.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Records a new state. Returns whether it changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "connectivity changed");
        }
        changed
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Starts the reachability probe unless it is disabled.
    pub fn spawn_probe(
        &self,
        config: &ConnectivityConfig,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if !config.probe_enabled {
            debug!("connectivity probe disabled");
            return None;
        }
        let probe = Probe {
            host: config.probe_host.clone(),
            port: config.probe_port,
            interval: Duration::from_secs(config.probe_interval_secs),
            timeout: Duration::from_millis(config.probe_timeout_ms),
        };
        let monitor = self.clone();
        Some(tokio::spawn(async move {
            probe.run(monitor, cancel).await;
        }))
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

struct Probe {
    host: String,
    port: u16,
    interval: Duration,
    timeout: Duration,
}

impl Probe {
    async fn run(self, monitor: ConnectivityMonitor, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!(host = %self.host, port = self.port, "connectivity probe started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("connectivity probe stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let reachable = self.check().await;
                    monitor.set_online(reachable);
                }
            }
        }
    }

    async fn check(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "probe connection failed");
                false
            }
            Err(_) => {
                debug!("probe connection timed out");
                false
            }
        }
    }
}
