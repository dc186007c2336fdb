//! Periodic polling of every configured instance.
//!
//! A [`Poller`] turns snapshots from a [`HealthSource`] into
//! [`InstanceView`]s and history ticks. [`Poller::run`] drives it from a
//! timer and a command channel until cancelled, publishing
//! [`PollerEvent`]s for a front end to draw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::client::{ClientError, HealthSource};
use super::history::HistoryStore;
use super::types::{InstanceView, Toast};
use super::view::{render_snapshot, render_unconfigured, render_unreachable};
use crate::api::{InstanceSummary, VpnAction};
use crate::config::InstanceId;

/// Delay between an accepted action and the re-poll showing its effect.
pub const ACTION_REPOLL_DELAY: Duration = Duration::from_secs(2);

/// Instance list used until the server answers `GET /api/instances`.
pub fn default_instances() -> Vec<InstanceSummary> {
    InstanceId::ALL
        .into_iter()
        .map(|id| InstanceSummary {
            id,
            name: id.default_name(),
            configured: id == InstanceId::One,
        })
        .collect()
}

/// Result of one poll over all instances.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub views: Vec<InstanceView>,
    pub toasts: Vec<Toast>,
    pub history: HistoryStore,
    pub completed_at: DateTime<Utc>,
}

/// Result of one start/stop request.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub accepted: bool,
    pub toasts: Vec<Toast>,
}

/// Instructions for a running [`Poller::run`] loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerCommand {
    Refresh,
    Action(InstanceId, VpnAction),
    /// New auto-refresh interval; zero disables the timer
    SetInterval(Duration),
}

/// Output of a running [`Poller::run`] loop.
#[derive(Debug, Clone)]
pub enum PollerEvent {
    Report(PollReport),
    Toast(Toast),
}

/// Clears the in-flight flag when a poll ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Poller<S: HealthSource + ?Sized> {
    source: Arc<S>,
    instances: RwLock<Vec<InstanceSummary>>,
    history: Mutex<HistoryStore>,
    in_flight: AtomicBool,
}

impl<S: HealthSource + ?Sized> Poller<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_history(source, HistoryStore::new())
    }

    /// Create a poller continuing a previously saved history.
    pub fn with_history(source: Arc<S>, history: HistoryStore) -> Self {
        Self {
            source,
            instances: RwLock::new(default_instances()),
            history: Mutex::new(history),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Refresh names and configured flags from the server.
    ///
    /// Failure keeps the current list and returns `false`.
    pub async fn load_instances(&self) -> bool {
        match self.source.instances().await {
            Ok(list) => {
                let mut instances = self.instances.write().await;
                for summary in list {
                    if let Some(known) = instances.iter_mut().find(|i| i.id == summary.id) {
                        *known = summary;
                    }
                }
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Could not load instance list, keeping defaults");
                false
            }
        }
    }

    pub async fn instances(&self) -> Vec<InstanceSummary> {
        self.instances.read().await.clone()
    }

    pub async fn history(&self) -> HistoryStore {
        self.history.lock().await.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Poll every instance once.
    ///
    /// Returns `None` without doing anything when another poll is still
    /// running.
    pub async fn poll(&self) -> Option<PollReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Poll already in flight, skipping");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let instances = self.instances().await;
        let results = join_all(instances.iter().map(|summary| self.poll_instance(summary))).await;

        let mut views = Vec::with_capacity(results.len());
        let mut toasts = Vec::new();
        for (view, toast) in results {
            views.push(view);
            toasts.extend(toast);
        }

        Some(PollReport {
            views,
            toasts,
            history: self.history().await,
            completed_at: Utc::now(),
        })
    }

    async fn poll_instance(&self, summary: &InstanceSummary) -> (InstanceView, Option<Toast>) {
        if !summary.configured {
            return (render_unconfigured(summary), None);
        }

        let (view, toast) = match self.source.health(summary.id).await {
            Ok(snapshot) => (render_snapshot(summary, &snapshot), None),
            Err(e) if e.is_not_configured() => return (render_unconfigured(summary), None),
            Err(e) => {
                tracing::warn!(instance = %summary.id, error = %e, "Health poll failed");
                (
                    render_unreachable(summary),
                    Some(Toast::error(format!(
                        "Instance {}: Failed to reach server: {}",
                        summary.id, e
                    ))),
                )
            }
        };

        if let Some(state) = view.coarse_state() {
            self.history.lock().await.push(summary.id, state);
        }
        (view, toast)
    }

    /// Send a start/stop request for one instance.
    pub async fn action(&self, id: InstanceId, action: VpnAction) -> ActionOutcome {
        let configured = self
            .instances
            .read()
            .await
            .iter()
            .any(|i| i.id == id && i.configured);
        if !configured {
            return ActionOutcome {
                accepted: false,
                toasts: vec![Toast::error(format!("Instance {} is not configured", id))],
            };
        }

        let label = match action {
            VpnAction::Start => "Starting",
            VpnAction::Stop => "Stopping",
        };
        let mut toasts = vec![Toast::info(format!("{} VPN (instance {})…", label, id))];

        let accepted = match self.source.vpn_action(id, action).await {
            Ok(_) => {
                toasts.push(Toast::success(format!(
                    "VPN {} command sent (instance {})",
                    action.as_str(),
                    id
                )));
                true
            }
            Err(ClientError::Http { message, .. }) => {
                toasts.push(Toast::error(format!("Error: {}", message)));
                false
            }
            Err(e) => {
                toasts.push(Toast::error(format!("Request failed: {}", e)));
                false
            }
        };

        ActionOutcome { accepted, toasts }
    }

    /// Drive the poller until `cancel` fires or `events` is closed.
    ///
    /// Polls once immediately, then every `interval` (never when zero).
    /// An accepted action brings the next poll forward to
    /// [`ACTION_REPOLL_DELAY`] from now.
    pub async fn run(
        self: Arc<Self>,
        mut interval: Duration,
        mut commands: mpsc::Receiver<PollerCommand>,
        events: mpsc::Sender<PollerEvent>,
        cancel: CancellationToken,
    ) {
        let next_after = |interval: Duration| -> Option<Instant> {
            (!interval.is_zero()).then(|| Instant::now() + interval)
        };

        self.load_instances().await;
        let mut deadline = Some(Instant::now());
        let mut commands_open = true;

        loop {
            let timer = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            let mut to_send = Vec::new();
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Poller shutting down");
                    break;
                }
                _ = timer => {
                    if let Some(report) = self.poll().await {
                        to_send.push(PollerEvent::Report(report));
                    }
                    deadline = next_after(interval);
                }
                command = commands.recv(), if commands_open => match command {
                    None => commands_open = false,
                    Some(PollerCommand::Refresh) => {
                        if let Some(report) = self.poll().await {
                            to_send.push(PollerEvent::Report(report));
                        }
                        deadline = next_after(interval);
                    }
                    Some(PollerCommand::SetInterval(new_interval)) => {
                        tracing::debug!(
                            interval_ms = new_interval.as_millis() as u64,
                            "Refresh interval changed"
                        );
                        interval = new_interval;
                        deadline = next_after(interval);
                    }
                    Some(PollerCommand::Action(id, action)) => {
                        let outcome = self.action(id, action).await;
                        to_send.extend(outcome.toasts.into_iter().map(PollerEvent::Toast));
                        if outcome.accepted {
                            let repoll = Instant::now() + ACTION_REPOLL_DELAY;
                            deadline = Some(deadline.map_or(repoll, |at| at.min(repoll)));
                        }
                    }
                },
            }

            for event in to_send {
                if events.send(event).await.is_err() {
                    tracing::debug!("Poller event receiver dropped");
                    return;
                }
            }
        }
    }
}
