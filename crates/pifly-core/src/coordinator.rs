// ── Poll coordinator ──
//
// Lifecycle management for a single PiFire device: initial fetch,
// adaptive background polling, listener fan-out, entity discovery, and
// command pass-through. One coordinator per device; no global state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use pifly_api::{PiFireClient, TransportConfig};
use strum::Display;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, route_command};
use crate::config::DeviceConfig;
use crate::convert::normalize;
use crate::discovery::{DiscoveredKeySet, DiscoveryKey};
use crate::error::CoreError;
use crate::model::{Mode, Status};
use crate::stream::{PollSnapshot, StatusStream};

// ── Public types ─────────────────────────────────────────────────

/// Which of the two polling cadences is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PollInterval {
    Fast,
    Slow,
}

impl PollInterval {
    /// Fast while a cook is active, slow otherwise.
    pub fn for_mode(mode: Mode) -> Self {
        if mode.is_active_cook() {
            Self::Fast
        } else {
            Self::Slow
        }
    }
}

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Delivered to listeners, in order, on the poll path.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A cycle produced a fresh snapshot.
    Updated(Arc<Status>),
    /// A cycle failed; the previous snapshot is still current.
    Failed(CoreError),
    /// A sensor-worthy key appeared for the first time.
    Discovered(DiscoveryKey),
}

/// Token returned by [`Coordinator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Listener = Arc<dyn Fn(&PollEvent) + Send + Sync>;

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the device client and the single source of truth for its status.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Create with
/// [`new()`](Self::new), register listeners, then
/// [`connect()`](Self::connect) to run the first poll and start the
/// background loop.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: DeviceConfig,
    client: PiFireClient,
    connection_state: watch::Sender<ConnectionState>,
    /// Last good status plus the error from the latest cycle, replaced
    /// wholesale on every cycle.
    snapshot: watch::Sender<Arc<PollSnapshot>>,
    interval: watch::Sender<PollInterval>,
    /// Serializes poll cycles; there is never more than one fetch in flight.
    cycle_lock: Mutex<()>,
    /// Bumped when a cycle begins, used to collapse refresh requests.
    cycles_started: AtomicU64,
    /// Wakes the poll loop so it restarts its wait.
    reschedule: Notify,
    discovered: std::sync::Mutex<DiscoveredKeySet>,
    listeners: std::sync::Mutex<Vec<(ListenerHandle, Listener)>>,
    next_listener_id: AtomicU64,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("url", &self.inner.config.url.as_str())
            .field("state", &*self.inner.connection_state.borrow())
            .field("interval", &*self.inner.interval.borrow())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Build a coordinator for `config`. Does NOT contact the device;
    /// call [`connect()`](Self::connect) for that.
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = PiFireClient::new(config.url.as_str(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build a coordinator around an existing client.
    pub fn with_client(config: DeviceConfig, client: PiFireClient) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (snapshot, _) = watch::channel(Arc::new(PollSnapshot::default()));
        let (interval, _) = watch::channel(PollInterval::Slow);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                connection_state,
                snapshot,
                interval,
                cycle_lock: Mutex::new(()),
                cycles_started: AtomicU64::new(0),
                reschedule: Notify::new(),
                discovered: std::sync::Mutex::new(DiscoveredKeySet::new()),
                listeners: std::sync::Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    /// The underlying device client, for ad-hoc reads.
    pub fn client(&self) -> &PiFireClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first poll cycle, then start background polling.
    ///
    /// A failure here is returned as-is and no background task is
    /// started. Calling it again while connected does nothing.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::NotConnected);
        }
        // Held until the task is registered so racing callers see it.
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("already connected; not starting a second poll task");
            return Ok(());
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let first = {
            let _cycle = self.inner.cycle_lock.lock().await;
            self.run_cycle().await
        };
        if let Err(e) = first {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Failed);
            return Err(e);
        }

        handles.push(tokio::spawn(poll_task(
            self.clone(),
            self.inner.cancel.child_token(),
        )));
        drop(handles);

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(
            url = %self.inner.config.url,
            interval = %self.poll_interval(),
            "connected to PiFire device"
        );
        Ok(())
    }

    /// Connect, run `f`, then shut down.
    ///
    /// Suited to single CLI invocations that need one fresh snapshot.
    pub async fn oneshot<F, Fut, T>(config: DeviceConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let coordinator = Coordinator::new(config)?;
        coordinator.connect().await?;
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }

    /// Stop background polling and release listeners.
    ///
    /// A pending wait is interrupted; a fetch already in flight is allowed
    /// to finish (bounded by the request timeout). Idempotent.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        info!(url = %self.inner.config.url, "coordinator shut down");
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.connection_state.borrow()
    }

    fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
            && self.connection_state() == ConnectionState::Connected
    }

    // ── Listeners ────────────────────────────────────────────────

    /// Register a callback for poll events.
    ///
    /// Callbacks run inline on the poll path, in registration order, and
    /// must not block.
    pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&PollEvent) + Send + Sync + 'static,
    {
        let handle = ListenerHandle(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((handle, Arc::new(listener)));
        handle
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        listeners.len() != before
    }

    // ── State observation ────────────────────────────────────────

    /// Most recent successful status, if any.
    pub fn current_status(&self) -> Option<Arc<Status>> {
        self.inner.snapshot.borrow().status.clone()
    }

    /// Error from the most recent cycle, cleared by the next success.
    pub fn last_error(&self) -> Option<CoreError> {
        self.inner.snapshot.borrow().error.clone()
    }

    pub fn poll_interval(&self) -> PollInterval {
        *self.inner.interval.borrow()
    }

    /// The wait the poll loop uses for the current interval.
    pub fn poll_interval_duration(&self) -> Duration {
        match self.poll_interval() {
            PollInterval::Fast => self.inner.config.fast_interval,
            PollInterval::Slow => self.inner.config.slow_interval,
        }
    }

    /// Every key discovered so far, in discovery order.
    pub fn discovered_keys(&self) -> Vec<DiscoveryKey> {
        self.inner
            .discovered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Subscribe to snapshot changes.
    pub fn status_stream(&self) -> StatusStream {
        StatusStream::new(self.inner.snapshot.subscribe())
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Poll now instead of waiting for the schedule.
    ///
    /// Concurrent requests collapse: a caller that had to wait behind a
    /// cycle which started after its request returns without polling
    /// again. Check [`last_error()`](Self::last_error) for the outcome.
    pub async fn request_refresh(&self) {
        if self.inner.cancel.is_cancelled() {
            debug!("refresh requested after shutdown; ignoring");
            return;
        }
        self.refresh_collapsed().await;
        self.inner.reschedule.notify_one();
    }

    async fn refresh_collapsed(&self) {
        let requested_at = self.inner.cycles_started.load(Ordering::Acquire);
        let _cycle = self.inner.cycle_lock.lock().await;
        if self.inner.cycles_started.load(Ordering::Acquire) > requested_at {
            debug!("refresh satisfied by a concurrent cycle");
            return;
        }
        // Failures are recorded in the snapshot and already logged.
        let _ = self.run_cycle().await;
    }

    /// One fetch → normalize → store → notify pass. Caller holds the
    /// cycle lock.
    async fn run_cycle(&self) -> Result<Arc<Status>, CoreError> {
        self.inner.cycles_started.fetch_add(1, Ordering::AcqRel);

        // One request at a time; the hopper is only asked once the main
        // status has come back.
        let client = &self.inner.client;
        let payload = match client.fetch_status().await {
            Ok(payload) => payload,
            Err(e) => {
                let err = CoreError::from(e);
                self.apply_failure(&err);
                return Err(err);
            }
        };
        let hopper = client.fetch_hopper().await;

        let status = Arc::new(normalize(&payload, hopper.as_ref()));
        self.apply_success(&status);
        Ok(status)
    }

    fn apply_success(&self, status: &Arc<Status>) {
        self.inner.snapshot.send_replace(Arc::new(PollSnapshot {
            status: Some(Arc::clone(status)),
            error: None,
        }));

        let next = PollInterval::for_mode(status.mode);
        let changed = self.inner.interval.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
        if changed {
            debug!(mode = %status.mode, interval = %next, "poll interval changed");
        }

        let discovered = self
            .inner
            .discovered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scan(status);
        for key in &discovered {
            debug!(%key, "discovered entity");
        }

        self.notify(&PollEvent::Updated(Arc::clone(status)));
        for key in discovered {
            self.notify(&PollEvent::Discovered(key));
        }
    }

    fn apply_failure(&self, err: &CoreError) {
        warn!(error = %err, "poll cycle failed");
        self.inner.snapshot.send_modify(|snap| {
            *snap = Arc::new(PollSnapshot {
                status: snap.status.clone(),
                error: Some(err.clone()),
            });
        });
        self.notify(&PollEvent::Failed(err.clone()));
    }

    fn notify(&self, event: &PollEvent) {
        // Snapshot the list so listeners may (un)subscribe from a callback.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Send a command to the device. Errors propagate; nothing is retried.
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if !self.is_running() {
            return Err(CoreError::NotConnected);
        }
        route_command(&self.inner.client, cmd).await
    }

    /// [`execute()`](Self::execute), then refresh so the change shows up
    /// without waiting for the next scheduled poll.
    pub async fn execute_and_refresh(&self, cmd: Command) -> Result<(), CoreError> {
        self.execute(cmd).await?;
        self.request_refresh().await;
        Ok(())
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task(coordinator: Coordinator, cancel: CancellationToken) {
    loop {
        let wait = coordinator.poll_interval_duration();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = coordinator.inner.reschedule.notified() => {}
            () = tokio::time::sleep(wait) => coordinator.refresh_collapsed().await,
        }
    }
    debug!("poll task stopped");
}
