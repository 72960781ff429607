//! Background execution of one run at a time.
//!
//! The coordinator owns the single in-flight run. [`ExecutionCoordinator::start`]
//! spawns the assembly on a tokio runtime and keeps the receiving half of a
//! oneshot channel; the render loop calls [`ExecutionCoordinator::poll`] each
//! frame, which never blocks. The background task only ever sends one
//! complete outcome, so a partially assembled row is never observable.
//!
//! A discarded run keeps going until its submissions finish. Runs hold a
//! per-device lock for their whole lifetime, so a new run on the same device
//! waits for the discarded one before it submits anything.
//!
//! ```text
//!   Idle ──start──→ Running ──ok──→ ResultReady ──consume──→ Idle
//!                      │
//!                      └──err──→ Failed ──start──→ Running
//! ```

use std::sync::Arc;
use std::time::Duration;

use qcoin_hal::{BackendConfig, BackendRegistry};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::assembler::{DEFAULT_CALL_PAUSE, ResultAssembler};
use crate::error::FlipResult;
use crate::outcome::CoinOutcome;
use crate::profile::DeviceProfile;

/// Lifecycle of the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RunStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// The background task is assembling a result.
    Running,
    /// A result is waiting to be consumed.
    ResultReady,
    /// The last run failed; see [`ExecutionCoordinator::error_message`].
    Failed,
}

impl RunStatus {
    /// Whether a run occupies the coordinator: from start until its result
    /// has been consumed.
    pub fn is_in_flight(self) -> bool {
        matches!(self, RunStatus::Running | RunStatus::ResultReady)
    }
}

type RunOutcome = FlipResult<CoinOutcome>;

/// Runs [`ResultAssembler::assemble`] off the render thread.
pub struct ExecutionCoordinator {
    runtime: Handle,
    registry: Arc<BackendRegistry>,
    backend_config: BackendConfig,
    call_pause: Duration,
    status: RunStatus,
    result: Option<CoinOutcome>,
    error_message: Option<String>,
    unreported_failure: bool,
    pending: Option<oneshot::Receiver<RunOutcome>>,
    device_locks: FxHashMap<&'static str, Arc<Mutex<()>>>,
    runs: u64,
}

impl ExecutionCoordinator {
    /// Create a coordinator that spawns runs on `runtime` and builds backends
    /// from `registry`.
    pub fn new(
        runtime: Handle,
        registry: Arc<BackendRegistry>,
        backend_config: BackendConfig,
    ) -> Self {
        Self {
            runtime,
            registry,
            backend_config,
            call_pause: DEFAULT_CALL_PAUSE,
            status: RunStatus::Idle,
            result: None,
            error_message: None,
            unreported_failure: false,
            pending: None,
            device_locks: FxHashMap::default(),
            runs: 0,
        }
    }

    /// Override the pause between hardware submissions.
    pub fn with_call_pause(mut self, pause: Duration) -> Self {
        self.call_pause = pause;
        self
    }

    /// Start a run for `profile`.
    ///
    /// Returns `Ok(false)` without doing anything while a run is in flight.
    /// An invalid profile is rejected before anything is spawned.
    pub fn start(&mut self, profile: &DeviceProfile) -> FlipResult<bool> {
        if self.status.is_in_flight() {
            debug!("Ignoring start while {:?}", self.status);
            return Ok(false);
        }
        profile.validate()?;

        self.runs += 1;
        let run = self.runs;
        let profile = *profile;
        let registry = Arc::clone(&self.registry);
        let config = self.backend_config.for_backend(profile.backend_id);
        let call_pause = self.call_pause;
        let device_lock = Arc::clone(self.device_locks.entry(profile.backend_id).or_default());
        let (tx, rx) = oneshot::channel();

        self.runtime.spawn(async move {
            let _device = match Arc::clone(&device_lock).try_lock_owned() {
                Ok(guard) => guard,
                Err(_) => {
                    debug!(run, device = profile.backend_id, "Waiting for previous run on device");
                    device_lock.lock_owned().await
                }
            };

            let outcome = async {
                let backend = registry.create(profile.backend_id, config)?;
                ResultAssembler::new(backend)
                    .with_call_pause(call_pause)
                    .assemble(&profile)
                    .await
            }
            .await;

            if tx.send(outcome).is_err() {
                debug!(run, "Run finished after its result was discarded");
            }
        });

        info!(run, device = %profile.selector, coins = profile.total_bits, "Run started");
        self.status = RunStatus::Running;
        self.result = None;
        self.error_message = None;
        self.unreported_failure = false;
        self.pending = Some(rx);
        Ok(true)
    }

    /// Check for a finished run without blocking.
    pub fn poll(&mut self) -> RunStatus {
        if self.status != RunStatus::Running {
            return self.status;
        }
        let Some(rx) = self.pending.as_mut() else {
            return self.status;
        };

        match rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Ok(Ok(outcome)) => {
                info!(run = self.runs, "Run finished: {}", outcome.statistics());
                self.pending = None;
                self.result = Some(outcome);
                self.status = RunStatus::ResultReady;
            }
            Ok(Err(err)) => {
                warn!(run = self.runs, "Run failed: {err}");
                self.pending = None;
                self.error_message = Some(err.to_string());
                self.unreported_failure = true;
                self.status = RunStatus::Failed;
            }
            Err(TryRecvError::Closed) => {
                warn!(run = self.runs, "Run ended without a result");
                self.pending = None;
                self.error_message = Some("execution task ended without a result".into());
                self.unreported_failure = true;
                self.status = RunStatus::Failed;
            }
        }
        self.status
    }

    /// Take the ready result and return to `Idle`.
    ///
    /// Returns `None` unless the status is `ResultReady`.
    pub fn consume(&mut self) -> Option<CoinOutcome> {
        if self.status != RunStatus::ResultReady {
            return None;
        }
        self.status = RunStatus::Idle;
        self.result.take()
    }

    /// Drop interest in the current run. A running task still completes;
    /// its result is ignored on arrival, and it keeps its device busy until
    /// then.
    pub fn discard(&mut self) {
        if self.pending.take().is_some() {
            debug!(run = self.runs, "Discarding in-flight run");
        }
        self.status = RunStatus::Idle;
        self.result = None;
        self.error_message = None;
        self.unreported_failure = false;
    }

    /// Current status, as of the last poll.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Whether a run occupies the coordinator.
    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    /// Message of the last failure, while `Failed`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The failure message, the first time it is asked for after a run
    /// fails. Later calls return `None` until another run fails.
    pub fn take_failure(&mut self) -> Option<&str> {
        if !std::mem::take(&mut self.unreported_failure) {
            return None;
        }
        self.error_message.as_deref()
    }
}

impl std::fmt::Debug for ExecutionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionCoordinator")
            .field("status", &self.status)
            .field("runs", &self.runs)
            .field("call_pause", &self.call_pause)
            .finish_non_exhaustive()
    }
}
