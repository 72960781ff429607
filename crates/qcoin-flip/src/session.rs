//! The coin-flip session.
//!
//! A [`CoinFlipSession`] ties the device profile, one [`CoinAnimator`] per
//! coin and the [`ExecutionCoordinator`] together. The render loop calls
//! [`CoinFlipSession::tick`] once per frame; commands from the user arrive
//! through [`trigger_flip`](CoinFlipSession::trigger_flip),
//! [`select_device`](CoinFlipSession::select_device) and
//! [`adjust_coins`](CoinFlipSession::adjust_coins).

use std::sync::Arc;
use std::time::Duration;

use qcoin_hal::{BackendConfig, BackendRegistry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::animator::{AnimatorState, CoinAnimator, RenderState};
use crate::assembler::DEFAULT_CALL_PAUSE;
use crate::coordinator::{ExecutionCoordinator, RunStatus};
use crate::error::{FlipError, FlipResult};
use crate::outcome::{CoinOutcome, Face, Statistics};
use crate::profile::{DEFAULT_SIMULATION_COINS, DeviceProfile, DeviceSelector};

/// Status line shown while a run is in flight.
pub const EXECUTING_MESSAGE: &str = "Executing quantum circuit...";

/// Builder for [`CoinFlipSession`].
#[derive(Debug)]
pub struct SessionBuilder {
    registry: Arc<BackendRegistry>,
    device: DeviceSelector,
    coins: usize,
    backend_config: BackendConfig,
    seed: Option<u64>,
    call_pause: Duration,
}

impl SessionBuilder {
    /// Device selected at start-up.
    pub fn device(mut self, device: DeviceSelector) -> Self {
        self.device = device;
        self
    }

    /// Coin count used whenever the simulator is selected. Clamped.
    pub fn coins(mut self, coins: usize) -> Self {
        self.coins = coins;
        self
    }

    /// Host, user and token handed to backend factories.
    pub fn backend_config(mut self, config: BackendConfig) -> Self {
        self.backend_config = config;
        self
    }

    /// Seed the animators' settle timing.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pause between consecutive hardware submissions.
    pub fn call_pause(mut self, pause: Duration) -> Self {
        self.call_pause = pause;
        self
    }

    /// Build the session. Background runs are spawned on `runtime`.
    ///
    /// Fails if the start-up device cannot be selected.
    pub fn build(self, runtime: Handle) -> FlipResult<CoinFlipSession> {
        let simulation_coins = DeviceProfile::simulation(self.coins).total_bits;
        let profile = profile_for(self.device, simulation_coins);
        profile.validate()?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let coordinator = ExecutionCoordinator::new(runtime, self.registry, self.backend_config)
            .with_call_pause(self.call_pause);

        let mut session = CoinFlipSession {
            coordinator,
            profile,
            simulation_coins,
            animators: Vec::new(),
            rng,
            status_message: String::new(),
            last_outcome: None,
        };
        session.rebuild();
        Ok(session)
    }
}

/// One user's coin row and the run behind it.
#[derive(Debug)]
pub struct CoinFlipSession {
    coordinator: ExecutionCoordinator,
    profile: DeviceProfile,
    simulation_coins: usize,
    animators: Vec<CoinAnimator>,
    rng: StdRng,
    status_message: String,
    last_outcome: Option<CoinOutcome>,
}

impl CoinFlipSession {
    /// Start building a session that creates backends from `registry`.
    pub fn builder(registry: Arc<BackendRegistry>) -> SessionBuilder {
        SessionBuilder {
            registry,
            device: DeviceSelector::Simulation,
            coins: DEFAULT_SIMULATION_COINS,
            backend_config: BackendConfig::new("qcoin"),
            seed: None,
            call_pause: DEFAULT_CALL_PAUSE,
        }
    }

    /// Flip every coin and start a run.
    ///
    /// Returns `false` if a run is already in flight or coins from the last
    /// result are still landing; nothing changes then.
    pub fn trigger_flip(&mut self) -> bool {
        if self.coordinator.is_in_flight() {
            return false;
        }
        if self.is_landing() {
            debug!("Flip ignored until the coins have landed");
            return false;
        }

        for animator in &mut self.animators {
            animator.start_flip();
        }
        match self.coordinator.start(&self.profile) {
            Ok(started) => {
                if started {
                    self.status_message = EXECUTING_MESSAGE.to_string();
                }
                started
            }
            Err(err) => {
                warn!("Could not start run: {err}");
                for animator in &mut self.animators {
                    animator.reset();
                }
                self.status_message = err.to_string();
                false
            }
        }
    }

    /// Advance one render frame.
    ///
    /// Delivers a finished result to the animators (coin `i` gets bit `i`),
    /// surfaces a failure, then ticks every animator once.
    pub fn tick(&mut self) {
        match self.coordinator.poll() {
            RunStatus::ResultReady => {
                if let Some(outcome) = self.coordinator.consume() {
                    self.deliver(outcome);
                }
            }
            RunStatus::Failed => {
                if let Some(message) = self.coordinator.take_failure() {
                    self.status_message = format!("Quantum execution error: {message}");
                }
            }
            RunStatus::Idle | RunStatus::Running => {}
        }

        for animator in &mut self.animators {
            animator.tick();
        }
    }

    fn deliver(&mut self, outcome: CoinOutcome) {
        if outcome.len() != self.animators.len() {
            warn!(
                "Result has {} coins but {} are shown; ignoring it",
                outcome.len(),
                self.animators.len()
            );
            return;
        }
        for (animator, bit) in self.animators.iter_mut().zip(outcome.bits()) {
            animator.set_final_face(Face::from_bit(*bit));
        }
        self.status_message = format!("Results: {}", outcome.statistics());
        self.last_outcome = Some(outcome);
    }

    /// Switch device.
    ///
    /// Any in-flight run is discarded and the coin row is rebuilt. An
    /// unsupported device leaves everything as it was.
    pub fn select_device(&mut self, selector: DeviceSelector) -> FlipResult<()> {
        let profile = profile_for(selector, self.simulation_coins);
        if let Err(err) = profile.validate() {
            self.status_message = format!("Device {selector} is not supported");
            return Err(err);
        }

        info!(device = %selector, coins = profile.total_bits, "Switching device");
        self.coordinator.discard();
        self.profile = profile;
        self.rebuild();
        Ok(())
    }

    /// Change the simulator's coin count by `delta`, clamped to the allowed
    /// range. Returns the new count.
    pub fn adjust_coins(&mut self, delta: isize) -> FlipResult<usize> {
        if !self.profile.selector.is_adjustable() {
            self.status_message = "Coin count can only be changed in Simulation".to_string();
            return Err(FlipError::Configuration(format!(
                "coin count is fixed on {}",
                self.profile.selector
            )));
        }

        let profile = self.profile.adjusted(delta)?;
        if profile == self.profile {
            return Ok(profile.total_bits);
        }

        info!(coins = profile.total_bits, "Adjusting coin count");
        self.coordinator.discard();
        self.simulation_coins = profile.total_bits;
        self.profile = profile;
        self.rebuild();
        Ok(profile.total_bits)
    }

    fn rebuild(&mut self) {
        self.animators = (0..self.profile.total_bits)
            .map(|_| CoinAnimator::new(self.rng.r#gen()))
            .collect();
        self.last_outcome = None;
        self.status_message = format!(
            "Device ready: {} ({} coins)",
            self.profile.backend_id, self.profile.total_bits
        );
    }

    /// Run status, as of the last tick.
    pub fn status(&self) -> RunStatus {
        self.coordinator.status()
    }

    /// Human-readable status line.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Current device profile.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Number of coins in the row.
    pub fn total_bits(&self) -> usize {
        self.profile.total_bits
    }

    /// The coin animators, in coin order.
    pub fn animators(&self) -> &[CoinAnimator] {
        &self.animators
    }

    /// What to draw for each coin this frame.
    pub fn render_states(&self) -> Vec<RenderState> {
        self.animators.iter().map(CoinAnimator::render_state).collect()
    }

    /// The most recently delivered result.
    pub fn last_outcome(&self) -> Option<&CoinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Tally of the most recently delivered result.
    pub fn last_statistics(&self) -> Option<Statistics> {
        self.last_outcome.as_ref().map(CoinOutcome::statistics)
    }

    /// Whether any coin is still settling onto a delivered face.
    pub fn is_landing(&self) -> bool {
        self.animators
            .iter()
            .any(|a| a.state() == AnimatorState::Settling)
    }

    /// Whether every coin has landed.
    pub fn is_settled(&self) -> bool {
        self.animators.iter().all(CoinAnimator::is_done)
    }

    /// Message of the last failed run, if the last run failed.
    pub fn error_message(&self) -> Option<&str> {
        self.coordinator.error_message()
    }
}

fn profile_for(selector: DeviceSelector, simulation_coins: usize) -> DeviceProfile {
    match selector {
        DeviceSelector::Simulation => DeviceProfile::simulation(simulation_coins),
        other => DeviceProfile::for_selector(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(device: DeviceSelector) -> FlipResult<CoinFlipSession> {
        CoinFlipSession::builder(Arc::new(BackendRegistry::new()))
            .device(device)
            .seed(1)
            .build(Handle::current())
    }

    #[tokio::test]
    async fn test_initial_state() {
        let session = session(DeviceSelector::Simulation).unwrap();
        assert_eq!(session.total_bits(), DEFAULT_SIMULATION_COINS);
        assert_eq!(session.animators().len(), DEFAULT_SIMULATION_COINS);
        assert_eq!(session.status(), RunStatus::Idle);
        assert_eq!(session.status_message(), "Device ready: simulator (6 coins)");
        assert!(
            session
                .animators()
                .iter()
                .all(|a| a.state() == AnimatorState::Idle)
        );
    }

    #[tokio::test]
    async fn test_primary_cannot_start_session() {
        let err = session(DeviceSelector::Primary).unwrap_err();
        assert!(matches!(err, FlipError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_adjust_outside_simulation() {
        let mut session = session(DeviceSelector::Secondary).unwrap();
        assert!(session.adjust_coins(1).is_err());
        assert_eq!(
            session.status_message(),
            "Coin count can only be changed in Simulation"
        );
        assert_eq!(session.total_bits(), 6);
    }

    #[tokio::test]
    async fn test_simulation_coins_survive_device_switch() {
        let mut session = session(DeviceSelector::Simulation).unwrap();
        assert_eq!(session.adjust_coins(2).unwrap(), 8);
        session.select_device(DeviceSelector::Backup).unwrap();
        assert_eq!(session.total_bits(), 24);
        session.select_device(DeviceSelector::Simulation).unwrap();
        assert_eq!(session.total_bits(), 8);
        assert_eq!(session.animators().len(), 8);
    }
}
