//! Simulator backend implementation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use qcoin_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Circuit, Counts,
    ExecutionResult, HalError, HalResult, JobId, JobStatus,
};

use crate::qubit_state::ProductState;

/// Qubits accepted per submission unless configured otherwise.
pub const DEFAULT_MAX_QUBITS: u32 = 24;

/// Job data for the simulator.
struct SimJob {
    status: JobStatus,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Delay applied to every submission.
    latency: Duration,
    /// Measurement randomness.
    rng: Mutex<StdRng>,
    /// Submitted jobs.
    jobs: Mutex<FxHashMap<String, SimJob>>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator that accepts at most `max_qubits` per circuit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::from_parts(BackendConfig::new("simulator"), max_qubits)
    }

    fn from_parts(config: BackendConfig, max_qubits: u32) -> Self {
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name = config.name.clone();
        Self {
            config,
            capabilities,
            latency: Duration::ZERO,
            rng: Mutex::new(StdRng::from_entropy()),
            jobs: Mutex::new(FxHashMap::default()),
        }
    }

    /// Delay every submission by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Use a fixed seed for measurement sampling.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Configured per-submission delay.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();

        let mut state = ProductState::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            state.apply(inst);
        }

        let mut counts = Counts::new();
        {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for _ in 0..shots {
                counts.insert(state.sample_bitstring(&mut *rng), 1);
            }
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuit), fields(backend = %self.config.name, qubits = circuit.num_qubits()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if !self.capabilities.fits(circuit.num_qubits()) {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but {} only supports {}",
                circuit.num_qubits(),
                self.config.name,
                self.capabilities.num_qubits
            )));
        }
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots (allowed 1..={})",
                self.capabilities.max_shots
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            jobs.insert(
                job_id.0.clone(),
                SimJob {
                    status: JobStatus::Running,
                    result: None,
                },
            );
        }
        debug!("Submitted job: {}", job_id);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = self.run_simulation(circuit, shots);

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(sim_job) = jobs.get_mut(&job_id.0) {
                sim_job.result = Some(result);
                sim_job.status = JobStatus::Completed;
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits") {
            Some(0) => {
                return Err(HalError::Configuration(
                    "max_qubits must be at least 1".into(),
                ));
            }
            Some(n) => u32::try_from(n).map_err(|_| {
                HalError::Configuration(format!("max_qubits {n} is out of range"))
            })?,
            None => DEFAULT_MAX_QUBITS,
        };
        let latency = Duration::from_millis(config.extra_u64("latency_ms").unwrap_or(0));
        let seed = config.extra_u64("seed");
        let emulate_device = config.extra_flag("emulate_device");

        let mut backend = Self::from_parts(config, max_qubits).with_latency(latency);
        // Report as hardware so callers apply their rate-limit pauses.
        backend.capabilities.is_simulator = !emulate_device;
        Ok(match seed {
            Some(seed) => backend.with_seed(seed),
            None => backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, DEFAULT_MAX_QUBITS);
    }

    #[tokio::test]
    async fn test_simulator_coin_row() {
        let backend = SimulatorBackend::new().with_seed(3);

        let circuit = Circuit::coin_row(6).unwrap();
        let job_id = backend.submit(&circuit, 1).await.unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert_eq!(status, JobStatus::Completed);

        let result = backend.wait(&job_id).await.unwrap();
        assert_eq!(result.shots, 1);
        let bits = result.single_bitstring().unwrap();
        assert_eq!(bits.len(), 6);
        assert!(bits.chars().all(|c| c == '0' || c == '1'));
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(6);

        let circuit = Circuit::coin_row(7).unwrap();
        let result = backend.submit(&circuit, 1).await;

        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn test_simulator_rejects_zero_shots() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::coin_row(1).unwrap();
        assert!(matches!(
            backend.submit(&circuit, 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("missing");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_submission() {
        let backend = SimulatorBackend::new().with_latency(Duration::from_secs(7));
        let circuit = Circuit::coin_row(2).unwrap();

        let before = tokio::time::Instant::now();
        backend.submit(&circuit, 1).await.unwrap();
        assert!(before.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let circuit = Circuit::coin_row(24).unwrap();
        let a = SimulatorBackend::new().with_seed(11);
        let b = SimulatorBackend::new().with_seed(11);

        let ra = a.wait(&a.submit(&circuit, 1).await.unwrap()).await.unwrap();
        let rb = b.wait(&b.submit(&circuit, 1).await.unwrap()).await.unwrap();
        assert_eq!(ra.single_bitstring(), rb.single_bitstring());
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("backup")
            .with_extra("max_qubits", serde_json::json!(6))
            .with_extra("latency_ms", serde_json::json!(250));
        let backend = SimulatorBackend::from_config(config).unwrap();

        assert_eq!(backend.name(), "backup");
        assert_eq!(backend.capabilities().name, "backup");
        assert_eq!(backend.capabilities().num_qubits, 6);
        assert_eq!(backend.latency(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_config_emulated_device() {
        let config = BackendConfig::new("secondary")
            .with_extra("max_qubits", serde_json::json!(6))
            .with_extra("emulate_device", serde_json::json!(true));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert!(!backend.capabilities().is_simulator);

        let plain = SimulatorBackend::from_config(BackendConfig::new("simulator")).unwrap();
        assert!(plain.capabilities().is_simulator);
    }

    #[test]
    fn test_from_config_rejects_zero_qubits() {
        let config = BackendConfig::new("simulator").with_extra("max_qubits", serde_json::json!(0));
        assert!(matches!(
            SimulatorBackend::from_config(config),
            Err(HalError::Configuration(_))
        ));
    }
}
