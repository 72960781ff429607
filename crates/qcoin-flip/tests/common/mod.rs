//! A scripted backend for exercising assembly and sessions.
//!
//! Each submission pops the next scripted reply: a bitstring that becomes
//! the job's single observation, or an error returned from `submit`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use qcoin_hal::{
    Backend, BackendAvailability, BackendRegistry, Capabilities, Circuit, Counts, ExecutionResult,
    HalError, HalResult, JobId, JobStatus,
};
use rustc_hash::FxHashMap;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Bits(&'static str),
    Fail(&'static str),
}

/// Backend that answers from a script and records what it was asked.
pub struct ScriptedBackend {
    name: String,
    capabilities: Capabilities,
    latency: Duration,
    replies: Mutex<VecDeque<Reply>>,
    submitted: Mutex<Vec<usize>>,
    results: Mutex<FxHashMap<String, ExecutionResult>>,
    next_job_id: AtomicU64,
}

impl ScriptedBackend {
    /// A simulator-flavoured backend: no rate-limit pauses expected.
    pub fn simulator(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::with_capabilities(Capabilities::simulator(24), replies)
    }

    /// A hardware-flavoured backend accepting `qubits` per call.
    pub fn device(qubits: u32, replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::with_capabilities(Capabilities::device("scripted", qubits, 1_000), replies)
    }

    fn with_capabilities(capabilities: Capabilities, replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            name: capabilities.name.clone(),
            capabilities,
            latency: Duration::ZERO,
            replies: Mutex::new(replies.into_iter().collect()),
            submitted: Mutex::new(Vec::new()),
            results: Mutex::new(FxHashMap::default()),
            next_job_id: AtomicU64::new(0),
        }
    }

    /// Delay every submission.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Qubit counts of every submitted circuit, in order.
    pub fn submitted(&self) -> Vec<usize> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        assert_eq!(shots, 1, "coin rows are sampled with one shot");
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(circuit.num_qubits());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| HalError::SubmissionFailed("script exhausted".into()))?;

        match reply {
            Reply::Fail(msg) => Err(HalError::Backend(msg.into())),
            Reply::Bits(bits) => {
                let id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
                let job_id = JobId::new(format!("scripted-{id}"));
                let counts: Counts = [(bits, 1)].into_iter().collect();
                self.results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(job_id.0.clone(), ExecutionResult::new(counts, 1));
                Ok(job_id)
            }
        }
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if results.contains_key(&job_id.0) {
            Ok(JobStatus::Completed)
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id.0)
            .cloned()
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

/// A registry that hands out `backend` for every id in `ids`.
pub fn registry_with(ids: &[&str], backend: Arc<ScriptedBackend>) -> Arc<BackendRegistry> {
    let mut registry = BackendRegistry::new();
    for id in ids {
        let backend = Arc::clone(&backend);
        registry.register_factory(*id, move |_config| Ok(backend.clone() as Arc<dyn Backend>));
    }
    Arc::new(registry)
}
