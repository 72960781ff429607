//! qcoin Hardware Abstraction Layer
//!
//! This crate is the execution capability the coin-flip core talks to: it
//! describes the circuit a coin row needs and the lifecycle for running it on
//! a simulator or a remote device.
//!
//! # Overview
//!
//! - [`Circuit`]: a row of independent qubits, each put into uniform
//!   superposition and measured
//! - [`Backend`]: the job lifecycle (`submit` → `status` → `result`)
//! - [`Capabilities`]: per-backend limits, most importantly how many qubits
//!   one submission may use
//! - [`BackendConfig`]: endpoint, user and token handed to backend factories
//! - [`BackendRegistry`]: backend id → factory lookup
//! - [`ExecutionResult`] and [`Counts`]: measurement outcomes
//!
//! # Example: One Coin Row
//!
//! ```ignore
//! use qcoin_hal::{Backend, Circuit};
//! use qcoin_adapter_sim::SimulatorBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new();
//!     let circuit = Circuit::coin_row(6)?;
//!
//!     let job_id = backend.submit(&circuit, 1).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     // One shot, so exactly one bitstring: character i is qubit i.
//!     println!("{:?}", result.single_bitstring());
//!     Ok(())
//! }
//! ```
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use qcoin_hal::{
//!     Backend, BackendAvailability, Capabilities, Circuit, ExecutionResult,
//!     HalResult, JobId, JobStatus,
//! };
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     fn capabilities(&self) -> &Capabilities {
//!         &self.capabilities
//!     }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
//!         # todo!()
//!     }
//!
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
//!         # todo!()
//!     }
//!
//!     async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod circuit;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory};
pub use capability::Capabilities;
pub use circuit::{Circuit, Instruction, InstructionKind, QubitId};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult};
