//! qcoin Local Simulator
//!
//! A local backend for coin-row circuits. Coin rows only contain single-qubit
//! gates, so every qubit stays unentangled and is simulated as its own
//! two-amplitude state. Memory and time grow linearly with the qubit count
//! instead of exponentially, which keeps the 24-coin row instant.
//!
//! # Features
//!
//! - **Per-qubit states**: exact amplitudes, sampled on measurement
//! - **Artificial latency**: optionally delay every job to mimic a remote
//!   device round-trip
//! - **Qubit cap**: emulate a device that only accepts `n` qubits per call
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use qcoin_adapter_sim::SimulatorBackend;
//! use qcoin_hal::{Backend, Circuit};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // A six-qubit device that takes a moment to answer.
//!     let backend = SimulatorBackend::with_max_qubits(6)
//!         .with_latency(Duration::from_millis(300));
//!
//!     let job_id = backend.submit(&Circuit::coin_row(6)?, 1).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("{:?}", result.single_bitstring());
//!     Ok(())
//! }
//! ```

mod qubit_state;
mod simulator;

pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};
