//! qcoin Coin Flips
//!
//! Turns quantum measurements into a row of animated coins. Each coin is one
//! qubit put into uniform superposition and measured once: `0` lands heads,
//! `1` lands tails.
//!
//! # Overview
//!
//! - [`DeviceProfile`]: how a device produces its coins (bits per call and
//!   how many calls), keyed by the closed [`DeviceSelector`] set
//! - [`ResultAssembler`]: runs the profile's submissions in order and
//!   stitches an exact-length [`CoinOutcome`]
//! - [`ExecutionCoordinator`]: keeps at most one run in flight on a tokio
//!   runtime and hands its result to the render loop without blocking
//! - [`CoinAnimator`]: per-coin `Idle → Waiting → Settling → Done` machine
//!   and the squash/bounce render contract
//! - [`CoinFlipSession`]: the orchestrator the UI drives once per frame
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qcoin_adapter_sim::SimulatorBackend;
//! use qcoin_flip::{CoinFlipSession, DeviceSelector};
//! use qcoin_hal::BackendRegistry;
//!
//! let mut registry = BackendRegistry::new();
//! registry.register::<SimulatorBackend>("simulator");
//!
//! let mut session = CoinFlipSession::builder(Arc::new(registry))
//!     .device(DeviceSelector::Simulation)
//!     .coins(6)
//!     .build(tokio::runtime::Handle::current())?;
//!
//! session.trigger_flip();
//! while !session.is_settled() {
//!     session.tick();
//!     // draw session.render_states() ...
//! }
//! println!("{}", session.status_message());
//! ```

pub mod animator;
pub mod assembler;
pub mod coordinator;
pub mod error;
pub mod outcome;
pub mod profile;
pub mod session;

pub use animator::{AnimatorState, CoinAnimator, CoinShape, RenderState};
pub use assembler::{DEFAULT_CALL_PAUSE, ResultAssembler};
pub use coordinator::{ExecutionCoordinator, RunStatus};
pub use error::{FlipError, FlipResult};
pub use outcome::{CoinOutcome, Face, Statistics, statistics};
pub use profile::{
    DEFAULT_SIMULATION_COINS, DeviceProfile, DeviceSelector, MAX_COINS, MIN_COINS, validate_table,
};
pub use session::{CoinFlipSession, SessionBuilder};
