//! Backend capabilities.

use serde::{Deserialize, Serialize};

/// What a backend can run in a single submission.
///
/// Capabilities are cached at construction time; [`crate::Backend::capabilities`]
/// hands out a reference without I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Device name as reported by the provider.
    pub name: String,
    /// Maximum qubits one circuit may use.
    pub num_qubits: u32,
    /// Maximum shots per submission.
    pub max_shots: u32,
    /// Whether this is a local simulator (no rate limiting needed).
    pub is_simulator: bool,
}

impl Capabilities {
    /// Capabilities of a local simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: true,
        }
    }

    /// Capabilities of a physical device.
    pub fn device(name: impl Into<String>, num_qubits: u32, max_shots: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            max_shots,
            is_simulator: false,
        }
    }

    /// Whether a circuit of `qubits` fits in one submission.
    pub fn fits(&self, qubits: usize) -> bool {
        qubits <= self.num_qubits as usize
    }
}
