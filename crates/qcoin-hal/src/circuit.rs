//! Coin-row circuits.
//!
//! A coin row is the only circuit shape this workspace submits: `n` qubits,
//! each independently placed into uniform superposition by a Hadamard gate,
//! then measured into its own classical bit.
//!
//! ```text
//!   q0: ─H─M─
//!   q1: ─H─M─
//!   ...
//!   qn: ─H─M─
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Index of a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Operation applied by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Hadamard gate.
    H,
    /// Computational-basis measurement into the clbit with the same index.
    Measure,
}

/// A single-qubit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// What to apply.
    pub kind: InstructionKind,
    /// Target qubit.
    pub qubit: QubitId,
}

/// A circuit of single-qubit instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: Vec::new(),
        }
    }

    /// Build the coin-row circuit: `H` then measure on every qubit.
    pub fn coin_row(num_qubits: usize) -> HalResult<Self> {
        if num_qubits == 0 {
            return Err(HalError::InvalidCircuit(
                "a coin row needs at least one qubit".into(),
            ));
        }
        let width = u32::try_from(num_qubits).map_err(|_| {
            HalError::InvalidCircuit(format!("{num_qubits} qubits does not fit a circuit"))
        })?;

        let mut circuit = Self::with_size(format!("coin_row_{width}"), width);
        for q in 0..width {
            circuit.h(QubitId(q))?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Append a Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> HalResult<&mut Self> {
        self.push(InstructionKind::H, qubit)
    }

    /// Measure every qubit in index order.
    pub fn measure_all(&mut self) -> HalResult<&mut Self> {
        for q in 0..self.num_qubits {
            self.push(InstructionKind::Measure, QubitId(q))?;
        }
        Ok(self)
    }

    fn push(&mut self, kind: InstructionKind, qubit: QubitId) -> HalResult<&mut Self> {
        if qubit.0 >= self.num_qubits {
            return Err(HalError::InvalidCircuit(format!(
                "{qubit} is outside a {}-qubit circuit",
                self.num_qubits
            )));
        }
        self.instructions.push(Instruction { kind, qubit });
        Ok(self)
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} qubits)", self.name, self.num_qubits)?;
        for q in 0..self.num_qubits {
            let ops: String = self
                .instructions
                .iter()
                .filter(|inst| inst.qubit.0 == q)
                .map(|inst| match inst.kind {
                    InstructionKind::H => "─H",
                    InstructionKind::Measure => "─M",
                })
                .collect();
            writeln!(f, "  {:>4}: {ops}─", QubitId(q).to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_row_layout() {
        let circuit = Circuit::coin_row(3).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.instructions().len(), 6);

        let hadamards: Vec<_> = circuit
            .instructions()
            .iter()
            .filter(|i| i.kind == InstructionKind::H)
            .map(|i| i.qubit)
            .collect();
        assert_eq!(hadamards, vec![QubitId(0), QubitId(1), QubitId(2)]);

        // Every measurement comes after every gate.
        let first_measure = circuit
            .instructions()
            .iter()
            .position(|i| i.kind == InstructionKind::Measure)
            .unwrap();
        assert_eq!(first_measure, 3);
    }

    #[test]
    fn test_coin_row_rejects_zero_qubits() {
        assert!(matches!(
            Circuit::coin_row(0),
            Err(HalError::InvalidCircuit(_))
        ));
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut circuit = Circuit::with_size("small", 2);
        assert!(circuit.h(QubitId(2)).is_err());
        assert!(circuit.h(QubitId(1)).is_ok());
    }

    #[test]
    fn test_display_lists_each_wire() {
        let text = Circuit::coin_row(2).unwrap().to_string();
        assert!(text.contains("coin_row_2"));
        assert!(text.contains("q0: ─H─M─"));
        assert!(text.contains("q1: ─H─M─"));
    }
}
