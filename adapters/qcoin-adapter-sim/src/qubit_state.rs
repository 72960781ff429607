//! Single-qubit state simulation.

use num_complex::Complex64;
use rand::Rng;

use qcoin_hal::{Instruction, InstructionKind};

/// The state of one unentangled qubit: `alpha|0⟩ + beta|1⟩`.
#[derive(Debug, Clone, Copy)]
pub struct QubitState {
    alpha: Complex64,
    beta: Complex64,
}

impl QubitState {
    /// |0⟩.
    pub fn zero() -> Self {
        Self {
            alpha: Complex64::new(1.0, 0.0),
            beta: Complex64::new(0.0, 0.0),
        }
    }

    /// Apply one instruction. Measurement leaves the state untouched; the
    /// outcome is drawn by [`QubitState::sample`].
    pub fn apply(&mut self, instruction: &Instruction) {
        match instruction.kind {
            InstructionKind::H => self.apply_h(),
            InstructionKind::Measure => {}
        }
    }

    fn apply_h(&mut self) {
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        let a = self.alpha;
        let b = self.beta;
        self.alpha = sqrt2_inv * (a + b);
        self.beta = sqrt2_inv * (a - b);
    }

    /// Probability of measuring |1⟩.
    pub fn probability_one(&self) -> f64 {
        let norm = self.alpha.norm_sqr() + self.beta.norm_sqr();
        self.beta.norm_sqr() / norm
    }

    /// Draw a measurement outcome.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> bool {
        let r: f64 = rng.r#gen();
        r < self.probability_one()
    }
}

/// Product state of a whole register.
pub struct ProductState {
    qubits: Vec<QubitState>,
}

impl ProductState {
    /// `num_qubits` qubits in |0⟩.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            qubits: vec![QubitState::zero(); num_qubits],
        }
    }

    /// Apply an instruction to its target qubit.
    pub fn apply(&mut self, instruction: &Instruction) {
        if let Some(qubit) = self.qubits.get_mut(instruction.qubit.0 as usize) {
            qubit.apply(instruction);
        }
    }

    /// Measure every qubit; character `i` is qubit `i`.
    pub fn sample_bitstring<R: Rng>(&self, rng: &mut R) -> String {
        self.qubits
            .iter()
            .map(|q| if q.sample(rng) { '1' } else { '0' })
            .collect()
    }
}
