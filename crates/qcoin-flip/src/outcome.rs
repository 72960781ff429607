//! Coin faces and assembled outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The face a coin shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Measured 0.
    #[default]
    Heads,
    /// Measured 1.
    Tails,
}

impl Face {
    /// `0 → Heads`, `1 → Tails`.
    pub fn from_bit(bit: bool) -> Self {
        if bit { Face::Tails } else { Face::Heads }
    }

    /// One-letter label drawn on the coin.
    pub fn label(self) -> char {
        match self {
            Face::Heads => 'H',
            Face::Tails => 'T',
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Heads => write!(f, "Heads"),
            Face::Tails => write!(f, "Tails"),
        }
    }
}

/// Heads/tails tally of one outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of 0-bits.
    pub heads: usize,
    /// Number of 1-bits.
    pub tails: usize,
}

impl Statistics {
    /// Total coins counted.
    pub fn total(&self) -> usize {
        self.heads + self.tails
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Heads, {} Tails", self.heads, self.tails)
    }
}

/// Tally `bits` with the same mapping as [`Face::from_bit`].
pub fn statistics(bits: &[bool]) -> Statistics {
    let tails = bits.iter().filter(|b| **b).count();
    Statistics {
        heads: bits.len() - tails,
        tails,
    }
}

/// An exact-length result: one bit per coin, in coin order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinOutcome {
    bits: Vec<bool>,
}

impl CoinOutcome {
    /// Wrap raw measurement bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Raw bits.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Faces, one per bit.
    pub fn faces(&self) -> Vec<Face> {
        self.bits.iter().copied().map(Face::from_bit).collect()
    }

    /// Heads/tails tally.
    pub fn statistics(&self) -> Statistics {
        statistics(&self.bits)
    }

    /// Number of coins.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether there are no coins.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl fmt::Display for CoinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: String = self.faces().into_iter().map(Face::label).collect();
        f.write_str(&labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_mapping() {
        assert_eq!(Face::from_bit(false), Face::Heads);
        assert_eq!(Face::from_bit(true), Face::Tails);
        assert_eq!(Face::default(), Face::Heads);
    }

    #[test]
    fn test_statistics() {
        let stats = statistics(&[false, true, false, true, true, false]);
        assert_eq!(stats, Statistics { heads: 3, tails: 3 });
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.to_string(), "3 Heads, 3 Tails");
    }

    #[test]
    fn test_empty_statistics() {
        assert_eq!(statistics(&[]), Statistics::default());
    }

    #[test]
    fn test_outcome_labels() {
        let outcome = CoinOutcome::from_bits(vec![false, true, false, true, true, false]);
        assert_eq!(outcome.to_string(), "HTHTTH");
        assert_eq!(
            outcome.faces(),
            vec![
                Face::Heads,
                Face::Tails,
                Face::Heads,
                Face::Tails,
                Face::Tails,
                Face::Heads
            ]
        );
    }
}
