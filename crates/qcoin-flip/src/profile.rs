//! Device profiles.
//!
//! Each selectable device maps to a fixed way of producing its coins:
//!
//! | selector | backend id | coins | bits per call | calls |
//! |---|---|---|---|---|
//! | `Primary` | `primary` | 24 | 24 | 1 |
//! | `Backup` | `backup` | 24 | 6 | 4 |
//! | `Secondary` | `secondary` | 6 | 6 | 1 |
//! | `Simulation` | `simulator` | 1..=24 (default 6) | = coins | 1 |
//!
//! `Primary` is reserved: it is listed but cannot be selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FlipError, FlipResult};

/// Fewest coins a profile may request.
pub const MIN_COINS: usize = 1;

/// Most coins a profile may request.
pub const MAX_COINS: usize = 24;

/// Coins shown when the simulator is first selected.
pub const DEFAULT_SIMULATION_COINS: usize = 6;

/// The closed set of selectable devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSelector {
    /// Full-width device; reserved and currently unsupported.
    Primary,
    /// Fallback device that only yields six bits per call.
    Backup,
    /// Small six-qubit device.
    Secondary,
    /// Local simulator with an adjustable coin count.
    Simulation,
}

impl DeviceSelector {
    /// Every selector, in menu order.
    pub const ALL: [DeviceSelector; 4] = [
        DeviceSelector::Primary,
        DeviceSelector::Backup,
        DeviceSelector::Secondary,
        DeviceSelector::Simulation,
    ];

    /// Identifier handed to the execution capability.
    pub fn backend_id(self) -> &'static str {
        match self {
            DeviceSelector::Primary => "primary",
            DeviceSelector::Backup => "backup",
            DeviceSelector::Secondary => "secondary",
            DeviceSelector::Simulation => "simulator",
        }
    }

    /// Whether the device may be selected.
    pub fn is_supported(self) -> bool {
        !matches!(self, DeviceSelector::Primary)
    }

    /// Whether the coin count can be changed on this device.
    pub fn is_adjustable(self) -> bool {
        matches!(self, DeviceSelector::Simulation)
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceSelector::Primary => "Primary",
            DeviceSelector::Backup => "Backup",
            DeviceSelector::Secondary => "Secondary",
            DeviceSelector::Simulation => "Simulation",
        };
        f.write_str(name)
    }
}

impl FromStr for DeviceSelector {
    type Err = FlipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(DeviceSelector::Primary),
            "backup" => Ok(DeviceSelector::Backup),
            "secondary" => Ok(DeviceSelector::Secondary),
            "simulation" | "simulator" | "sim" => Ok(DeviceSelector::Simulation),
            other => Err(FlipError::Configuration(format!("unknown device '{other}'"))),
        }
    }
}

/// How one device produces a row of coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    /// Device this profile belongs to.
    pub selector: DeviceSelector,
    /// Identifier handed to the execution capability.
    pub backend_id: &'static str,
    /// Coins (bits) to produce.
    pub total_bits: usize,
    /// Bits one circuit submission yields.
    pub bits_per_call: usize,
    /// Submissions needed per run.
    pub calls_needed: usize,
}

impl DeviceProfile {
    /// The table entry for `selector`. Simulation starts at
    /// [`DEFAULT_SIMULATION_COINS`].
    pub fn for_selector(selector: DeviceSelector) -> Self {
        match selector {
            DeviceSelector::Primary => Self {
                selector,
                backend_id: selector.backend_id(),
                total_bits: 24,
                bits_per_call: 24,
                calls_needed: 1,
            },
            DeviceSelector::Backup => Self {
                selector,
                backend_id: selector.backend_id(),
                total_bits: 24,
                bits_per_call: 6,
                calls_needed: 4,
            },
            DeviceSelector::Secondary => Self {
                selector,
                backend_id: selector.backend_id(),
                total_bits: 6,
                bits_per_call: 6,
                calls_needed: 1,
            },
            DeviceSelector::Simulation => Self::simulation(DEFAULT_SIMULATION_COINS),
        }
    }

    /// A simulation profile for `coins` coins, clamped to
    /// `[MIN_COINS, MAX_COINS]`.
    pub fn simulation(coins: usize) -> Self {
        let total_bits = coins.clamp(MIN_COINS, MAX_COINS);
        Self {
            selector: DeviceSelector::Simulation,
            backend_id: DeviceSelector::Simulation.backend_id(),
            total_bits,
            bits_per_call: total_bits,
            calls_needed: 1,
        }
    }

    /// Every table entry, in menu order.
    pub fn table() -> [DeviceProfile; 4] {
        DeviceSelector::ALL.map(Self::for_selector)
    }

    /// `ceil(total_bits / bits_per_call)`.
    pub fn derived_calls(total_bits: usize, bits_per_call: usize) -> usize {
        if bits_per_call == 0 {
            return 0;
        }
        total_bits.div_ceil(bits_per_call)
    }

    /// This profile with its coin count moved by `delta`, clamped.
    ///
    /// Only simulation profiles can be adjusted.
    pub fn adjusted(&self, delta: isize) -> FlipResult<Self> {
        if !self.selector.is_adjustable() {
            return Err(FlipError::Configuration(format!(
                "coin count is fixed at {} on {}",
                self.total_bits, self.selector
            )));
        }
        Ok(Self::simulation(self.total_bits.saturating_add_signed(delta)))
    }

    /// Check the arithmetic: bounds, and enough calls to cover every coin.
    pub fn check_consistency(&self) -> FlipResult<()> {
        if !(MIN_COINS..=MAX_COINS).contains(&self.total_bits) {
            return Err(FlipError::Configuration(format!(
                "{} requests {} coins; allowed {MIN_COINS}..={MAX_COINS}",
                self.selector, self.total_bits
            )));
        }
        if self.bits_per_call == 0 || self.calls_needed == 0 {
            return Err(FlipError::Configuration(format!(
                "{} yields no bits ({} calls of {} bits)",
                self.selector, self.calls_needed, self.bits_per_call
            )));
        }
        // Overflow means far more bits than any coin row needs.
        let covered = self
            .calls_needed
            .checked_mul(self.bits_per_call)
            .unwrap_or(usize::MAX);
        if covered < self.total_bits {
            return Err(FlipError::Configuration(format!(
                "{}: {} calls of {} bits cannot cover {} coins",
                self.selector, self.calls_needed, self.bits_per_call, self.total_bits
            )));
        }
        Ok(())
    }

    /// Check the profile is consistent and its device is selectable.
    pub fn validate(&self) -> FlipResult<()> {
        if !self.selector.is_supported() {
            return Err(FlipError::Configuration(format!(
                "Device {} is not supported",
                self.selector
            )));
        }
        self.check_consistency()
    }
}

/// Check every table entry's arithmetic. Run once at startup.
pub fn validate_table() -> FlipResult<()> {
    DeviceProfile::table()
        .iter()
        .try_for_each(DeviceProfile::check_consistency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_values() {
        let backup = DeviceProfile::for_selector(DeviceSelector::Backup);
        assert_eq!(backup.backend_id, "backup");
        assert_eq!(
            (backup.total_bits, backup.bits_per_call, backup.calls_needed),
            (24, 6, 4)
        );

        let secondary = DeviceProfile::for_selector(DeviceSelector::Secondary);
        assert_eq!(
            (secondary.total_bits, secondary.bits_per_call, secondary.calls_needed),
            (6, 6, 1)
        );

        let primary = DeviceProfile::for_selector(DeviceSelector::Primary);
        assert_eq!(
            (primary.total_bits, primary.bits_per_call, primary.calls_needed),
            (24, 24, 1)
        );

        let sim = DeviceProfile::for_selector(DeviceSelector::Simulation);
        assert_eq!(sim.backend_id, "simulator");
        assert_eq!(sim.total_bits, DEFAULT_SIMULATION_COINS);
        assert_eq!(sim.bits_per_call, sim.total_bits);
    }

    #[test]
    fn test_table_is_consistent() {
        validate_table().unwrap();
        for profile in DeviceProfile::table() {
            assert!(profile.calls_needed * profile.bits_per_call >= profile.total_bits);
            assert_eq!(
                profile.calls_needed,
                DeviceProfile::derived_calls(profile.total_bits, profile.bits_per_call)
            );
        }
    }

    #[test]
    fn test_primary_is_unsupported() {
        let primary = DeviceProfile::for_selector(DeviceSelector::Primary);
        assert!(primary.check_consistency().is_ok());
        let err = primary.validate().unwrap_err();
        assert!(matches!(err, FlipError::Configuration(_)));
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_inconsistent_profile_rejected() {
        let profile = DeviceProfile {
            selector: DeviceSelector::Backup,
            backend_id: "backup",
            total_bits: 24,
            bits_per_call: 6,
            calls_needed: 3,
        };
        assert!(matches!(
            profile.validate(),
            Err(FlipError::Configuration(_))
        ));
    }

    #[test]
    fn test_simulation_adjust_clamps() {
        let sim = DeviceProfile::simulation(1);
        assert_eq!(sim.adjusted(-1).unwrap().total_bits, 1);
        assert_eq!(sim.adjusted(1).unwrap().total_bits, 2);

        let full = DeviceProfile::simulation(MAX_COINS);
        let adjusted = full.adjusted(1).unwrap();
        assert_eq!(adjusted.total_bits, MAX_COINS);
        assert_eq!(adjusted.bits_per_call, MAX_COINS);
        assert_eq!(adjusted.calls_needed, 1);

        assert_eq!(DeviceProfile::simulation(0).total_bits, MIN_COINS);
        assert_eq!(DeviceProfile::simulation(99).total_bits, MAX_COINS);
    }

    #[test]
    fn test_fixed_devices_cannot_adjust() {
        let backup = DeviceProfile::for_selector(DeviceSelector::Backup);
        assert!(matches!(
            backup.adjusted(1),
            Err(FlipError::Configuration(_))
        ));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(
            "Backup".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::Backup
        );
        assert_eq!(
            "sim".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::Simulation
        );
        assert!("quantum-toaster".parse::<DeviceSelector>().is_err());
    }

    #[test]
    fn test_selector_serde_names() {
        let json = serde_json::to_string(&DeviceSelector::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
    }

    #[test]
    fn test_derived_calls() {
        assert_eq!(DeviceProfile::derived_calls(24, 6), 4);
        assert_eq!(DeviceProfile::derived_calls(25, 6), 5);
        assert_eq!(DeviceProfile::derived_calls(6, 24), 1);
        assert_eq!(DeviceProfile::derived_calls(6, 0), 0);
    }

    #[test]
    fn test_consistency_with_oversized_batching() {
        let profile = DeviceProfile {
            selector: DeviceSelector::Secondary,
            backend_id: "secondary",
            total_bits: 6,
            bits_per_call: usize::MAX,
            calls_needed: 2,
        };
        assert!(profile.check_consistency().is_ok());
    }
}
