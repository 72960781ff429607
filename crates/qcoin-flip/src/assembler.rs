//! Result assembly across device limits.
//!
//! A device may yield fewer bits per submission than the coin row needs.
//! [`ResultAssembler`] runs as many one-shot submissions as the profile asks
//! for, one after another, and stitches the bitstrings into exactly
//! `total_bits` coins.

use std::sync::Arc;
use std::time::Duration;

use qcoin_hal::{Backend, Circuit};
use tracing::{debug, info, instrument, warn};

use crate::error::{FlipError, FlipResult};
use crate::outcome::CoinOutcome;
use crate::profile::DeviceProfile;

/// Pause between consecutive submissions to a hardware backend.
pub const DEFAULT_CALL_PAUSE: Duration = Duration::from_secs(1);

/// Turns a [`DeviceProfile`] into a [`CoinOutcome`] using one backend.
pub struct ResultAssembler {
    backend: Arc<dyn Backend>,
    call_pause: Duration,
}

impl ResultAssembler {
    /// Assemble against `backend` with the default call pause.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            call_pause: DEFAULT_CALL_PAUSE,
        }
    }

    /// Override the pause between hardware submissions.
    pub fn with_call_pause(mut self, pause: Duration) -> Self {
        self.call_pause = pause;
        self
    }

    /// Run the profile's submissions in order and return exactly
    /// `profile.total_bits` coins.
    ///
    /// Submissions are strictly sequential. Hardware backends get
    /// [`DEFAULT_CALL_PAUSE`] (or the configured pause) between calls;
    /// simulators and single-call profiles get none.
    #[instrument(skip(self, profile), fields(
        backend = %self.backend.name(),
        device = %profile.selector,
        calls = profile.calls_needed
    ))]
    pub async fn assemble(&self, profile: &DeviceProfile) -> FlipResult<CoinOutcome> {
        profile.validate()?;

        let circuit = Circuit::coin_row(profile.bits_per_call)?;
        let pause = !self.backend.capabilities().is_simulator && profile.calls_needed > 1;

        let mut bits = Vec::with_capacity(profile.total_bits);
        for call in 0..profile.calls_needed {
            if call > 0 && pause {
                tokio::time::sleep(self.call_pause).await;
            }

            let job_id = self.backend.submit(&circuit, 1).await?;
            let result = self.backend.wait(&job_id).await?;
            let bitstring = result.single_bitstring().ok_or_else(|| {
                FlipError::MalformedResult(format!(
                    "job {job_id} returned {} observations, expected one",
                    result.counts.total_shots()
                ))
            })?;

            let chunk = parse_bitstring(bitstring)?;
            debug!(
                execution_time_ms = result.execution_time_ms,
                "Call {}/{}: {} bits from job {}",
                call + 1,
                profile.calls_needed,
                chunk.len(),
                job_id
            );
            bits.extend(chunk);
        }

        if bits.len() != profile.total_bits {
            warn!(
                "Assembled {} bits for {} coins; fitting to length",
                bits.len(),
                profile.total_bits
            );
        }
        let outcome = CoinOutcome::from_bits(fit_to_length(bits, profile.total_bits));
        info!("Assembled {} coins: {}", outcome.len(), outcome);
        Ok(outcome)
    }
}

/// Parse a measured bitstring. Character `i` is qubit `i`.
pub fn parse_bitstring(bitstring: &str) -> FlipResult<Vec<bool>> {
    bitstring
        .chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(FlipError::MalformedResult(format!(
                "unexpected character '{other}' in bitstring \"{bitstring}\""
            ))),
        })
        .collect()
}

/// Truncate to the first `len` bits, or right-pad with zero bits.
pub fn fit_to_length(mut bits: Vec<bool>, len: usize) -> Vec<bool> {
    bits.resize(len, false);
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bitstring() {
        assert_eq!(
            parse_bitstring("010110").unwrap(),
            vec![false, true, false, true, true, false]
        );
        assert!(parse_bitstring("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_binary() {
        let err = parse_bitstring("01x0").unwrap_err();
        assert!(matches!(err, FlipError::MalformedResult(_)));
    }

    #[test]
    fn test_fit_to_length() {
        assert_eq!(fit_to_length(vec![true; 30], 24), vec![true; 24]);
        assert_eq!(
            fit_to_length(vec![true, true], 4),
            vec![true, true, false, false]
        );
        assert_eq!(fit_to_length(vec![true, false], 2), vec![true, false]);
    }
}
