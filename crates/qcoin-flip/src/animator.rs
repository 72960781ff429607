//! Per-coin flip animation.
//!
//! ```text
//!            start_flip()          set_final_face(f)        cycle elapsed
//!   Idle ─────────────────→ Waiting ─────────────────→ Settling ──────────→ Done
//!    ↑                      ↺ loops every                                    │
//!    │                        BOUNCE_PERIOD ticks           start_flip()     │
//!    │                                        Waiting ←──────────────────────┘
//!    └── reset() from any state
//! ```
//!
//! `Waiting` loops forever because nobody knows how long the backend will
//! take. The settle length is drawn per animator from its own random source,
//! so a row of coins does not land in lockstep.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::trace;

use crate::outcome::Face;

/// Ticks per bounce loop while waiting for a result.
pub const BOUNCE_PERIOD: u32 = 60;

/// Range the settle length is drawn from.
pub const SETTLE_TICKS: RangeInclusive<u32> = 45..=90;

/// Peak vertical lift, in renderer units.
pub const BOUNCE_AMPLITUDE: f64 = 30.0;

/// The on-edge dimension never shrinks below this fraction of a full coin.
pub const MIN_EDGE_SCALE: f64 = 0.2;

/// Animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnimatorState {
    /// Resting, showing heads.
    Idle,
    /// Bouncing until a result arrives.
    Waiting,
    /// Final tumble onto the measured face.
    Settling,
    /// Resting on the measured face.
    Done,
}

/// How to draw a coin this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CoinShape {
    /// Face-on, at rest.
    Flat,
    /// Mid-flip.
    Tumbling {
        /// On-edge dimension as a fraction of the full coin, in
        /// `[MIN_EDGE_SCALE, 1]`.
        edge_scale: f64,
        /// Upward offset from the resting position, in `[0, BOUNCE_AMPLITUDE]`.
        lift: f64,
    },
}

/// Everything a renderer needs for one coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderState {
    /// Outline to draw.
    pub shape: CoinShape,
    /// Face to print on it. While tumbling this alternates for effect and
    /// says nothing about the outcome.
    pub face: Face,
}

/// Drives one coin's flip animation.
#[derive(Debug, Clone)]
pub struct CoinAnimator {
    state: AnimatorState,
    elapsed_frames: u32,
    cycle_length: u32,
    face: Face,
    rng: StdRng,
}

impl CoinAnimator {
    /// An idle coin whose settle timing is drawn from `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// An idle coin seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: AnimatorState::Idle,
            elapsed_frames: 0,
            cycle_length: 0,
            face: Face::Heads,
            rng,
        }
    }

    /// Start bouncing. Only applies from `Idle` or `Done`; an in-flight
    /// wait or settle is left alone.
    pub fn start_flip(&mut self) {
        match self.state {
            AnimatorState::Idle | AnimatorState::Done => {
                self.state = AnimatorState::Waiting;
                self.elapsed_frames = 0;
                self.cycle_length = BOUNCE_PERIOD;
            }
            AnimatorState::Waiting | AnimatorState::Settling => {
                trace!(state = ?self.state, "start_flip ignored");
            }
        }
    }

    /// Commit to `face` and begin settling. Only applies from `Waiting`.
    pub fn set_final_face(&mut self, face: Face) {
        if self.state != AnimatorState::Waiting {
            trace!(state = ?self.state, "set_final_face ignored");
            return;
        }
        self.state = AnimatorState::Settling;
        self.face = face;
        self.elapsed_frames = 0;
        self.cycle_length = self.rng.gen_range(SETTLE_TICKS);
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        match self.state {
            AnimatorState::Waiting => {
                self.elapsed_frames += 1;
                if self.elapsed_frames >= self.cycle_length {
                    self.elapsed_frames = 0;
                }
            }
            AnimatorState::Settling => {
                self.elapsed_frames += 1;
                if self.elapsed_frames >= self.cycle_length {
                    self.state = AnimatorState::Done;
                }
            }
            AnimatorState::Idle | AnimatorState::Done => {}
        }
    }

    /// Back to `Idle` showing heads.
    pub fn reset(&mut self) {
        self.state = AnimatorState::Idle;
        self.elapsed_frames = 0;
        self.cycle_length = 0;
        self.face = Face::Heads;
    }

    /// Current phase.
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// Frames since the current phase (or bounce loop) began.
    pub fn elapsed_frames(&self) -> u32 {
        self.elapsed_frames
    }

    /// Length of the current loop or settle, in frames.
    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// The measured face, once the coin has landed.
    pub fn final_face(&self) -> Option<Face> {
        (self.state == AnimatorState::Done).then_some(self.face)
    }

    /// Whether the coin has landed on its measured face.
    pub fn is_done(&self) -> bool {
        self.state == AnimatorState::Done
    }

    /// Fraction of the current cycle elapsed, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        if self.cycle_length == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_frames) / f64::from(self.cycle_length)
    }

    /// Shape and face to draw this frame.
    pub fn render_state(&self) -> RenderState {
        match self.state {
            AnimatorState::Idle | AnimatorState::Done => RenderState {
                shape: CoinShape::Flat,
                face: self.face,
            },
            AnimatorState::Waiting | AnimatorState::Settling => {
                let t = self.progress();
                let edge_scale = (4.0 * PI * t).cos().abs().max(MIN_EDGE_SCALE);
                let lift = (PI * t).sin() * BOUNCE_AMPLITUDE;
                // Two face changes per quarter cycle.
                let face = if (t * 8.0) as u32 % 2 == 0 {
                    Face::Heads
                } else {
                    Face::Tails
                };
                RenderState {
                    shape: CoinShape::Tumbling { edge_scale, lift },
                    face,
                }
            }
        }
    }
}

impl Default for CoinAnimator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
