//! Estimated upload progress.
//!
//! The transport reports no byte-level progress, so the session advances an
//! estimate on a fixed tick and holds it below [`PROGRESS_CAP`] until the
//! response arrives.

use rand::Rng;
use std::time::Duration;

/// How often the estimate advances while a batch is in flight.
pub const TICK_INTERVAL: Duration = Duration::from_millis(300);

/// Upper bound (exclusive) of a single random increment.
pub const MAX_INCREMENT: f32 = 15.0;

/// The estimate never passes this value while a request is outstanding.
pub const PROGRESS_CAP: f32 = 90.0;

pub const PROGRESS_DONE: f32 = 100.0;

/// Next estimate after adding `increment` to `current`.
pub fn advance(current: f32, increment: f32) -> f32 {
    (current + increment.max(0.0)).min(PROGRESS_CAP)
}

pub fn random_increment<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..MAX_INCREMENT)
}
