//! Pure policy evaluation (no IO).
//!
//! Input: findings produced elsewhere and an effective policy.
//! Output: violations, policy conflicts, and the gate decision.

#![forbid(unsafe_code)]

pub mod gate;
pub mod policy;

mod engine;
mod fingerprint;
mod rules;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{evaluate, Evaluation};
pub use gate::{gate, ExitIntent, RunResult};
pub use policy::{EffectivePolicy, LicenseBreach};
