//! Ad rotation: eligibility filtering, the rotation state machine and a
//! tokio-hosted timer that drives it.

pub mod driver;
pub mod engine;

pub use driver::RotationDriver;
pub use engine::{eligible_ads, AdRotator, RotationError, RotationState};
