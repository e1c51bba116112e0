//! Ember Runtime - Frame loop building blocks
//!
//! - `GameClock` - per-frame delta time with clamping and frame pacing
//! - `RuntimeSystem` - trait for systems ticked once per frame

mod clock;
mod system;

pub use clock::{GameClock, MAX_FPS, MIN_FPS};
pub use system::RuntimeSystem;
