//! Ember Player - runs the particle fountain
//!
//! `FountainScene` ties the simulation, the spinning camera and the sprite
//! batch together. `PlayerApp` drives it in a window; `run_snapshot` drives it
//! offscreen and writes a PNG.

mod player_app;
mod scene;
mod snapshot;

pub use player_app::PlayerApp;
pub use scene::{load_sprite_texture, FountainScene, PlayerOptions, SPRITE_SIZE};
pub use snapshot::{run_snapshot, SnapshotOptions};
