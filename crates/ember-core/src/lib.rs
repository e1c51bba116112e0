//! Ember Core - Foundational types for the Ember particle demo
//!
//! This crate provides the types every other Ember crate depends on:
//! - `Vec3` - 3D vector used for particle kinematics
//! - `Mat4` and helpers - column-major 4x4 matrices for camera transforms
//! - Error types and Result alias

mod error;
pub mod matrix;
mod types;

pub use error::{EmberError, Result};
pub use matrix::Mat4;
pub use types::Vec3;
