//! Ember Particles - fixed-pool fountain simulation
//!
//! Provides a single pool of independent point particles with:
//! - Semi-implicit Euler integration under gravity and per-particle acceleration
//! - A damped floor bounce at y = 0
//! - Fade-based death and in-place respawn at the emitter
//! - Injected random sources for deterministic tests

pub mod config;
pub mod particle;
pub mod rand;

use ember_core::Result;
use ember_runtime::RuntimeSystem;

pub use config::{ParticleConfig, DEFAULT_PALETTE};
pub use particle::{Particle, ParticlePool};
pub use rand::{ParticleRng, RandomSource};

/// A pool and its random source, ticked by the frame loop as a `RuntimeSystem`
pub struct ParticleSystem<R: RandomSource = ParticleRng> {
    pool: ParticlePool,
    rng: R,
}

impl ParticleSystem<ParticleRng> {
    /// Validate `config` and build a pool driven by a seeded xorshift source
    pub fn new(config: ParticleConfig, seed: u32) -> Result<Self> {
        Self::with_rng(config, ParticleRng::new(seed))
    }
}

impl<R: RandomSource> ParticleSystem<R> {
    pub fn with_rng(config: ParticleConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pool: ParticlePool::new(config),
            rng,
        })
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    /// Advance the pool by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.pool.update(dt, &mut self.rng);
    }
}

impl<R: RandomSource> RuntimeSystem for ParticleSystem<R> {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[particles] Pool ready: {} slots, gravity {}",
            self.pool.capacity(),
            self.pool.config().gravity
        );
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.step(dt as f32);
        log::trace!("[particles] {} alive", self.pool.alive_count());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_rejects_invalid_config() {
        let config = ParticleConfig {
            count: 0,
            ..Default::default()
        };
        assert!(ParticleSystem::new(config, 1).is_err());
    }

    #[test]
    fn system_update_fills_pool() {
        let mut system = ParticleSystem::new(ParticleConfig::default(), 42).unwrap();
        system.initialize().unwrap();
        assert_eq!(system.pool().alive_count(), 0);

        system.update(0.02).unwrap();
        assert_eq!(system.pool().alive_count(), 300);
        assert_eq!(system.name(), "particles");
    }

    #[test]
    fn same_seed_same_simulation() {
        let mut a = ParticleSystem::new(ParticleConfig::default(), 9).unwrap();
        let mut b = ParticleSystem::new(ParticleConfig::default(), 9).unwrap();
        for _ in 0..100 {
            a.step(0.02);
            b.step(0.02);
        }
        assert_eq!(a.pool().particles(), b.pool().particles());
    }

    #[test]
    fn long_run_keeps_invariants() {
        let mut system = ParticleSystem::new(ParticleConfig::default(), 3).unwrap();
        for _ in 0..2000 {
            system.step(0.02);
        }
        for p in system.pool().particles() {
            assert!(p.life() <= 1.0);
            assert!(DEFAULT_PALETTE.contains(&p.color));
        }
        assert_eq!(system.pool().capacity(), 300);
    }
}
