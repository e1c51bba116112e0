//! Particle state and the fixed-slot pool that simulates it

use crate::config::ParticleConfig;
use crate::rand::RandomSource;
use ember_core::Vec3;

/// One point particle. Slots are reused in place; a dead particle keeps its
/// storage until it is respawned.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub color: [f32; 3],
    /// Remaining life, doubling as alpha. Never above 1.0.
    life: f32,
    fade_rate: f32,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            color: [0.0; 3],
            life: 0.0,
            fade_rate: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life; also the alpha used when drawing
    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn fade_rate(&self) -> f32 {
        self.fade_rate
    }

    /// Colour with the remaining life as alpha
    pub fn rgba(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.life]
    }

    /// Extra acceleration on top of gravity, kept until the next respawn
    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    /// Reinitialize this slot at the emitter.
    ///
    /// Draws five values from `rng`, in order: x velocity, y velocity,
    /// z velocity, palette index, fade rate.
    pub fn respawn<R: RandomSource + ?Sized>(&mut self, config: &ParticleConfig, rng: &mut R) {
        let jitter = config.horizontal_jitter;

        self.position = Vec3::from_array(config.emitter_origin);
        self.velocity = Vec3::new(
            rng.range(-jitter, jitter),
            rng.range(config.vertical_speed_min, config.vertical_speed_max),
            rng.range(-jitter, jitter),
        );
        self.acceleration = Vec3::ZERO;

        let slot = (rng.next_f32() * config.palette.len() as f32) as usize;
        self.color = config
            .palette
            .get(slot.min(config.palette.len().saturating_sub(1)))
            .copied()
            .unwrap_or([1.0; 3]);

        self.life = 1.0;
        self.fade_rate = rng.range(config.fade_rate_min, config.fade_rate_max);
    }

    /// Advance one frame: semi-implicit Euler, floor bounce, fade.
    pub fn step(&mut self, dt: f32, gravity: f32, restitution: f32) {
        // Velocity first, then position with the new velocity
        self.velocity += (self.acceleration - Vec3::UP * gravity) * dt;
        self.position += self.velocity * dt;

        // Floor at y = 0: reflect once per frame, no time-of-impact solve
        if self.position.y < 0.0 {
            self.velocity.y *= -restitution;
        }

        self.life -= self.fade_rate;
    }
}

/// Fixed-capacity pool; slot `i` is always the same particle storage.
pub struct ParticlePool {
    particles: Vec<Particle>,
    config: ParticleConfig,
}

impl ParticlePool {
    /// Allocate `config.count` dead particles
    pub fn new(config: ParticleConfig) -> Self {
        let particles = vec![Particle::dead(); config.count];
        Self { particles, config }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Iterate the particles worth drawing this frame
    pub fn alive(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    /// Advance every slot by `dt` seconds, respawning dead ones first.
    /// `dt == 0` is a no-op frame. Negative `dt` is a caller bug.
    pub fn update<R: RandomSource + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        debug_assert!(dt >= 0.0, "particle update with negative dt {dt}");
        if dt <= 0.0 {
            return;
        }

        let config = &self.config;
        for p in &mut self.particles {
            if !p.is_alive() {
                p.respawn(config, rng);
            }
            p.step(dt, config.gravity, config.restitution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::{ParticleRng, SequenceRng};

    fn single(config: ParticleConfig) -> ParticlePool {
        ParticlePool::new(ParticleConfig { count: 1, ..config })
    }

    #[test]
    fn pool_starts_dead() {
        let pool = ParticlePool::new(ParticleConfig::default());
        assert_eq!(pool.capacity(), 300);
        assert_eq!(pool.alive_count(), 0);
        assert!(pool.particles().iter().all(|p| p.life() == 0.0));
    }

    #[test]
    fn respawn_resets_slot() {
        let config = ParticleConfig::default();
        let mut p = Particle::dead();
        p.position = Vec3::new(4.0, -1.0, 2.0);
        p.acceleration = Vec3::new(1.0, 1.0, 1.0);

        // x, y, z velocity, palette index, fade rate
        let mut rng = SequenceRng::new(&[0.5, 0.0, 0.25, 0.99, 0.5]);
        p.respawn(&config, &mut rng);

        assert_eq!(p.life(), 1.0);
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.acceleration, Vec3::ZERO);
        assert!(p.velocity.x.abs() < 1e-6);
        assert!((p.velocity.y - 1.0).abs() < 1e-6);
        assert!((p.velocity.z + 1.25).abs() < 1e-6);
        assert_eq!(p.color, [1.0, 0.5, 0.75]);
        assert!((p.fade_rate() - 0.053).abs() < 1e-6);
    }

    #[test]
    fn respawn_respects_emitter_origin() {
        let config = ParticleConfig {
            emitter_origin: [1.0, 2.0, 3.0],
            ..Default::default()
        };
        let mut p = Particle::dead();
        p.respawn(&config, &mut ParticleRng::new(3));
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn respawned_particles_stay_in_bounds() {
        let config = ParticleConfig::default();
        let mut rng = ParticleRng::new(99);
        let mut p = Particle::dead();
        for _ in 0..2000 {
            p.respawn(&config, &mut rng);
            assert!(p.velocity.y >= 0.0);
            assert!(p.velocity.y < config.vertical_speed_max);
            assert!(p.velocity.x >= -config.horizontal_jitter);
            assert!(p.velocity.x < config.horizontal_jitter);
            assert!(p.velocity.z >= -config.horizontal_jitter);
            assert!(p.velocity.z < config.horizontal_jitter);
            assert_eq!(p.acceleration, Vec3::ZERO);
            assert!(config.palette.contains(&p.color));
            assert!(p.fade_rate() >= config.fade_rate_min);
            assert!(p.fade_rate() < config.fade_rate_max);
        }
    }

    #[test]
    fn first_update_uses_semi_implicit_euler() {
        let mut pool = single(ParticleConfig::default());
        // vx = 0, vy = 1 + 0.5 * 14 = 8, vz = 0, colour 0, fade 0.003
        let mut rng = SequenceRng::new(&[0.5, 0.5, 0.5, 0.0, 0.0]);
        pool.update(1.0, &mut rng);

        let p = pool.get(0).unwrap();
        // Velocity is updated first: 8 - 9.8 = -1.8; the move uses the new velocity
        assert!((p.velocity.y + 0.75 * -1.8).abs() < 1e-5);
        assert!((p.position.y + 1.8).abs() < 1e-5);
        assert!(p.position.x.abs() < 1e-6);
        assert!(p.position.z.abs() < 1e-6);
        assert!((p.life() - (1.0 - 0.003)).abs() < 1e-6);
    }

    #[test]
    fn floor_bounce_reflects_and_damps() {
        let mut pool = single(ParticleConfig {
            gravity: 0.0,
            ..Default::default()
        });
        {
            let p = pool.get_mut(0).unwrap();
            p.respawn(&ParticleConfig::default(), &mut ParticleRng::new(5));
            p.position = Vec3::new(0.0, -0.1, 0.0);
            p.velocity = Vec3::new(0.0, -2.0, 0.0);
        }

        pool.update(0.01, &mut ParticleRng::new(1));
        let p = pool.get(0).unwrap();
        assert!(p.position.y < 0.0);
        assert!((p.velocity.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bounce_applies_once_per_frame() {
        let mut p = Particle::dead();
        p.respawn(&ParticleConfig::default(), &mut ParticleRng::new(8));
        p.position = Vec3::new(0.0, -0.1, 0.0);
        p.velocity = Vec3::new(0.0, -2.0, 0.0);

        p.step(0.01, 0.0, 0.75);
        assert!((p.velocity.y - 1.5).abs() < 1e-6);

        // Still below the floor: the next frame reflects again, from the new velocity
        p.position.y = -1.0;
        p.step(0.01, 0.0, 0.75);
        assert!((p.velocity.y + 1.125).abs() < 1e-6);
    }

    #[test]
    fn no_bounce_above_floor() {
        let mut p = Particle::dead();
        p.respawn(&ParticleConfig::default(), &mut ParticleRng::new(8));
        p.position = Vec3::new(0.0, 5.0, 0.0);
        p.velocity = Vec3::new(0.0, -2.0, 0.0);
        p.step(0.01, 0.0, 0.75);
        assert!((p.velocity.y + 2.0).abs() < 1e-6);
    }

    #[test]
    fn acceleration_adds_to_gravity() {
        let mut p = Particle::dead();
        p.respawn(&ParticleConfig::default(), &mut ParticleRng::new(8));
        p.position = Vec3::new(0.0, 100.0, 0.0);
        p.velocity = Vec3::ZERO;
        p.set_acceleration(Vec3::new(2.0, 9.8, 0.0));
        p.step(0.5, 9.8, 0.75);
        assert!((p.velocity.x - 1.0).abs() < 1e-6);
        assert!(p.velocity.y.abs() < 1e-6);
        assert!((p.position.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut pool = ParticlePool::new(ParticleConfig {
            count: 16,
            ..Default::default()
        });
        let mut rng = ParticleRng::new(11);
        pool.update(0.02, &mut rng);
        let before: Vec<Particle> = pool.particles().to_vec();

        pool.update(0.0, &mut rng);
        assert_eq!(pool.particles(), before.as_slice());

        // Also leaves dead slots dead
        let mut fresh = single(ParticleConfig::default());
        fresh.update(0.0, &mut rng);
        assert!(!fresh.get(0).unwrap().is_alive());
    }

    #[test]
    fn life_decays_monotonically_until_respawn() {
        let mut pool = ParticlePool::new(ParticleConfig {
            count: 32,
            ..Default::default()
        });
        let mut rng = ParticleRng::new(2024);
        pool.update(0.02, &mut rng);

        for _ in 0..500 {
            let before: Vec<f32> = pool.particles().iter().map(|p| p.life()).collect();
            pool.update(0.02, &mut rng);
            for (p, prev) in pool.particles().iter().zip(before) {
                assert!(p.life() <= 1.0);
                if prev > 0.0 {
                    assert!(p.life() < prev);
                } else {
                    // Dead slots respawn at 1.0 and fade within the same update
                    assert!((p.life() - (1.0 - p.fade_rate())).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn dead_slot_respawns_in_the_same_update() {
        let mut pool = single(ParticleConfig::default());
        let mut rng = ParticleRng::new(77);
        pool.update(0.02, &mut rng);
        assert!(pool.get(0).unwrap().is_alive());

        // Force the slot dead, then one update brings it back
        {
            let p = pool.get_mut(0).unwrap();
            p.life = -0.5;
            p.position = Vec3::new(9.0, 9.0, 9.0);
        }
        pool.update(0.02, &mut rng);
        let p = pool.get(0).unwrap();
        assert!(p.is_alive());
        assert!(p.position.length() < 1.0);
    }

    #[test]
    fn pool_never_grows() {
        let mut pool = ParticlePool::new(ParticleConfig {
            count: 10,
            ..Default::default()
        });
        let mut rng = ParticleRng::new(1);
        for _ in 0..1000 {
            pool.update(0.02, &mut rng);
        }
        assert_eq!(pool.capacity(), 10);
        assert_eq!(pool.alive().count(), pool.alive_count());
    }

    #[test]
    fn rgba_uses_life_as_alpha() {
        let mut p = Particle::dead();
        let mut rng = SequenceRng::new(&[0.5, 0.5, 0.5, 0.0, 0.0]);
        p.respawn(&ParticleConfig::default(), &mut rng);
        assert_eq!(p.rgba(), [1.0, 0.5, 0.5, 1.0]);
    }
}
