//! Random sources for respawn sampling

/// A source of uniform floats in [0, 1).
///
/// The pool never reaches for global state; callers inject the source so
/// tests can replay exact sequences.
pub trait RandomSource {
    /// Returns a float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// A seed that differs from run to run, taken from the wall clock
pub fn time_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0xDEAD_BEEF)
}

/// Lightweight xorshift32 PRNG
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for ParticleRng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits fit the f32 mantissa exactly, so 1.0 is never produced
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Replays a fixed list of values, cycling when exhausted
#[cfg(test)]
pub(crate) struct SequenceRng {
    values: Vec<f32>,
    index: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub(crate) fn new(values: &[f32]) -> Self {
        Self {
            values: values.to_vec(),
            index: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        let v = self.values[self.index % self.values.len()];
        self.index += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_unit_interval() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(-2.5, 2.5);
            assert!((-2.5..2.5).contains(&v));
        }
    }

    #[test]
    fn rng_same_seed_same_sequence() {
        let mut a = ParticleRng::new(1234);
        let mut b = ParticleRng::new(1234);
        for _ in 0..100 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn zero_seed_is_not_stuck() {
        let mut rng = ParticleRng::new(0);
        let first = rng.next_f32();
        let second = rng.next_f32();
        assert_ne!(first, second);
    }

    #[test]
    fn sequence_rng_cycles() {
        let mut rng = SequenceRng::new(&[0.25, 0.5]);
        assert_eq!(rng.next_f32(), 0.25);
        assert_eq!(rng.next_f32(), 0.5);
        assert_eq!(rng.next_f32(), 0.25);
        assert!((rng.range(0.0, 4.0) - 2.0).abs() < 1e-6);
    }
}
