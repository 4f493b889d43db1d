//! Random draws used by generation and combat
//!
//! Every roll in the workspace is a uniform `f64` in `[0, 1)` taken from a
//! caller-supplied [`Rng`]. Production code passes `thread_rng()` or a seeded
//! `ChaCha8Rng`; tests can pass a [`ScriptedRng`] to force specific outcomes.

use rand::{Error, Rng, RngCore};

/// A uniform draw in `[0, 1)`
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Returns true with probability `p`
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    unit(rng) < p
}

/// Uniform integer in `[min, max]` (inclusive); returns `min` when `max < min`
pub fn roll_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    let width = max - min;
    let span = (u64::from(width) + 1) as f64;
    let offset = ((unit(rng) * span).floor() as u64).min(u64::from(width));
    min + offset as u32
}

/// Choose one element uniformly
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let idx = (unit(rng) * items.len() as f64).floor() as usize;
    items.get(idx.min(items.len() - 1))
}

/// Weighted random choice
///
/// Draws uniformly in `[0, total)` and subtracts weights in list order until
/// the remainder is `<= 0`. The last element is the fallback for rounding
/// edge cases and for non-positive totals.
pub fn weighted_choice<'a, T, R, F>(rng: &mut R, items: &'a [T], weight: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let last = items.last()?;
    let total: f64 = items.iter().map(|item| weight(item).max(0.0)).sum();
    if total <= 0.0 {
        return Some(last);
    }

    let mut roll = unit(rng) * total;
    for item in items {
        roll -= weight(item).max(0.0);
        if roll <= 0.0 {
            return Some(item);
        }
    }

    Some(last)
}

/// Cumulative-threshold sampling
///
/// Walks `(value, probability)` pairs in order, accumulating probability; the
/// first bucket whose cumulative sum is `>= draw` wins. Remaining mass falls
/// to `default`.
pub fn cumulative_pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, buckets: &[(T, f64)], default: T) -> T {
    let draw = unit(rng);
    let mut cumulative = 0.0;
    for (value, probability) in buckets {
        cumulative += probability.max(0.0);
        if draw <= cumulative {
            return *value;
        }
    }
    default
}

/// An [`RngCore`] that replays scripted `[0, 1)` draws
///
/// Each `rng.gen::<f64>()` returns the next scripted value (to within one ulp
/// of 2^-53); the script repeats once exhausted. An empty script always yields
/// `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        ScriptedRng {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// A source that always returns the same draw
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    fn next_draw(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}

/// Encode a unit float so that rand's `Standard` f64 sampling (top 53 bits
/// of `next_u64`) decodes it back
fn encode_unit(value: f64) -> u64 {
    const SCALE: f64 = (1u64 << 53) as f64;
    let clamped = value.clamp(0.0, 1.0 - f64::EPSILON);
    ((clamped * SCALE) as u64) << 11
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let draw = self.next_draw();
        encode_unit(draw)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scripted_rng_replays_draws() {
        let mut rng = ScriptedRng::new(vec![0.25, 0.5, 0.75]);
        assert!((unit(&mut rng) - 0.25).abs() < 1e-12);
        assert!((unit(&mut rng) - 0.5).abs() < 1e-12);
        assert!((unit(&mut rng) - 0.75).abs() < 1e-12);
        // wraps around
        assert!((unit(&mut rng) - 0.25).abs() < 1e-12);
        assert_eq!(rng.consumed(), 4);
    }

    #[test]
    fn test_scripted_rng_stays_below_one() {
        let mut rng = ScriptedRng::constant(1.0);
        assert!(unit(&mut rng) < 1.0);
    }

    #[test]
    fn test_roll_int_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let n = roll_int(&mut rng, 2, 5);
            assert!((2..=5).contains(&n));
        }
        assert_eq!(roll_int(&mut rng, 3, 3), 3);
        assert_eq!(roll_int(&mut rng, 4, 1), 4);
    }

    #[test]
    fn test_roll_int_extremes() {
        assert_eq!(roll_int(&mut ScriptedRng::constant(0.0), 1, 3), 1);
        assert_eq!(roll_int(&mut ScriptedRng::constant(0.999), 1, 3), 3);
    }

    #[test]
    fn test_roll_int_full_u32_range() {
        assert_eq!(roll_int(&mut ScriptedRng::constant(0.0), 0, u32::MAX), 0);
        assert_eq!(roll_int(&mut ScriptedRng::constant(0.5), 0, u32::MAX), 1 << 31);
        assert_eq!(roll_int(&mut ScriptedRng::constant(1.0), 0, u32::MAX), u32::MAX);
        assert_eq!(roll_int(&mut ScriptedRng::constant(1.0), 1, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_weighted_choice_walks_in_order() {
        let items = [("a", 1.0), ("b", 1.0), ("c", 2.0)];
        // total 4: 0.1*4=0.4 -> a; 0.4*4=1.6 -> b; 0.9*4=3.6 -> c
        let mut rng = ScriptedRng::new(vec![0.1, 0.4, 0.9]);
        let w = |item: &(&str, f64)| item.1;
        assert_eq!(weighted_choice(&mut rng, &items, w).unwrap().0, "a");
        assert_eq!(weighted_choice(&mut rng, &items, w).unwrap().0, "b");
        assert_eq!(weighted_choice(&mut rng, &items, w).unwrap().0, "c");
    }

    #[test]
    fn test_weighted_choice_fallbacks() {
        let empty: [(&str, f64); 0] = [];
        let mut rng = ScriptedRng::constant(0.5);
        assert!(weighted_choice(&mut rng, &empty, |i| i.1).is_none());

        let zero = [("a", 0.0), ("b", 0.0)];
        assert_eq!(weighted_choice(&mut rng, &zero, |i| i.1).unwrap().0, "b");
    }

    #[test]
    fn test_cumulative_pick_defaults() {
        let buckets = [("legendary", 0.1), ("rare", 0.2)];
        assert_eq!(cumulative_pick(&mut ScriptedRng::constant(0.05), &buckets, "common"), "legendary");
        assert_eq!(cumulative_pick(&mut ScriptedRng::constant(0.25), &buckets, "common"), "rare");
        assert_eq!(cumulative_pick(&mut ScriptedRng::constant(0.5), &buckets, "common"), "common");
    }

    #[test]
    fn test_pick_uniform_edges() {
        let items = [1, 2, 3];
        assert_eq!(pick(&mut ScriptedRng::constant(0.0), &items), Some(&1));
        assert_eq!(pick(&mut ScriptedRng::constant(0.99), &items), Some(&3));
        let empty: [i32; 0] = [];
        assert_eq!(pick(&mut ScriptedRng::constant(0.5), &empty), None);
    }
}
