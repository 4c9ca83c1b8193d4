//! Seeded random helpers
//!
//! Every random draw in the simulation goes through the run's `Pcg32` so a
//! seed fully determines wave layouts, levels and velocities.

use rand::Rng;

/// Uniform integer in `[min, max]`, with a random sign when `signed` is set
pub fn random_integer<R: Rng>(rng: &mut R, min: i32, max: i32, signed: bool) -> i32 {
    let magnitude = rng.random_range(min..=max);
    if signed && rng.random_bool(0.5) {
        -magnitude
    } else {
        magnitude
    }
}

/// Uniform pick from `choices` (None when empty)
pub fn choose<'a, R: Rng, T>(rng: &mut R, choices: &'a [T]) -> Option<&'a T> {
    if choices.is_empty() {
        return None;
    }
    choices.get(rng.random_range(0..choices.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_unsigned_integer_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let value = random_integer(&mut rng, 10, 100, false);
            assert!((10..=100).contains(&value));
        }
    }

    #[test]
    fn test_signed_integer_covers_both_signs() {
        let mut rng = Pcg32::seed_from_u64(7);
        let values: Vec<i32> = (0..200)
            .map(|_| random_integer(&mut rng, 50, 100, true))
            .collect();
        assert!(values.iter().all(|v| (50..=100).contains(&v.abs())));
        assert!(values.iter().any(|v| *v < 0));
        assert!(values.iter().any(|v| *v > 0));
    }

    #[test]
    fn test_choose() {
        let mut rng = Pcg32::seed_from_u64(3);
        let empty: [u8; 0] = [];
        assert!(choose(&mut rng, &empty).is_none());
        let picked = choose(&mut rng, &[1, 2, 3]).copied();
        assert!(matches!(picked, Some(1..=3)));
    }
}
