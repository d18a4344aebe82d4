//! Seeding and shared sampling helpers.
//!
//! A simulation draws every random number from one sequential stream, so a run is reproduced
//! exactly by reusing its seed. The default generator is [`SmallRng`]; any [`Rng`] can be
//! injected with [`Simulation::with_rng`](crate::simulation::Simulation::with_rng).
use log::info;
use rand::seq::SliceRandom;
pub use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeds a [`SmallRng`] with `seed`, or with a fresh seed from the operating system when `seed`
/// is `None`. Returns the generator and the seed that was used.
#[must_use]
pub fn rng_from_seed(seed: Option<u64>) -> (SmallRng, u64) {
    let seed = seed.unwrap_or_else(|| {
        let seed = rand::rng().random::<u64>();
        info!("no random seed given, using {seed}");
        seed
    });
    (SmallRng::seed_from_u64(seed), seed)
}

/// A random permutation of `0..len`.
pub fn shuffled_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_stream() {
        let (mut a, seed_a) = rng_from_seed(Some(42));
        let (mut b, seed_b) = rng_from_seed(Some(42));
        assert_eq!(seed_a, 42);
        assert_eq!(seed_b, 42);
        for _ in 0..10 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn unseeded_rng_reports_its_seed() {
        let (mut rng, seed) = rng_from_seed(None);
        let (mut replay, _) = rng_from_seed(Some(seed));
        assert_eq!(rng.random::<u64>(), replay.random::<u64>());
    }

    #[test]
    fn shuffled_indices_is_a_permutation() {
        let (mut rng, _) = rng_from_seed(Some(7));
        let mut order = shuffled_indices(50, &mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }
}
