const STATE_INCREMENT: u32 = 0x6d2b_79f5;
const HASH_BASIS: u32 = 1_779_033_703;
const UNIT_RANGE: f64 = 4_294_967_296.0;

/// Deterministic pseudo-random generator producing floats in `[0, 1)`.
///
/// A seed string is folded into the initial 32-bit state with a string mixing
/// hash; every draw advances the state by a fixed increment and scrambles it
/// with xorshift-multiply rounds. The same seed always yields the same stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Creates a generator whose stream is fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: &str) -> Self {
        Self {
            state: hash_seed(seed),
        }
    }

    /// Creates a generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            state: rand::random(),
        }
    }

    /// Uses `seed` when present, entropy otherwise.
    #[must_use]
    pub fn from_optional_seed(seed: Option<&str>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    /// Draws the next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut mixed = self.state;
        mixed = (mixed ^ (mixed >> 15)).wrapping_mul(mixed | 1);
        mixed ^= mixed.wrapping_add((mixed ^ (mixed >> 7)).wrapping_mul(mixed | 61));
        f64::from(mixed ^ (mixed >> 14)) / UNIT_RANGE
    }

    /// Returns `true` with probability `probability`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Draws an integer uniformly from the inclusive range `[min, max]`.
    ///
    /// Empty ranges return `min` without consuming a draw.
    pub fn int_between(&mut self, min: i32, max: i32) -> i32 {
        let span = i64::from(max) - i64::from(min) + 1;
        if span <= 0 {
            return min;
        }
        let offset = (self.next_f64() * span as f64).floor() as i64;
        (i64::from(min) + offset.min(span - 1)) as i32
    }

    /// Draws an index uniformly from `0..len`, or `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = (self.next_f64() * len as f64).floor() as usize;
        Some(index.min(len - 1))
    }

    /// Picks a uniformly random element.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).and_then(|index| items.get(index))
    }

    /// Shuffles the slice in place with a Fisher–Yates pass from the back.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let swap_index = (self.next_f64() * (index + 1) as f64).floor() as usize;
            items.swap(index, swap_index.min(index));
        }
    }
}

fn hash_seed(seed: &str) -> u32 {
    let length = seed.encode_utf16().count() as u32;
    let mut hash = HASH_BASIS ^ length;
    for unit in seed.encode_utf16() {
        hash = (hash ^ u32::from(unit)).wrapping_mul(3_432_918_353);
        hash = hash.rotate_left(13);
    }
    hash = (hash ^ (hash >> 16)).wrapping_mul(2_246_822_507);
    hash = (hash ^ (hash >> 13)).wrapping_mul(3_266_489_909);
    hash ^ (hash >> 16)
}

#[cfg(test)]
mod tests {
    use super::SeededRng;

    #[test]
    fn same_seed_yields_identical_stream() {
        let mut first = SeededRng::from_seed("snake");
        let mut second = SeededRng::from_seed("snake");
        for _ in 0..64 {
            assert_eq!(first.next_f64().to_bits(), second.next_f64().to_bits());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut first = SeededRng::from_seed("snake");
        let mut second = SeededRng::from_seed("ladder");
        let first_draws: Vec<u64> = (0..8).map(|_| first.next_f64().to_bits()).collect();
        let second_draws: Vec<u64> = (0..8).map(|_| second.next_f64().to_bits()).collect();
        assert_ne!(first_draws, second_draws);
    }

    #[test]
    fn draws_stay_in_unit_interval() {
        let mut rng = SeededRng::from_seed("bounds");
        for _ in 0..1_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value), "draw {value} escaped [0, 1)");
        }
    }

    #[test]
    fn integer_helpers_respect_bounds() {
        let mut rng = SeededRng::from_seed("ints");
        for _ in 0..500 {
            let value = rng.int_between(-2, 3);
            assert!((-2..=3).contains(&value));
            let index = rng.index(7).expect("non-empty range");
            assert!(index < 7);
        }
        assert_eq!(rng.int_between(5, 4), 5);
        assert_eq!(rng.index(0), None);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut rng = SeededRng::from_seed("shuffle");
        let mut items = vec![1, 2, 3, 4, 5, 6];
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
    }
}
