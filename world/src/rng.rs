//! Deterministic random stream shared by every actor.

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

#[derive(Clone, Debug)]
pub(crate) struct Random {
    state: u64,
}

impl Random {
    pub(crate) const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in `0..=255`.
    pub(crate) fn next_byte(&mut self) -> i32 {
        self.state = self
            .state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        ((self.state >> 33) & 0xff) as i32
    }

    /// Difference of two draws, in `-255..=255`.
    pub(crate) fn diff(&mut self) -> i32 {
        let first = self.next_byte();
        let second = self.next_byte();
        first - second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_seeds_produce_identical_streams() {
        let mut first = Random::new(7);
        let mut second = Random::new(7);
        for _ in 0..64 {
            assert_eq!(first.next_byte(), second.next_byte());
        }
    }

    #[test]
    fn draws_stay_within_a_byte() {
        let mut random = Random::new(0x1234);
        for _ in 0..256 {
            let value = random.next_byte();
            assert!((0..=255).contains(&value));
            assert!((-255..=255).contains(&random.diff()));
        }
    }
}
