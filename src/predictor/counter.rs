//! Implementation of a saturating counter.

use crate::Outcome;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Width of the counter
    pub bits: u8,

    /// Value of the counter after construction or reset
    pub init: u8,
}
impl SaturatingCounterConfig {
    /// A counter initialized to the lowest 'taken' state.
    pub fn weakly_taken(bits: u8) -> Self { 
        Self { bits, init: 1 << (bits - 1) }
    }

    /// A counter initialized to zero.
    pub fn zeroed(bits: u8) -> Self { 
        Self { bits, init: 0 }
    }

    pub fn storage_bits(&self) -> usize {
        self.bits as usize
    }

    pub fn max(&self) -> u8 { 
        ((1u16 << self.bits) - 1) as u8
    }

    pub fn build(self) -> SaturatingCounter {
        assert!(self.bits > 0 && self.bits <= 8);
        SaturatingCounter {
            cfg: self,
            value: self.init.min(self.max()),
        }
    }
}

/// An N-bit unsigned counter which clamps at zero and at its maximum value.
///
/// When used to follow the behavior of a branch, the top bit is the 
/// predicted direction: values in the upper half of the range are 'taken'.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    value: u8,
}
impl SaturatingCounter {
    pub fn value(&self) -> u8 { self.value }
    pub fn bits(&self) -> u8 { self.cfg.bits }
    pub fn max(&self) -> u8 { self.cfg.max() }

    /// The lowest value in the upper half of the range.
    pub fn midpoint(&self) -> u8 { 1 << (self.cfg.bits - 1) }

    pub fn is_zero(&self) -> bool { self.value == 0 }
    pub fn is_saturated(&self) -> bool { self.value == self.max() }

    pub fn increment(&mut self) {
        if self.value < self.max() {
            self.value += 1;
        }
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    /// Set the counter to some value, clamped to the range of the counter.
    pub fn set(&mut self, val: u8) {
        self.value = val.min(self.max());
    }

    /// Reset the counter.
    pub fn reset(&mut self) { 
        self.value = self.cfg.init.min(self.max());
    }

    /// Return the direction encoded by the top bit.
    pub fn predict(&self) -> Outcome { 
        Outcome::from(self.value >= self.midpoint())
    }

    /// Returns 'true' when the counter sits on either side of the boundary 
    /// between 'not-taken' and 'taken'.
    pub fn is_weak(&self) -> bool {
        let mid = self.midpoint();
        self.value == mid || self.value == mid - 1
    }

    /// Move the counter towards the provided outcome.
    pub fn update(&mut self, outcome: Outcome) {
        match outcome { 
            Outcome::T => self.increment(),
            Outcome::N => self.decrement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_both_ends() {
        for bits in 1..=8u8 {
            let mut ctr = SaturatingCounterConfig::zeroed(bits).build();
            let max = ((1u16 << bits) - 1) as u8;
            for _ in 0..600 {
                ctr.increment();
                assert!(ctr.value() <= max);
            }
            assert_eq!(ctr.value(), max);
            assert!(ctr.is_saturated());
            for _ in 0..600 {
                ctr.decrement();
            }
            assert_eq!(ctr.value(), 0);
        }
    }

    #[test]
    fn three_bit_direction_and_weakness() {
        let mut ctr = SaturatingCounterConfig::weakly_taken(3).build();
        assert_eq!(ctr.value(), 4);
        assert_eq!(ctr.predict(), Outcome::T);
        assert!(ctr.is_weak());

        ctr.update(Outcome::N);
        assert_eq!(ctr.value(), 3);
        assert_eq!(ctr.predict(), Outcome::N);
        assert!(ctr.is_weak());

        ctr.update(Outcome::N);
        assert!(!ctr.is_weak());

        ctr.set(5);
        assert!(!ctr.is_weak());
        assert_eq!(ctr.predict(), Outcome::T);
    }

    #[test]
    fn two_bit_bimodal_states() {
        let mut ctr = SaturatingCounterConfig { bits: 2, init: 2 }.build();
        assert_eq!(ctr.predict(), Outcome::T);
        ctr.update(Outcome::N);
        assert_eq!(ctr.predict(), Outcome::N);
        ctr.update(Outcome::T);
        ctr.update(Outcome::T);
        ctr.update(Outcome::T);
        assert_eq!(ctr.value(), 3);
    }

    #[test]
    fn set_and_reset_are_clamped() {
        let mut ctr = SaturatingCounterConfig { bits: 2, init: 9 }.build();
        assert_eq!(ctr.value(), 3);
        ctr.set(200);
        assert_eq!(ctr.value(), 3);
        ctr.set(0);
        ctr.reset();
        assert_eq!(ctr.value(), 3);
    }
}
