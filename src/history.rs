//! Global branch history.

use bitvec::prelude::*;
use crate::branch::Outcome;

/// A fixed-length register of the most recent branch outcomes.
///
/// Index 0 always holds the newest outcome. Shifting a new outcome in moves
/// every bit towards the back of the register and discards the oldest one,
/// so the length never changes after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format 
// where the leftmost bit is the oldest (index n) and the rightmost bit is 
// the newest (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero. 
    pub fn new(len: usize) -> Self { 
        Self { 
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn data(&self) -> &BitSlice { self.data.as_bitslice() }
}

impl HistoryRegister {
    /// Shift a new outcome into the register. 
    pub fn push(&mut self, outcome: Outcome) {
        if self.len == 0 {
            return;
        }
        // The oldest bit wraps around to the front and is overwritten.
        self.data.rotate_right(1);
        self.data.set(0, outcome.is_taken());
    }

    /// Return the 'n' newest bits.
    pub fn newest(&self, n: usize) -> &BitSlice {
        &self.data[..n.min(self.len)]
    }

    /// Fold [with XOR] the newest 'len' bits into an 'output_bits'-wide value.
    ///
    /// The window is cut into consecutive 'output_bits'-sized chunks starting
    /// from the newest bit. Within a chunk, the newest bit is the most 
    /// significant. A trailing partial chunk is folded in as a narrower value.
    pub fn fold(&self, len: usize, output_bits: usize) -> usize { 
        assert!(output_bits > 0 && output_bits < usize::BITS as usize);
        let output_mask = (1 << output_bits) - 1;
        let res = self.newest(len).chunks(output_bits).fold(0, |res, chunk| {
            let val = chunk.iter().by_vals()
                .fold(0usize, |acc, b| (acc << 1) | b as usize);
            res ^ val
        });
        res & output_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a register whose newest-first contents are 'bits'.
    fn ghr_from(len: usize, bits: &[u8]) -> HistoryRegister {
        let mut ghr = HistoryRegister::new(len);
        for b in bits.iter().rev() {
            ghr.push(Outcome::from(*b != 0));
        }
        ghr
    }

    #[test]
    fn push_shifts_and_keeps_length() {
        let mut ghr = HistoryRegister::new(8);
        ghr.push(Outcome::T);
        ghr.push(Outcome::N);
        ghr.push(Outcome::T);
        assert_eq!(ghr.len(), 8);
        assert_eq!(ghr.data().len(), 8);
        assert_eq!(ghr.to_string(), "00000101");
        for _ in 0..100 {
            ghr.push(Outcome::T);
        }
        assert_eq!(ghr.data().len(), 8);
        assert_eq!(ghr.to_string(), "11111111");
    }

    #[test]
    fn push_discards_the_oldest_bit() {
        let mut ghr = HistoryRegister::new(4);
        ghr.push(Outcome::T);
        for _ in 0..3 {
            ghr.push(Outcome::N);
        }
        assert_eq!(ghr.to_string(), "1000");
        ghr.push(Outcome::N);
        assert_eq!(ghr.to_string(), "0000");
        assert_eq!(ghr.len(), 4);
    }

    #[test]
    fn fold_single_chunk() {
        let ghr = ghr_from(150, &[1, 0, 1, 1, 0]);
        assert_eq!(ghr.fold(5, 10), 0b10110);
    }

    #[test]
    fn fold_full_chunks() {
        let ghr = ghr_from(150, &[1, 0, 1, 1, 1, 0]);
        assert_eq!(ghr.fold(6, 3), 0b101 ^ 0b110);
    }

    #[test]
    fn fold_partial_chunk() {
        let ghr = ghr_from(150, &[1, 0, 1, 1, 1]);
        assert_eq!(ghr.fold(5, 3), 0b101 ^ 0b11);
    }

    #[test]
    fn fold_ignores_bits_outside_the_window() {
        let ghr = ghr_from(16, &[0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(ghr.fold(3, 8), 0);
        assert_eq!(ghr.fold(4, 8), 0b0001);
    }

    #[test]
    fn fold_window_longer_than_register() {
        let ghr = ghr_from(4, &[1, 1, 1, 1]);
        assert_eq!(ghr.fold(130, 2), 0b11 ^ 0b11);
    }
}
