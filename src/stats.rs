//! Helpers for collecting statistics.

use std::collections::*;
use crate::branch::*;
use bitvec::prelude::*;
use itertools::*;

/// Container for recording simple statistics while evaluating some model.
#[derive(Default)]
pub struct BranchStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<u32, BranchData>,

    /// Number of correct predictions
    pub global_hits: usize,

    /// Number of times any conditional branch was predicted
    pub global_brns: usize,
}
impl BranchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        if self.global_brns == 0 {
            return 0.0;
        }
        self.global_hits as f64 / self.global_brns as f64
    }

    /// Return the global miss count.
    pub fn global_miss(&self) -> usize { self.global_brns - self.global_hits }

    /// Record a prediction for some resolved branch.
    pub fn record(&mut self, record: &BranchRecord, prediction: Outcome) {
        let hit = prediction == record.outcome;
        self.global_brns += 1;
        if hit { self.global_hits += 1; }

        let data = self.get_mut(record.pc);
        data.occ += 1;
        data.pat.push(record.outcome.into());
        if hit { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: u32) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: u32) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the 'n' most frequent branches with a hit rate at or below
    /// 'max_rate', ignoring branches seen fewer than 'min_occ' times.
    pub fn get_low_rate_branches(&self, n: usize, min_occ: usize, max_rate: f64) 
        -> Vec<(u32, &BranchData)> 
    {
        self.data.iter()
            .filter(|(_, s)| s.occ >= min_occ && s.hit_rate() <= max_rate)
            .sorted_by(|x, y| x.1.occ.cmp(&y.1.occ))
            .rev()
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Default)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 {
            return 0.0;
        }
        self.hits as f64 / self.occ as f64
    }

    pub fn times_taken(&self) -> usize { 
        self.pat.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_hits_per_branch() {
        let mut stats = BranchStats::new();
        let a = BranchRecord::conditional(0x10, Outcome::T);
        let b = BranchRecord::conditional(0x20, Outcome::N);
        stats.record(&a, Outcome::T);
        stats.record(&a, Outcome::N);
        stats.record(&b, Outcome::N);
        assert_eq!(stats.global_brns, 3);
        assert_eq!(stats.global_hits, 2);
        assert_eq!(stats.global_miss(), 1);
        assert_eq!(stats.num_unique_branches(), 2);
        assert_eq!(stats.get(0x10).unwrap().hit_rate(), 0.5);
        assert_eq!(stats.get(0x10).unwrap().times_taken(), 2);

        let low = stats.get_low_rate_branches(8, 1, 0.6);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].0, 0x10);
    }
}
