
use crate::Outcome;
use crate::history::*;
use crate::predictor::*;

/// Container for inputs passed to the tagged components of a 
/// [`TAGEPredictor`].
#[derive(Clone, Copy)]
pub struct TAGEInputs<'a> {
    /// Program counter associated with a predicted branch
    pub pc: u32,

    /// Global history used to form an index and tag
    pub ghr: &'a HistoryRegister,
}

/// A base component in the TAGE predictor: a table of bimodal counters
/// indexed by the low bits of the program counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEBaseComponent {
    pub cfg: TAGEBaseConfig,

    /// A table of saturating counters
    data: Vec<SaturatingCounter>,
}
impl TAGEBaseComponent {
    pub fn new(cfg: TAGEBaseConfig) -> Self {
        let data = vec![cfg.ctr.build(); cfg.size()];
        Self { cfg, data }
    }

    /// Get the predicted outcome for some program counter value.
    pub fn predict(&self, pc: u32) -> Outcome {
        self.get_entry(self.get_index(pc)).predict()
    }
}
impl PredictorTable for TAGEBaseComponent {
    type Input<'a> = u32;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, pc: u32) -> usize { 
        pc as usize & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter { 
        let index = idx & self.index_mask();
        &self.data[index]
    }
    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter { 
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}


/// An entry in some [TAGEComponent]. 
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEEntry {
    /// State machine tracking a branch outcome
    pub ctr: SaturatingCounter,

    /// The 'useful' counter, used to determine when the entry is 
    /// eligible to be replaced
    pub useful: SaturatingCounter,

    /// Tag associated with this entry
    pub tag: usize,
}
impl TAGEEntry { 
    pub fn new(ctr: SaturatingCounter, useful: SaturatingCounter) -> Self { 
        Self { ctr, useful, tag: 0 }
    }

    /// Get the current predicted outcome.
    pub fn predict(&self) -> Outcome {
        self.ctr.predict()
    }

    /// Returns true if the provided tag matches this entry. 
    pub fn tag_matches(&self, tag: usize) -> bool { 
        self.tag == tag
    }

    /// Take over this entry for a new branch. The prediction counter starts
    /// in the weakest 'taken' state; the 'useful' counter is left alone.
    pub fn allocate(&mut self, tag: usize) {
        self.ctr.set(self.ctr.midpoint());
        self.tag = tag;
    }

    /// Age the 'useful' counter.
    pub fn age(&mut self, aging: UsefulAging) {
        let aged = aging.apply(self.useful.value(), self.useful.bits());
        self.useful.set(aged);
    }
}

/// A tagged component in the TAGE predictor. 
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEComponent {
    pub cfg: TAGEComponentConfig,

    /// Position of this component, counting up from 1 by history length
    number: usize,

    /// Table of entries
    data: Vec<TAGEEntry>,
}
impl TAGEComponent {
    pub fn new(
        cfg: TAGEComponentConfig, 
        number: usize, 
        ctr: SaturatingCounterConfig,
        useful: SaturatingCounterConfig,
    ) -> Self 
    {
        assert!(number >= 1 && number <= cfg.index_bits);
        let entry = TAGEEntry::new(ctr.build(), useful.build());
        let data = vec![entry; cfg.size()];
        Self { cfg, number, data }
    }

    pub fn number(&self) -> usize { self.number }

    /// Amount the program counter is shifted by before being mixed into 
    /// the index. This differs between components so that a branch which
    /// collides in one component is unlikely to collide in the others.
    pub fn pc_shift(&self) -> usize {
        self.cfg.index_bits - self.number + 1
    }

    pub fn tag_mask(&self) -> usize { 
        (1 << self.cfg.tag_bits) - 1
    }

    pub fn entries(&self) -> &[TAGEEntry] { &self.data }

    pub fn num_useful_entries(&self) -> usize { 
        self.data.iter().filter(|e| !e.useful.is_zero()).count()
    }

    /// Age the 'useful' counter for all entries in this component.
    pub fn age_useful(&mut self, aging: UsefulAging) {
        for entry in self.data.iter_mut() {
            entry.age(aging);
        }
    }
}

impl PredictorTable for TAGEComponent {
    type Input<'a> = TAGEInputs<'a>;
    type Entry = TAGEEntry;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, input: TAGEInputs) -> usize { 
        let ghist_bits = input.ghr.fold(self.cfg.history_len, self.cfg.index_bits);
        let pc = input.pc as usize;
        (ghist_bits ^ pc ^ (pc >> self.pc_shift())) & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &TAGEEntry { 
        let index = idx & self.index_mask();
        &self.data[index]
    }
    fn get_entry_mut(&mut self, idx: usize) -> &mut TAGEEntry { 
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

impl TaggedPredictorTable for TAGEComponent {
    fn get_tag(&self, input: TAGEInputs) -> usize { 
        let ghist_bits = input.ghr.fold(self.cfg.history_len, self.cfg.tag_bits);
        (ghist_bits ^ input.pc as usize) & self.tag_mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(number: usize, history_len: usize, tag_bits: usize) 
        -> TAGEComponent 
    {
        TAGEComponent::new(
            TAGEComponentConfig::new(history_len, 10, tag_bits), 
            number,
            SaturatingCounterConfig::weakly_taken(3),
            SaturatingCounterConfig::zeroed(2),
        )
    }

    #[test]
    fn index_with_empty_history() {
        let ghr = HistoryRegister::new(150);
        let input = TAGEInputs { pc: 0x12345, ghr: &ghr };
        let expected = [0x30d, 0x3d4, 0x266, 0x103];
        for (i, exp) in expected.iter().enumerate() {
            let c = component(i + 1, 5, 8);
            assert_eq!(c.get_index(input), *exp, "component {}", i + 1);
        }
    }

    #[test]
    fn tag_with_empty_history() {
        let ghr = HistoryRegister::new(150);
        let input = TAGEInputs { pc: 0x12345, ghr: &ghr };
        assert_eq!(component(1, 5, 8).get_tag(input), 0x45);
        assert_eq!(component(3, 44, 9).get_tag(input), 0x145);
    }

    #[test]
    fn history_changes_index_and_tag() {
        let mut ghr = HistoryRegister::new(150);
        ghr.push(Outcome::T);
        let input = TAGEInputs { pc: 0, ghr: &ghr };
        let c = component(1, 5, 8);
        // A single taken bit at the head of a 5-bit window is the MSB of 
        // the only chunk.
        assert_eq!(c.get_index(input), 0b10000);
        assert_eq!(c.get_tag(input), 0b10000);
    }

    #[test]
    fn history_outside_the_window_is_ignored() {
        let mut ghr = HistoryRegister::new(150);
        ghr.push(Outcome::T);
        for _ in 0..5 {
            ghr.push(Outcome::N);
        }
        let input = TAGEInputs { pc: 0x40, ghr: &ghr };
        let c = component(1, 5, 8);
        assert_eq!(c.get_tag(input), 0x40);
    }

    #[test]
    fn allocation_resets_prediction_only() {
        let c = component(2, 15, 8);
        let mut entry = c.get_entry(0).clone();
        entry.ctr.set(0);
        entry.useful.set(0);
        entry.allocate(0x5a);
        assert_eq!(entry.ctr.value(), 4);
        assert_eq!(entry.predict(), Outcome::T);
        assert_eq!(entry.useful.value(), 0);
        assert!(entry.tag_matches(0x5a));
    }

    #[test]
    fn base_component_indexes_low_pc_bits() {
        let base = TAGEBaseConfig::default().build();
        assert_eq!(base.size(), 4096);
        assert_eq!(base.get_index(0xdead_beef), 0xeef);
        assert_eq!(base.predict(0xdead_beef), Outcome::T);
    }
}
