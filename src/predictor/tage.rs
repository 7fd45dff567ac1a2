//! Implementation of a "TAgged GEometric history length" (TAGE) predictor. 

pub mod component;
pub mod stat;
pub mod config;

pub use component::*;
pub use stat::*;
pub use config::*;

use log::{ debug, trace };
use rand::Rng;
use rand::rngs::StdRng;

use crate::history::*;
use crate::Outcome;
use crate::predictor::*;

/// Identifies a particular component in a [`TAGEPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TAGEProvider { 
    /// The base component
    Base, 

    /// A tagged component, numbered from 1 by increasing history length
    Tagged(usize), 
}
impl TAGEProvider {
    /// The component number, where the base component is 0.
    pub fn number(&self) -> usize {
        match self {
            Self::Base => 0,
            Self::Tagged(n) => *n,
        }
    }
}

/// Container for output from [`TAGEPredictor::lookup`], including the 
/// predicted outcome and other metadata about how the prediction was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TAGEPrediction {
    /// Program counter of the predicted branch
    pub pc: u32,

    /// The final predicted direction
    pub outcome: Outcome,

    /// The component providing the prediction
    pub provider: TAGEProvider,

    /// Predicted direction from the providing component
    pub provider_outcome: Outcome,

    /// The index identifying the entry used to make this prediction
    pub idx: usize,

    /// The tag matching the entry used to make this prediction
    pub tag: usize,

    /// Alternate component used to provide a prediction
    pub alt_provider: TAGEProvider,

    /// Predicted direction from the alternate component
    pub alt_outcome: Outcome,

    /// The index identifying the entry from the alternate component
    pub alt_idx: usize,

    /// Whether the providing entry was in one of the two weakest states
    pub weak: bool,

    /// Whether the alternate prediction was used as the final outcome
    pub used_alt: bool,
}


/// The "TAgged GEometric history length" predictor. 
///
/// See the following: 
///  - "A case for (partially) TAgged GEometric history length branch prediction" 
///  (Seznec, 2006).
///
/// Allocation decisions are drawn from 'R', so two predictors built with 
/// identically-seeded generators behave identically.
pub struct TAGEPredictor<R: Rng = StdRng> { 
    /// The configuration used to create this object
    cfg: TAGEConfig,

    stat: TAGEStats,

    /// Base component
    base: TAGEBaseComponent,

    /// Tagged components, by increasing history length
    comp: Vec<TAGEComponent>,

    /// Global history register
    ghr: HistoryRegister,

    /// Decides whether weak entries defer to the alternate prediction
    use_alt: SaturatingCounter,

    /// Conditional branches since the last usefulness aging
    num_branches: usize,

    /// The most recent prediction, waiting to be resolved
    pending: Option<TAGEPrediction>,

    rng: R,
}

impl <R: Rng> TAGEPredictor<R> {
    pub(crate) fn from_parts(
        cfg: TAGEConfig, 
        base: TAGEBaseComponent,
        comp: Vec<TAGEComponent>,
        ghr: HistoryRegister,
        use_alt: SaturatingCounter,
        stat: TAGEStats,
        rng: R,
    ) -> Self 
    {
        Self { 
            cfg, 
            stat, 
            base, 
            comp, 
            ghr, 
            use_alt, 
            num_branches: 0, 
            pending: None, 
            rng 
        }
    }

    fn get_component(&self, number: usize) -> &TAGEComponent {
        &self.comp[number - 1]
    }

    fn get_component_mut(&mut self, number: usize) -> &mut TAGEComponent {
        &mut self.comp[number - 1]
    }

    /// Read the predicted outcome from some entry in some component.
    fn component_outcome(&self, provider: TAGEProvider, idx: usize) -> Outcome {
        match provider {
            TAGEProvider::Base => self.base.get_entry(idx).predict(),
            TAGEProvider::Tagged(n) => self.get_component(n).get_entry(idx).predict(),
        }
    }

    /// Move the counter in some entry in some component towards 'outcome'.
    fn train_component(&mut self, provider: TAGEProvider, idx: usize, outcome: Outcome) {
        match provider {
            TAGEProvider::Base => {
                self.base.get_entry_mut(idx).update(outcome);
            },
            TAGEProvider::Tagged(n) => {
                self.get_component_mut(n).get_entry_mut(idx).ctr.update(outcome);
            },
        }
    }

    /// Given a program counter value and the provider of an incorrect 
    /// prediction, try to allocate an entry in a component with a longer 
    /// history than the provider.
    ///
    /// Returns the number of the component holding the new entry, or [None] 
    /// if we fail to allocate a new entry. 
    fn alloc(&mut self, pc: u32, provider: TAGEProvider) -> Option<usize> { 
        let first = provider.number() + 1;
        let last = self.num_tagged_components();

        // Early return: the provider already has the longest history.
        if first > last {
            return None;
        }

        // Locate the entry for this branch in each longer-history component.
        let input = TAGEInputs { pc, ghr: &self.ghr };
        let slots: Vec<(usize, usize, usize)> = (first..=last).map(|n| {
            let c = self.get_component(n);
            (n, c.get_index(input), c.get_tag(input))
        }).collect();

        // A component is only eligible when the entry associated with this
        // branch has its 'useful' counter set to zero. 
        let candidates: Vec<(usize, usize, usize)> = slots.iter().copied()
            .filter(|(n, idx, _)| {
                self.get_component(*n).get_entry(*idx).useful.is_zero()
            })
            .collect();

        // When every entry is useful, make each of them a little less so.
        // Eventually one of them will become eligible.
        if candidates.is_empty() {
            for (n, idx, _) in slots {
                self.get_component_mut(n).get_entry_mut(idx).useful.decrement();
                self.stat.penalties += 1;
            }
            trace!("alloc failed for pc={:08x} above component {}", pc, provider.number());
            return None;
        }

        // Skip ahead one candidate for every 'heads'. The shortest eligible
        // history is the most likely choice, but every candidate can win.
        let mut skip = 0;
        while self.rng.gen::<bool>() {
            skip += 1;
        }
        let (n, idx, tag) = candidates[skip % candidates.len()];
        self.get_component_mut(n).get_entry_mut(idx).allocate(tag);
        trace!("alloc pc={:08x} in component {} (idx={:03x}, tag={:03x})", 
            pc, n, idx, tag
        );
        Some(n)
    }

    /// Age the 'useful' counters in every tagged component.
    fn age_useful(&mut self) {
        let aging = self.cfg.aging;
        for comp in self.comp.iter_mut() {
            comp.age_useful(aging);
        }
        self.stat.resets += 1;
        debug!("aged useful counters ({:?}) after {} updates", aging, self.stat.clk);
    }

}

/// The public interface to a [`TAGEPredictor`].
impl <R: Rng> TAGEPredictor<R> {
    /// Return the number of tagged components.
    pub fn num_tagged_components(&self) -> usize { 
        self.comp.len()
    }

    pub fn config(&self) -> &TAGEConfig { &self.cfg }
    pub fn stats(&self) -> &TAGEStats { &self.stat }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
    pub fn base(&self) -> &TAGEBaseComponent { &self.base }
    pub fn components(&self) -> &[TAGEComponent] { &self.comp }

    /// Return some tagged component by number (starting from 1).
    pub fn component(&self, number: usize) -> Option<&TAGEComponent> { 
        number.checked_sub(1).and_then(|idx| self.comp.get(idx))
    }

    /// Current value of the global 'use_alt_on_na' counter.
    pub fn use_alt_on_na(&self) -> u8 { self.use_alt.value() }

    /// Number of conditional branches since usefulness was last aged.
    pub fn num_branches(&self) -> usize { self.num_branches }

    /// Make a prediction for the provided program counter value without 
    /// changing any state.
    pub fn lookup(&self, pc: u32) -> TAGEPrediction {
        let input = TAGEInputs { pc, ghr: &self.ghr };
        let base_idx = self.base.get_index(pc);

        // Find the longest-history tagged components that yield a match.
        // The first is the provider, the second is the alternate.
        let mut hits = self.comp.iter().rev().filter_map(|c| {
            let idx = c.get_index(input);
            let tag = c.get_tag(input);
            if c.get_entry(idx).tag_matches(tag) {
                Some((TAGEProvider::Tagged(c.number()), idx, tag))
            } else {
                None
            }
        });
        let (provider, idx, tag) = hits.next()
            .unwrap_or((TAGEProvider::Base, base_idx, 0));
        let (alt_provider, alt_idx, _) = hits.next()
            .unwrap_or((TAGEProvider::Base, base_idx, 0));

        let provider_outcome = self.component_outcome(provider, idx);
        let alt_outcome = self.component_outcome(alt_provider, alt_idx);

        let weak = match provider {
            TAGEProvider::Base => false,
            TAGEProvider::Tagged(n) => self.get_component(n).get_entry(idx).ctr.is_weak(),
        };
        let used_alt = match self.cfg.alt_policy {
            AltPolicy::Simple => false,
            AltPolicy::UseAltOnNewAlloc => {
                weak && self.use_alt.value() >= self.use_alt.midpoint()
            },
        };

        TAGEPrediction {
            pc,
            outcome: if used_alt { alt_outcome } else { provider_outcome },
            provider,
            provider_outcome,
            idx,
            tag,
            alt_provider,
            alt_outcome,
            alt_idx,
            weak,
            used_alt,
        }
    }

    /// Given a particular prediction and the resolved outcome, update the 
    /// state of the predictor. 
    pub fn train(&mut self, prediction: TAGEPrediction, outcome: Outcome) {
        let alt_policy = self.cfg.alt_policy;
        let p = prediction;

        // Update the entry in the component that provided the prediction
        match p.provider {
            TAGEProvider::Base => {
                self.base.get_entry_mut(p.idx).update(outcome);
                if p.provider_outcome == outcome {
                    self.stat.base_hits += 1;
                } else {
                    self.stat.base_miss += 1;
                }
            },
            TAGEProvider::Tagged(n) => {
                let entry = self.comp[n - 1].get_entry_mut(p.idx);

                // Until the provider has proven useful, keep the alternate
                // trained as a fallback.
                let train_alt = alt_policy == AltPolicy::UseAltOnNewAlloc 
                    && entry.useful.is_zero();

                entry.ctr.update(outcome);

                // The 'useful' counter only moves when the provider and the
                // alternate disagree.
                if p.provider_outcome != p.alt_outcome {
                    if p.provider_outcome == outcome {
                        entry.useful.increment();
                    } else {
                        entry.useful.decrement();
                    }
                    if alt_policy == AltPolicy::UseAltOnNewAlloc && p.weak {
                        if p.provider_outcome == outcome {
                            self.use_alt.decrement();
                        } else {
                            self.use_alt.increment();
                        }
                    }
                }

                if train_alt {
                    self.train_component(p.alt_provider, p.alt_idx, outcome);
                }

                if p.provider_outcome == outcome {
                    self.stat.comp_hits[n - 1] += 1;
                } else {
                    self.stat.comp_miss[n - 1] += 1;
                }
            },
        }
        if p.used_alt {
            self.stat.alt_used += 1;
        }

        // Try to allocate a new entry when the final prediction was wrong.
        if p.outcome != outcome {
            match self.alloc(p.pc, p.provider) {
                Some(n) => self.stat.alcs[n - 1] += 1,
                None => if p.provider.number() < self.num_tagged_components() {
                    self.stat.failed_alcs += 1;
                },
            }
        }

        self.ghr.push(outcome);

        // Periodically age *all* of the 'useful' counters across all 
        // tagged components. 
        self.num_branches += 1;
        if self.num_branches == self.cfg.useful_reset_interval {
            self.num_branches = 0;
            self.age_useful();
        }

        self.stat.clk += 1;
    }
}

impl <R: Rng> BranchPredictor for TAGEPredictor<R> {
    fn name(&self) -> &'static str { "TAGEPredictor" }

    fn predict(&mut self, pc: u32) -> Outcome {
        let prediction = self.lookup(pc);
        self.pending = Some(prediction);
        prediction.outcome
    }

    fn update(&mut self, pc: u32, outcome: Outcome) {
        let prediction = match self.pending.take() {
            Some(p) if p.pc == pc => p,
            _ => self.lookup(pc),
        };
        self.train(prediction, outcome);
    }

    fn add_non_conditional_branch(&mut self) {
        // A pending prediction was made with the old history.
        self.pending = None;
        self.ghr.push(Outcome::T);
    }
}
