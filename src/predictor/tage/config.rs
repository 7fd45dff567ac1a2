
use crate::history::*;
use crate::predictor::*;
use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

/// Widest index supported by any table.
pub const MAX_INDEX_BITS: usize = 24;

/// Widest tag supported by a tagged component.
pub const MAX_TAG_BITS: usize = 16;

/// Reasons a [`TAGEConfig`] cannot be turned into a predictor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TAGEConfigError {
    #[error("component {component}: history length {history_len} exceeds the {ghr_len}-bit history register")]
    HistoryTooLong { component: usize, history_len: usize, ghr_len: usize },

    #[error("component {component}: index width must be between 1 and 24 bits (got {bits})")]
    InvalidIndexWidth { component: usize, bits: usize },

    #[error("component {component}: tag width must be between 1 and 16 bits (got {bits})")]
    InvalidTagWidth { component: usize, bits: usize },

    #[error("component {component}: a {index_bits}-bit index leaves no pc shift for this component")]
    PcShiftUnderflow { component: usize, index_bits: usize },

    #[error("{name} counter must be between 1 and 8 bits wide (got {bits})")]
    InvalidCounterWidth { name: &'static str, bits: u8 },

    #[error("the usefulness aging interval must be non-zero")]
    ZeroResetInterval,
}

/// How the final prediction is chosen once a tagged component matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AltPolicy {
    /// Always use the prediction from the longest matching component.
    Simple,

    /// When the longest matching entry is weak, use the alternate 
    /// prediction instead if the global 'use_alt_on_na' counter says that
    /// alternate predictions have been more reliable for new entries.
    UseAltOnNewAlloc,
}

/// How 'useful' counters are aged when the periodic interval elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsefulAging {
    /// Shift every counter right by one bit.
    Halve,

    /// Clear the most-significant bit of every counter.
    ClearHighBit,
}
impl UsefulAging {
    /// Return the aged value of a 'bits'-wide counter.
    pub fn apply(&self, value: u8, bits: u8) -> u8 {
        match self {
            Self::Halve => value >> 1,
            Self::ClearHighBit => value & !(1 << (bits - 1)),
        }
    }
}

/// Configuration for a [`TAGEBaseComponent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEBaseConfig {
    /// Parameters for the saturating counters
    pub ctr: SaturatingCounterConfig,

    /// Number of index bits (the table has 2^index_bits entries)
    pub index_bits: usize,
}
impl Default for TAGEBaseConfig {
    fn default() -> Self {
        Self {
            ctr: SaturatingCounterConfig { bits: 2, init: 2 },
            index_bits: 12,
        }
    }
}
impl TAGEBaseConfig {
    /// Number of entries
    pub fn size(&self) -> usize { 1 << self.index_bits }

    /// Get the [approximate] number of storage bits. 
    pub fn storage_bits(&self) -> usize { 
        self.ctr.storage_bits() * self.size()
    }

    /// Use this configuration to create a new [`TAGEBaseComponent`].
    pub fn build(self) -> TAGEBaseComponent {
        TAGEBaseComponent::new(self)
    }
}

/// Configuration for a [`TAGEComponent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEComponentConfig {
    /// Number of global history bits used to form the index and tag
    pub history_len: usize,

    /// Number of index bits (the table has 2^index_bits entries)
    pub index_bits: usize,

    /// Number of tag bits
    pub tag_bits: usize,
}
impl TAGEComponentConfig {
    pub fn new(history_len: usize, index_bits: usize, tag_bits: usize) 
        -> Self 
    {
        Self { history_len, index_bits, tag_bits }
    }

    /// Number of entries
    pub fn size(&self) -> usize { 1 << self.index_bits }

    /// Get the [approximate] number of storage bits. 
    pub fn storage_bits(&self, ctr_bits: usize, useful_bits: usize) -> usize {
        (ctr_bits + useful_bits + self.tag_bits) * self.size()
    }
}

/// Configuration for a [`TAGEPredictor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEConfig {
    /// Length of the global history register
    pub ghr_len: usize,

    /// Base component configuration
    pub base: TAGEBaseConfig,

    /// Tagged component configurations, by increasing history length
    pub comp: Vec<TAGEComponentConfig>,

    /// Prediction counter in each tagged entry
    pub ctr: SaturatingCounterConfig,

    /// 'Useful' counter in each tagged entry
    pub useful: SaturatingCounterConfig,

    /// Global counter deciding when to trust the alternate prediction
    pub use_alt: SaturatingCounterConfig,

    /// Number of conditional branches between usefulness aging
    pub useful_reset_interval: usize,

    pub alt_policy: AltPolicy,
    pub aging: UsefulAging,
}

impl Default for TAGEConfig {
    /// Four tagged components with history lengths 5, 15, 44 and 130.
    fn default() -> Self {
        let mut cfg = Self::new(TAGEBaseConfig::default());
        for (history_len, tag_bits) in [(5, 8), (15, 8), (44, 9), (130, 9)] {
            cfg.add_component(
                TAGEComponentConfig::new(history_len, 10, tag_bits)
            );
        }
        cfg
    }
}

impl TAGEConfig {
    /// A configuration with no tagged components.
    pub fn new(base: TAGEBaseConfig) -> Self {
        Self {
            ghr_len: 150,
            base,
            comp: Vec::new(),
            ctr: SaturatingCounterConfig::weakly_taken(3),
            useful: SaturatingCounterConfig::zeroed(2),
            use_alt: SaturatingCounterConfig::weakly_taken(4),
            useful_reset_interval: 256_000,
            alt_policy: AltPolicy::Simple,
            aging: UsefulAging::Halve,
        }
    }

    pub fn with_alt_policy(mut self, alt_policy: AltPolicy) -> Self {
        self.alt_policy = alt_policy;
        self
    }

    pub fn with_aging(mut self, aging: UsefulAging) -> Self {
        self.aging = aging;
        self
    }

    pub fn with_reset_interval(mut self, interval: usize) -> Self {
        self.useful_reset_interval = interval;
        self
    }

    pub fn total_entries(&self) -> usize {
        let c: usize = self.comp.iter().map(|c| c.size()).sum();
        self.base.size() + c
    }

    /// Get the [approximate] number of storage bits. 
    pub fn storage_bits(&self) -> usize { 
        let ctr_bits = self.ctr.storage_bits();
        let useful_bits = self.useful.storage_bits();
        let c: usize = self.comp.iter()
            .map(|c| c.storage_bits(ctr_bits, useful_bits))
            .sum();
        c + self.base.storage_bits() + self.ghr_len + self.use_alt.storage_bits()
    }

    /// Add a tagged component to the predictor.
    ///
    /// Components are kept sorted by history length, so the component with
    /// the shortest history is always component 1.
    pub fn add_component(&mut self, c: TAGEComponentConfig) {
        self.comp.push(c);
        self.comp.sort_by_key(|c| c.history_len);
    }

    /// Check that every table can be indexed and every counter can be built.
    pub fn validate(&self) -> Result<(), TAGEConfigError> {
        let counters = [
            ("bimodal", self.base.ctr.bits),
            ("prediction", self.ctr.bits),
            ("useful", self.useful.bits),
            ("use-alt", self.use_alt.bits),
        ];
        for (name, bits) in counters {
            if bits == 0 || bits > 8 {
                return Err(TAGEConfigError::InvalidCounterWidth { name, bits });
            }
        }

        if self.base.index_bits == 0 || self.base.index_bits > MAX_INDEX_BITS {
            return Err(TAGEConfigError::InvalidIndexWidth { 
                component: 0, bits: self.base.index_bits 
            });
        }

        for (idx, c) in self.comp.iter().enumerate() {
            let component = idx + 1;
            if c.history_len > self.ghr_len {
                return Err(TAGEConfigError::HistoryTooLong { 
                    component, 
                    history_len: c.history_len, 
                    ghr_len: self.ghr_len,
                });
            }
            if c.index_bits == 0 || c.index_bits > MAX_INDEX_BITS {
                return Err(TAGEConfigError::InvalidIndexWidth { 
                    component, bits: c.index_bits 
                });
            }
            if c.tag_bits == 0 || c.tag_bits > MAX_TAG_BITS {
                return Err(TAGEConfigError::InvalidTagWidth { 
                    component, bits: c.tag_bits 
                });
            }
            if component > c.index_bits {
                return Err(TAGEConfigError::PcShiftUnderflow { 
                    component, index_bits: c.index_bits 
                });
            }
        }

        if self.useful_reset_interval == 0 {
            return Err(TAGEConfigError::ZeroResetInterval);
        }
        Ok(())
    }

    /// Use this configuration to create a new [`TAGEPredictor`] which draws
    /// allocation decisions from 'rng'.
    pub fn build<R: Rng>(self, rng: R) 
        -> Result<TAGEPredictor<R>, TAGEConfigError> 
    {
        self.validate()?;
        debug!("building TAGE predictor: {} tagged components, {} entries, {} storage bits",
            self.comp.len(), self.total_entries(), self.storage_bits()
        );

        let base = self.base.clone().build();
        let comp = self.comp.iter().enumerate()
            .map(|(idx, c)| TAGEComponent::new(c.clone(), idx + 1, self.ctr, self.useful))
            .collect::<Vec<TAGEComponent>>();
        let ghr = HistoryRegister::new(self.ghr_len);
        let use_alt = self.use_alt.build();
        let stat = TAGEStats::new(comp.len());
        Ok(TAGEPredictor::from_parts(self, base, comp, ghr, use_alt, stat, rng))
    }

    /// Create a new [`TAGEPredictor`] with a seeded [`StdRng`].
    pub fn build_seeded(self, seed: u64) 
        -> Result<TAGEPredictor<StdRng>, TAGEConfigError> 
    {
        self.build(StdRng::seed_from_u64(seed))
    }
}
