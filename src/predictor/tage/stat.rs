
/// Container for [TAGEPredictor](super::TAGEPredictor) runtime stats.
///
/// Per-component vectors are indexed by component number minus one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEStats {
    /// Number of updates
    pub clk: usize,

    /// Correct predictions provided by the base component
    pub base_hits: usize,

    /// Misses in the base component
    pub base_miss: usize,

    /// Correct predictions provided by each tagged component
    pub comp_hits: Vec<usize>,

    /// Misses in the tagged components
    pub comp_miss: Vec<usize>,

    /// Successful allocations in each tagged component
    pub alcs: Vec<usize>,

    /// Failed allocations
    pub failed_alcs: usize,

    /// 'Useful' counters decremented after failed allocations
    pub penalties: usize,

    /// Number of times the alternate prediction was used as the output
    pub alt_used: usize,

    /// Number of 'useful' counter agings
    pub resets: usize,
}
impl TAGEStats {
    pub fn new(num_comp: usize) -> Self { 
        Self {
            clk: 0,
            base_hits: 0,
            base_miss: 0,
            comp_hits: vec![0; num_comp],
            comp_miss: vec![0; num_comp],
            alcs: vec![0; num_comp],
            failed_alcs: 0,
            penalties: 0,
            alt_used: 0,
            resets: 0,
        }
    }

    pub fn total_alcs(&self) -> usize { 
        self.alcs.iter().sum()
    }

    /// Number of predictions provided by the tagged components.
    pub fn tagged_provided(&self) -> usize { 
        self.comp_hits.iter().sum::<usize>() + self.comp_miss.iter().sum::<usize>()
    }
}
