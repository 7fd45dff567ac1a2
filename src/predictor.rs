//! Implementations of different branch predictors. 

pub mod table;
pub mod counter; 
pub mod tage;

pub use table::*;
pub use counter::*;
pub use tage::*;

use crate::Outcome;

/// Interface between a branch predictor and the harness driving it.
///
/// For every conditional branch, the harness calls [BranchPredictor::predict]
/// and later resolves the same branch with [BranchPredictor::update]. 
/// Unconditional branches are never predicted; they are only reported with
/// [BranchPredictor::add_non_conditional_branch].
pub trait BranchPredictor { 
    fn name(&self) -> &'static str;

    /// Return the predicted direction for the branch at 'pc'.
    fn predict(&mut self, pc: u32) -> Outcome;

    /// Train the predictor with the resolved direction of the branch at 'pc'.
    fn update(&mut self, pc: u32, outcome: Outcome);

    /// Record an unconditional branch in global history.
    fn add_non_conditional_branch(&mut self);
}
