//! A tagged geometric-history-length (TAGE) branch direction predictor.
//!
//! The predictor is driven by some external harness: each conditional
//! branch is predicted with [BranchPredictor::predict] and later resolved
//! with [BranchPredictor::update]. Unconditional branches only perturb
//! global history via [BranchPredictor::add_non_conditional_branch].

pub mod branch;
pub mod history;
pub mod predictor;
pub mod stats;

pub use branch::*;
pub use history::*;
pub use predictor::*;
