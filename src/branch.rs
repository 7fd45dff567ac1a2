//! Types for representing branches and branch outcomes. 

/// A branch outcome. 
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome { 
    /// Not taken
    N = 0,
    /// Taken
    T = 1 
}

impl Outcome { 
    pub fn from_bool(b: bool) -> Self { 
        match b { 
            true => Self::T,
            false => Self::N,
        }
    }

    pub fn is_taken(&self) -> bool { 
        matches!(self, Self::T)
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self { 
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome { 
    type Output = Self;
    fn not(self) -> Self { 
        match self { 
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self { 
        Self::from_bool(x)
    }
}

impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool { 
        x.is_taken()
    }
}

/// Distinguishes branches that are predicted from branches that only 
/// contribute to global history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A conditional branch: predicted, then resolved.
    Conditional,

    /// An unconditional jump, call or return: never predicted.
    Unconditional,
}

/// A record of branch execution, as produced by some pipeline model. 
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BranchRecord { 
    /// The program counter value for this branch
    pub pc: u32,

    /// The resolved direction of this branch
    pub outcome: Outcome,

    /// The type/kind of branch
    pub kind: BranchKind,
}
impl BranchRecord {
    pub fn conditional(pc: u32, outcome: Outcome) -> Self { 
        Self { pc, outcome, kind: BranchKind::Conditional }
    }

    pub fn unconditional(pc: u32) -> Self { 
        Self { pc, outcome: Outcome::T, kind: BranchKind::Unconditional }
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool { 
        self.kind == BranchKind::Conditional
    }
}
