//! Domain logic - pure release rules independent of git operations

pub mod describe;
pub mod outcome;
pub mod version;

pub use describe::TagDescription;
pub use outcome::{GateState, RollOutcome};
pub use version::{IncrementLevel, SemanticVersion};
