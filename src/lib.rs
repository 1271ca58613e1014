pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod puzzle;
pub mod render;
pub mod solver;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use backtracking_search::{Assignment, FillFailure, FillSuccess, SolveOptions, Statistics};
pub use domains::Domains;
pub use error::{PuzzleError, RenderError};
pub use puzzle::{Direction, Puzzle, SlotId, Variable, WordId};
pub use solver::Solver;
