use instant::Instant;
use log::{debug, info};

use crate::arc_consistency::{self, ArcConsistencyResult, SlotArc};
use crate::backtracking_search::{
    self, backtracking_search, Assignment, FillFailure, FillSuccess, SolveOptions, Statistics,
};
use crate::domains::Domains;
use crate::puzzle::{Puzzle, SlotId, WordId};

/// A crossword solver for one puzzle. It owns the puzzle's domain store, which only ever shrinks:
/// node consistency and AC-3 prune it in place, while the search works on its own copies.
#[derive(Debug)]
pub struct Solver<'a> {
    puzzle: &'a Puzzle,
    domains: Domains,
}

impl<'a> Solver<'a> {
    pub fn new(puzzle: &'a Puzzle) -> Solver<'a> {
        Solver { puzzle, domains: Domains::new(puzzle) }
    }

    pub fn puzzle(&self) -> &'a Puzzle {
        self.puzzle
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Drop every word whose length doesn't match its slot. Returns the number of words removed.
    pub fn enforce_node_consistency(&mut self) -> usize {
        self.domains.enforce_node_consistency(self.puzzle)
    }

    /// Make slot `x` arc-consistent with slot `y`, returning whether `x`'s domain changed.
    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        arc_consistency::revise(self.puzzle, &mut self.domains, x, y)
    }

    /// Enforce arc consistency, starting from every arc in the puzzle or just the given ones.
    pub fn ac3(&mut self, arcs: Option<&[SlotArc]>) -> ArcConsistencyResult {
        arc_consistency::ac3(self.puzzle, &mut self.domains, arcs)
    }

    pub fn assignment_complete(&self, assignment: &Assignment) -> bool {
        backtracking_search::assignment_complete(self.puzzle, assignment)
    }

    pub fn consistent(&self, assignment: &Assignment) -> bool {
        backtracking_search::consistent(self.puzzle, assignment)
    }

    pub fn order_domain_values(&self, slot_id: SlotId, assignment: &Assignment) -> Vec<WordId> {
        backtracking_search::order_domain_values(self.puzzle, &self.domains, slot_id, assignment)
    }

    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        backtracking_search::select_unassigned_variable(self.puzzle, &self.domains, assignment)
    }

    /// Run the backtracking search over the current domains.
    pub fn backtrack(&self, options: &SolveOptions) -> Result<FillSuccess, FillFailure> {
        let mut statistics = Statistics::default();
        let start = Instant::now();

        let assignment = backtracking_search(self.puzzle, &self.domains, options, &mut statistics)?;
        statistics.duration = start.elapsed();

        Ok(FillSuccess { assignment, statistics })
    }

    /// Enforce node consistency and arc consistency, then search. Returns `None` if the puzzle
    /// has no solution.
    pub fn solve(&mut self) -> Option<Assignment> {
        self.solve_with_options(&SolveOptions::default()).ok().map(|success| success.assignment)
    }

    /// Like `solve`, but with explicit options, statistics, and a distinction between exhausting
    /// the search and running out of time.
    pub fn solve_with_options(&mut self, options: &SolveOptions) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.enforce_node_consistency();

        let initial_revisions = match self.ac3(None) {
            Ok(success) => {
                debug!(
                    "Initial arc consistency removed {} options; domain sizes: {:?}",
                    success.eliminations, self.domains.sizes(),
                );
                success.revisions
            }
            Err(failure) => {
                info!("No solution: slot {} has no viable options", failure.slot_id);
                return Err(FillFailure::NoSolution);
            }
        };

        let result = self.backtrack(options).map(|mut success| {
            success.statistics.ac3_revisions += initial_revisions;
            success.statistics.duration = start.elapsed();
            success
        });

        match &result {
            Ok(success) => info!("Found a fill: {:?}", success.statistics),
            Err(failure) => info!("Search failed: {:?}", failure),
        }

        result
    }
}
