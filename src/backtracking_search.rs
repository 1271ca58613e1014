//! This module fills the grid with a depth-first backtracking search. Slots are chosen with the
//! "minimum remaining values" heuristic (ties go to the slot with the most crossings), words are
//! tried in "least constraining value" order, and, when inference is enabled, every tentative
//! choice is followed by an AC-3 pass over a private copy of the domains so that each branch of
//! the search sees its own pruning and nothing else's.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use instant::{Duration, Instant};
use log::{debug, trace};
use smallvec::SmallVec;

use crate::arc_consistency::{ac3, SlotArc};
use crate::domains::{Domains, GlyphCounts};
use crate::puzzle::{Puzzle, SlotId, WordId};
use crate::MAX_SLOT_LENGTH;

/// A mapping from slots to the words chosen for them. Partial during search; complete once every
/// slot in the puzzle has an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words_by_slot: BTreeMap<SlotId, WordId>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Assign a word to a slot, returning the word it replaces, if any.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        self.words_by_slot.insert(slot_id, word_id)
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        self.words_by_slot.remove(&slot_id)
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words_by_slot.get(&slot_id).copied()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.words_by_slot.contains_key(&slot_id)
    }

    pub fn len(&self) -> usize {
        self.words_by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words_by_slot.is_empty()
    }

    /// Iterate over `(slot, word)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item=(SlotId, WordId)> + '_ {
        self.words_by_slot.iter().map(|(&slot_id, &word_id)| (slot_id, word_id))
    }

    /// The text of the word assigned to the given slot.
    pub fn word<'a>(&self, puzzle: &'a Puzzle, slot_id: SlotId) -> Option<&'a str> {
        self.get(slot_id).map(|word_id| puzzle.word(word_id).string.as_str())
    }
}

/// Knobs for the search.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Re-establish arc consistency after every tentative choice, pruning a branch-local copy of
    /// the domains.
    pub inference: bool,

    /// Give up with `FillFailure::TimedOut` once this much time has passed.
    pub timeout: Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions {
        SolveOptions { inference: true, timeout: None }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub ac3_revisions: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub assignment: Assignment,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// The search was exhaustive: no assignment satisfies every constraint.
    NoSolution,

    /// The deadline passed before the search could finish. This says nothing about whether a
    /// solution exists.
    TimedOut,
}

/// Does the assignment have a word for every slot in the puzzle?
pub fn assignment_complete(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    (0..puzzle.slot_count()).all(|slot_id| assignment.contains(slot_id))
}

/// Is the (possibly partial) assignment free of conflicts? Every assigned word must fit its slot,
/// crossing slots must agree on their shared letter, and no word may be used twice.
pub fn consistent(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    let mut used_words: HashSet<WordId> = HashSet::with_capacity(assignment.len());

    for (slot_id, word_id) in assignment.iter() {
        let word = puzzle.word(word_id);

        if word.len() != puzzle.slot(slot_id).length {
            return false;
        }

        // Word ids are unique per string, so this also catches identical words in crossing
        // slots.
        if !used_words.insert(word_id) {
            return false;
        }

        for &neighbor in puzzle.neighbors(slot_id) {
            let neighbor_word_id = match assignment.get(neighbor) {
                Some(neighbor_word_id) => neighbor_word_id,
                None => continue,
            };

            if let Some((i, j)) = puzzle.overlap(slot_id, neighbor) {
                let neighbor_word = puzzle.word(neighbor_word_id);

                if word.glyphs.get(i) != neighbor_word.glyphs.get(j) {
                    return false;
                }
            }
        }
    }

    true
}

/// Return the options for `slot_id` in "least constraining value" order: ascending by the number
/// of options each one would rule out for the slot's unassigned neighbors. A neighbor's option is
/// ruled out if it disagrees with the candidate in the shared cell or is the same word. The sort
/// is stable, so ties stay in word order.
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &Domains,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    // For each unassigned neighbor: its id, the shared cell's index within our slot and within
    // the neighbor, and how many of the neighbor's options place each glyph in the shared cell.
    let neighbor_counts: SmallVec<[(SlotId, usize, usize, GlyphCounts); MAX_SLOT_LENGTH]> =
        puzzle.neighbors(slot_id).iter()
            .filter(|&&neighbor| !assignment.contains(neighbor))
            .filter_map(|&neighbor| {
                let (cell_idx, neighbor_cell_idx) = puzzle.overlap(slot_id, neighbor)?;
                let glyph_counts = domains.glyph_counts_for_cell(puzzle, neighbor, neighbor_cell_idx);
                Some((neighbor, cell_idx, neighbor_cell_idx, glyph_counts))
            })
            .collect();

    let mut scored: Vec<(usize, WordId)> = domains.iter(slot_id).map(|word_id| {
        let word = puzzle.word(word_id);

        let ruled_out: usize = neighbor_counts.iter().map(|&(neighbor, cell_idx, neighbor_cell_idx, ref glyph_counts)| {
            let glyph = word.glyphs.get(cell_idx);
            let compatible = glyph.and_then(|glyph| glyph_counts.get(glyph)).copied().unwrap_or(0);

            // The same word in the neighbor is ruled out as well. It only needs counting here if
            // its letter in the shared cell happens to match, since otherwise it's already
            // excluded from `compatible`.
            let duplicate_counted_as_compatible = glyph.is_some() &&
                domains.contains(neighbor, word_id) &&
                word.glyphs.get(neighbor_cell_idx) == glyph;

            domains.len(neighbor) - compatible + duplicate_counted_as_compatible as usize
        }).sum();

        (ruled_out, word_id)
    }).collect();

    scored.sort_by_key(|&(ruled_out, _)| ruled_out);
    scored.into_iter().map(|(_, word_id)| word_id).collect()
}

/// Choose the unassigned slot with the fewest remaining options, breaking ties by the number of
/// crossings (more is better) and then by slot id. Returns `None` if every slot is assigned or if
/// the chosen slot has nothing left to try.
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    let slot_id = (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| {
            (domains.len(slot_id), Reverse(puzzle.neighbors(slot_id).len()), slot_id)
        })?;

    if domains.is_empty(slot_id) {
        None
    } else {
        Some(slot_id)
    }
}

/// One level of the search: the slot being filled, the words left to try for it, and the domains
/// as they stood when we reached this slot.
struct Frame {
    slot_id: SlotId,
    candidates: Vec<WordId>,
    next_candidate: usize,
    domains: Rc<Domains>,
}

/// Search for a complete, consistent assignment starting from the given (already node- and
/// arc-consistent) domains. The recursion is kept on an explicit stack of `Frame`s; a slot's entry
/// in the assignment is always removed before its frame moves on to its next candidate, and a
/// frame's domains are dropped along with it, so backtracking undoes everything the abandoned
/// branch did.
pub fn backtracking_search(
    puzzle: &Puzzle,
    domains: &Domains,
    options: &SolveOptions,
    statistics: &mut Statistics,
) -> Result<Assignment, FillFailure> {
    let start = Instant::now();
    let deadline = options.timeout.map(|timeout| start + timeout);

    let mut assignment = Assignment::new();
    let mut stack: Vec<Frame> = vec![];

    // The domains for the next frame to open, if the last step accepted a choice (or we're just
    // getting started).
    let mut opening: Option<Rc<Domains>> = Some(Rc::new(domains.clone()));

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                debug!("Search timed out after {} states", statistics.states);
                return Err(FillFailure::TimedOut);
            }
        }

        if let Some(branch_domains) = opening.take() {
            statistics.states += 1;

            if assignment_complete(puzzle, &assignment) {
                return Ok(assignment);
            }

            match select_unassigned_variable(puzzle, &branch_domains, &assignment) {
                Some(slot_id) => {
                    let candidates = order_domain_values(puzzle, &branch_domains, slot_id, &assignment);
                    stack.push(Frame { slot_id, candidates, next_candidate: 0, domains: branch_domains });
                }
                None => {
                    trace!(target: "backtracking_search", "No selectable slot; backtracking");
                    statistics.backtracks += 1;
                }
            }
        }

        // Move the deepest frame on to its next viable candidate.
        let frame = match stack.last_mut() {
            Some(frame) => frame,
            None => return Err(FillFailure::NoSolution),
        };
        assignment.remove(frame.slot_id);

        while frame.next_candidate < frame.candidates.len() {
            let word_id = frame.candidates[frame.next_candidate];
            frame.next_candidate += 1;

            assignment.insert(frame.slot_id, word_id);
            if !consistent(puzzle, &assignment) {
                trace!(
                    target: "backtracking_search",
                    "Rejecting {} for slot {}: inconsistent", puzzle.word(word_id).string, frame.slot_id,
                );
                assignment.remove(frame.slot_id);
                continue;
            }

            if !options.inference {
                opening = Some(Rc::clone(&frame.domains));
                break;
            }

            let mut branch_domains = Domains::clone(&frame.domains);
            branch_domains.restrict_to(frame.slot_id, word_id);

            let arcs: SmallVec<[SlotArc; MAX_SLOT_LENGTH]> = puzzle.neighbors(frame.slot_id).iter()
                .filter(|&&neighbor| !assignment.contains(neighbor))
                .map(|&neighbor| (neighbor, frame.slot_id))
                .collect();

            match ac3(puzzle, &mut branch_domains, Some(arcs.as_slice())) {
                Ok(success) => {
                    statistics.ac3_revisions += success.revisions;
                    opening = Some(Rc::new(branch_domains));
                    break;
                }
                Err(failure) => {
                    statistics.ac3_revisions += failure.revisions;
                    trace!(
                        target: "backtracking_search",
                        "Rejecting {} for slot {}: slot {} would have no options",
                        puzzle.word(word_id).string, frame.slot_id, failure.slot_id,
                    );
                    assignment.remove(frame.slot_id);
                }
            }
        }

        // If nothing was accepted, this frame is exhausted; the next pass through the loop resumes
        // its parent.
        if opening.is_none() {
            debug!("Exhausted options for slot {}; backtracking", frame.slot_id);
            statistics.backtracks += 1;
            stack.pop();
        }
    }
}
