//! Binary constraint propagation between crossing slots: `revise` makes one slot consistent with
//! one neighbor, and `ac3` runs it to a fixpoint over the whole constraint graph.

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::domains::Domains;
use crate::puzzle::{Puzzle, SlotId};

/// A directed constraint: the options for `slot_id` need support from `other_slot_id`.
pub type SlotArc = (SlotId, SlotId);

/// Results from a call to `ac3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    pub revisions: u64,
    pub eliminations: u64,
}

/// `slot_id` is the slot whose options were exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    pub revisions: u64,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Data structure used in `ac3` to track which arcs we need to visit. An arc that is already
/// waiting in the queue isn't added a second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    queued: HashSet<SlotArc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
        where
            Items: IntoIterator<Item=SlotArc>
    {
        let mut queue = ConsistencyQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Make slot `x` arc-consistent with slot `y`: remove every option for `x` whose letter in the
/// shared cell doesn't appear in that cell for any remaining option of `y`. Returns whether
/// anything was removed. Slots that don't cross impose no constraint on each other, so this is a
/// no-op for them.
pub fn revise(puzzle: &Puzzle, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let (x_cell, y_cell) = match puzzle.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    let supported_glyphs = domains.glyph_counts_for_cell(puzzle, y, y_cell);

    let unsupported: Vec<_> = domains.iter(x).filter(|&word_id| {
        match puzzle.word(word_id).glyphs.get(x_cell) {
            Some(glyph) => !supported_glyphs.contains_key(glyph),
            None => true,
        }
    }).collect();

    for &word_id in &unsupported {
        trace!(
            target: "arc_consistency",
            "Removing {} from slot {} (no support in slot {})",
            puzzle.word(word_id).string, x, y,
        );
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// Enforce arc consistency with the AC-3 worklist algorithm. If `arcs` is `None`, we start from
/// every arc in the puzzle (each neighbor pair in both directions); otherwise we start from the
/// given arcs. Arcs are processed first-in first-out, and whenever a slot's domain shrinks, the
/// arcs pointing at it from its other neighbors are revisited.
///
/// Fails as soon as any domain is empty, including one that was empty before we started.
pub fn ac3(puzzle: &Puzzle, domains: &mut Domains, arcs: Option<&[SlotArc]>) -> ArcConsistencyResult {
    if let Some(slot_id) = domains.first_empty_slot() {
        return Err(ArcConsistencyFailure { slot_id, revisions: 0 });
    }

    let mut queue = match arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue(
            (0..puzzle.slot_count()).flat_map(|x| {
                puzzle.neighbors(x).iter().map(move |&y| (x, y))
            })
        ),
    };

    let mut revisions = 0;
    let mut eliminations = 0;

    while let Some((x, y)) = queue.pop_front() {
        let before = domains.len(x);
        revisions += 1;

        if !revise(puzzle, domains, x, y) {
            continue;
        }
        eliminations += (before - domains.len(x)) as u64;

        if domains.is_empty(x) {
            trace!(target: "arc_consistency", "Slot {} has no remaining options", x);
            return Err(ArcConsistencyFailure { slot_id: x, revisions });
        }

        for &z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions, eliminations })
}
