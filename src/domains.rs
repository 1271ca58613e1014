use std::collections::HashMap;

use bit_set::BitSet;
use log::debug;

use crate::puzzle::{Puzzle, SlotId, WordId};

/// The set of words still considered possible for each slot, indexed by `SlotId`.
///
/// Search never mutates the solver's own `Domains`; each branch works on its own clone, so
/// dropping a branch's copy is all it takes to undo the pruning done along it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    by_slot: Vec<BitSet>,
}

/// How many remaining options in a slot place each glyph in a given cell.
pub type GlyphCounts = HashMap<char, usize>;

impl Domains {
    /// Start every slot off with every word in the puzzle's word list.
    pub fn new(puzzle: &Puzzle) -> Domains {
        let all_words: BitSet = (0..puzzle.words().len()).collect();

        Domains { by_slot: vec![all_words; puzzle.slot_count()] }
    }

    /// Remove every word whose length doesn't match the length of the slot it's a candidate for.
    /// Returns the number of words removed across all slots.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle) -> usize {
        let mut removed = 0;

        for (slot_id, domain) in self.by_slot.iter_mut().enumerate() {
            let length = puzzle.slot(slot_id).length;
            let before = domain.len();

            *domain = domain.iter().filter(|&word_id| puzzle.word(word_id).len() == length).collect();

            removed += before - domain.len();
        }

        debug!("Node consistency removed {} options; domain sizes: {:?}", removed, self.sizes());

        removed
    }

    pub fn slot_count(&self) -> usize {
        self.by_slot.len()
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.by_slot[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.by_slot[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].contains(word_id)
    }

    /// The remaining options for a slot, in ascending `WordId` order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item=WordId> + '_ {
        self.by_slot[slot_id].iter()
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].remove(word_id)
    }

    /// Narrow a slot's domain down to a single word.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) {
        let domain = &mut self.by_slot[slot_id];
        domain.clear();
        domain.insert(word_id);
    }

    /// Return the first slot whose domain has been wiped out, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.by_slot.iter().position(|domain| domain.is_empty())
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.by_slot.iter().map(|domain| domain.len()).collect()
    }

    /// Count how many of a slot's remaining options place each glyph in the given cell. Words too
    /// short to reach the cell don't contribute.
    pub fn glyph_counts_for_cell(&self, puzzle: &Puzzle, slot_id: SlotId, cell_idx: usize) -> GlyphCounts {
        let mut counts = GlyphCounts::new();

        for word_id in self.iter(slot_id) {
            if let Some(&glyph) = puzzle.word(word_id).glyphs.get(cell_idx) {
                *counts.entry(glyph).or_insert(0) += 1;
            }
        }

        counts
    }
}
