//! The static side of a crossword: which cells can be filled, the slots (variables) those cells
//! form, how slots cross each other, and the words that are candidates for them. Nothing here
//! changes once a `Puzzle` has been built.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use log::{debug, info};
use smallvec::SmallVec;

use crate::error::PuzzleError;
use crate::{MAX_SLOT_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given slot, based on its index in the Puzzle's `variables` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the Puzzle's `words` field. Words are
/// stored in sorted order, so comparing ids compares the words themselves.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A slot in the grid: a maximal run of two or more fillable cells in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length).map(|cell_idx| {
            match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            }
        }).collect()
    }
}

/// A candidate word, along with its characters split out so that we can index them by cell.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// The number of characters (not bytes) in the word.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

pub struct Puzzle {
    height: usize,
    width: usize,
    structure: Vec<Vec<bool>>,
    variables: Vec<Variable>,
    crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>>,
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,
    words: Vec<Word>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Puzzle")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("variables", &self.variables)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl Puzzle {
    /// Build a puzzle from the text of a structure description, where `_` marks a fillable cell
    /// and anything else marks a block, and the text of a word list with one word per line.
    pub fn new(structure: &str, words: &str) -> Result<Puzzle, PuzzleError> {
        let structure = parse_structure(structure)?;
        let height = structure.len();
        let width = structure[0].len();

        let variables = find_variables(&structure)?;
        let crossings = build_crossings(&variables);

        let neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> = crossings.iter().map(|slot_crossings| {
            slot_crossings.iter().flatten().map(|crossing| crossing.other_slot_id).collect()
        }).collect();

        let words = parse_words(words);

        info!(
            "Loaded {}x{} puzzle with {} slots and {} candidate words",
            height, width, variables.len(), words.len(),
        );

        Ok(Puzzle { height, width, structure, variables, crossings, neighbors, words })
    }

    /// Read the structure and word list from the given files.
    pub fn from_files<S: AsRef<Path>, W: AsRef<Path>>(
        structure_path: S,
        words_path: W,
    ) -> Result<Puzzle, PuzzleError> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| PuzzleError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let structure = read(structure_path.as_ref())?;
        let words = read(words_path.as_ref())?;

        Puzzle::new(&structure, &words)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Can the cell at the given coords hold a letter? Coords outside the grid are treated as
    /// blocks.
    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn slot_count(&self) -> usize {
        self.variables.len()
    }

    pub fn slot(&self, slot_id: SlotId) -> &Variable {
        &self.variables[slot_id]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, ignoring case.
    pub fn find_word(&self, word: &str) -> Option<WordId> {
        let word = word.trim().to_uppercase();
        self.words.binary_search_by(|candidate| candidate.string.as_str().cmp(&word)).ok()
    }

    /// Per-cell crossings for the given slot; `None` for cells that no other slot passes through.
    pub fn crossings(&self, slot_id: SlotId) -> &[Option<Crossing>] {
        &self.crossings[slot_id]
    }

    /// The slots that share a cell with the given slot.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// If slots `x` and `y` share a cell, return `(i, j)` such that character `i` of `x`'s word
    /// must equal character `j` of `y`'s word.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.crossings[x].iter().enumerate().find_map(|(cell_idx, crossing)| {
            match crossing {
                Some(crossing) if crossing.other_slot_id == y => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            }
        })
    }
}

/// Turn the structure text into a rectangular matrix of fillable flags. Rows shorter than the
/// widest one are padded with blocks.
fn parse_structure(structure: &str) -> Result<Vec<Vec<bool>>, PuzzleError> {
    let mut rows: Vec<Vec<bool>> =
        structure.lines().map(|line| line.chars().map(|c| c == '_').collect()).collect();

    while rows.last().map(|row| row.is_empty()).unwrap_or(false) {
        rows.pop();
    }

    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    if !rows.iter().flatten().any(|&fillable| fillable) {
        return Err(PuzzleError::EmptyStructure);
    }

    for row in &mut rows {
        row.resize(width, false);
    }

    Ok(rows)
}

/// Find every slot in the grid, across slots first and then down slots, each in row-major order
/// of their starting cells.
fn find_variables(structure: &[Vec<bool>]) -> Result<Vec<Variable>, PuzzleError> {
    let fillable = |row: usize, col: usize| {
        structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    };

    let mut variables: Vec<Variable> = vec![];

    for direction in [Direction::Across, Direction::Down] {
        for (row, cells) in structure.iter().enumerate() {
            for col in 0..cells.len() {
                let starts_run = fillable(row, col) && match direction {
                    Direction::Across => col == 0 || !fillable(row, col - 1),
                    Direction::Down => row == 0 || !fillable(row - 1, col),
                };
                if !starts_run {
                    continue;
                }

                let length = (0..).take_while(|&offset| match direction {
                    Direction::Across => fillable(row, col + offset),
                    Direction::Down => fillable(row + offset, col),
                }).count();

                if length < 2 {
                    continue;
                }
                if length > MAX_SLOT_LENGTH {
                    return Err(PuzzleError::SlotTooLong { length, max: MAX_SLOT_LENGTH });
                }

                variables.push(Variable { row, col, direction, length });
            }
        }
    }

    if variables.len() > MAX_SLOT_COUNT {
        return Err(PuzzleError::TooManySlots { count: variables.len(), max: MAX_SLOT_COUNT });
    }

    Ok(variables)
}

/// Build a map from cell location to the slots passing through it, and use that to work out which
/// slot (if any) crosses each cell of each slot.
fn build_crossings(variables: &[Variable]) -> Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>> {
    // (slot id, cell index within slot)
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();

    for (slot_id, variable) in variables.iter().enumerate() {
        for (cell_idx, loc) in variable.cell_coords().into_iter().enumerate() {
            entries_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
        }
    }

    variables.iter().enumerate().map(|(slot_id, variable)| {
        variable.cell_coords().iter().map(|loc| {
            // Slots running in the same direction can't share a cell, so there's at most one
            // other entry here.
            entries_by_loc[loc].iter()
                .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                .map(|&(other_slot_id, other_slot_cell)| Crossing { other_slot_id, other_slot_cell })
        }).collect()
    }).collect()
}

/// Normalize the word list: trim, uppercase, drop blanks and duplicates, and sort.
fn parse_words(words: &str) -> Vec<Word> {
    let unique: BTreeSet<String> = words.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_uppercase())
        .collect();

    debug!("Parsed {} distinct words", unique.len());

    unique.into_iter().map(Word::new).collect()
}

#[cfg(test)]
mod tests {
    use crate::error::PuzzleError;
    use crate::puzzle::{Direction, Puzzle, Variable};

    ///   #___#
    ///   #_##_
    ///   #_##_
    ///   #_##_
    ///   #____
    const STRUCTURE: &str = "#___#\n#_##_\n#_##_\n#_##_\n#____\n";

    #[test]
    fn test_variables_are_extracted_across_then_down() {
        let puzzle = Puzzle::new(STRUCTURE, "one\ntwo").unwrap();

        assert_eq!(puzzle.height(), 5);
        assert_eq!(puzzle.width(), 5);
        assert_eq!(puzzle.variables(), &[
            Variable { row: 0, col: 1, direction: Direction::Across, length: 3 },
            Variable { row: 4, col: 1, direction: Direction::Across, length: 4 },
            Variable { row: 0, col: 1, direction: Direction::Down, length: 5 },
            Variable { row: 1, col: 4, direction: Direction::Down, length: 4 },
        ]);
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let puzzle = Puzzle::new(STRUCTURE, "one").unwrap();

        assert_eq!(puzzle.overlap(0, 2), Some((0, 0)));
        assert_eq!(puzzle.overlap(2, 0), Some((0, 0)));
        assert_eq!(puzzle.overlap(1, 2), Some((0, 4)));
        assert_eq!(puzzle.overlap(2, 1), Some((4, 0)));
        assert_eq!(puzzle.overlap(1, 3), Some((3, 3)));
        assert_eq!(puzzle.overlap(0, 1), None);
        assert_eq!(puzzle.overlap(0, 3), None);

        assert_eq!(puzzle.neighbors(0), &[2]);
        assert_eq!(puzzle.neighbors(1), &[2, 3]);
        assert_eq!(puzzle.neighbors(2), &[0, 1]);
        assert_eq!(puzzle.neighbors(3), &[1]);
    }

    #[test]
    fn test_short_rows_are_padded_with_blocks() {
        let puzzle = Puzzle::new("___\n_\n_\n\n", "cat").unwrap();

        assert_eq!(puzzle.height(), 3);
        assert_eq!(puzzle.width(), 3);
        assert!(puzzle.is_fillable(1, 0));
        assert!(!puzzle.is_fillable(1, 1));
        assert!(!puzzle.is_fillable(7, 7));
        assert_eq!(puzzle.slot_count(), 2);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let puzzle = Puzzle::new("_#_\n###\n_#_", "a").unwrap();

        assert_eq!(puzzle.slot_count(), 0);
    }

    #[test]
    fn test_words_are_normalized() {
        let puzzle = Puzzle::new("___", "  dog\ncat\n\nCAT\nÉté\n").unwrap();

        let strings: Vec<_> = puzzle.words().iter().map(|word| word.string.as_str()).collect();
        assert_eq!(strings, vec!["CAT", "DOG", "ÉTÉ"]);
        assert_eq!(puzzle.word(2).len(), 3);
        assert_eq!(puzzle.find_word("dog"), Some(1));
        assert_eq!(puzzle.find_word("bird"), None);
    }

    #[test]
    fn test_structure_without_fillable_cells_is_rejected() {
        assert!(matches!(Puzzle::new("###\n###", "cat"), Err(PuzzleError::EmptyStructure)));
        assert!(matches!(Puzzle::new("", "cat"), Err(PuzzleError::EmptyStructure)));
    }

    #[test]
    fn test_overlong_slot_is_rejected() {
        let structure = "_".repeat(30);

        assert!(matches!(
            Puzzle::new(&structure, "cat"),
            Err(PuzzleError::SlotTooLong { length: 30, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = Puzzle::from_files("/nonexistent/structure.txt", "/nonexistent/words.txt");

        assert!(matches!(result, Err(PuzzleError::Io { .. })));
    }
}
