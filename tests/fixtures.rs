use std::path::PathBuf;

use crossfill::backtracking_search::{assignment_complete, consistent};
use crossfill::render::render_text;
use crossfill::{Assignment, Domains, FillFailure, Puzzle, SolveOptions, Solver};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn load(structure: &str, words: &str) -> Puzzle {
    Puzzle::from_files(data_path(structure), data_path(words)).expect("failed to load fixture")
}

fn assert_valid_fill(puzzle: &Puzzle, assignment: &Assignment) {
    assert!(assignment_complete(puzzle, assignment));
    assert!(consistent(puzzle, assignment));

    let mut words: Vec<_> = assignment.iter().map(|(_, word_id)| word_id).collect();
    words.sort();
    words.dedup();
    assert_eq!(words.len(), puzzle.slot_count(), "a word was used twice");
}

#[test]
fn test_fill_structure0() {
    let puzzle = load("structure0.txt", "words0.txt");

    for inference in [true, false] {
        let mut solver = Solver::new(&puzzle);
        let success = solver
            .solve_with_options(&SolveOptions { inference, timeout: None })
            .expect("failed to find a fill");

        assert_valid_fill(&puzzle, &success.assignment);
        assert_eq!(
            render_text(&puzzle, &success.assignment),
            "█SIX█\n█E██F\n█V██I\n█E██V\n█NINE",
        );
    }
}

#[test]
fn test_fill_structure1() {
    let puzzle = load("structure1.txt", "words1.txt");
    let mut solver = Solver::new(&puzzle);

    let assignment = solver.solve().expect("failed to find a fill");

    assert_eq!(assignment.len(), 6);
    assert_valid_fill(&puzzle, &assignment);
}

#[test]
fn test_fill_fails_gracefully() {
    let structure = std::fs::read_to_string(data_path("structure0.txt")).unwrap();
    let puzzle = Puzzle::new(&structure, "one\ntwo\nthree\nfour\nsix\nseven\neight\nnine\nten").unwrap();

    for inference in [true, false] {
        let mut solver = Solver::new(&puzzle);

        assert_eq!(
            solver.solve_with_options(&SolveOptions { inference, timeout: None }).unwrap_err(),
            FillFailure::NoSolution,
        );
    }
}

/// Try every combination of node-consistent options and report whether any of them is a valid
/// fill.
fn brute_force_has_solution(puzzle: &Puzzle) -> bool {
    fn search(puzzle: &Puzzle, domains: &Domains, assignment: &mut Assignment, slot_id: usize) -> bool {
        if slot_id == puzzle.slot_count() {
            return consistent(puzzle, assignment);
        }

        for word_id in domains.iter(slot_id) {
            assignment.insert(slot_id, word_id);
            if search(puzzle, domains, assignment, slot_id + 1) {
                return true;
            }
        }
        assignment.remove(slot_id);

        false
    }

    let mut domains = Domains::new(puzzle);
    domains.enforce_node_consistency(puzzle);

    search(puzzle, &domains, &mut Assignment::new(), 0)
}

/// ___
/// _#_
/// ___
#[test]
fn test_search_agrees_with_brute_force() {
    let word_lists = [
        "bat\ntab\nbut\ntub\nbot\ntot\ntat\nbib\ntee\nbee",
        "bat\ntab\nbib",
        "aaa\naab\nbaa\nbab",
        "abc\ncba\naxa\ncxc\nbob",
        "sap\nole\nden\nsod\nale\npen\ncat",
        "cat\ndog",
        "",
    ];

    for words in word_lists {
        let puzzle = Puzzle::new("___\n_#_\n___", words).unwrap();
        let expected = brute_force_has_solution(&puzzle);

        for inference in [true, false] {
            let mut solver = Solver::new(&puzzle);
            let result = solver.solve_with_options(&SolveOptions { inference, timeout: None });

            match result {
                Ok(success) => {
                    assert!(expected, "found a fill brute force couldn't for {:?}", words);
                    assert_valid_fill(&puzzle, &success.assignment);
                }
                Err(failure) => {
                    assert_eq!(failure, FillFailure::NoSolution);
                    assert!(!expected, "missed a fill for {:?}", words);
                }
            }
        }
    }
}
