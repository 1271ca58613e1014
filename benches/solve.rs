use crossfill::{Puzzle, SolveOptions, Solver};

use criterion::{criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    let structure0 = include_str!("../data/structure0.txt");
    let words0 = include_str!("../data/words0.txt");
    let structure1 = include_str!("../data/structure1.txt");
    let words1 = include_str!("../data/words1.txt");

    let puzzle0 = Puzzle::new(structure0, words0).expect("failed to parse puzzle");
    let puzzle1 = Puzzle::new(structure1, words1).expect("failed to parse puzzle");

    c.bench_function("parse_3x3_puzzle", |b| {
        b.iter(|| Puzzle::new(structure1, words1))
    });

    for (name, puzzle) in [("solve_structure0", &puzzle0), ("solve_3x3", &puzzle1)] {
        c.bench_function(name, |b| {
            b.iter(|| Solver::new(puzzle).solve())
        });

        c.bench_function(&format!("{}_without_inference", name), |b| {
            let options = SolveOptions { inference: false, timeout: None };
            b.iter(|| Solver::new(puzzle).solve_with_options(&options))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
