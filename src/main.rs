use std::process;

use anyhow::{ensure, Context, Result};
use clap::{App, Arg};
use crossfill::render::{render_text, save_image};
use crossfill::{FillFailure, Puzzle, SolveOptions, Solver};
use instant::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("crossfill")
        .about("Fill a crossword grid from a word list")
        .arg(
            Arg::with_name("structure")
                .value_name("STRUCTURE")
                .help("Grid structure file, with _ for fillable cells")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .help("Word list file, one word per line")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("output")
                .value_name("OUTPUT")
                .help("Where to save an image of the filled grid")
                .index(3),
        )
        .arg(
            Arg::with_name("no-inference")
                .long("no-inference")
                .help("Skip arc consistency after each choice during search"),
        )
        .arg(
            Arg::with_name("timeout")
                .short("t")
                .long("timeout")
                .value_name("SECONDS")
                .help("Give up after this many seconds")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("stats")
                .long("stats")
                .help("Print search statistics"),
        )
        .get_matches();

    let structure = matches.value_of("structure").expect("structure is required");
    let words = matches.value_of("words").expect("words is required");

    let timeout = match matches.value_of("timeout") {
        Some(seconds) => {
            let seconds: f64 = seconds.parse()
                .with_context(|| format!("invalid timeout `{}`", seconds))?;
            ensure!(seconds.is_finite() && seconds >= 0.0, "timeout must be a non-negative number of seconds");
            Some(Duration::from_secs_f64(seconds))
        }
        None => None,
    };

    let options = SolveOptions {
        inference: !matches.is_present("no-inference"),
        timeout,
    };

    let puzzle = Puzzle::from_files(structure, words).context("failed to load puzzle")?;
    let mut solver = Solver::new(&puzzle);

    match solver.solve_with_options(&options) {
        Ok(success) => {
            println!("{}", render_text(&puzzle, &success.assignment));

            if matches.is_present("stats") {
                println!("{:?}", success.statistics);
            }

            if let Some(output) = matches.value_of("output") {
                save_image(&puzzle, &success.assignment, output)
                    .with_context(|| format!("failed to save image to `{}`", output))?;
            }
        }
        Err(FillFailure::NoSolution) => println!("No solution."),
        Err(FillFailure::TimedOut) => {
            eprintln!("Timed out.");
            process::exit(2);
        }
    }

    Ok(())
}
