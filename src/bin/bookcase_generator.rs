use anyhow::{bail, ensure, Result};
use bookcase_solver::engine::{Bookcase, COLOR_COUNT, MAX_SIZE};
use bookcase_solver::solver::{solve_bfs, SearchLimits};
use bookcase_solver::utils::bookcase_to_file_string;
use clap::Parser;
use log::info;

const MAX_ATTEMPTS: u64 = 10_000;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Prints a random bookcase puzzle", long_about = None)]
struct Args {
    #[clap(short, long, default_value_t = 3)]
    rows: usize,

    #[clap(short, long, default_value_t = 3)]
    columns: usize,

    /// Number of distinct book colors to draw from
    #[clap(short = 'k', long, default_value_t = 3)]
    colors: usize,

    #[clap(short, long, default_value_t = 514514)]
    seed: u64,

    /// Keep drawing (seed, seed + 1, ...) until the puzzle is solvable
    #[clap(long)]
    solvable: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    ensure!(
        (1..=MAX_SIZE).contains(&args.rows) && (1..=MAX_SIZE).contains(&args.columns),
        "rows and columns must be between 1 and {}",
        MAX_SIZE
    );
    ensure!(
        (1..=COLOR_COUNT).contains(&args.colors),
        "colors must be between 1 and {}",
        COLOR_COUNT
    );

    let mut seed = args.seed;
    let mut attempts = 0;
    let bookcase = loop {
        if attempts == MAX_ATTEMPTS {
            bail!("no solvable puzzle found in {} seeds from {}", MAX_ATTEMPTS, args.seed);
        }
        attempts += 1;
        let candidate = Bookcase::new_random_with_seed(args.rows, args.columns, args.colors, seed);
        if !args.solvable {
            break candidate;
        }
        let result = solve_bfs(&candidate, &SearchLimits::default())?;
        if result.outcome.solution().is_some() {
            info!("seed {} gives a solvable puzzle", seed);
            break candidate;
        }
        seed = seed.wrapping_add(1);
    };

    print!("{}", bookcase_to_file_string(&bookcase));
    Ok(())
}
