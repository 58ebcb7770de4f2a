use anyhow::{Context, Result};
use bookcase_solver::solver::{solve_bfs, write_report, SearchLimits};
use bookcase_solver::utils::parse_bookcase;
use clap::{Parser, ValueEnum};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Print every bookcase along the solution
    Verbose,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file ("<rows> <columns>" header, then one line per row)
    puzzle_file: PathBuf,

    /// Report mode; only `verbose` is accepted
    #[clap(value_enum)]
    mode: Option<Mode>,

    /// Override the depth bound derived from the number of rows
    #[clap(long)]
    depth_limit: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.puzzle_file)
        .with_context(|| format!("Failed to read puzzle file {}", args.puzzle_file.display()))?;
    let root = parse_bookcase(&text)
        .with_context(|| format!("Invalid puzzle file {}", args.puzzle_file.display()))?;
    info!("loaded {}x{} bookcase from {}", root.rows(), root.columns(), args.puzzle_file.display());

    let limits = SearchLimits {
        depth_bound: args.depth_limit,
    };
    let result = solve_bfs(&root, &limits)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &result.outcome, args.mode == Some(Mode::Verbose))?;
    out.flush()?;
    Ok(())
}
