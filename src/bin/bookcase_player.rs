use anyhow::{Context, Result};
use bookcase_solver::engine::{Bookcase, Game, Move};
use bookcase_solver::solver::hint;
use bookcase_solver::utils::parse_bookcase;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play a bookcase puzzle in the terminal", long_about = None)]
struct Args {
    /// Puzzle file to play; a random puzzle is used when omitted
    puzzle_file: Option<PathBuf>,

    /// Seed for the random puzzle
    #[clap(short, long, default_value_t = 514514)]
    seed: u64,
}

fn load_bookcase(args: &Args) -> Result<Bookcase> {
    match &args.puzzle_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read puzzle file {}", path.display()))?;
            parse_bookcase(&text).with_context(|| format!("Invalid puzzle file {}", path.display()))
        }
        None => Ok(Bookcase::new_random_with_seed(4, 4, 3, args.seed)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut game = Game::new_with_bookcase(load_bookcase(&args)?);
    println!("Welcome to Bookcase!");

    loop {
        println!("---------------------");
        println!("Steps: {}", game.steps());
        println!("{}", game.bookcase().to_string_with_highlight(None));

        if game.is_solved() {
            println!();
            println!("---------------------");
            println!("Sorted in {} moves!", game.steps());
            println!("---------------------");
            break;
        }

        print!("Enter your move (from to), 'h' for a hint, 'u' to undo, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                if game.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            "h" => match hint(game.bookcase())? {
                Some(mv) => {
                    println!("Try moving {}:", mv);
                    println!("{}", game.bookcase().to_string_with_highlight(Some(mv.from)));
                }
                None => println!("No solution is reachable from here. Try undoing."),
            },
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                let parsed = match parts.as_slice() {
                    [from, to] => from.parse::<usize>().ok().zip(to.parse::<usize>().ok()),
                    _ => None,
                };
                match parsed {
                    Some((from, to)) => match game.process_move(Move { from, to }) {
                        Ok(()) => println!("Move processed."),
                        Err(e) => println!("Invalid move: {}.", e),
                    },
                    None => println!("Invalid input format. Use 'from to', 'h', 'u' or 'q'."),
                }
            }
        }
    }
    Ok(())
}
