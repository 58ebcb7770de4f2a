//! # Bookcase Solver Library
//!
//! This library provides the puzzle model for the bookcase sorting puzzle and a
//! Breadth First Search (BFS) solver that finds a shortest sequence of moves.
//!
//! A bookcase is a grid of shelves. Each shelf holds a left-packed row of colored
//! books. A move takes the rightmost book of one shelf and puts it on the first free
//! slot of another. The puzzle is solved when every shelf holds a single color and
//! no color is spread over two shelves.
//!
//! It is used by three binaries:
//! - `bookcase_solver`: reads a puzzle file and prints the length of the shortest
//!   solution, or every step of it in `verbose` mode.
//! - `bookcase_player`: lets a human play a puzzle from the command line.
//! - `bookcase_generator`: prints a random puzzle in the input format.
//!
//! ## Modules
//! - `engine`: `Book`, `Bookcase`, `Move`, move generation, the goal test and `Game`.
//! - `solver`: the search history, `solve_bfs` and report printing.
//! - `utils`: parsing and printing of the puzzle file format.
//! - `error`: error types returned by the other modules.

pub mod engine;
pub mod error;
pub mod solver;
pub mod utils;
