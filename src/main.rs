//! Polyomino Tiling Solver
//!
//! Covers a rectangular board with a set of pieces drawn in ASCII notation,
//! using every piece exactly once, and prints the tiling as a box-drawing
//! diagram.

use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use tiler::pieces::{self, CatalogPuzzle, Puzzle};
use tiler::render::format_solution;
use tiler::solver::{self, Outcome, SolverConfig};

/// Finds a tiling of a rectangular board with the given pieces.
#[derive(Parser)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Search worker threads [default: twice the available parallelism].
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle read from a file ("-" for stdin).
    Solve {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        height: usize,
        pieces: PathBuf,
    },
    /// Solve one of the built-in puzzles.
    Builtin {
        #[arg(value_enum)]
        name: Builtin,
    },
    /// Show orientation and placement counts for each piece.
    Inspect {
        #[arg(long)]
        width: usize,
        #[arg(long)]
        height: usize,
        pieces: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Builtin {
    /// Domino, monomino and L-tromino on a 3x2 board.
    Simple,
    /// Straight and square tetrominoes on a 5x4 board.
    Bars,
    /// The Meiji chocolate puzzle: twelve pentominoes on a 10x6 board.
    Meiji,
}

impl Builtin {
    fn puzzle(self) -> CatalogPuzzle {
        match self {
            Self::Simple => pieces::SIMPLE_PUZZLE,
            Self::Bars => pieces::BARS_PUZZLE,
            Self::Meiji => pieces::MEIJI_PUZZLE,
        }
    }
}

const EXIT_UNSOLVABLE: u8 = 1;
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli
        .workers
        .map_or_else(SolverConfig::default, SolverConfig::with_workers);

    match cli.command {
        Command::Solve {
            width,
            height,
            pieces,
        } => match load_puzzle(width, height, &pieces) {
            Some(puzzle) => run_solver(&puzzle, &config),
            None => ExitCode::from(EXIT_CONFIG),
        },
        Command::Builtin { name } => match name.puzzle().build() {
            Ok(puzzle) => run_solver(&puzzle, &config),
            Err(e) => {
                eprintln!("Cannot initialize puzzle: {}", e);
                ExitCode::from(EXIT_CONFIG)
            }
        },
        Command::Inspect {
            width,
            height,
            pieces,
        } => match load_puzzle(width, height, &pieces) {
            Some(puzzle) => {
                print!("{}", describe_pieces(&puzzle));
                ExitCode::SUCCESS
            }
            None => ExitCode::from(EXIT_CONFIG),
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Reads the piece notation from `path`, or stdin for `-`.
fn read_pieces(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Loads and validates a puzzle, reporting failures on stderr.
fn load_puzzle(width: usize, height: usize, path: &Path) -> Option<Puzzle> {
    let text = match read_pieces(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match Puzzle::parse(width, height, &text) {
        Ok(puzzle) => Some(puzzle),
        Err(e) => {
            eprintln!("Cannot initialize puzzle: {}", e);
            None
        }
    }
}

/// Solves the puzzle and prints the tiling.
fn run_solver(puzzle: &Puzzle, config: &SolverConfig) -> ExitCode {
    let report = solver::solve(puzzle, config);
    match report.outcome {
        Outcome::Solved(solution) => {
            if !solution.covers_board() {
                log::warn!("solution does not cover the board exactly");
            }
            print!("{}", format_solution(&solution));
            ExitCode::SUCCESS
        }
        Outcome::Unsolvable => {
            eprintln!(
                "Unsolvable: no tiling exists ({} states explored)",
                report.stats.states_expanded
            );
            ExitCode::from(EXIT_UNSOLVABLE)
        }
    }
}

/// One line per piece: identifier, size, orientations and placements.
fn describe_pieces(puzzle: &Puzzle) -> String {
    let mut output = format!("{}x{} board\n", puzzle.width(), puzzle.height());
    for piece in puzzle.pieces() {
        let _ = writeln!(
            output,
            "{}: cells={} orientations={} placements={}",
            piece.name(),
            piece.cell_count(),
            piece.orientations().len(),
            piece.placement_count()
        );
    }
    output
}
