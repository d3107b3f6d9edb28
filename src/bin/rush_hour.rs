use anyhow::{Context, Result};
use clap::Parser;
use log::error;
use rush_hour_solver::solver::{solve_bfs, SearchOutcome, Solution};
use rush_hour_solver::state::SearchState;
use rush_hour_solver::utils::{load_board_file, render_state};
use rush_hour_solver::Board;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file (size header followed by the grid rows)
    board_file: PathBuf,

    /// Wait for ENTER before showing each step of the solution
    #[clap(long)]
    step: bool,

    /// Only print the summary, not the boards
    #[clap(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .target(env_logger::Target::Stderr)
    .init();
}

fn wait_for_enter() -> Result<()> {
    print!("[Press ENTER to see the next step]");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}

fn print_steps(board: &mut Board, solution: &Solution, step: bool) -> Result<()> {
    for (i, state) in solution.path.iter().enumerate() {
        if step {
            wait_for_enter()?;
        }
        let highlight = match i {
            0 => {
                println!("Start:");
                None
            }
            _ => {
                let slide = solution.moves[i - 1];
                let orientation = board.car_geometry(slide.code)?.orientation;
                println!("Move {}: {}", i, slide.describe(orientation));
                Some(slide.code)
            }
        };
        println!("{}\n", render_state(board, state, highlight)?);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let mut board = load_board_file(&args.board_file)
        .with_context(|| format!("Failed to read board from file: {}", args.board_file.display()))?;
    println!(
        "Loaded board from {} (width = {}, height = {})\n",
        args.board_file.display(),
        board.width(),
        board.height()
    );
    if !args.quiet {
        println!("Initial board state:\n{}\n", board);
    }

    let root = SearchState::extract_from(&mut board).context("Invalid car layout")?;

    let start = Instant::now();
    let outcome = solve_bfs(&mut board, root).context("Search aborted")?;
    let elapsed = start.elapsed();

    match &outcome {
        SearchOutcome::Solved(solution) => {
            println!("Found solution!");
            println!("In {} moves", solution.move_count());
            println!("Explored {} states ({} generated)", solution.explored, solution.generated);
            println!("Elapsed seconds: {:.3}\n", elapsed.as_secs_f64());
            if !args.quiet {
                print_steps(&mut board, solution, args.step)?;
            }
        }
        SearchOutcome::Exhausted { explored, generated } => {
            println!("No solution found.");
            println!("Explored {} states ({} generated)", explored, generated);
            println!("Elapsed seconds: {:.3}", elapsed.as_secs_f64());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(&args) {
        // The log filter may be off; the reason must still reach the user.
        if log::log_enabled!(log::Level::Error) {
            error!("{:#}", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
