mod board;
mod game;
mod puzzle;
mod reach;
mod render;
mod solver;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::{debug, info, trace};

use crate::{
    board::Position,
    game::{BoardStatus, PushMove},
    puzzle::Puzzle,
    reach::NeighborOrder,
    render::{ExportError, Scene},
    solver::{Event, SolveResult, Solver, SolverConfig, Tracer},
};

fn print_solution(puzzle: &Puzzle, solution: &[PushMove]) {
    let mut status = puzzle.initial_status();
    println!(
        "\nStarting position:\n{}",
        Scene::new(&status, puzzle.targets())
    );
    let total = solution.len();
    for (count, &push) in solution.iter().enumerate() {
        status.update(push);
        println!(
            "Push box {} {} ({}/{}):\n{}",
            push.box_pos,
            push.direction,
            count + 1,
            total,
            Scene::new(&status, puzzle.targets())
        );
    }
}

struct VerboseTracer {
    trace_range: Option<(usize, usize)>,
    targets: Vec<Position>,
}

impl VerboseTracer {
    fn new(trace_range: Option<(usize, usize)>, targets: &[Position]) -> Self {
        Self {
            trace_range,
            targets: targets.to_vec(),
        }
    }
}

impl Tracer for VerboseTracer {
    fn trace(&self, event: Event, status: &BoardStatus, steps: usize) {
        trace!("step={} event={:?} player={}", steps, event, status.player);

        if let Some((trace_start, trace_end)) = self.trace_range {
            if trace_start <= steps && steps <= trace_end {
                println!(
                    "event={:?}, player={}, step={}:\n{}",
                    event,
                    status.player,
                    steps,
                    Scene::new(status, &self.targets)
                );
            }
        }
    }
}

struct PuzzleStats {
    solved: bool,
    pushes: usize,
    steps: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    name: String,
    max_steps: Option<usize>,
    shuffle_seed: Option<u64>,
    print_solution: bool,
    export_dir: Option<PathBuf>,
    block_size: u32,
    trace_range: Option<(usize, usize)>,
}

fn solve_puzzle(puzzle: &Puzzle, opts: SolveOpts) -> Result<PuzzleStats, ExportError> {
    let neighbor_order = match opts.shuffle_seed {
        Some(seed) => NeighborOrder::shuffled(seed),
        None => NeighborOrder::Fixed,
    };
    let config = SolverConfig {
        max_steps: opts.max_steps,
        neighbor_order,
    };
    let tracer = VerboseTracer::new(opts.trace_range, puzzle.targets());
    let mut solver = Solver::new(puzzle, config).with_tracer(tracer);

    debug!(
        "solving {} ({}x{}, player at {}, {} targets)",
        opts.name,
        puzzle.board().width(),
        puzzle.board().height(),
        puzzle.player(),
        puzzle.targets().len()
    );
    let start = Instant::now();
    let result = solver.solve();
    let elapsed_ms = start.elapsed().as_millis();

    let (solved_char, pushes, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Aborted => ('N', 0, false),
        SolveResult::Exhausted => ('X', 0, false),
    };

    println!(
        "puzzle: {:<20}  solved: {}  pushes: {:<5}  steps: {:<10}  visited: {:<10}  elapsed: {} ms",
        opts.name,
        solved_char,
        pushes,
        solver.steps(),
        solver.visited_len(),
        elapsed_ms
    );

    if let SolveResult::Solved(solution) = &result {
        debug_assert!(puzzle.is_solved(&puzzle.replay(solution).board));
        if opts.print_solution {
            print_solution(puzzle, solution);
        }
        if let Some(dir) = &opts.export_dir {
            let frames = render::export_steps(puzzle, solution, dir, opts.block_size)?;
            info!("wrote {} frames to {}", frames, dir.display());
        }
    }

    Ok(PuzzleStats {
        solved,
        pushes,
        steps: solver.steps(),
        elapsed_ms,
    })
}

#[derive(Parser)]
#[command(name = "pushbox")]
#[command(about = "A box-pushing puzzle solver", long_about = None)]
struct Args {
    /// Puzzle files to solve
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Print the solution push by push
    #[arg(short, long)]
    print_solution: bool,

    /// Maximum number of configurations to examine before giving up
    #[arg(short = 'n', long)]
    max_steps: Option<usize>,

    /// Walk the board in a random neighbour order drawn from this seed
    #[arg(long)]
    shuffle_seed: Option<u64>,

    /// Write one PNG per solution frame into this directory
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Size in pixels of one board cell in exported images
    #[arg(long, default_value = "20")]
    block_size: u32,

    /// Range of step numbers to trace (start, end)
    #[arg(long, num_args = 2)]
    trace_range: Option<Vec<usize>>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.print_solution && args.files.len() > 1 {
        eprintln!("Error: solution printing only supported when solving a single puzzle");
        std::process::exit(1);
    }

    if args.block_size == 0 {
        eprintln!("Error: block size must be at least 1");
        std::process::exit(1);
    }

    // Validate trace_range
    if let Some(ref range) = args.trace_range {
        if range[0] > range[1] {
            eprintln!("Error: trace range start must be <= end");
            std::process::exit(1);
        }
    }
    let trace_range = args.trace_range.as_ref().map(|v| (v[0], v[1]));

    // Load every puzzle up front so a bad file fails before any solving
    let mut puzzles = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match Puzzle::from_file(path) {
            Ok(puzzle) => puzzles.push((path, puzzle)),
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    let mut total_solved = 0;
    let mut total_pushes = 0;
    let mut total_steps = 0;
    let mut total_time_ms = 0;

    for (path, puzzle) in &puzzles {
        // One export subdirectory per puzzle when solving several
        let export_dir = args.export.as_ref().map(|dir| {
            if puzzles.len() > 1 {
                let stem = path.file_stem().unwrap_or(path.as_os_str());
                dir.join(stem)
            } else {
                dir.clone()
            }
        });

        let opts = SolveOpts {
            name: path.display().to_string(),
            max_steps: args.max_steps,
            shuffle_seed: args.shuffle_seed,
            print_solution: args.print_solution,
            export_dir,
            block_size: args.block_size,
            trace_range,
        };

        let stats = match solve_puzzle(puzzle, opts) {
            Ok(stats) => stats,
            Err(e) => {
                eprintln!("Error exporting {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };

        if stats.solved {
            total_solved += 1;
        }
        total_pushes += stats.pushes;
        total_steps += stats.steps;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple puzzles were solved
    if puzzles.len() > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}  pushes: {:<5}  steps: {:<10}  elapsed: {} ms",
            total_solved,
            puzzles.len(),
            total_pushes,
            total_steps,
            total_time_ms
        );
    }
}
