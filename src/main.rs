use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use clap::Parser;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use mazeweave::{
    MazeEngine, Result,
    app::{App, AppOptions, Outcome, RenderMode},
    generators::Generator,
};

/// Generate a perfect maze and watch it being built and solved in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of cell rows
    #[arg(long, default_value_t = 15)]
    height: u16,

    /// Number of cell columns
    #[arg(long, default_value_t = 25)]
    width: u16,

    /// backtrack-straight, backtrack-jagged, hunt-and-kill-straight,
    /// hunt-and-kill-jagged, prim or kruskal
    #[arg(long, default_value = "backtrack-straight")]
    generator: Generator,

    /// Seed for every random choice; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// remove-walls, build-walls or fill-cells
    #[arg(long, default_value = "remove-walls")]
    mode: RenderMode,

    /// Milliseconds to wait after each generation event
    #[arg(long, default_value_t = 10)]
    gen_delay_ms: u64,

    /// Milliseconds to wait after each solve event
    #[arg(long, default_value_t = 20)]
    solve_delay_ms: u64,

    /// Only draw the finished maze
    #[arg(long)]
    hide_generation: bool,

    /// Only draw the finished solution
    #[arg(long)]
    hide_solve: bool,

    /// Mark cells the generator backs out of
    #[arg(long)]
    show_backtracks: bool,

    /// Stop after generating
    #[arg(long)]
    no_solve: bool,

    /// Swap wall and passage colors
    #[arg(long)]
    inverse: bool,

    /// Skip the animation and print the maze as text
    #[arg(long)]
    print: bool,

    /// File the log is written to
    #[arg(long, default_value = "mazeweave.log")]
    log_file: PathBuf,

    /// Most verbose level written to the log
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn init_logging(path: &Path, level: Level) -> std::io::Result<WorkerGuard> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file path {} has no file name", path.display()),
        )
    })?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(guard)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| since.as_nanos() as u64)
}

/// Generates (and solves) without a terminal UI and prints the result.
fn print_maze(engine: &mut MazeEngine, solve: bool) -> Result<()> {
    let mut generation = engine.generate();
    generation.by_ref().for_each(drop);
    let elapsed = generation.elapsed();
    drop(generation);
    println!("{} in {:?}", engine.generator(), elapsed);

    if solve {
        let mut walk = engine.solve()?;
        walk.by_ref().for_each(drop);
        println!("solved in {:?}, path of {} cells", walk.elapsed(), walk.path().len());
    }
    print!("{}", engine.maze());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args.log_file, args.log_level)?;

    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!("[main] starting with {:?}, seed {}", args, seed);
    let mut engine = MazeEngine::new(args.height, args.width, args.generator, seed)?;

    if args.print {
        print_maze(&mut engine, !args.no_solve)?;
        println!("seed {}", seed);
        return Ok(());
    }

    let app = App::new(AppOptions {
        mode: args.mode,
        generation_delay: Duration::from_millis(args.gen_delay_ms),
        solve_delay: Duration::from_millis(args.solve_delay_ms),
        show_generation: !args.hide_generation,
        show_backtracks: args.show_backtracks,
        show_solve: !args.hide_solve,
        solve: !args.no_solve,
        inverse_colors: args.inverse,
        ..AppOptions::default()
    });

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let outcome = app.run(&mut engine);
    App::restore_terminal(&mut stdout)?;

    match outcome? {
        Outcome::Cancelled => println!("Cancelled."),
        Outcome::Generated { elapsed } => {
            println!("{} maze generated in {:?} (seed {}).", engine.generator(), elapsed, seed)
        }
        Outcome::Solved { elapsed, path } => println!(
            "{} maze solved in {:?} with a path of {} cells (seed {}).",
            engine.generator(),
            elapsed,
            path.len(),
            seed
        ),
    }
    Ok(())
}
