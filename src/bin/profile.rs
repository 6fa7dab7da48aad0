use std::time::Duration;

use clap::Parser;
use mazeweave::{MazeEngine, generators::Generator};

/// Time every generator and the solver on square mazes, without drawing.
#[derive(Parser, Debug)]
struct Args {
    /// Runs per generator, each with its own seed
    #[arg(default_value_t = 1)]
    iterations: u64,

    /// Side length of the maze
    #[arg(long, default_value_t = u8::MAX as u16)]
    size: u16,
}

fn main() -> mazeweave::Result<()> {
    let args = Args::parse();
    let mut engine = MazeEngine::new(args.size, args.size, Generator::Prim, 0)?;

    println!(
        "{:<34} {:>14} {:>14} {:>12}",
        "generator", "generate", "solve", "events"
    );
    for generator in Generator::ALL {
        let mut generate_total = Duration::ZERO;
        let mut solve_total = Duration::ZERO;
        let mut events = 0;
        for seed in 0..args.iterations {
            engine.configure(args.size, args.size, generator, seed)?;

            let mut generation = engine.generate();
            events += generation.by_ref().count();
            generate_total += generation.elapsed();
            drop(generation);

            let mut solve = engine.solve()?;
            events += solve.by_ref().count();
            solve_total += solve.elapsed();
        }
        let runs = args.iterations.max(1) as u32;
        println!(
            "{:<34} {:>14.3?} {:>14.3?} {:>12}",
            generator.to_string(),
            generate_total / runs,
            solve_total / runs,
            events / runs as usize
        );
    }
    Ok(())
}
