use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

mod keymap;
mod run;
mod scheduler;

/// Run a CHIP-8 program in a window.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the program image to run
    rom: PathBuf,

    /// Executor steps per second
    #[arg(long, default_value_t = vm8_core::constants::CLOCK_RATE)]
    clock_rate: u32,

    /// Window pixels per frame buffer pixel
    #[arg(long, default_value_t = 10)]
    scale: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    run::run(&args.rom, args.clock_rate, args.scale)
}
