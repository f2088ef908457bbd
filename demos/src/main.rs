//! Parallel policy demos.
//!
//! Each demo builds a pool of simulation actors and drives it through the
//! batched async/wait API:
//!
//! ```bash
//! # Game-of-tag arenas stepped in parallel
//! RUST_LOG=info cargo run --release -- tag
//!
//! # Failure injection: aggregation and timeout behavior
//! RUST_LOG=info cargo run --release -- faults
//! ```

mod faults;
mod tag;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "tag" => tag::run(),
            "faults" => faults::run(),
            _ => {
                println!("Unknown demo: {}", args[1]);
                println!();
                print_usage();
            }
        }
    } else {
        print_usage();
    }
}

fn print_usage() {
    println!("Usage: demos <demo>");
    println!();
    println!("Available demos:");
    println!("  tag     - step parallel game-of-tag arenas to completion");
    println!("  faults  - inject actor failures and watch batch aggregation");
}
