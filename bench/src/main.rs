use env_logger::Env;
use log::error;
use move_r_bench::{BenchError, cli, memory::TrackingAllocator};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

/// Example:
/// cargo run --release --bin move-r-bench -- -r -m results.txt data/english data/english.p1 data/english.p2 8
/// cargo run --release --bin move-r-bench -- -sa data/english 8
fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match cli::run(std::env::args_os().collect()) {
        Ok(()) => {}
        Err(BenchError::Usage(message)) => cli::print_usage(&message),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
