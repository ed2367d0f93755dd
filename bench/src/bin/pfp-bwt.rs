// BWT construction helper run as a subprocess by the `rlbwt_external`
// implementation. Reads a text file, builds the suffix array and BWT of the
// remapped, terminated text and writes `<file>.bwt`, `<file>.sa` and
// `<file>.map` next to it. Every phase is logged to stderr as
// `<phase>, time: <ns>, peak: <bytes>,`.
use std::{path::PathBuf, time::Instant};

use clap::Parser;
use env_logger::Env;
use indexes::{SuffixArray, alphabet, parallel, suffix_array::bwt_from_suffix_array};
use log::error;
use move_r_bench::{
    Result, memory::{self, TrackingAllocator}, subprocess::write_artifacts, timing::elapsed_ns,
};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[derive(Debug, Parser)]
#[command(name = "pfp-bwt", about = "Build the suffix array and BWT of a text file")]
struct Cli {
    /// Number of threads
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: u16,

    input: PathBuf,
}

fn phase<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    memory::reset_peak();
    let t1 = Instant::now();
    let value = f()?;
    let t2 = Instant::now();
    eprintln!("{}, time: {}, peak: {},", name, elapsed_ns(t1, t2), memory::peak());
    Ok(value)
}

fn run(cli: &Cli) -> Result<()> {
    let threads = cli.threads.max(1);
    parallel::with_threads(threads, || -> Result<()> {
        let text = phase("read", || Ok(storage::load_text(&cli.input)?))?;
        let (terminated, map) = phase("alphabet", || Ok(alphabet::terminated(&text)?))?;
        drop(text);
        let sa = phase("suffix array", || Ok(SuffixArray::build(&terminated, threads)?))?;
        let bwt = phase("bwt", || Ok(bwt_from_suffix_array(&sa, &terminated)))?;
        drop(terminated);
        phase("write", || write_artifacts(&cli.input, &sa, &bwt, &map))
    })?
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
