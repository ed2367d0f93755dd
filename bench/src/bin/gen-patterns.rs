// Writes a benchmark pattern file by sampling substrings of an input text.
use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rand::{SeedableRng, rngs::StdRng};
use storage::{
    load_text,
    patterns::{sample_patterns, write_pattern_file},
    text_name,
};

/// Example:
/// cargo run --release --bin gen-patterns -- data/english 100000 10 data/english.p1
#[derive(Debug, Parser)]
#[command(name = "gen-patterns", about = "Sample fixed-length patterns from a text file")]
struct Cli {
    input_file: PathBuf,
    count: usize,
    length: usize,
    output_file: PathBuf,

    /// Seed for reproducible pattern sets
    #[arg(long)]
    seed: Option<u64>,
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let text = load_text(&cli.input_file)?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let patterns = sample_patterns(&text, cli.count, cli.length, &mut rng)?;

    let mut out = BufWriter::new(File::create(&cli.output_file)?);
    write_pattern_file(&mut out, cli.length, &patterns, &text_name(&cli.input_file))?;
    info!(
        "wrote {} patterns of length {} to {}",
        patterns.len(),
        cli.length,
        cli.output_file.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
