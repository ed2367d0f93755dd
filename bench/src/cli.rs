// Command line front end of `move-r-bench`.
//
// Two modes share the binary: the standard benchmark and the SA/BWT mode,
// selected by `-sa` as the very first argument. Usage errors are printed to
// stdout together with the usage banner and end the process with status 0.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use clap::{Args, Parser};
use storage::{PatternReader, load_text, text_name};

use crate::{
    BenchError, Result,
    adapter::{AdapterConfig, work_dir_exists},
    context::BenchContext,
    measurement::MeasurementLog,
    registry, report,
    sa_mode::PreparedSaBwt,
    timing::{format_size, format_threads},
};

pub const USAGE: &str = "\
move-r-bench: benchmarks construction-(, revert-) and query-performance of run-length BWT
              and FM-index based self-indexes.

usage: move-r-bench [options] <input_file> <patterns_file_1> <patterns_file_2> <num_threads>
   -r                 measure revert performance
   -c                 check for correctness if possible; disables the -m option; will not print
                      runtime data if the runtime could be affected by checking for correctness
   -m <m_file>        writes measurement data to m_file
   <input_file>       input file
   <patterns_file_1>  file containing patterns (pattern length ~ number of occurrences) from <input_file>
                      to count and locate
   <patterns_file_2>  file containing patterns (pattern length << number of occurrences) from <input_file>
                      to locate
   <num_threads>      maximum number of threads to use

alternative usage: move-r-bench -sa [options] <input_file> <num_threads>
                   builds the suffix array and BWT once using libsais and constructs only the indexes
                   that can be built from the suffix array and the BWT
   -m <m_file>     writes measurement data to m_file
   <input_file>    input file
   <num_threads>   maximum number of threads to use

environment:
   MOVE_R_BENCH_PFP_BWT   path of the pfp-bwt helper (default: next to this executable)
   MOVE_R_BENCH_WORK_DIR  directory for temporary files (default: current directory)
   RUST_LOG               log filter (default: warn)";

#[derive(Debug, Clone, Args)]
pub struct HelperArgs {
    #[arg(long = "pfp-bwt", env = "MOVE_R_BENCH_PFP_BWT", hide = true)]
    pub pfp_bwt: Option<PathBuf>,

    #[arg(long = "work-dir", env = "MOVE_R_BENCH_WORK_DIR", hide = true)]
    pub work_dir: Option<PathBuf>,
}

impl HelperArgs {
    fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig::new(self.pfp_bwt.clone(), self.work_dir.clone())
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "move-r-bench", disable_help_flag = true, disable_version_flag = true)]
pub struct BenchArgs {
    /// Measure revert performance
    #[arg(short = 'r')]
    pub revert: bool,

    /// Check for correctness if possible
    #[arg(short = 'c')]
    pub check_correctness: bool,

    /// Write measurement data to this file
    #[arg(short = 'm', value_name = "M_FILE")]
    pub measurement_file: Option<PathBuf>,

    pub input_file: PathBuf,
    pub patterns_file_1: PathBuf,
    pub patterns_file_2: PathBuf,
    pub num_threads: u16,

    #[command(flatten)]
    pub helper: HelperArgs,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "move-r-bench -sa", disable_help_flag = true, disable_version_flag = true)]
pub struct SaArgs {
    #[arg(short = 'm', value_name = "M_FILE")]
    pub measurement_file: Option<PathBuf>,

    pub input_file: PathBuf,
    pub num_threads: u16,

    #[command(flatten)]
    pub helper: HelperArgs,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Standard(BenchArgs),
    SuffixArray(SaArgs),
}

fn usage(message: impl Into<String>) -> BenchError {
    BenchError::Usage(message.into())
}

/// Selects the mode and parses the rest of the arguments.
pub fn parse_mode(args: Vec<OsString>) -> Result<Mode> {
    if args.len() <= 1 {
        return Err(usage(""));
    }
    let parsed = if args[1] == "-sa" {
        let rest = args[..1].iter().chain(&args[2..]).cloned();
        SaArgs::try_parse_from(rest).map(Mode::SuffixArray)
    } else {
        BenchArgs::try_parse_from(args).map(Mode::Standard)
    };
    parsed.map_err(|e| usage(e.to_string().trim_end()))
}

pub fn available_threads() -> u16 {
    std::thread::available_parallelism()
        .map(|n| u16::try_from(n.get()).unwrap_or(u16::MAX))
        .unwrap_or(1)
}

fn check_threads(threads: u16) -> Result<()> {
    if threads == 0 || threads > available_threads() {
        return Err(usage("error: invalid number of threads"));
    }
    Ok(())
}

fn open_log(path: Option<&Path>) -> Result<Option<MeasurementLog>> {
    path.map(|path| {
        MeasurementLog::open(path)
            .map_err(|_| usage("error: cannot open or create measurement file"))
    })
    .transpose()
}

fn load_input(path: &Path) -> Result<Vec<u8>> {
    load_text(path).map_err(|_| usage("error: invalid input, could not read <input_file>"))
}

pub fn run(args: Vec<OsString>) -> Result<()> {
    match parse_mode(args)? {
        Mode::Standard(args) => run_standard(args),
        Mode::SuffixArray(args) => run_sa(args),
    }
}

pub fn run_standard(args: BenchArgs) -> Result<()> {
    let text = load_input(&args.input_file)?;
    let first = PatternReader::open(&args.patterns_file_1)
        .map_err(|_| usage("error: invalid input, could not read <patterns_file_1>"))?;
    let second = PatternReader::open(&args.patterns_file_2)
        .map_err(|_| usage("error: invalid input, could not read <patterns_file_2>"))?;
    if args.check_correctness && args.measurement_file.is_some() {
        return Err(usage(
            "error: cannot output measurement data when checking for correctness",
        ));
    }
    check_threads(args.num_threads)?;
    let config = args.helper.adapter_config();
    work_dir_exists(&config.work_dir)?;
    let log = open_log(args.measurement_file.as_deref())?;

    println!(
        "benchmarking {} ({}) using up to {}",
        args.input_file.display(),
        format_size(text.len() as u64),
        format_threads(args.num_threads)
    );
    if args.check_correctness {
        println!("correctness will be checked if possible");
    }
    println!();

    let mut ctx = BenchContext::new(text, text_name(&args.input_file))
        .with_patterns(first, second)
        .with_adapter_config(config)
        .checking_correctness(args.check_correctness);
    if let Some(log) = log {
        ctx = ctx.with_log(log);
    }

    registry::measure_all(&mut ctx, args.num_threads, args.revert)?;
    report::print_summary_table(&ctx.reports);
    Ok(())
}

pub fn run_sa(args: SaArgs) -> Result<()> {
    let text = load_input(&args.input_file)?;
    check_threads(args.num_threads)?;
    let config = args.helper.adapter_config();
    work_dir_exists(&config.work_dir)?;
    let log = open_log(args.measurement_file.as_deref())?;

    println!(
        "benchmarking {} ({}) using up to {}",
        args.input_file.display(),
        format_size(text.len() as u64),
        format_threads(args.num_threads)
    );
    println!();

    let prepared = PreparedSaBwt::prepare(&text, args.num_threads)?;
    let mut ctx =
        BenchContext::new(text, text_name(&args.input_file)).with_adapter_config(config);
    if let Some(log) = log {
        ctx = ctx.with_log(log);
    }

    registry::measure_all_from_sa_and_bwt(&mut ctx, &prepared, args.num_threads)?;
    report::print_summary_table(&ctx.reports);
    Ok(())
}

/// Prints a usage error the way the benchmark reports them.
pub fn print_usage(message: &str) {
    if !message.is_empty() {
        println!("{}", message);
        println!();
    }
    println!("{}", USAGE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn standard_mode() {
        let mode = parse_mode(args(&[
            "move-r-bench", "-r", "-m", "log.txt", "in.txt", "p1", "p2", "4",
        ]))
        .unwrap();
        match mode {
            Mode::Standard(a) => {
                assert!(a.revert);
                assert!(!a.check_correctness);
                assert_eq!(a.measurement_file, Some(PathBuf::from("log.txt")));
                assert_eq!(a.input_file, PathBuf::from("in.txt"));
                assert_eq!(a.patterns_file_2, PathBuf::from("p2"));
                assert_eq!(a.num_threads, 4);
            }
            other => panic!("expected standard mode, got {:?}", other),
        }
    }

    #[test]
    fn sa_mode_is_selected_by_first_argument() {
        let mode = parse_mode(args(&["move-r-bench", "-sa", "in.txt", "2"])).unwrap();
        match mode {
            Mode::SuffixArray(a) => {
                assert_eq!(a.input_file, PathBuf::from("in.txt"));
                assert_eq!(a.num_threads, 2);
                assert!(a.measurement_file.is_none());
            }
            other => panic!("expected SA mode, got {:?}", other),
        }
    }

    #[test]
    fn usage_errors() {
        for list in [
            &["move-r-bench"][..],
            &["move-r-bench", "in.txt", "p1", "p2"],
            &["move-r-bench", "-x", "in.txt", "p1", "p2", "1"],
            &["move-r-bench", "in.txt", "p1", "p2", "many"],
            &["move-r-bench", "-sa", "in.txt"],
        ] {
            assert!(
                matches!(parse_mode(args(list)), Err(BenchError::Usage(_))),
                "{:?}",
                list
            );
        }
    }

    #[test]
    fn thread_count_bounds() {
        assert!(check_threads(0).is_err());
        assert!(check_threads(1).is_ok());
        assert!(check_threads(available_threads()).is_ok());
        if available_threads() < u16::MAX {
            assert!(check_threads(available_threads() + 1).is_err());
        }
    }

    #[test]
    fn correctness_check_excludes_measurement_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let patterns = dir.path().join("p.txt");
        std::fs::write(&input, b"banana").unwrap();
        std::fs::write(&patterns, b"1 3\nana").unwrap();

        let mode = parse_mode(vec![
            "move-r-bench".into(),
            "-c".into(),
            "-m".into(),
            dir.path().join("m.txt").into(),
            input.into(),
            patterns.clone().into(),
            patterns.into(),
            "1".into(),
        ])
        .unwrap();
        let Mode::Standard(args) = mode else {
            panic!("expected standard mode");
        };
        match run_standard(args) {
            Err(BenchError::Usage(message)) => {
                assert!(message.contains("checking for correctness"))
            }
            other => panic!("expected a usage error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_work_dir_is_reported_before_measuring() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let patterns = dir.path().join("p.txt");
        let measurements = dir.path().join("m.txt");
        std::fs::write(&input, b"banana").unwrap();
        std::fs::write(&patterns, b"1 3\nana").unwrap();

        let mode = parse_mode(vec![
            "move-r-bench".into(),
            "--work-dir".into(),
            dir.path().join("absent").into(),
            "-m".into(),
            measurements.clone().into(),
            input.into(),
            patterns.clone().into(),
            patterns.into(),
            "1".into(),
        ])
        .unwrap();
        let Mode::Standard(args) = mode else {
            panic!("expected standard mode");
        };
        match run_standard(args) {
            Err(BenchError::Usage(message)) => assert!(message.contains("work directory")),
            other => panic!("expected a usage error, got {:?}", other.map(|_| ())),
        }
        assert!(!measurements.exists());
    }
}
