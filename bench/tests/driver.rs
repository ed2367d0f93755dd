use std::{fs, path::Path};

use indexes::naive;
use move_r_bench::{
    BenchError, Result,
    adapter::{
        AdapterConfig, BuildOutcome, Capabilities, FmAdapter, IndexAdapter, ReversedFmAdapter,
        RlbwtAdapter, RlbwtRevertAdapter,
    },
    context::BenchContext,
    driver::{MeasureSpec, measure, measure_from_sa_and_bwt},
    measurement::MeasurementLog,
    registry,
    sa_mode::PreparedSaBwt,
};
use storage::{PatternError, PatternReader, patterns::write_pattern_file};
use tempfile::TempDir;

const TEXT: &[u8] = b"mississippi banana mississippi bandana panama canal";

fn write_patterns(dir: &Path, name: &str, length: usize, patterns: &[&[u8]]) -> PatternReader {
    let path = dir.join(name);
    let owned: Vec<Vec<u8>> = patterns.iter().map(|p| p.to_vec()).collect();
    let mut file = fs::File::create(&path).unwrap();
    write_pattern_file(&mut file, length, &owned, "text").unwrap();
    PatternReader::open(&path).unwrap()
}

fn context(dir: &TempDir) -> BenchContext {
    let first = write_patterns(dir.path(), "p1", 3, &[b"ssi", b"ana", b"xyz", b"pan"]);
    let second = write_patterns(dir.path(), "p2", 1, &[b"a", b"n", b"s"]);
    BenchContext::new(TEXT.to_vec(), "text".to_string())
        .with_patterns(first, second)
        .with_adapter_config(AdapterConfig {
            helper: env!("CARGO_BIN_EXE_pfp-bwt").into(),
            work_dir: dir.path().to_path_buf(),
        })
}

fn full_spec(max_threads: u16) -> MeasureSpec {
    MeasureSpec {
        name: "rlbwt",
        log_name: "rlbwt",
        max_build_threads: max_threads,
        max_revert_threads: max_threads,
        revert: true,
        count: true,
        locate: true,
    }
}

fn total(text: &[u8], patterns: &[&[u8]]) -> u64 {
    patterns.iter().map(|p| naive::count(text, p) as u64).sum()
}

#[test]
fn checked_run_is_correct() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir).checking_correctness(true);

    let report = measure::<RlbwtAdapter>(&mut ctx, &full_spec(2)).unwrap();
    assert_eq!(report.builds.len(), 2);
    assert_eq!(report.reverts.len(), 2);
    assert_eq!(report.revert_correct, Some(true));

    let count = report.count.unwrap();
    assert_eq!(count.num_queries, 4);
    assert_eq!(count.pattern_length, 3);
    assert_eq!(count.num_occurrences, total(TEXT, &[b"ssi", b"ana", b"xyz", b"pan"]));

    assert_eq!(report.locates.len(), 2);
    assert_eq!(report.locates[0].correct, Some(true));
    assert_eq!(report.locates[1].correct, Some(true));
    assert_eq!(report.locates[0].result.num_occurrences, count.num_occurrences);
    assert_eq!(
        report.locates[1].result.num_occurrences,
        total(TEXT, &[b"a", b"n", b"s"])
    );
}

#[test]
fn capabilities_limit_the_phases() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir).checking_correctness(true);

    let report = measure::<RlbwtRevertAdapter>(
        &mut ctx,
        &MeasureSpec {
            name: "rlbwt_revert",
            log_name: "rlbwt_revert",
            ..full_spec(1)
        },
    )
    .unwrap();
    assert!(report.count.is_some());
    assert!(report.locates.is_empty());

    let report = measure::<ReversedFmAdapter>(
        &mut ctx,
        &MeasureSpec {
            name: "reversed",
            log_name: "fm_index_reversed",
            ..full_spec(1)
        },
    )
    .unwrap();
    assert_eq!(report.revert_correct, Some(true));
    assert!(report.locates.iter().all(|pass| pass.correct == Some(true)));
}

#[test]
fn measurement_log_lines() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("results.txt");

    for _ in 0..2 {
        let mut ctx = context(&dir).with_log(MeasurementLog::open(&log_path).unwrap());
        measure::<FmAdapter>(
            &mut ctx,
            &MeasureSpec {
                name: "FM-index",
                log_name: "fm_index",
                ..full_spec(4)
            },
        )
        .unwrap();
    }

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    // 3 builds, 3 reverts, 1 count, 2 locates, twice
    assert_eq!(lines.len(), 18);
    assert!(lines.iter().all(|l| l.starts_with("RESULT type=comparison_")));
    assert!(lines.iter().all(|l| l.contains(" implementation=fm_index text=text ")));

    let kinds = |kind: &str| lines.iter().filter(|l| l.starts_with(kind)).count();
    assert_eq!(kinds("RESULT type=comparison_build "), 6);
    assert_eq!(kinds("RESULT type=comparison_revert "), 6);
    assert_eq!(kinds("RESULT type=comparison_count "), 2);
    assert_eq!(kinds("RESULT type=comparison_locate "), 4);

    let threads: Vec<&str> = lines[..3]
        .iter()
        .map(|l| l.split(' ').find(|t| t.starts_with("num_threads=")).unwrap())
        .collect();
    assert_eq!(threads, vec!["num_threads=1", "num_threads=2", "num_threads=4"]);

    let locate_second = lines[8];
    assert!(locate_second.contains(&format!(
        " num_occurrences={} ",
        total(TEXT, &[b"a", b"n", b"s"])
    )));
}

#[test]
fn sa_mode_runs_every_registered_index() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("sa.txt");
    let text = b"\x01abracadabra\x00abracadabra".to_vec();
    let prepared = PreparedSaBwt::prepare(&text, 2).unwrap();

    let mut ctx = BenchContext::new(text, "abra".to_string())
        .with_adapter_config(AdapterConfig {
            helper: env!("CARGO_BIN_EXE_pfp-bwt").into(),
            work_dir: dir.path().to_path_buf(),
        })
        .with_log(MeasurementLog::open(&log_path).unwrap());
    registry::measure_all_from_sa_and_bwt(&mut ctx, &prepared, 2).unwrap();

    let names: Vec<&str> = ctx.reports.iter().map(|r| r.log_name.as_str()).collect();
    assert_eq!(names, vec!["rlbwt", "fm_index", "rlbwt_external"]);
    assert_eq!(ctx.reports[0].builds.len(), 2);
    assert_eq!(ctx.reports[1].builds.len(), 1);
    assert_eq!(ctx.reports[2].builds.len(), 1);

    drop(ctx);
    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.lines().count(), 4);
    assert!(
        log.lines()
            .all(|l| l.starts_with("RESULT type=comparison_build_from_sa_and_bwt "))
    );
}

#[test]
fn single_build_from_sa_and_bwt() {
    let dir = TempDir::new().unwrap();
    let prepared = PreparedSaBwt::prepare(TEXT, 1).unwrap();
    let mut ctx = context(&dir);
    let report = measure_from_sa_and_bwt::<FmAdapter>(
        &mut ctx,
        &prepared,
        &MeasureSpec {
            name: "FM-index",
            log_name: "fm_index",
            ..full_spec(8)
        },
    )
    .unwrap();
    let threads: Vec<u16> = report.builds.iter().map(|b| b.num_threads).collect();
    assert_eq!(threads, vec![1, 2, 4, 8]);
    assert!(report.reverts.is_empty());
    assert!(report.count.is_none());
}

#[test]
fn standard_registry_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir).checking_correctness(true);
    registry::measure_all(&mut ctx, 2, true).unwrap();

    let names: Vec<&str> = ctx.reports.iter().map(|r| r.log_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["rlbwt", "rlbwt_revert", "rlbwt_external", "fm_index", "fm_index_reversed"]
    );
    for report in &ctx.reports {
        assert_ne!(report.revert_correct, Some(false), "{}", report.name);
        assert!(
            report.locates.iter().all(|p| p.correct != Some(false)),
            "{}",
            report.name
        );
    }
    // the external index is only built
    assert!(ctx.reports[2].reverts.is_empty());
    assert!(ctx.reports[2].count.is_none());
}

/// FM-index that corrupts its answers: the first reverted byte is flipped
/// and every located offset is shifted by one.
struct ShiftedFm {
    inner: FmAdapter,
}

impl IndexAdapter for ShiftedFm {
    const KIND: &'static str = "shifted_fm";
    const CAPABILITIES: Capabilities = FmAdapter::CAPABILITIES;

    fn create(config: &AdapterConfig) -> Self {
        Self {
            inner: FmAdapter::create(config),
        }
    }

    fn build(&mut self, text: &[u8], threads: u16) -> Result<BuildOutcome> {
        self.inner.build(text, threads)
    }

    fn destroy(&mut self) {
        self.inner.destroy();
    }

    fn revert(&self, threads: u16, out: &mut [u8]) -> Result<()> {
        self.inner.revert(threads, out)?;
        if let Some(first) = out.first_mut() {
            *first ^= 1;
        }
        Ok(())
    }

    fn count(&mut self, pattern: &[u8]) -> Result<usize> {
        self.inner.count(pattern)
    }

    fn locate(&mut self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        let start = out.len();
        self.inner.locate(pattern, out)?;
        for o in &mut out[start..] {
            *o += 1;
        }
        Ok(())
    }
}

#[test]
fn wrong_answers_are_reported() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir).checking_correctness(true);

    let report = measure::<ShiftedFm>(
        &mut ctx,
        &MeasureSpec {
            name: "shifted",
            log_name: "shifted_fm",
            ..full_spec(2)
        },
    )
    .unwrap();
    assert_eq!(report.revert_correct, Some(false));
    assert_eq!(report.locates.len(), 2);
    assert_eq!(report.locates[0].correct, Some(false));
    assert_eq!(report.locates[1].correct, Some(false));
    // timing and totals still cover every pattern
    assert_eq!(
        report.locates[1].result.num_occurrences,
        total(TEXT, &[b"a", b"n", b"s"])
    );

    let mut unchecked = context(&dir);
    let report = measure::<ShiftedFm>(
        &mut unchecked,
        &MeasureSpec {
            name: "shifted",
            log_name: "shifted_fm",
            ..full_spec(1)
        },
    )
    .unwrap();
    assert_eq!(report.revert_correct, None);
    assert!(report.locates.iter().all(|pass| pass.correct.is_none()));
}

#[test]
fn oversized_pattern_header_is_an_error() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("huge");
    fs::write(&first, b"1 9223372036854775807\nabc").unwrap();
    let second = write_patterns(dir.path(), "p2", 1, &[b"a"]);

    let mut ctx = BenchContext::new(TEXT.to_vec(), "text".to_string())
        .with_patterns(PatternReader::open(&first).unwrap(), second);
    let result = measure::<FmAdapter>(
        &mut ctx,
        &MeasureSpec {
            name: "FM-index",
            log_name: "fm_index",
            ..full_spec(1)
        },
    );
    assert!(matches!(
        result,
        Err(BenchError::Pattern(PatternError::Truncated { index: 0, got: 3, .. }))
    ));
}

#[test]
fn sa_mode_needs_the_capability() {
    let prepared = PreparedSaBwt::prepare(TEXT, 1).unwrap();
    let mut ctx = BenchContext::new(TEXT.to_vec(), "text".to_string());
    let result = measure_from_sa_and_bwt::<ReversedFmAdapter>(
        &mut ctx,
        &prepared,
        &MeasureSpec {
            name: "reversed",
            log_name: "fm_index_reversed",
            ..full_spec(1)
        },
    );
    assert!(matches!(
        result,
        Err(BenchError::Unsupported {
            implementation: "fm_index_reversed",
            ..
        })
    ));
    assert!(ctx.reports.is_empty());
}
