// The measurement state machine run once per implementation: build sweep,
// optional revert sweep, count pass, two locate passes, log emission.
use std::time::Instant;

use indexes::naive;
use storage::PatternReader;

use crate::{
    BenchError, Result,
    adapter::{BuildOutcome, IndexAdapter, unsupported},
    context::BenchContext,
    measurement::{BuildResult, QueryResult, Record, RevertResult},
    memory::MemoryProbe,
    sa_mode::PreparedSaBwt,
    timing::{
        elapsed_ns, format_query_throughput, format_size, format_threads, format_time,
        thread_sweep,
    },
};

/// What to measure for one implementation.
#[derive(Debug, Clone, Copy)]
pub struct MeasureSpec {
    /// Display name.
    pub name: &'static str,
    /// `implementation=` value in the measurement log.
    pub log_name: &'static str,
    pub max_build_threads: u16,
    pub max_revert_threads: u16,
    pub revert: bool,
    pub count: bool,
    pub locate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatePass {
    pub result: QueryResult,
    /// `None` when correctness was not checked.
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureReport {
    pub name: String,
    pub log_name: String,
    pub builds: Vec<BuildResult>,
    pub reverts: Vec<RevertResult>,
    pub revert_correct: Option<bool>,
    pub count: Option<QueryResult>,
    pub locates: Vec<LocatePass>,
}

impl MeasureReport {
    fn new(spec: &MeasureSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            log_name: spec.log_name.to_string(),
            builds: Vec::new(),
            reverts: Vec::new(),
            revert_correct: None,
            count: None,
            locates: Vec::new(),
        }
    }

    /// Size of the last built index.
    pub fn index_size(&self) -> u64 {
        self.builds.last().map_or(0, |b| b.index_size)
    }
}

fn build_sweep<A, F>(adapter: &mut A, spec: &MeasureSpec, mut build: F) -> Result<Vec<BuildResult>>
where
    A: IndexAdapter,
    F: FnMut(&mut A, u16) -> Result<BuildOutcome>,
{
    let mut results = Vec::new();

    for threads in thread_sweep(spec.max_build_threads) {
        println!("building {} using {}", spec.name, format_threads(threads));

        adapter.destroy();
        let probe = MemoryProbe::start();
        let t1 = Instant::now();
        let outcome = build(adapter, threads)?;
        let t2 = Instant::now();
        let (peak, size) = probe.finish(outcome.external_peak);

        let result = BuildResult {
            num_threads: threads,
            time_build: outcome.time_override.unwrap_or_else(|| elapsed_ns(t1, t2)),
            peak_memory_usage: peak,
            index_size: size,
        };
        println!("build time: {}", format_time(result.time_build));
        println!("peak memory usage: {}", format_size(result.peak_memory_usage));
        println!("index size: {}", format_size(result.index_size));
        println!();
        results.push(result);
    }

    Ok(results)
}

/// Runs every enabled phase for one implementation on the context's text.
pub fn measure<A: IndexAdapter>(
    ctx: &mut BenchContext,
    spec: &MeasureSpec,
) -> Result<MeasureReport> {
    println!("############## benchmarking {} ##############", spec.name);
    println!();

    let mut adapter = A::create(&ctx.adapter_config);
    let mut report = MeasureReport::new(spec);
    let text = &ctx.text;

    report.builds = build_sweep(&mut adapter, spec, |adapter, threads| {
        adapter.build(text, threads)
    })?;

    if spec.revert && A::CAPABILITIES.revert {
        let mut reverted = vec![0u8; text.len()];
        let mut all_correct = true;

        for threads in thread_sweep(spec.max_revert_threads) {
            println!("reverting the index using {}", format_threads(threads));
            reverted.fill(0);
            let t1 = Instant::now();
            adapter.revert(threads, &mut reverted)?;
            let t2 = Instant::now();

            let result = RevertResult {
                num_threads: threads,
                time_revert: elapsed_ns(t1, t2),
            };
            println!("revert time: {}", format_time(result.time_revert));
            report.reverts.push(result);

            if ctx.check_correctness {
                let correct = reverted == *text;
                println!(
                    "checking correctness of the reverted text: {}",
                    if correct { "correct" } else { "not correct" }
                );
                all_correct &= correct;
            }
            println!();
        }

        if ctx.check_correctness {
            report.revert_correct = Some(all_correct);
        }
    }

    let count = spec.count && A::CAPABILITIES.count;
    let locate = spec.locate && A::CAPABILITIES.locate;
    if count || locate {
        let patterns = ctx
            .patterns
            .as_mut()
            .ok_or(BenchError::MissingPatterns(spec.name))?;
        let check = ctx.check_correctness;

        if count {
            println!("counting the first set of patterns");
            let result = count_patterns(&mut adapter, &mut patterns.first)?;
            print_query(&result, check, None);
            report.count = Some(result);
        }

        if locate {
            let sets = [("first", &mut patterns.first), ("second", &mut patterns.second)];
            for (label, reader) in sets {
                println!("locating the {} set of patterns", label);
                let pass = locate_patterns(&mut adapter, reader, text, check)?;
                print_query(&pass.result, check, pass.correct);
                report.locates.push(pass);
            }
        }
        println!();
    }

    adapter.destroy();
    emit(ctx, &report, false)?;
    Ok(report)
}

/// Build sweep only, from a suffix array and BWT prepared once for all
/// implementations.
pub fn measure_from_sa_and_bwt<A: IndexAdapter>(
    ctx: &mut BenchContext,
    prepared: &PreparedSaBwt,
    spec: &MeasureSpec,
) -> Result<MeasureReport> {
    if !A::CAPABILITIES.from_sa_and_bwt {
        return Err(unsupported::<A>("construction from suffix array and BWT"));
    }
    println!("############## benchmarking {} ##############", spec.name);
    println!();

    let mut adapter = A::create(&ctx.adapter_config);
    let mut report = MeasureReport::new(spec);
    let input = prepared.input(&ctx.text);

    report.builds = build_sweep(&mut adapter, spec, |adapter, threads| {
        adapter.build_from_sa_and_bwt(&input, threads)
    })?;

    adapter.destroy();
    emit(ctx, &report, true)?;
    Ok(report)
}

fn count_patterns<A: IndexAdapter>(
    adapter: &mut A,
    reader: &mut PatternReader,
) -> Result<QueryResult> {
    let header = reader.read_header()?;
    let mut pattern = Vec::new();
    let mut result = QueryResult {
        num_queries: header.number as u64,
        pattern_length: header.length as u64,
        ..QueryResult::default()
    };

    for _ in 0..header.number {
        reader.next_pattern(&mut pattern)?;
        let t1 = Instant::now();
        let occurrences = adapter.count(&pattern)?;
        let t2 = Instant::now();
        result.time_query += elapsed_ns(t1, t2);
        result.num_occurrences += occurrences as u64;
    }

    Ok(result)
}

fn locate_patterns<A: IndexAdapter>(
    adapter: &mut A,
    reader: &mut PatternReader,
    text: &[u8],
    check: bool,
) -> Result<LocatePass> {
    let header = reader.read_header()?;
    let mut pattern = Vec::new();
    let mut occurrences = Vec::new();
    let mut result = QueryResult {
        num_queries: header.number as u64,
        pattern_length: header.length as u64,
        ..QueryResult::default()
    };
    let mut correct = true;

    for _ in 0..header.number {
        reader.next_pattern(&mut pattern)?;
        occurrences.clear();
        let t1 = Instant::now();
        adapter.locate(&pattern, &mut occurrences)?;
        let t2 = Instant::now();
        result.time_query += elapsed_ns(t1, t2);
        result.num_occurrences += occurrences.len() as u64;

        // stop verifying after the first wrong answer, keep timing
        if check && correct {
            correct = occurrences
                .iter()
                .all(|&o| naive::occurs_at(text, o, &pattern));
            if correct && A::CAPABILITIES.count {
                correct = adapter.count(&pattern)? == occurrences.len();
            }
        }
    }

    Ok(LocatePass {
        result,
        correct: check.then_some(correct),
    })
}

fn print_query(result: &QueryResult, check: bool, correct: Option<bool>) {
    // checking perturbs the timing, so no throughput then
    if !check {
        println!(
            "throughput: {}",
            format_query_throughput(result.num_queries, result.time_query)
        );
    }
    if let Some(correct) = correct {
        println!(
            "{}",
            if correct { "no wrong occurrences" } else { "wrong occurrences" }
        );
    }
    println!("total number of occurrences: {}", result.num_occurrences);
}

fn emit(ctx: &mut BenchContext, report: &MeasureReport, from_sa_and_bwt: bool) -> Result<()> {
    let Some(log) = ctx.log.as_mut() else {
        return Ok(());
    };
    let implementation = report.log_name.as_str();
    let text = ctx.text_name.as_str();
    let index_size = report.index_size();

    for result in &report.builds {
        log.write(&Record::Build {
            implementation,
            text,
            from_sa_and_bwt,
            result,
        })?;
    }
    for result in &report.reverts {
        log.write(&Record::Revert {
            implementation,
            text,
            result,
            index_size,
        })?;
    }
    if let Some(result) = &report.count {
        log.write(&Record::Count {
            implementation,
            text,
            result,
            index_size,
        })?;
    }
    for pass in &report.locates {
        log.write(&Record::Locate {
            implementation,
            text,
            result: &pass.result,
            index_size,
        })?;
    }
    log.flush()?;
    Ok(())
}
