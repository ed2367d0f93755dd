// The implementations measured in each mode, in order. Phases and thread
// caps follow each implementation's capabilities.
use crate::{
    Result,
    adapter::{
        ExternalRlbwtAdapter, FmAdapter, IndexAdapter, ReversedFmAdapter, RlbwtAdapter,
        RlbwtRevertAdapter,
    },
    context::BenchContext,
    driver::{MeasureSpec, measure, measure_from_sa_and_bwt},
    sa_mode::PreparedSaBwt,
};

fn cap(parallel: bool, max_threads: u16) -> u16 {
    if parallel {
        max_threads
    } else {
        max_threads.min(1)
    }
}

/// Standard mode spec for `A`. `queries` enables count and locate where
/// `A` supports them.
pub fn standard_spec<A: IndexAdapter>(
    name: &'static str,
    log_name: &'static str,
    max_threads: u16,
    revert: bool,
    queries: bool,
) -> MeasureSpec {
    let caps = A::CAPABILITIES;
    let revert = revert && caps.revert;
    MeasureSpec {
        name,
        log_name,
        max_build_threads: cap(caps.parallel_build, max_threads),
        max_revert_threads: if revert {
            cap(caps.parallel_revert, max_threads)
        } else {
            0
        },
        revert,
        count: queries && caps.count,
        locate: queries && caps.locate,
    }
}

/// SA/BWT mode spec for `A`: build sweep only.
pub fn sa_spec<A: IndexAdapter>(
    name: &'static str,
    log_name: &'static str,
    max_threads: u16,
) -> MeasureSpec {
    MeasureSpec {
        name,
        log_name,
        max_build_threads: cap(A::CAPABILITIES.parallel_from_sa_and_bwt, max_threads),
        max_revert_threads: 0,
        revert: false,
        count: false,
        locate: false,
    }
}

pub fn standard_specs(max_threads: u16, revert: bool) -> [MeasureSpec; 5] {
    [
        standard_spec::<RlbwtAdapter>("rlbwt (full support)", "rlbwt", max_threads, revert, true),
        standard_spec::<RlbwtRevertAdapter>(
            "rlbwt (revert + count)",
            "rlbwt_revert",
            max_threads,
            revert,
            true,
        ),
        // build sweep only
        standard_spec::<ExternalRlbwtAdapter>(
            "rlbwt (external BWT)",
            "rlbwt_external",
            max_threads,
            false,
            false,
        ),
        standard_spec::<FmAdapter>("FM-index", "fm_index", max_threads, revert, true),
        standard_spec::<ReversedFmAdapter>(
            "FM-index (reversed text)",
            "fm_index_reversed",
            max_threads,
            revert,
            true,
        ),
    ]
}

pub fn sa_specs(max_threads: u16) -> [MeasureSpec; 3] {
    [
        sa_spec::<RlbwtAdapter>("rlbwt (full support)", "rlbwt", max_threads),
        sa_spec::<FmAdapter>("FM-index", "fm_index", max_threads),
        sa_spec::<ExternalRlbwtAdapter>("rlbwt (external BWT)", "rlbwt_external", max_threads),
    ]
}

fn run<A: IndexAdapter>(ctx: &mut BenchContext, spec: &MeasureSpec) -> Result<()> {
    let report = measure::<A>(ctx, spec)?;
    ctx.reports.push(report);
    Ok(())
}

fn run_from_sa_and_bwt<A: IndexAdapter>(
    ctx: &mut BenchContext,
    prepared: &PreparedSaBwt,
    spec: &MeasureSpec,
) -> Result<()> {
    let report = measure_from_sa_and_bwt::<A>(ctx, prepared, spec)?;
    ctx.reports.push(report);
    Ok(())
}

pub fn measure_all(ctx: &mut BenchContext, max_threads: u16, revert: bool) -> Result<()> {
    let [rlbwt, rlbwt_revert, external, fm, reversed] = standard_specs(max_threads, revert);
    run::<RlbwtAdapter>(ctx, &rlbwt)?;
    run::<RlbwtRevertAdapter>(ctx, &rlbwt_revert)?;
    run::<ExternalRlbwtAdapter>(ctx, &external)?;
    run::<FmAdapter>(ctx, &fm)?;
    run::<ReversedFmAdapter>(ctx, &reversed)?;
    Ok(())
}

pub fn measure_all_from_sa_and_bwt(
    ctx: &mut BenchContext,
    prepared: &PreparedSaBwt,
    max_threads: u16,
) -> Result<()> {
    let [rlbwt, fm, external] = sa_specs(max_threads);
    run_from_sa_and_bwt::<RlbwtAdapter>(ctx, prepared, &rlbwt)?;
    run_from_sa_and_bwt::<FmAdapter>(ctx, prepared, &fm)?;
    run_from_sa_and_bwt::<ExternalRlbwtAdapter>(ctx, prepared, &external)?;
    Ok(())
}
