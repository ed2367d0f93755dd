use std::time::Instant;

use indexes::{RlbwtIndex, Support};
use log::debug;

use super::{
    AdapterConfig, BuildOutcome, Capabilities, IndexAdapter, SaBwtInput, built, work_dir_exists,
};
use crate::{Result, subprocess, timing::elapsed_ns};

/// Run-length BWT index whose suffix array and BWT come from the `pfp-bwt`
/// helper process.
pub struct ExternalRlbwtAdapter {
    config: AdapterConfig,
    index: Option<RlbwtIndex>,
}

impl ExternalRlbwtAdapter {
    /// Runs the helper and builds the index; returns the helper's peak and
    /// the time spent outside the subprocess.
    fn build_via_helper(&mut self, text: &[u8], threads: u16) -> Result<(u64, u64)> {
        work_dir_exists(&self.config.work_dir)?;
        let run = subprocess::run_helper(&self.config, text, threads)?;

        let t1 = Instant::now();
        let artifacts = run.artifacts;
        let index = RlbwtIndex::from_sa_and_bwt(
            &artifacts.sa,
            &artifacts.bwt,
            artifacts.map,
            threads,
            Support::Full,
        )?;
        drop(artifacts.sa);
        let construct_ns = elapsed_ns(t1, Instant::now());
        debug!(
            "external: r={}, load {} ns, construction {} ns",
            index.runs(),
            run.load_ns,
            construct_ns
        );

        self.index = Some(index);
        Ok((run.peak, run.load_ns + construct_ns))
    }
}

impl IndexAdapter for ExternalRlbwtAdapter {
    const KIND: &'static str = "rlbwt_external";
    const CAPABILITIES: Capabilities = Capabilities {
        revert: true,
        count: true,
        locate: true,
        from_sa_and_bwt: true,
        parallel_build: true,
        parallel_revert: true,
        parallel_from_sa_and_bwt: false,
    };

    fn create(config: &AdapterConfig) -> Self {
        Self {
            config: config.clone(),
            index: None,
        }
    }

    fn build(&mut self, text: &[u8], threads: u16) -> Result<BuildOutcome> {
        let (external_peak, _) = self.build_via_helper(text, threads)?;
        Ok(BuildOutcome {
            time_override: None,
            external_peak,
        })
    }

    /// Ignores the prepared suffix array and runs the helper on the raw
    /// input with one thread; only loading the artifacts and the
    /// construction are timed.
    fn build_from_sa_and_bwt(
        &mut self,
        input: &SaBwtInput<'_>,
        _threads: u16,
    ) -> Result<BuildOutcome> {
        let (external_peak, time) = self.build_via_helper(input.text, 1)?;
        Ok(BuildOutcome {
            time_override: Some(time),
            external_peak,
        })
    }

    fn destroy(&mut self) {
        self.index = None;
    }

    fn revert(&self, threads: u16, out: &mut [u8]) -> Result<()> {
        built(&self.index)?.revert(out, threads)?;
        Ok(())
    }

    fn count(&mut self, pattern: &[u8]) -> Result<usize> {
        Ok(built(&self.index)?
            .count_range(pattern)
            .map_or(0, |range| range.end() - range.start() + 1))
    }

    fn locate(&mut self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        built(&self.index)?.locate(pattern, out)?;
        Ok(())
    }
}
