use indexes::{RlbwtIndex, Support};

use super::{AdapterConfig, BuildOutcome, Capabilities, IndexAdapter, SaBwtInput, built};
use crate::Result;

/// Run-length BWT index. With `LOCATE = false` no suffix array samples are
/// kept and the index answers revert and count only.
pub struct RlbwtIndexAdapter<const LOCATE: bool> {
    index: Option<RlbwtIndex>,
}

pub type RlbwtAdapter = RlbwtIndexAdapter<true>;
pub type RlbwtRevertAdapter = RlbwtIndexAdapter<false>;

impl<const LOCATE: bool> RlbwtIndexAdapter<LOCATE> {
    const SUPPORT: Support = if LOCATE { Support::Full } else { Support::Revert };
}

impl<const LOCATE: bool> IndexAdapter for RlbwtIndexAdapter<LOCATE> {
    const KIND: &'static str = if LOCATE { "rlbwt" } else { "rlbwt_revert" };
    const CAPABILITIES: Capabilities = Capabilities {
        revert: true,
        count: true,
        locate: LOCATE,
        from_sa_and_bwt: true,
        parallel_build: true,
        parallel_revert: true,
        parallel_from_sa_and_bwt: true,
    };

    fn create(_config: &AdapterConfig) -> Self {
        Self { index: None }
    }

    fn build(&mut self, text: &[u8], threads: u16) -> Result<BuildOutcome> {
        self.index = Some(RlbwtIndex::new(text, threads, Self::SUPPORT)?);
        Ok(BuildOutcome::default())
    }

    fn build_from_sa_and_bwt(
        &mut self,
        input: &SaBwtInput<'_>,
        threads: u16,
    ) -> Result<BuildOutcome> {
        self.index = Some(RlbwtIndex::from_sa_and_bwt(
            input.sa,
            input.bwt,
            input.map.clone(),
            threads,
            Self::SUPPORT,
        )?);
        Ok(BuildOutcome::default())
    }

    fn destroy(&mut self) {
        self.index = None;
    }

    fn revert(&self, threads: u16, out: &mut [u8]) -> Result<()> {
        built(&self.index)?.revert(out, threads)?;
        Ok(())
    }

    fn count(&mut self, pattern: &[u8]) -> Result<usize> {
        // inclusive row range
        Ok(built(&self.index)?
            .count_range(pattern)
            .map_or(0, |range| range.end() - range.start() + 1))
    }

    fn locate(&mut self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        if !LOCATE {
            return Err(super::unsupported::<Self>("locate"));
        }
        built(&self.index)?.locate(pattern, out)?;
        Ok(())
    }
}
