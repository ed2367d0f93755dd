use indexes::FmIndex;

use super::{AdapterConfig, BuildOutcome, Capabilities, IndexAdapter, SaBwtInput, built};
use crate::Result;

/// FM-index with a full suffix array.
pub struct FmAdapter {
    index: Option<FmIndex>,
}

impl IndexAdapter for FmAdapter {
    const KIND: &'static str = "fm_index";
    const CAPABILITIES: Capabilities = Capabilities {
        revert: true,
        count: true,
        locate: true,
        from_sa_and_bwt: true,
        parallel_build: true,
        parallel_revert: true,
        parallel_from_sa_and_bwt: false,
    };

    fn create(_config: &AdapterConfig) -> Self {
        Self { index: None }
    }

    fn build(&mut self, text: &[u8], threads: u16) -> Result<BuildOutcome> {
        self.index = Some(FmIndex::new(text, threads)?);
        Ok(BuildOutcome::default())
    }

    /// Sequential, like the reference FM-index construction from a suffix
    /// array.
    fn build_from_sa_and_bwt(
        &mut self,
        input: &SaBwtInput<'_>,
        _threads: u16,
    ) -> Result<BuildOutcome> {
        self.index = Some(FmIndex::from_sa_and_bwt(
            input.sa,
            input.bwt,
            input.map.clone(),
            1,
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
        // half-open row range
        Ok(built(&self.index)?
            .backward_search(pattern)
            .map_or(0, |(low, high)| high - low))
    }

    fn locate(&mut self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        built(&self.index)?.locate(pattern, out);
        Ok(())
    }
}
