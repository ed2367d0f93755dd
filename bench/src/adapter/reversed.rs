use indexes::FmIndex;

use super::{AdapterConfig, BuildOutcome, Capabilities, IndexAdapter, built};
use crate::Result;

/// FM-index over the reversed text, built and queried on one thread.
///
/// Patterns are reversed before the search. An occurrence of the reversed
/// pattern starting at `q` ends at `e = q + m - 1` in reversed coordinates,
/// which is forward offset `text_len - 1 - e`.
pub struct ReversedFmAdapter {
    index: Option<FmIndex>,
    text_len: usize,
    reversed: Vec<u8>,
    hits: Vec<usize>,
}

impl ReversedFmAdapter {
    fn reverse_pattern(&mut self, pattern: &[u8]) {
        self.reversed.clear();
        self.reversed.extend(pattern.iter().rev());
    }
}

impl IndexAdapter for ReversedFmAdapter {
    const KIND: &'static str = "fm_index_reversed";
    const CAPABILITIES: Capabilities = Capabilities {
        revert: true,
        count: true,
        locate: true,
        from_sa_and_bwt: false,
        parallel_build: false,
        parallel_revert: false,
        parallel_from_sa_and_bwt: false,
    };

    fn create(_config: &AdapterConfig) -> Self {
        Self {
            index: None,
            text_len: 0,
            reversed: Vec::new(),
            hits: Vec::new(),
        }
    }

    fn build(&mut self, text: &[u8], _threads: u16) -> Result<BuildOutcome> {
        let reversed: Vec<u8> = text.iter().rev().copied().collect();
        self.index = Some(FmIndex::new(&reversed, 1)?);
        self.text_len = text.len();
        Ok(BuildOutcome::default())
    }

    fn destroy(&mut self) {
        self.index = None;
        self.text_len = 0;
    }

    fn revert(&self, _threads: u16, out: &mut [u8]) -> Result<()> {
        built(&self.index)?.revert(out, 1)?;
        out.reverse();
        Ok(())
    }

    fn count(&mut self, pattern: &[u8]) -> Result<usize> {
        self.reverse_pattern(pattern);
        Ok(built(&self.index)?
            .backward_search(&self.reversed)
            .map_or(0, |(low, high)| high - low))
    }

    fn locate(&mut self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        self.reverse_pattern(pattern);
        let index = built(&self.index)?;
        self.hits.clear();
        index.locate(&self.reversed, &mut self.hits);

        let m = pattern.len();
        let last = self.text_len;
        out.extend(self.hits.iter().map(|&q| {
            // the empty pattern also matches at the end of the text
            if m == 0 { last - q } else { last - 1 - (q + m - 1) }
        }));
        Ok(())
    }
}
