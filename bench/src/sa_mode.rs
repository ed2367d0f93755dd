// Preparation for the SA/BWT mode: the suffix array and BWT of the input
// are built once and every registered implementation is constructed from
// them.
use indexes::{AlphabetMap, SuffixArray, alphabet, parallel, suffix_array::bwt_from_suffix_array};
use log::info;

use crate::{Result, adapter::SaBwtInput};

pub struct PreparedSaBwt {
    pub sa: SuffixArray,
    pub bwt: Vec<u8>,
    pub map: AlphabetMap,
}

impl PreparedSaBwt {
    /// Scans the alphabet, remaps the input if it contains 0 or 1, appends
    /// the sentinel and builds suffix array and BWT with `threads` workers.
    pub fn prepare(text: &[u8], threads: u16) -> Result<Self> {
        let prepared = parallel::with_threads(threads, || -> Result<Self> {
            let (terminated, map) = alphabet::terminated(text)?;
            if !map.is_identity() {
                info!("sa mode: input contains reserved bytes, alphabet remapped");
            }

            println!("building suffix array");
            let sa = SuffixArray::build(&terminated, threads)?;
            info!("sa mode: {} bit suffix array", sa.word_bits());

            println!("building BWT");
            let bwt = bwt_from_suffix_array(&sa, &terminated);
            println!();

            Ok(Self { sa, bwt, map })
        })??;
        Ok(prepared)
    }

    /// View handed to the adapters; `text` is the input as read.
    pub fn input<'a>(&'a self, text: &'a [u8]) -> SaBwtInput<'a> {
        SaBwtInput {
            text,
            sa: &self.sa,
            bwt: &self.bwt,
            map: &self.map,
        }
    }
}
