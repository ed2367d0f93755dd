// Suffix array and BWT construction on top of libsais.
// Texts whose length fits an i32 get 32-bit entries, larger texts 64-bit.
use libsais::ThreadCount;
use log::debug;
use rayon::prelude::*;

use crate::{IndexError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixArray {
    I32(Vec<i32>),
    I64(Vec<i64>),
}

impl SuffixArray {
    /// Builds the suffix array of `text` with libsais using `threads`
    /// OpenMP workers. The text must end with a unique minimal byte.
    pub fn build(text: &[u8], threads: u16) -> Result<Self> {
        let threads = threads.max(1);
        if text.len() <= i32::MAX as usize {
            debug!("suffix array: libsais (32 bit), n={}, threads={}", text.len(), threads);
            let sa: Vec<i32> = libsais::SuffixArrayConstruction::for_text(text)
                .in_owned_buffer()
                .multi_threaded(ThreadCount::fixed(threads))
                .run()
                .map_err(|e| IndexError::SuffixArray(format!("{:?}", e)))?
                .into_vec();
            Ok(SuffixArray::I32(sa))
        } else {
            debug!("suffix array: libsais (64 bit), n={}, threads={}", text.len(), threads);
            let sa: Vec<i64> = libsais::SuffixArrayConstruction::for_text(text)
                .in_owned_buffer()
                .multi_threaded(ThreadCount::fixed(threads))
                .run()
                .map_err(|e| IndexError::SuffixArray(format!("{:?}", e)))?
                .into_vec();
            Ok(SuffixArray::I64(sa))
        }
    }

    pub fn from_positions(positions: &[usize]) -> Self {
        if positions.len() <= i32::MAX as usize {
            SuffixArray::I32(positions.iter().map(|&p| p as i32).collect())
        } else {
            SuffixArray::I64(positions.iter().map(|&p| p as i64).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SuffixArray::I32(sa) => sa.len(),
            SuffixArray::I64(sa) => sa.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> usize {
        match self {
            SuffixArray::I32(sa) => sa[i] as usize,
            SuffixArray::I64(sa) => sa[i] as usize,
        }
    }

    pub fn word_bits(&self) -> u32 {
        match self {
            SuffixArray::I32(_) => 32,
            SuffixArray::I64(_) => 64,
        }
    }

    /// Calls `f(row, position)` for every entry in parallel.
    pub fn par_for_each<F>(&self, f: F)
    where
        F: Fn(usize, usize) + Sync + Send,
    {
        match self {
            SuffixArray::I32(sa) => sa
                .par_iter()
                .enumerate()
                .for_each(|(i, &p)| f(i, p as usize)),
            SuffixArray::I64(sa) => sa
                .par_iter()
                .enumerate()
                .for_each(|(i, &p)| f(i, p as usize)),
        }
    }

    /// Rows whose suffix starts at a position accepted by `keep`, as
    /// `(row, position)` pairs in row order.
    pub fn par_filter_rows<F>(&self, keep: F) -> Vec<(usize, usize)>
    where
        F: Fn(usize) -> bool + Sync + Send,
    {
        match self {
            SuffixArray::I32(sa) => sa
                .par_iter()
                .enumerate()
                .filter(|&(_, &p)| keep(p as usize))
                .map(|(i, &p)| (i, p as usize))
                .collect(),
            SuffixArray::I64(sa) => sa
                .par_iter()
                .enumerate()
                .filter(|&(_, &p)| keep(p as usize))
                .map(|(i, &p)| (i, p as usize))
                .collect(),
        }
    }
}

/// BWT[i] = text[SA[i] - 1], wrapping to the last byte for SA[i] == 0.
pub fn bwt_from_suffix_array(sa: &SuffixArray, text: &[u8]) -> Vec<u8> {
    let n = text.len();
    let mut bwt = vec![0u8; n];
    match sa {
        SuffixArray::I32(sa) => bwt
            .par_iter_mut()
            .zip(sa.par_iter())
            .for_each(|(b, &p)| *b = text[if p == 0 { n - 1 } else { p as usize - 1 }]),
        SuffixArray::I64(sa) => bwt
            .par_iter_mut()
            .zip(sa.par_iter())
            .for_each(|(b, &p)| *b = text[if p == 0 { n - 1 } else { p as usize - 1 }]),
    }
    bwt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_suffix_array(text: &[u8]) -> Vec<usize> {
        let mut sa: Vec<usize> = (0..text.len()).collect();
        sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        sa
    }

    #[test]
    fn matches_naive_sort() {
        let text = b"mississippi\x01";
        let sa = SuffixArray::build(text, 1).unwrap();
        let expected = naive_suffix_array(text);
        assert_eq!(sa.len(), expected.len());
        for (i, &p) in expected.iter().enumerate() {
            assert_eq!(sa.get(i), p);
        }
        assert_eq!(sa.word_bits(), 32);
    }

    #[test]
    fn parallel_build_agrees() {
        let text: Vec<u8> = (0..5000u32)
            .map(|i| b"acgt"[(i * 7 % 11 % 4) as usize])
            .chain(std::iter::once(1))
            .collect();
        let one = SuffixArray::build(&text, 1).unwrap();
        let four = SuffixArray::build(&text, 4).unwrap();
        assert_eq!(one, four);
    }

    #[test]
    fn bwt_of_banana() {
        let text = b"banana\x01";
        let sa = SuffixArray::from_positions(&naive_suffix_array(text));
        let bwt = bwt_from_suffix_array(&sa, text);
        assert_eq!(bwt, b"annb\x01aa");
    }

    #[test]
    fn filter_rows_keeps_row_order() {
        let text = b"banana\x01";
        let sa = SuffixArray::from_positions(&naive_suffix_array(text));
        let rows = sa.par_filter_rows(|p| p % 2 == 0);
        assert_eq!(rows, vec![(0, 6), (4, 0), (5, 4), (6, 2)]);
    }
}
