// Run-length encoded BWT index.
// The BWT is kept as r runs (head byte + start row). Rank inside a byte is a
// binary search over the runs of that byte, LF inside a run is an offset from
// the run's precomputed rank. Locate needs suffix array samples, which only
// the full-support variant keeps.
use log::debug;
use rayon::prelude::*;

use crate::{
    AlphabetMap, IndexError, Result, SuffixArray, alphabet, parallel,
    revert::{self, LfWalk, RevertSamples},
    suffix_array::bwt_from_suffix_array,
};

const SA_SAMPLE_RATE: usize = 32;

/// Which queries the index is built to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Revert, count and locate.
    Full,
    /// Revert and count only; no suffix array samples are kept.
    Revert,
}

#[derive(Debug, Clone)]
struct SaSamples {
    rate: usize,
    // sorted
    rows: Vec<usize>,
    positions: Vec<usize>,
}

impl SaSamples {
    fn from_suffix_array(sa: &SuffixArray, rate: usize) -> Self {
        let (rows, positions) = sa.par_filter_rows(|p| p % rate == 0).into_iter().unzip();
        Self {
            rate,
            rows,
            positions,
        }
    }

    fn lookup(&self, row: usize) -> Option<usize> {
        self.rows
            .binary_search(&row)
            .ok()
            .map(|i| self.positions[i])
    }
}

#[derive(Debug, Clone)]
pub struct RlbwtIndex {
    rows: usize,
    heads: Vec<u8>,
    starts: Vec<usize>,
    // occurrences of heads[i] in bwt[..starts[i]]
    run_rank: Vec<usize>,
    // per mapped byte: start rows of its runs and their run_rank
    byte_starts: Vec<Vec<usize>>,
    byte_runs: Vec<Vec<usize>>,
    c: [usize; 256],
    map: AlphabetMap,
    samples: RevertSamples,
    sa_samples: Option<SaSamples>,
}

impl RlbwtIndex {
    pub fn new(text: &[u8], threads: u16, support: Support) -> Result<Self> {
        parallel::with_threads(threads, || {
            let (text, map) = alphabet::terminated(text)?;
            let sa = SuffixArray::build(&text, threads)?;
            let bwt = bwt_from_suffix_array(&sa, &text);
            drop(text);
            Ok(Self::from_parts(&sa, &bwt, map, support))
        })?
    }

    pub fn from_sa_and_bwt(
        sa: &SuffixArray,
        bwt: &[u8],
        map: AlphabetMap,
        threads: u16,
        support: Support,
    ) -> Result<Self> {
        if sa.len() != bwt.len() || bwt.is_empty() {
            return Err(IndexError::Inconsistent(format!(
                "suffix array has {} entries, BWT has {}",
                sa.len(),
                bwt.len()
            )));
        }
        parallel::with_threads(threads, || Self::from_parts(sa, bwt, map, support))
    }

    fn from_parts(sa: &SuffixArray, bwt: &[u8], map: AlphabetMap, support: Support) -> Self {
        let rows = bwt.len();
        let starts: Vec<usize> = (0..rows)
            .into_par_iter()
            .filter(|&i| i == 0 || bwt[i] != bwt[i - 1])
            .collect();
        let heads: Vec<u8> = starts.par_iter().map(|&s| bwt[s]).collect();

        let mut seen = [0usize; 256];
        let mut run_rank = Vec::with_capacity(starts.len());
        let mut byte_starts = vec![Vec::new(); 256];
        let mut byte_runs = vec![Vec::new(); 256];
        for (i, (&start, &head)) in starts.iter().zip(&heads).enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(rows);
            run_rank.push(seen[head as usize]);
            byte_starts[head as usize].push(start);
            byte_runs[head as usize].push(i);
            seen[head as usize] += end - start;
        }

        let mut c = [0usize; 256];
        let mut total = 0usize;
        for (slot, &count) in c.iter_mut().zip(seen.iter()) {
            *slot = total;
            total += count;
        }

        let samples = RevertSamples::from_suffix_array(sa, rows - 1);
        let sa_samples = match support {
            Support::Full => Some(SaSamples::from_suffix_array(sa, SA_SAMPLE_RATE)),
            Support::Revert => None,
        };
        debug!(
            "rlbwt: n={}, r={}, sa samples={}",
            rows,
            starts.len(),
            sa_samples.as_ref().map_or(0, |s| s.rows.len())
        );

        Self {
            rows,
            heads,
            starts,
            run_rank,
            byte_starts,
            byte_runs,
            c,
            map,
            samples,
            sa_samples,
        }
    }

    /// Length of the indexed text, without the sentinel.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of BWT runs.
    pub fn runs(&self) -> usize {
        self.starts.len()
    }

    pub fn support(&self) -> Support {
        if self.sa_samples.is_some() {
            Support::Full
        } else {
            Support::Revert
        }
    }

    pub fn alphabet(&self) -> &AlphabetMap {
        &self.map
    }

    fn run_of(&self, row: usize) -> usize {
        self.starts.partition_point(|&s| s <= row) - 1
    }

    fn run_end(&self, run: usize) -> usize {
        self.starts.get(run + 1).copied().unwrap_or(self.rows)
    }

    // occurrences of the mapped byte `b` in bwt[..i]
    fn rank(&self, b: u8, i: usize) -> usize {
        let starts = &self.byte_starts[b as usize];
        let k = starts.partition_point(|&s| s < i);
        if k == 0 {
            return 0;
        }
        let run = self.byte_runs[b as usize][k - 1];
        let len = self.run_end(run) - self.starts[run];
        self.run_rank[run] + (i - self.starts[run]).min(len)
    }

    fn lf(&self, row: usize) -> (u8, usize) {
        let run = self.run_of(row);
        let head = self.heads[run];
        let lf = self.c[head as usize] + self.run_rank[run] + (row - self.starts[run]);
        (head, lf)
    }

    /// Inclusive range of suffix array rows prefixed by `pattern`.
    pub fn count_range(&self, pattern: &[u8]) -> Option<std::ops::RangeInclusive<usize>> {
        let mut top = 0usize;
        let mut bottom = self.rows;

        for &ch in pattern.iter().rev() {
            let b = self.map.map_byte(ch)?;
            if self.byte_starts[b as usize].is_empty() {
                return None;
            }
            top = self.c[b as usize] + self.rank(b, top);
            bottom = self.c[b as usize] + self.rank(b, bottom);
            if top >= bottom {
                return None;
            }
        }

        Some(top..=bottom - 1)
    }

    /// Appends the text positions of all occurrences. Fails on an index
    /// built without suffix array samples.
    pub fn locate(&self, pattern: &[u8], out: &mut Vec<usize>) -> Result<()> {
        let Some(sa_samples) = &self.sa_samples else {
            return Err(IndexError::NoSamples);
        };
        let Some(range) = self.count_range(pattern) else {
            return Ok(());
        };

        out.reserve(range.end() - range.start() + 1);
        for row in range {
            out.push(self.position_of(sa_samples, row));
        }
        Ok(())
    }

    fn position_of(&self, sa_samples: &SaSamples, mut row: usize) -> usize {
        // position 0 is always sampled, so the walk ends within `rate` steps
        let mut steps = 0usize;
        loop {
            if let Some(pos) = sa_samples.lookup(row) {
                return pos + steps;
            }
            row = self.lf(row).1;
            steps += 1;
            debug_assert!(steps < sa_samples.rate);
        }
    }

    /// Reconstructs the text into `out`, which must have length `len()`.
    pub fn revert(&self, out: &mut [u8], threads: u16) -> Result<()> {
        revert::revert(self, &self.samples, out, threads)
    }
}

impl LfWalk for RlbwtIndex {
    fn step(&self, row: usize) -> (u8, usize) {
        let (head, lf) = self.lf(row);
        (self.map.unmap_byte(head), lf)
    }
}
