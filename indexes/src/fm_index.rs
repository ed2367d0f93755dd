// FM-index over a byte text with a full suffix array.
// Occ is stored as checkpoints every `CHECKPOINT` rows plus a scan of the
// BWT inside the block. The suffix array is kept whole (n words), so locate
// is a plain range copy.
// The text is terminated internally with the sentinel and remapped when it
// contains the reserved bytes 0 or 1.
use rayon::prelude::*;

use crate::{
    AlphabetMap, IndexError, Result, SuffixArray, alphabet, parallel,
    revert::{self, LfWalk, RevertSamples},
    suffix_array::bwt_from_suffix_array,
};

const CHECKPOINT: usize = 128;

#[derive(Debug, Clone)]
pub struct FmIndex {
    sa: SuffixArray,
    bwt: Vec<u8>,
    c: Vec<usize>,
    counts: Vec<usize>,
    occ: Vec<u64>,
    byte_to_rank: [i16; 256],
    rank_to_text_byte: Vec<u8>,
    map: AlphabetMap,
    samples: RevertSamples,
}

impl FmIndex {
    /// Builds the index of `text` using up to `threads` workers.
    pub fn new(text: &[u8], threads: u16) -> Result<Self> {
        parallel::with_threads(threads, || {
            let (text, map) = alphabet::terminated(text)?;
            let sa = SuffixArray::build(&text, threads)?;
            let bwt = bwt_from_suffix_array(&sa, &text);
            drop(text);
            Ok(Self::from_parts(sa, &bwt, map))
        })?
    }

    /// Builds the index from a precomputed suffix array and BWT of a
    /// sentinel-terminated text whose bytes were mapped with `map`.
    pub fn from_sa_and_bwt(
        sa: &SuffixArray,
        bwt: &[u8],
        map: AlphabetMap,
        threads: u16,
    ) -> Result<Self> {
        if sa.len() != bwt.len() || bwt.is_empty() {
            return Err(IndexError::Inconsistent(format!(
                "suffix array has {} entries, BWT has {}",
                sa.len(),
                bwt.len()
            )));
        }
        parallel::with_threads(threads, || Self::from_parts(sa.clone(), bwt, map))
    }

    fn from_parts(sa: SuffixArray, bwt: &[u8], map: AlphabetMap) -> Self {
        let (byte_to_rank, rank_to_byte, counts) = build_alphabet(bwt);
        let c = build_c(&counts);
        let ranks = remap_bwt(bwt, &byte_to_rank);
        let occ = build_occ(&ranks, counts.len(), CHECKPOINT);
        let samples = RevertSamples::from_suffix_array(&sa, bwt.len() - 1);
        let rank_to_text_byte = rank_to_byte.iter().map(|&b| map.unmap_byte(b)).collect();

        Self {
            sa,
            bwt: ranks,
            c,
            counts,
            occ,
            byte_to_rank,
            rank_to_text_byte,
            map,
            samples,
        }
    }

    /// Length of the indexed text, without the sentinel.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> usize {
        self.bwt.len()
    }

    /// Half-open range `[top, bottom)` of suffix array rows prefixed by
    /// `pattern`, or `None` when it does not occur.
    pub fn backward_search(&self, pattern: &[u8]) -> Option<(usize, usize)> {
        if pattern.is_empty() {
            return Some((0, self.rows()));
        }

        let mut top = 0usize;
        let mut bottom = self.rows();

        for &ch in pattern.iter().rev() {
            let rank = self.rank_for_byte(ch)?;

            top = self.c[rank] + self.occ_at(rank, top);
            bottom = self.c[rank] + self.occ_at(rank, bottom);

            if top >= bottom {
                return None;
            }
        }

        Some((top, bottom))
    }

    /// Appends the text positions of all occurrences, in suffix array order.
    pub fn locate(&self, pattern: &[u8], out: &mut Vec<usize>) {
        if let Some((top, bottom)) = self.backward_search(pattern) {
            out.extend((top..bottom).map(|row| self.sa.get(row)));
        }
    }

    /// Sorted occurrence positions.
    pub fn search(&self, pattern: &[u8]) -> Vec<usize> {
        let mut out = Vec::new();
        self.locate(pattern, &mut out);
        out.sort_unstable();
        out
    }

    /// Reconstructs the text into `out`, which must have length `len()`.
    pub fn revert(&self, out: &mut [u8], threads: u16) -> Result<()> {
        revert::revert(self, &self.samples, out, threads)
    }

    pub fn alphabet(&self) -> &AlphabetMap {
        &self.map
    }

    fn lf(&self, row: usize) -> usize {
        let rank = self.bwt[row] as usize;
        self.c[rank] + self.occ_at(rank, row)
    }

    fn occ_at(&self, rank: usize, index: usize) -> usize {
        let sigma = self.counts.len();
        let capped = index.min(self.rows());
        let base_idx = capped / CHECKPOINT;
        let base_pos = base_idx * CHECKPOINT;
        let mut count = self.occ[base_idx * sigma + rank] as usize;
        for &r in &self.bwt[base_pos..capped] {
            if r as usize == rank {
                count += 1;
            }
        }
        count
    }

    fn rank_for_byte(&self, ch: u8) -> Option<usize> {
        let mapped = self.map.map_byte(ch)?;
        let rank = self.byte_to_rank[mapped as usize];
        if rank < 0 { None } else { Some(rank as usize) }
    }
}

impl LfWalk for FmIndex {
    fn step(&self, row: usize) -> (u8, usize) {
        (self.rank_to_text_byte[self.bwt[row] as usize], self.lf(row))
    }
}

fn build_alphabet(bwt: &[u8]) -> ([i16; 256], Vec<u8>, Vec<usize>) {
    let counts_by_byte = bwt
        .par_chunks(1 << 16)
        .fold(
            || [0usize; 256],
            |mut acc, chunk| {
                for &b in chunk {
                    acc[b as usize] += 1;
                }
                acc
            },
        )
        .reduce(
            || [0usize; 256],
            |mut a, b| {
                for i in 0..256 {
                    a[i] += b[i];
                }
                a
            },
        );

    let mut byte_to_rank = [-1i16; 256];
    let mut rank_to_byte = Vec::new();
    let mut counts = Vec::new();

    for byte in 0..256usize {
        let count = counts_by_byte[byte];
        if count == 0 {
            continue;
        }
        byte_to_rank[byte] = rank_to_byte.len() as i16;
        rank_to_byte.push(byte as u8);
        counts.push(count);
    }

    (byte_to_rank, rank_to_byte, counts)
}

fn build_c(counts: &[usize]) -> Vec<usize> {
    let mut c = Vec::with_capacity(counts.len());
    let mut total = 0usize;
    for &count in counts {
        c.push(total);
        total += count;
    }
    c
}

fn remap_bwt(bwt: &[u8], byte_to_rank: &[i16; 256]) -> Vec<u8> {
    // every BWT byte was counted, so every rank exists
    bwt.par_iter()
        .map(|&b| byte_to_rank[b as usize] as u8)
        .collect()
}

// occ[b * sigma + r] = occurrences of rank r in bwt[..b * checkpoint]
fn build_occ(bwt: &[u8], sigma: usize, checkpoint: usize) -> Vec<u64> {
    let blocks: Vec<Vec<u64>> = bwt
        .par_chunks(checkpoint)
        .map(|block| {
            let mut counts = vec![0u64; sigma];
            for &rank in block {
                counts[rank as usize] += 1;
            }
            counts
        })
        .collect();

    let mut occ = Vec::with_capacity((bwt.len() / checkpoint + 1) * sigma);
    let mut running = vec![0u64; sigma];
    occ.extend_from_slice(&running);

    for block in blocks.iter().take(bwt.len() / checkpoint) {
        for (total, &count) in running.iter_mut().zip(block) {
            *total += count;
        }
        occ.extend_from_slice(&running);
    }

    occ
}
