// Text reconstruction by walking LF backwards from sampled rows.
// The text is cut at every `rate`-th position; the row of each cut is known,
// so contiguous groups of segments can be rebuilt independently.
use rayon::prelude::*;

use crate::{IndexError, Result, SuffixArray, parallel};

const TARGET_SEGMENTS: usize = 4096;

/// One LF step: the BWT byte of `row` and the row of the preceding suffix.
pub(crate) trait LfWalk: Sync {
    fn step(&self, row: usize) -> (u8, usize);
}

#[derive(Debug, Clone)]
pub(crate) struct RevertSamples {
    rate: usize,
    n: usize,
    // rows[k] is the row of the suffix starting at min(k * rate, n)
    rows: Vec<usize>,
}

impl RevertSamples {
    /// `n` is the text length without the sentinel; `sa` covers `n + 1` rows.
    pub(crate) fn from_suffix_array(sa: &SuffixArray, n: usize) -> Self {
        let rate = (n / TARGET_SEGMENTS).max(1);
        let segments = n.div_ceil(rate);
        let mut rows = vec![0usize; segments + 1];

        for (row, pos) in sa.par_filter_rows(|p| p % rate == 0 || p == n) {
            let k = if pos == n { segments } else { pos / rate };
            rows[k] = row;
        }

        Self { rate, n, rows }
    }

    pub(crate) fn len(&self) -> usize {
        self.n
    }

    fn segments(&self) -> usize {
        self.rows.len() - 1
    }

    fn boundary(&self, k: usize) -> usize {
        (k * self.rate).min(self.n)
    }
}

/// Fills `out` with the (still mapped) text. Uses at most `threads` workers.
pub(crate) fn revert<W: LfWalk>(
    walk: &W,
    samples: &RevertSamples,
    out: &mut [u8],
    threads: u16,
) -> Result<()> {
    if out.len() != samples.n {
        return Err(IndexError::OutputLength {
            expected: samples.n,
            actual: out.len(),
        });
    }

    let segments = samples.segments();
    let groups = (threads as usize).min(segments).max(1);
    let mut jobs = Vec::with_capacity(groups);
    let mut rest: &mut [u8] = out;

    for g in 0..groups {
        let k_lo = g * segments / groups;
        let k_hi = (g + 1) * segments / groups;
        let len = samples.boundary(k_hi) - samples.boundary(k_lo);
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(len);
        rest = tail;
        jobs.push((chunk, samples.rows[k_hi]));
    }

    if groups == 1 {
        for (chunk, row) in jobs {
            walk_back(walk, row, chunk);
        }
        return Ok(());
    }

    parallel::with_threads(threads, || {
        jobs.into_par_iter()
            .for_each(|(chunk, row)| walk_back(walk, row, chunk));
    })
}

fn walk_back<W: LfWalk>(walk: &W, mut row: usize, chunk: &mut [u8]) {
    for slot in chunk.iter_mut().rev() {
        let (byte, next) = walk.step(row);
        *slot = byte;
        row = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // LF over a plain suffix array, enough to drive the walk.
    struct PlainWalk {
        text: Vec<u8>,
        sa: Vec<usize>,
        isa: Vec<usize>,
    }

    impl PlainWalk {
        fn new(text: &[u8]) -> Self {
            let mut sa: Vec<usize> = (0..text.len()).collect();
            sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
            let mut isa = vec![0; sa.len()];
            for (row, &p) in sa.iter().enumerate() {
                isa[p] = row;
            }
            Self {
                text: text.to_vec(),
                sa,
                isa,
            }
        }
    }

    impl LfWalk for PlainWalk {
        fn step(&self, row: usize) -> (u8, usize) {
            let n = self.text.len();
            let p = self.sa[row];
            let prev = if p == 0 { n - 1 } else { p - 1 };
            (self.text[prev], self.isa[prev])
        }
    }

    #[test]
    fn reverts_with_any_thread_count() {
        let text = b"abracadabra_abracadabra\x01";
        let walk = PlainWalk::new(text);
        let sa = SuffixArray::from_positions(&walk.sa);
        let samples = RevertSamples::from_suffix_array(&sa, text.len() - 1);

        for threads in [1u16, 2, 3, 8, 64] {
            let mut out = vec![0u8; text.len() - 1];
            revert(&walk, &samples, &mut out, threads).unwrap();
            assert_eq!(&out[..], &text[..text.len() - 1], "threads={}", threads);
        }
    }

    #[test]
    fn rejects_wrong_output_length() {
        let text = b"abc\x01";
        let walk = PlainWalk::new(text);
        let samples = RevertSamples::from_suffix_array(&SuffixArray::from_positions(&walk.sa), 3);
        let mut out = vec![0u8; 2];
        assert!(matches!(
            revert(&walk, &samples, &mut out, 1),
            Err(IndexError::OutputLength { expected: 3, actual: 2 })
        ));
    }
}
