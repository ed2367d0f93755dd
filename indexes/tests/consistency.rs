use indexes::{FmIndex, RlbwtIndex, Support, naive};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn texts() -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut texts = vec![
        Vec::new(),
        vec![b'z'; 513],
        (2..=255u8).collect(),
        (0..1024u32).map(|i| b"ab"[(i.count_ones() % 2) as usize]).collect(),
        vec![0, 1, 0, 0, 1, 1, 2, 0, 1],
    ];
    for len in [1usize, 17, 4096, 20_000] {
        texts.push((0..len).map(|_| b"acgt"[rng.gen_range(0..4)]).collect());
    }
    texts.push((0..5000).map(|_| rng.gen_range(0..=255u8)).filter(|&b| b > 3).collect());
    texts
}

fn patterns(text: &[u8], rng: &mut StdRng) -> Vec<Vec<u8>> {
    let mut patterns = vec![b"ac".to_vec(), vec![0, 1], vec![b'z'; 3]];
    if text.is_empty() {
        return patterns;
    }
    for len in [1usize, 2, 5, 12] {
        if len > text.len() {
            break;
        }
        for _ in 0..10 {
            let start = rng.gen_range(0..=text.len() - len);
            patterns.push(text[start..start + len].to_vec());
        }
    }
    patterns
}

#[test]
fn revert_reproduces_text() {
    for text in texts() {
        let fm = FmIndex::new(&text, 2).unwrap();
        let rl = RlbwtIndex::new(&text, 2, Support::Revert).unwrap();
        for threads in [1u16, 3] {
            let mut out = vec![0u8; text.len()];
            fm.revert(&mut out, threads).unwrap();
            assert_eq!(out, text, "fm, n={}", text.len());

            out.fill(0);
            rl.revert(&mut out, threads).unwrap();
            assert_eq!(out, text, "rlbwt, n={}", text.len());
        }
    }
}

#[test]
fn queries_agree_with_scan() {
    let mut rng = StdRng::seed_from_u64(11);
    for text in texts() {
        let fm = FmIndex::new(&text, 1).unwrap();
        let rl = RlbwtIndex::new(&text, 3, Support::Full).unwrap();

        for pattern in patterns(&text, &mut rng) {
            let expected = naive::find_all(&text, &pattern);

            let fm_count = fm.backward_search(&pattern).map_or(0, |(lo, hi)| hi - lo);
            let rl_count = rl
                .count_range(&pattern)
                .map_or(0, |r| r.end() - r.start() + 1);
            assert_eq!(fm_count, expected.len());
            assert_eq!(rl_count, expected.len());

            assert_eq!(fm.search(&pattern), expected);

            let mut occ = Vec::new();
            rl.locate(&pattern, &mut occ).unwrap();
            occ.sort_unstable();
            assert_eq!(occ, expected);
        }
    }
}

#[test]
fn too_many_distinct_bytes_fail() {
    let text: Vec<u8> = (0..=255u8).collect();
    assert!(FmIndex::new(&text, 1).is_err());
    assert!(RlbwtIndex::new(&text, 1, Support::Full).is_err());
}
