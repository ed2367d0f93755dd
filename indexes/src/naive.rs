// Reference scans over the plain text. Used to check index answers, never
// to answer benchmark queries.

/// Whether `pattern` occurs in `text` starting at `pos`.
pub fn occurs_at(text: &[u8], pos: usize, pattern: &[u8]) -> bool {
    match pos.checked_add(pattern.len()) {
        Some(end) if end <= text.len() => &text[pos..end] == pattern,
        _ => false,
    }
}

/// All (possibly overlapping) occurrences of `pattern`, in increasing order.
pub fn find_all(text: &[u8], pattern: &[u8]) -> Vec<usize> {
    let n = text.len();
    let m = pattern.len();
    let mut result = Vec::new();

    if m == 0 {
        result.extend(0..=n);
        return result;
    }
    if m > n {
        return result;
    }

    let first = pattern[0];
    for i in 0..=n - m {
        if text[i] == first && &text[i..i + m] == pattern {
            result.push(i);
        }
    }

    result
}

pub fn count(text: &[u8], pattern: &[u8]) -> usize {
    find_all(text, pattern).len()
}
