// Wall-clock helpers and the human readable formatting used in the
// benchmark output.
use std::time::Instant;

/// Nanoseconds from `t1` to `t2`, 0 if `t2` is earlier.
pub fn elapsed_ns(t1: Instant, t2: Instant) -> u64 {
    u64::try_from(t2.saturating_duration_since(t1).as_nanos()).unwrap_or(u64::MAX)
}

/// Thread counts 1, 2, 4, ... up to and including `max`.
pub fn thread_sweep(max: u16) -> impl Iterator<Item = u16> {
    std::iter::successors(Some(1u16), |&t| t.checked_mul(2)).take_while(move |&t| t <= max)
}

pub fn format_time(ns: u64) -> String {
    let ns_f = ns as f64;
    if ns < 1_000 {
        format!("{} ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.3} µs", ns_f / 1e3)
    } else if ns < 1_000_000_000 {
        format!("{:.3} ms", ns_f / 1e6)
    } else {
        format!("{:.3} s", ns_f / 1e9)
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.3} {}", value, UNITS[unit])
}

pub fn format_threads(threads: u16) -> String {
    if threads == 1 {
        "1 thread".to_string()
    } else {
        format!("{} threads", threads)
    }
}

pub fn format_query_throughput(queries: u64, ns: u64) -> String {
    if ns == 0 {
        return format!("{} queries in 0 ns", queries);
    }
    let per_second = queries as f64 * 1e9 / ns as f64;
    format!(
        "{} queries in {} ({:.0} queries/s, {} per query)",
        queries,
        format_time(ns),
        per_second,
        format_time(ns / queries.max(1))
    )
}
