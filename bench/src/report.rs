// End-of-run summary over all measured implementations.
use crate::{
    driver::MeasureReport,
    measurement::QueryResult,
    timing::{format_size, format_time},
};

fn per_query(result: Option<&QueryResult>) -> String {
    match result {
        Some(r) if r.num_queries > 0 => format_time(r.time_query / r.num_queries),
        _ => "-".to_string(),
    }
}

fn check_column(report: &MeasureReport) -> &'static str {
    let checks: Vec<bool> = report
        .revert_correct
        .into_iter()
        .chain(report.locates.iter().filter_map(|pass| pass.correct))
        .collect();
    if checks.is_empty() {
        "-"
    } else if checks.iter().all(|&ok| ok) {
        "ok"
    } else {
        "FAILED"
    }
}

/// One row per implementation: fastest build and revert, per-query times.
pub fn summary_rows(reports: &[MeasureReport]) -> Vec<String> {
    reports
        .iter()
        .map(|report| {
            let build = report.builds.iter().min_by_key(|b| b.time_build);
            let revert = report.reverts.iter().min_by_key(|r| r.time_revert);
            format!(
                "{:<26} | {:>12} | {:>12} | {:>12} | {:>12} | {:>11} | {:>11} | {:>11} | {:<6}",
                report.name,
                build.map_or("-".to_string(), |b| format_time(b.time_build)),
                build.map_or("-".to_string(), |b| format_size(b.peak_memory_usage)),
                format_size(report.index_size()),
                revert.map_or("-".to_string(), |r| format_time(r.time_revert)),
                per_query(report.count.as_ref()),
                per_query(report.locates.first().map(|p| &p.result)),
                per_query(report.locates.get(1).map(|p| &p.result)),
                check_column(report),
            )
        })
        .collect()
}

pub fn print_summary_table(reports: &[MeasureReport]) {
    if reports.is_empty() {
        return;
    }
    println!("\n\n{:=^135}", " RESULTS SUMMARY ");
    println!(
        "{:<26} | {:>12} | {:>12} | {:>12} | {:>12} | {:>11} | {:>11} | {:>11} | {:<6}",
        "Implementation",
        "Build",
        "Peak memory",
        "Index size",
        "Revert",
        "Count/q",
        "Locate 1/q",
        "Locate 2/q",
        "Check"
    );
    println!("{:-^135}", "");

    for row in summary_rows(reports) {
        println!("{}", row);
    }
    println!("{:=^135}", " END ");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::LocatePass,
        measurement::{BuildResult, RevertResult},
    };

    fn report() -> MeasureReport {
        MeasureReport {
            name: "FM-index".to_string(),
            log_name: "fm_index".to_string(),
            builds: vec![
                BuildResult {
                    num_threads: 1,
                    time_build: 3_000,
                    peak_memory_usage: 2048,
                    index_size: 1024,
                },
                BuildResult {
                    num_threads: 2,
                    time_build: 2_000,
                    peak_memory_usage: 4096,
                    index_size: 1024,
                },
            ],
            reverts: vec![RevertResult {
                num_threads: 1,
                time_revert: 500,
            }],
            revert_correct: Some(true),
            count: Some(QueryResult {
                num_queries: 10,
                pattern_length: 4,
                num_occurrences: 3,
                time_query: 1_000,
            }),
            locates: vec![LocatePass {
                result: QueryResult::default(),
                correct: Some(false),
            }],
        }
    }

    #[test]
    fn row_uses_fastest_build() {
        let rows = summary_rows(&[report()]);
        assert_eq!(rows.len(), 1);
        let cells: Vec<&str> = rows[0].split('|').map(str::trim).collect();
        assert_eq!(cells[0], "FM-index");
        assert_eq!(cells[1], "2.000 µs");
        assert_eq!(cells[2], "4.000 KB");
        assert_eq!(cells[3], "1.000 KB");
        assert_eq!(cells[4], "500 ns");
        assert_eq!(cells[5], "100 ns");
        assert_eq!(cells[6], "-");
        assert_eq!(cells[7], "-");
        assert_eq!(cells[8], "FAILED");
    }
}
