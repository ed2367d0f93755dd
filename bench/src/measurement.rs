// Result records and the append-only measurement log.
//
// Every record is one line of space separated `key=value` tokens starting
// with `RESULT type=<kind>`, so logs of several runs can be concatenated
// and aggregated by line.
use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildResult {
    pub num_threads: u16,
    pub time_build: u64,
    pub peak_memory_usage: u64,
    pub index_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertResult {
    pub num_threads: u16,
    pub time_revert: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryResult {
    pub num_queries: u64,
    pub pattern_length: u64,
    pub num_occurrences: u64,
    pub time_query: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Build {
        implementation: &'a str,
        text: &'a str,
        from_sa_and_bwt: bool,
        result: &'a BuildResult,
    },
    Revert {
        implementation: &'a str,
        text: &'a str,
        result: &'a RevertResult,
        index_size: u64,
    },
    Count {
        implementation: &'a str,
        text: &'a str,
        result: &'a QueryResult,
        index_size: u64,
    },
    Locate {
        implementation: &'a str,
        text: &'a str,
        result: &'a QueryResult,
        index_size: u64,
    },
}

impl Record<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Build {
                from_sa_and_bwt: false,
                ..
            } => "comparison_build",
            Record::Build {
                from_sa_and_bwt: true,
                ..
            } => "comparison_build_from_sa_and_bwt",
            Record::Revert { .. } => "comparison_revert",
            Record::Count { .. } => "comparison_count",
            Record::Locate { .. } => "comparison_locate",
        }
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RESULT type={}", self.kind())?;
        match self {
            Record::Build {
                implementation,
                text,
                result,
                ..
            } => write!(
                f,
                " implementation={} text={} num_threads={} time_build={} peak_memory_usage={} index_size={}",
                implementation,
                text,
                result.num_threads,
                result.time_build,
                result.peak_memory_usage,
                result.index_size
            ),
            Record::Revert {
                implementation,
                text,
                result,
                index_size,
            } => write!(
                f,
                " implementation={} text={} num_threads={} time_revert={} index_size={}",
                implementation, text, result.num_threads, result.time_revert, index_size
            ),
            Record::Count {
                implementation,
                text,
                result,
                index_size,
            }
            | Record::Locate {
                implementation,
                text,
                result,
                index_size,
            } => write!(
                f,
                " implementation={} text={} num_queries={} pattern_length={} num_occurrences={} time_query={} index_size={}",
                implementation,
                text,
                result.num_queries,
                result.pattern_length,
                result.num_occurrences,
                result.time_query,
                index_size
            ),
        }
    }
}

pub struct MeasurementLog {
    out: BufWriter<File>,
}

impl MeasurementLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &Record<'_>) -> io::Result<()> {
        writeln!(self.out, "{}", record)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
