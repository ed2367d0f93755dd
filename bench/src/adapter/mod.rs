// Uniform build/destroy/revert/count/locate contract over the benchmarked
// indexes. The driver is generic over `IndexAdapter` and never touches a
// concrete index type.
mod external;
mod fm;
mod reversed;
mod rlbwt;

use std::path::{Path, PathBuf};

use indexes::{AlphabetMap, SuffixArray};

use crate::{BenchError, Result};

pub use external::ExternalRlbwtAdapter;
pub use fm::FmAdapter;
pub use reversed::ReversedFmAdapter;
pub use rlbwt::{RlbwtAdapter, RlbwtIndexAdapter, RlbwtRevertAdapter};

/// Name of the BWT construction helper binary.
pub const HELPER_NAME: &str = "pfp-bwt";

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Executable run by subprocess-backed adapters.
    pub helper: PathBuf,
    /// Directory that holds their temporary artifacts.
    pub work_dir: PathBuf,
}

impl AdapterConfig {
    pub fn new(helper: Option<PathBuf>, work_dir: Option<PathBuf>) -> Self {
        Self {
            helper: helper.unwrap_or_else(default_helper_path),
            work_dir: work_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// `pfp-bwt` next to the running executable, or on the `PATH`.
pub fn default_helper_path() -> PathBuf {
    let file_name = format!("{}{}", HELPER_NAME, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// What an implementation supports. The registry derives the phases and
/// thread caps of every measurement from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub revert: bool,
    pub count: bool,
    pub locate: bool,
    pub from_sa_and_bwt: bool,
    pub parallel_build: bool,
    pub parallel_revert: bool,
    /// Construction from a suffix array and BWT uses more than one thread.
    pub parallel_from_sa_and_bwt: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Replaces the measured wall-clock time when set.
    pub time_override: Option<u64>,
    /// Peak heap usage reported by a subprocess, in bytes.
    pub external_peak: u64,
}

/// Suffix array and BWT of the remapped, terminated input, prepared once
/// for every index built from them.
pub struct SaBwtInput<'a> {
    /// The input as read, without remapping or sentinel.
    pub text: &'a [u8],
    pub sa: &'a SuffixArray,
    pub bwt: &'a [u8],
    pub map: &'a AlphabetMap,
}

pub trait IndexAdapter {
    /// Implementation name used in error messages.
    const KIND: &'static str;
    const CAPABILITIES: Capabilities;

    fn create(config: &AdapterConfig) -> Self
    where
        Self: Sized;

    fn build(&mut self, text: &[u8], threads: u16) -> Result<BuildOutcome>;

    fn build_from_sa_and_bwt(
        &mut self,
        _input: &SaBwtInput<'_>,
        _threads: u16,
    ) -> Result<BuildOutcome> {
        Err(unsupported::<Self>("construction from suffix array and BWT"))
    }

    /// Releases the index. Does nothing on an empty handle.
    fn destroy(&mut self);

    /// Writes the original text into `out`, which has the text's length.
    fn revert(&self, _threads: u16, _out: &mut [u8]) -> Result<()> {
        Err(unsupported::<Self>("revert"))
    }

    fn count(&mut self, _pattern: &[u8]) -> Result<usize> {
        Err(unsupported::<Self>("count"))
    }

    /// Appends the starting offsets of `pattern`, in no particular order.
    fn locate(&mut self, _pattern: &[u8], _out: &mut Vec<usize>) -> Result<()> {
        Err(unsupported::<Self>("locate"))
    }
}

pub(crate) fn unsupported<A: IndexAdapter + ?Sized>(operation: &'static str) -> BenchError {
    BenchError::Unsupported {
        implementation: A::KIND,
        operation,
    }
}

fn built<T>(index: &Option<T>) -> Result<&T> {
    index.as_ref().ok_or(BenchError::NotBuilt)
}

/// Usage error when the directory for temporary artifacts is missing.
pub(crate) fn work_dir_exists(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(BenchError::Usage(format!(
            "work directory {} does not exist",
            path.display()
        )))
    }
}
