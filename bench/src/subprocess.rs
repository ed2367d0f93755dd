// Runs the `pfp-bwt` helper in a scoped temporary directory and reads back
// its artifacts.
//
// For an input file `<f>` the helper writes
//   <f>.bwt  BWT of the remapped, terminated text (one byte per row)
//   <f>.sa   suffix array, little-endian u64 per row
//   <f>.map  the 256-byte alphabet map
// and logs every phase to stderr as `<phase>, time: <ns>, peak: <bytes>,`.
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    time::Instant,
};

use indexes::{AlphabetMap, SuffixArray};
use log::{debug, info};

use crate::{
    BenchError, Result, adapter::AdapterConfig, memory::peak_memory_from_log, timing::elapsed_ns,
};

pub struct Artifacts {
    pub sa: SuffixArray,
    pub bwt: Vec<u8>,
    pub map: AlphabetMap,
}

pub struct HelperRun {
    pub artifacts: Artifacts,
    /// Largest peak the helper reported.
    pub peak: u64,
    /// Time spent reading the artifacts back.
    pub load_ns: u64,
}

fn artifact_path(input: &Path, extension: &str) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Writes `text` into a fresh temporary directory under the work directory,
/// runs the helper on it and loads the artifacts. The directory is removed
/// when this returns, whether or not the helper succeeded.
pub fn run_helper(config: &AdapterConfig, text: &[u8], threads: u16) -> Result<HelperRun> {
    let dir = tempfile::Builder::new()
        .prefix("rlbwt-")
        .rand_bytes(10)
        .tempdir_in(&config.work_dir)?;
    debug!("helper: temporary directory {}", dir.path().display());

    let input = dir.path().join("text");
    fs::write(&input, text)?;

    let mut command = Command::new(&config.helper);
    if threads > 1 {
        command.arg("-t").arg(threads.to_string());
    }
    command.arg(&input);
    debug!("helper: running {:?}", command);

    let tool = config.helper.display().to_string();
    let output = command.output().map_err(|e| BenchError::ExternalTool {
        tool: tool.clone(),
        status: "not started".to_string(),
        stderr: e.to_string(),
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(BenchError::ExternalTool {
            tool,
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    let peak = peak_memory_from_log(&stderr);
    info!("helper: finished, reported peak {} bytes", peak);

    let t1 = Instant::now();
    let artifacts = read_artifacts(&input)?;
    let load_ns = elapsed_ns(t1, Instant::now());

    Ok(HelperRun {
        artifacts,
        peak,
        load_ns,
    })
}

pub fn write_artifacts(
    input: &Path,
    sa: &SuffixArray,
    bwt: &[u8],
    map: &AlphabetMap,
) -> Result<()> {
    fs::write(artifact_path(input, "bwt"), bwt)?;

    let mut encoded = Vec::with_capacity(sa.len() * 8);
    for row in 0..sa.len() {
        encoded.extend_from_slice(&(sa.get(row) as u64).to_le_bytes());
    }
    fs::write(artifact_path(input, "sa"), encoded)?;

    fs::write(artifact_path(input, "map"), map.to_bytes())?;
    Ok(())
}

pub fn read_artifacts(input: &Path) -> Result<Artifacts> {
    let bwt_path = artifact_path(input, "bwt");
    let sa_path = artifact_path(input, "sa");
    let map_path = artifact_path(input, "map");

    let bwt = fs::read(&bwt_path)?;
    let raw_sa = fs::read(&sa_path)?;
    let raw_map = fs::read(&map_path)?;

    let malformed = |path: &Path, reason: String| BenchError::Artifact {
        path: path.to_path_buf(),
        reason,
    };

    if raw_sa.len() != bwt.len() * 8 {
        return Err(malformed(
            &sa_path,
            format!("{} bytes for a BWT of {} rows", raw_sa.len(), bwt.len()),
        ));
    }
    let n = bwt.len();
    let positions = raw_sa.chunks_exact(8).map(|chunk| {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        u64::from_le_bytes(word)
    });
    if let Some(bad) = positions.clone().find(|&p| p >= n as u64) {
        return Err(malformed(&sa_path, format!("entry {} out of range", bad)));
    }
    let sa = if n <= i32::MAX as usize {
        SuffixArray::I32(positions.map(|p| p as i32).collect())
    } else {
        SuffixArray::I64(positions.map(|p| p as i64).collect())
    };

    let map = AlphabetMap::from_bytes(&raw_map)
        .ok_or_else(|| malformed(&map_path, "not a valid alphabet map".to_string()))?;

    Ok(Artifacts { sa, bwt, map })
}
