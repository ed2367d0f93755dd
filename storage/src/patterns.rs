// Benchmark pattern files.
//
// A pattern file is a one-line header followed by the patterns concatenated
// without separators. All patterns in a file share one length. The header is
// either the Pizza&Chili form
//
//     # number=<N> length=<L> file=<name> forbidden=<bytes>
//
// (only `number` and `length` are read) or the bare form `<N> <L>`.
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("failed to open pattern file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid pattern file header: {0:?}")]
    InvalidHeader(String),
    #[error("pattern {index} is truncated: expected {expected} bytes, got {got}")]
    Truncated {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("all {0} patterns have been read")]
    Exhausted(usize),
    #[error("pattern {index} has length {got}, expected {expected}")]
    WrongLength {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("cannot sample patterns of length {length} from a text of length {text_len}")]
    TextTooShort { length: usize, text_len: usize },
}

pub type Result<T> = std::result::Result<T, PatternError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternHeader {
    pub number: usize,
    pub length: usize,
}

/// Parses one header line (without the trailing newline).
pub fn parse_header(line: &str) -> Result<PatternHeader> {
    let invalid = || PatternError::InvalidHeader(line.to_string());
    let mut tokens = line.split_whitespace().peekable();

    if tokens.peek() == Some(&"#") {
        tokens.next();
        let mut number = None;
        let mut length = None;
        for token in tokens {
            match token.split_once('=') {
                Some(("number", v)) => number = Some(v.parse().map_err(|_| invalid())?),
                Some(("length", v)) => length = Some(v.parse().map_err(|_| invalid())?),
                _ => {}
            }
        }
        return match (number, length) {
            (Some(number), Some(length)) => Ok(PatternHeader { number, length }),
            _ => Err(invalid()),
        };
    }

    let number = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(invalid)?;
    let length = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(invalid)?;
    if tokens.next().is_some() {
        return Err(invalid());
    }
    Ok(PatternHeader { number, length })
}

pub struct PatternReader {
    reader: BufReader<File>,
    header: Option<PatternHeader>,
    read: usize,
}

impl PatternReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PatternError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            header: None,
            read: 0,
        })
    }

    /// Seeks to the start of the file and parses the header. Afterwards the
    /// reader stands on the first pattern, so this also rewinds.
    ///
    /// Fails with `Truncated` when the file holds fewer pattern bytes than
    /// the header announces.
    pub fn read_header(&mut self) -> Result<PatternHeader> {
        self.header = None;
        self.reader.seek(SeekFrom::Start(0))?;
        let mut line = Vec::new();
        self.reader.read_until(b'\n', &mut line)?;
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        let text = String::from_utf8_lossy(&line);
        let header = parse_header(&text)?;

        let total = header
            .number
            .checked_mul(header.length)
            .ok_or_else(|| PatternError::InvalidHeader(text.to_string()))?;
        let start = self.reader.stream_position()?;
        let file_len = self.reader.get_ref().metadata()?.len();
        let available = usize::try_from(file_len.saturating_sub(start)).unwrap_or(usize::MAX);
        if available < total {
            return Err(PatternError::Truncated {
                index: available / header.length,
                expected: header.length,
                got: available % header.length,
            });
        }

        self.header = Some(header);
        self.read = 0;
        Ok(header)
    }

    /// Reads the next pattern into `out`, replacing its contents.
    pub fn next_pattern(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let header = match self.header {
            Some(header) => header,
            None => self.read_header()?,
        };
        if self.read >= header.number {
            return Err(PatternError::Exhausted(header.number));
        }

        // nothing is allocated for bytes the file does not have
        out.clear();
        let got = (&mut self.reader)
            .take(header.length as u64)
            .read_to_end(out)?;
        if got < header.length {
            return Err(PatternError::Truncated {
                index: self.read,
                expected: header.length,
                got,
            });
        }

        self.read += 1;
        Ok(())
    }

    /// Reads every pattern of the file.
    pub fn read_all(&mut self) -> Result<(PatternHeader, Vec<Vec<u8>>)> {
        let header = self.read_header()?;
        let mut patterns = Vec::new();
        let mut buf = Vec::new();
        for _ in 0..header.number {
            self.next_pattern(&mut buf)?;
            patterns.push(buf.clone());
        }
        Ok((header, patterns))
    }
}

/// Writes a pattern file with a Pizza&Chili header.
pub fn write_pattern_file<W: Write>(
    writer: &mut W,
    length: usize,
    patterns: &[Vec<u8>],
    file_name: &str,
) -> Result<()> {
    if let Some((index, p)) = patterns.iter().enumerate().find(|(_, p)| p.len() != length) {
        return Err(PatternError::WrongLength {
            index,
            expected: length,
            got: p.len(),
        });
    }

    writeln!(
        writer,
        "# number={} length={} file={} forbidden=",
        patterns.len(),
        length,
        file_name
    )?;
    for pattern in patterns {
        writer.write_all(pattern)?;
    }
    writer.flush()?;
    Ok(())
}

/// Draws `count` substrings of length `length` at uniformly random positions.
pub fn sample_patterns<R: Rng>(
    text: &[u8],
    count: usize,
    length: usize,
    rng: &mut R,
) -> Result<Vec<Vec<u8>>> {
    if length == 0 || length > text.len() {
        return Err(PatternError::TextTooShort {
            length,
            text_len: text.len(),
        });
    }

    let last = text.len() - length;
    Ok((0..count)
        .map(|_| {
            let start = rng.gen_range(0..=last);
            text[start..start + length].to_vec()
        })
        .collect())
}
