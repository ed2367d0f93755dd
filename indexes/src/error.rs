use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    /// The text needs remapping but uses too many distinct bytes to leave
    /// room for the reserved values 0 and 1.
    #[error("the input contains {distinct} distinct characters, at most {max} are supported")]
    AlphabetTooLarge { distinct: usize, max: usize },

    #[error("suffix array construction failed: {0}")]
    SuffixArray(String),

    #[error("thread pool build error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("output buffer has length {actual}, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("suffix array and BWT disagree: {0}")]
    Inconsistent(String),

    #[error("index was built without suffix array samples, locate is unavailable")]
    NoSamples,
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::AlphabetTooLarge {
            distinct: 254,
            max: 253,
        };
        assert_eq!(
            err.to_string(),
            "the input contains 254 distinct characters, at most 253 are supported"
        );

        let err = IndexError::OutputLength {
            expected: 7,
            actual: 6,
        };
        assert_eq!(err.to_string(), "output buffer has length 6, expected 7");
    }
}
