mod error;
mod fm_index;
mod revert;
mod rlbwt;

pub mod alphabet;
pub mod naive;
pub mod parallel;
pub mod suffix_array;

pub use alphabet::{AlphabetMap, SENTINEL};
pub use error::{IndexError, Result};
pub use fm_index::FmIndex;
pub use rlbwt::{RlbwtIndex, Support};
pub use suffix_array::SuffixArray;
