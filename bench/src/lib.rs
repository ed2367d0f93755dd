pub mod adapter;
pub mod cli;
pub mod context;
pub mod driver;
pub mod measurement;
pub mod memory;
pub mod registry;
pub mod report;
pub mod sa_mode;
pub mod subprocess;
pub mod timing;

mod error;

pub use error::{BenchError, Result};
