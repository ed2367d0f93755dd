use storage::PatternReader;

use crate::{adapter::AdapterConfig, driver::MeasureReport, measurement::MeasurementLog};

/// The two pattern sets of a standard run: few occurrences per pattern, many
/// occurrences per pattern.
pub struct PatternSets {
    pub first: PatternReader,
    pub second: PatternReader,
}

/// Everything one benchmark run shares between the measured
/// implementations. Built once by the front end, mutated only by the driver.
pub struct BenchContext {
    pub text: Vec<u8>,
    pub text_name: String,
    pub patterns: Option<PatternSets>,
    pub check_correctness: bool,
    pub log: Option<MeasurementLog>,
    pub adapter_config: AdapterConfig,
    pub reports: Vec<MeasureReport>,
}

impl BenchContext {
    pub fn new(text: Vec<u8>, text_name: String) -> Self {
        Self {
            text,
            text_name,
            patterns: None,
            check_correctness: false,
            log: None,
            adapter_config: AdapterConfig::default(),
            reports: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, first: PatternReader, second: PatternReader) -> Self {
        self.patterns = Some(PatternSets { first, second });
        self
    }

    pub fn with_log(mut self, log: MeasurementLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_adapter_config(mut self, config: AdapterConfig) -> Self {
        self.adapter_config = config;
        self
    }

    pub fn checking_correctness(mut self, check: bool) -> Self {
        self.check_correctness = check;
        self
    }
}
