use crate::model::IdfScheme;
use crate::tokenizer::Analyzer;
use thiserror::Error;

pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample fraction must be in (0, 1], got {0}")]
    SampleFraction(f64),
    #[error("min token length must be at least 1")]
    MinTokenLen,
}

/// Settings for one offline build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub sample_fraction: f64,
    /// `None` draws a fresh seed from the OS, so the sample differs per build.
    pub seed: Option<u64>,
    pub analyzer: Analyzer,
    pub idf_scheme: IdfScheme,
    pub sublinear_tf: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            seed: Some(DEFAULT_SEED),
            analyzer: Analyzer::default(),
            idf_scheme: IdfScheme::default(),
            sublinear_tf: false,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(ConfigError::SampleFraction(self.sample_fraction));
        }
        if self.analyzer.min_token_len == 0 {
            return Err(ConfigError::MinTokenLen);
        }
        Ok(())
    }
}
