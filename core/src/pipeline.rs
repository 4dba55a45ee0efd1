use crate::config::{BuildConfig, ConfigError};
use crate::corpus::{CorpusError, CorpusSource};
use crate::index::SimilarityIndex;
use crate::snapshot::SnapshotMeta;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Load every record from `source`, then sample, clean and index them.
pub fn build_index<C: CorpusSource + ?Sized>(
    source: &C,
    config: &BuildConfig,
) -> Result<(SimilarityIndex, SnapshotMeta), BuildError> {
    config.validate()?;
    let records = source.records()?;
    tracing::info!(corpus_size = records.len(), sample_fraction = config.sample_fraction, seed = ?config.seed, "building index");
    let index = SimilarityIndex::build_from_records(&records, config);
    let meta = SnapshotMeta::for_index(&index, records.len(), config.sample_fraction, config.seed);
    Ok((index, meta))
}
