//! Subtitle search pipeline: cleaning, sampling, TF-IDF vectorization,
//! cosine ranking and the snapshot file that carries the fitted index
//! from the offline build to the query server.

pub mod config;
pub mod corpus;
pub mod index;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod ranker;
pub mod sample;
pub mod snapshot;
pub mod snippet;
pub mod tokenizer;

pub use config::{BuildConfig, ConfigError};
pub use corpus::{CleanedDocument, CorpusError, CorpusSource, MemoryCorpus, SubtitleRecord};
pub use index::{IndexError, SimilarityIndex};
pub use model::{IdfScheme, SparseVector, TermId, TermModel};
pub use pipeline::{build_index, BuildError};
pub use ranker::{RankedResult, SearchError, DEFAULT_TOP_K};
pub use snapshot::{SnapshotError, SnapshotMeta, SnapshotStore};
