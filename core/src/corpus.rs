use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw row from the subtitle store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRecord {
    pub id: i64,
    pub name: String,
    pub raw_content: Vec<u8>,
}

/// A subtitle after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedDocument {
    pub id: i64,
    pub name: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus source unavailable: {0}")]
    Unavailable(String),
    #[error("corpus query failed: {0}")]
    Query(String),
}

/// Anything that can hand over every subtitle row, in a stable order.
pub trait CorpusSource {
    fn records(&self) -> Result<Vec<SubtitleRecord>, CorpusError>;
}

/// In-memory corpus, used for tests and small imports.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    pub records: Vec<SubtitleRecord>,
}

impl MemoryCorpus {
    pub fn new(records: Vec<SubtitleRecord>) -> Self { Self { records } }

    /// Build from (id, name, text) triples.
    pub fn from_texts<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, &'a str, &'a str)>,
    {
        let records = rows
            .into_iter()
            .map(|(id, name, text)| SubtitleRecord { id, name: name.to_string(), raw_content: text.as_bytes().to_vec() })
            .collect();
        Self { records }
    }
}

impl CorpusSource for MemoryCorpus {
    fn records(&self) -> Result<Vec<SubtitleRecord>, CorpusError> { Ok(self.records.clone()) }
}
