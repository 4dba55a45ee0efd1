use crate::config::BuildConfig;
use crate::corpus::{CleanedDocument, SubtitleRecord};
use crate::model::{SparseVector, TermModel};
use crate::sample::sample_corpus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("parallel sequences disagree: {vectors} vectors, {ids} ids, {names} names, {documents} documents")]
    LengthMismatch { vectors: usize, ids: usize, names: usize, documents: usize },
}

/// Fitted model plus one vector per sampled document. Position `i` of every
/// sequence refers to the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityIndex {
    term_model: TermModel,
    document_vectors: Vec<SparseVector>,
    document_ids: Vec<i64>,
    document_names: Vec<String>,
    documents: Vec<CleanedDocument>,
}

impl SimilarityIndex {
    pub fn from_parts(
        term_model: TermModel,
        document_vectors: Vec<SparseVector>,
        document_ids: Vec<i64>,
        document_names: Vec<String>,
        documents: Vec<CleanedDocument>,
    ) -> Result<Self, IndexError> {
        let index = Self { term_model, document_vectors, document_ids, document_names, documents };
        index.check()?;
        Ok(index)
    }

    /// Fit once over the sample, then transform every document with that model.
    pub fn build(sample: Vec<CleanedDocument>, config: &BuildConfig) -> Self {
        let texts: Vec<&str> = sample.iter().map(|d| d.text.as_str()).collect();
        let term_model = TermModel::fit(&texts, config.analyzer.clone(), config.idf_scheme, config.sublinear_tf);
        let document_vectors: Vec<SparseVector> = texts.iter().map(|t| term_model.transform(t)).collect();
        tracing::info!(num_docs = sample.len(), num_terms = term_model.num_terms(), "fitted term model");
        let document_ids = sample.iter().map(|d| d.id).collect();
        let document_names = sample.iter().map(|d| d.name.clone()).collect();
        Self { term_model, document_vectors, document_ids, document_names, documents: sample }
    }

    /// Sample, normalize and build in one go.
    pub fn build_from_records(records: &[SubtitleRecord], config: &BuildConfig) -> Self {
        let sample = sample_corpus(records, config.sample_fraction, config.seed);
        Self::build(sample, config)
    }

    pub fn check(&self) -> Result<(), IndexError> {
        let (vectors, ids, names, documents) =
            (self.document_vectors.len(), self.document_ids.len(), self.document_names.len(), self.documents.len());
        if vectors == ids && ids == names && names == documents {
            Ok(())
        } else {
            Err(IndexError::LengthMismatch { vectors, ids, names, documents })
        }
    }

    pub fn len(&self) -> usize { self.document_ids.len() }
    pub fn is_empty(&self) -> bool { self.document_ids.is_empty() }
    pub fn term_model(&self) -> &TermModel { &self.term_model }
    pub fn document_vectors(&self) -> &[SparseVector] { &self.document_vectors }
    pub fn document_ids(&self) -> &[i64] { &self.document_ids }
    pub fn document_names(&self) -> &[String] { &self.document_names }
    pub fn documents(&self) -> &[CleanedDocument] { &self.documents }

    /// Sample position of the document with this id.
    pub fn position(&self, id: i64) -> Option<usize> {
        self.document_ids.iter().position(|&d| d == id)
    }

    pub fn document(&self, id: i64) -> Option<&CleanedDocument> {
        self.position(id).map(|i| &self.documents[i])
    }
}
