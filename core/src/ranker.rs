use crate::index::SimilarityIndex;
use crate::snippet::{anchor_terms, snippet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("empty query")]
    EmptyQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub name: String,
    pub id: i64,
    pub score: f32,
    pub snippet: String,
}

impl SimilarityIndex {
    /// Cosine scores of `query` against every document, in sample order.
    pub fn scores(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        if query.trim().is_empty() { return Err(SearchError::EmptyQuery); }
        let q = self.term_model().transform(query);
        // both sides are unit length (or zero), so the dot product is the cosine
        Ok(self.document_vectors().iter().map(|d| q.dot(d).clamp(0.0, 1.0)).collect())
    }

    /// Top `k` documents by descending score; equal scores keep sample order.
    /// A query sharing no terms with the corpus still yields `k` results, all 0.0.
    pub fn rank(&self, query: &str, k: usize) -> Result<Vec<RankedResult>, SearchError> {
        let scores = self.scores(query)?;
        let mut order: Vec<usize> = (0..scores.len()).collect();
        // stable sort, so ties stay in first-seen order
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
        let terms = anchor_terms(query, &self.term_model().analyzer);
        let results = order
            .into_iter()
            .take(k)
            .map(|i| RankedResult {
                name: self.document_names()[i].clone(),
                id: self.document_ids()[i],
                score: scores[i],
                snippet: snippet(&self.documents()[i].text, &terms),
            })
            .collect();
        Ok(results)
    }
}
