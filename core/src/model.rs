use crate::tokenizer::Analyzer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdfScheme {
    /// ln((1 + N) / (1 + df)) + 1
    #[default]
    Smooth,
    /// ln(N / df)
    Plain,
    /// ln(1 + N / df)
    Log1p,
}

impl IdfScheme {
    pub fn idf(self, num_docs: u32, df: u32) -> f32 {
        let n = num_docs as f32;
        let df = df.max(1) as f32;
        match self {
            IdfScheme::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfScheme::Plain => (n.max(1.0) / df).ln(),
            IdfScheme::Log1p => (1.0 + n / df).ln(),
        }
    }
}

impl std::str::FromStr for IdfScheme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smooth" => Ok(IdfScheme::Smooth),
            "plain" => Ok(IdfScheme::Plain),
            "log1p" => Ok(IdfScheme::Log1p),
            other => Err(format!("unknown idf scheme '{other}' (expected smooth, plain or log1p)")),
        }
    }
}

/// Sparse vector with strictly ascending term ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<TermId>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Build from unordered (term, weight) pairs and L2-normalize.
    pub fn from_weights(weights: HashMap<TermId, f32>) -> Self {
        let mut pairs: Vec<(TermId, f32)> = weights.into_iter().filter(|(_, w)| *w != 0.0).collect();
        pairs.sort_by_key(|(t, _)| *t);
        let norm = pairs.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        let (indices, values) = pairs.into_iter().map(|(t, w)| (t, w / norm)).unzip();
        Self { indices, values }
    }

    pub fn is_zero(&self) -> bool { self.indices.is_empty() }

    pub fn nnz(&self) -> usize { self.indices.len() }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted TF-IDF model: vocabulary, document frequencies and the settings used to fit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermModel {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub idf: Vec<f32>,
    pub num_docs: u32,
    pub analyzer: Analyzer,
    pub idf_scheme: IdfScheme,
    pub sublinear_tf: bool,
}

impl TermModel {
    /// Learn the vocabulary and IDF weights. Term ids follow lexicographic term order.
    pub fn fit<S: AsRef<str>>(texts: &[S], analyzer: Analyzer, idf_scheme: IdfScheme, sublinear_tf: bool) -> Self {
        let mut df_by_term: BTreeMap<String, u32> = BTreeMap::new();
        for text in texts {
            let mut terms = analyzer.analyze(text.as_ref());
            terms.sort_unstable();
            terms.dedup();
            for term in terms {
                *df_by_term.entry(term).or_insert(0) += 1;
            }
        }
        let num_docs = texts.len() as u32;
        let mut dictionary = HashMap::with_capacity(df_by_term.len());
        let mut df = Vec::with_capacity(df_by_term.len());
        let mut idf = Vec::with_capacity(df_by_term.len());
        for (tid, (term, df_t)) in df_by_term.into_iter().enumerate() {
            dictionary.insert(term, tid as TermId);
            df.push(df_t);
            idf.push(idf_scheme.idf(num_docs, df_t));
        }
        Self { dictionary, df, idf, num_docs, analyzer, idf_scheme, sublinear_tf }
    }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    /// Project text into the fitted space. Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut tf_raw: HashMap<TermId, u32> = HashMap::new();
        for term in self.analyzer.analyze(text) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let weights = tf_raw
            .into_iter()
            .map(|(tid, tf_raw)| {
                let tf = if self.sublinear_tf { 1.0 + (tf_raw as f32).ln() } else { tf_raw as f32 };
                let idf = self.idf.get(tid as usize).copied().unwrap_or(0.0);
                (tid, tf * idf)
            })
            .collect();
        SparseVector::from_weights(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_sorted_and_stable() {
        let texts = ["zebra apple", "mango apple"];
        let m = TermModel::fit(&texts, Analyzer::default(), IdfScheme::Smooth, false);
        assert_eq!(m.dictionary["apple"], 0);
        assert_eq!(m.dictionary["mango"], 1);
        assert_eq!(m.dictionary["zebra"], 2);
        assert_eq!(m.df, vec![2, 1, 1]);
        // a term present everywhere still carries weight under smoothing
        assert!((m.idf[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transform_is_unit_length() {
        let texts = ["rust systems programming", "learning rust"];
        let m = TermModel::fit(&texts, Analyzer::default(), IdfScheme::Smooth, true);
        let v = m.transform("rust rust programming");
        assert!((v.dot(&v) - 1.0).abs() < 1e-5);
        assert!(v.indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unknown_terms_give_zero_vector() {
        let m = TermModel::fit(&["alpha beta"], Analyzer::default(), IdfScheme::Smooth, false);
        assert!(m.transform("gamma delta").is_zero());
    }

    #[test]
    fn plain_idf_zero_for_ubiquitous_terms() {
        assert_eq!(IdfScheme::Plain.idf(3, 3), 0.0);
        assert!(IdfScheme::Log1p.idf(3, 3) > 0.0);
        assert_eq!("LOG1P".parse::<IdfScheme>(), Ok(IdfScheme::Log1p));
    }
}
