use crate::corpus::{CleanedDocument, SubtitleRecord};
use crate::normalize::{clean_subtitle, count_non_ascii};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// floor(total * fraction), with the fraction clamped into [0, 1].
pub fn sample_size(total: usize, fraction: f64) -> usize {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    ((total as f64) * fraction).floor() as usize
}

/// Pick `sample_size(records.len(), fraction)` records without replacement and
/// normalize them. The same seed over the same records gives the same sample;
/// `None` draws the seed from the OS.
pub fn sample_corpus(records: &[SubtitleRecord], fraction: f64, seed: Option<u64>) -> Vec<CleanedDocument> {
    let amount = sample_size(records.len(), fraction);
    if amount == 0 {
        tracing::warn!(total = records.len(), fraction, "sample is empty; the index will hold no documents");
        return Vec::new();
    }
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let picked: Vec<usize> = rand::seq::index::sample(&mut rng, records.len(), amount).into_iter().collect();
    tracing::debug!(total = records.len(), amount, "sampled corpus");

    // collect() keeps selection order regardless of which worker finishes first
    picked
        .par_iter()
        .map(|&i| clean_record(&records[i]))
        .collect()
}

pub fn clean_record(record: &SubtitleRecord) -> CleanedDocument {
    let dropped = count_non_ascii(&record.raw_content);
    if dropped > 0 {
        tracing::trace!(id = record.id, dropped, "decode degraded: non-ascii bytes dropped");
    }
    CleanedDocument { id: record.id, name: record.name.clone(), text: clean_subtitle(&record.raw_content) }
}
