use subsearch_core::{
    build_index, BuildConfig, BuildError, CleanedDocument, ConfigError, MemoryCorpus, SearchError, SimilarityIndex,
    SnapshotMeta, SnapshotStore, DEFAULT_TOP_K,
};
use tempfile::tempdir;

fn full_sample() -> BuildConfig {
    BuildConfig { sample_fraction: 1.0, ..BuildConfig::default() }
}

fn three_docs() -> MemoryCorpus {
    MemoryCorpus::from_texts([
        (1, "cat", "the cat sat on the mat"),
        (2, "dog", "the dog sat on the log"),
        (3, "birds", "birds fly in the sky"),
    ])
}

fn assert_parallel(index: &SimilarityIndex) {
    let n = index.len();
    assert_eq!(index.document_vectors().len(), n);
    assert_eq!(index.document_ids().len(), n);
    assert_eq!(index.document_names().len(), n);
    assert_eq!(index.documents().len(), n);
}

#[test]
fn cat_query_prefers_the_cat_document() {
    let (index, meta) = build_index(&three_docs(), &full_sample()).unwrap();
    assert_eq!(meta.num_docs, 3);
    assert_parallel(&index);

    let results = index.rank("cat sat mat", DEFAULT_TOP_K).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, 1);
    assert_eq!(results[0].name, "cat");
    assert!(results[0].score > results[1].score);
    assert!(results[0].score > results[2].score);
    assert!(results[0].snippet.contains("cat sat"));
}

#[test]
fn single_document_matches_itself_perfectly() {
    let text = "winter is coming to the north";
    let docs = vec![CleanedDocument { id: 9, name: "got".into(), text: text.into() }];
    let index = SimilarityIndex::build(docs, &full_sample());
    let top = &index.rank(text, 1).unwrap()[0];
    assert_eq!(top.id, 9);
    assert!((top.score - 1.0).abs() < 1e-5, "score {}", top.score);
}

#[test]
fn empty_query_is_reported() {
    let (index, _) = build_index(&three_docs(), &full_sample()).unwrap();
    assert_eq!(index.rank("", DEFAULT_TOP_K), Err(SearchError::EmptyQuery));
}

#[test]
fn unrelated_query_scores_zero_everywhere() {
    let (index, _) = build_index(&three_docs(), &full_sample()).unwrap();
    let results = index.rank("quantum chromodynamics", DEFAULT_TOP_K).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.score == 0.0));
    // all tied, so sample order is kept
    let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, index.document_ids().to_vec());
}

#[test]
fn stopword_only_query_is_not_empty() {
    let (index, _) = build_index(&three_docs(), &full_sample()).unwrap();
    let results = index.rank("the on in", 2).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.score == 0.0));
}

#[test]
fn snapshot_round_trip() {
    let dir = tempdir().unwrap();
    let (index, meta) = build_index(&three_docs(), &full_sample()).unwrap();
    let store = SnapshotStore::new(dir.path().join("processed.snap"));
    store.save(&index, &meta).unwrap();

    let (loaded, loaded_meta) = store.load().unwrap();
    assert_eq!(loaded.document_ids(), index.document_ids());
    assert_eq!(loaded.document_names(), index.document_names());
    for (a, b) in loaded.document_vectors().iter().zip(index.document_vectors()) {
        assert_eq!(a.indices, b.indices);
        assert!(a.values.iter().zip(&b.values).all(|(x, y)| (x - y).abs() < 1e-6));
    }
    assert_eq!(loaded_meta.corpus_size, 3);
    assert_eq!(loaded.rank("cat sat mat", 3).unwrap(), index.rank("cat sat mat", 3).unwrap());
}

#[test]
fn sampling_bounds_the_index() {
    let rows: Vec<(i64, String)> = (0..20).map(|i| (i, format!("subtitle line {i} about topic{}", i % 4))).collect();
    let corpus = MemoryCorpus::from_texts(rows.iter().map(|(id, t)| (*id, "n", t.as_str())));
    let cfg = BuildConfig { sample_fraction: 0.25, seed: Some(3), ..BuildConfig::default() };
    let (index, meta) = build_index(&corpus, &cfg).unwrap();
    assert_eq!(index.len(), 5);
    assert_eq!(meta.corpus_size, 20);
    assert_eq!(meta.seed, Some(3));
    assert_parallel(&index);

    let (again, _) = build_index(&corpus, &cfg).unwrap();
    assert_eq!(again.document_ids(), index.document_ids());
}

#[test]
fn tiny_fraction_gives_empty_index() {
    let cfg = BuildConfig { sample_fraction: 0.1, ..BuildConfig::default() };
    let (index, meta) = build_index(&three_docs(), &cfg).unwrap();
    assert!(index.is_empty());
    assert_eq!(meta.num_docs, 0);
    assert!(index.rank("cat", DEFAULT_TOP_K).unwrap().is_empty());

    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("empty.snap"));
    store.save(&index, &SnapshotMeta::for_index(&index, 3, 0.1, None)).unwrap();
    assert!(store.load().unwrap().0.is_empty());
}

#[test]
fn invalid_fraction_is_rejected() {
    let cfg = BuildConfig { sample_fraction: 0.0, ..BuildConfig::default() };
    match build_index(&three_docs(), &cfg) {
        Err(BuildError::Config(ConfigError::SampleFraction(f))) => assert_eq!(f, 0.0),
        other => panic!("unexpected {other:?}"),
    }
}
