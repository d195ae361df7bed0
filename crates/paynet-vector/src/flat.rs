//! Flat (exhaustive) L2 index.
//!
//! Stores records in insertion order and scans all of them per query:
//! O(n·d) per search, no training, every vector queryable as soon as it is
//! appended. Report corpora here are small enough that exactness and
//! freshness matter more than search cost.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;

use chrono::Utc;
use paynet_embeddings::Embedding;
use tracing::debug;

use crate::error::VectorError;
use crate::index::{IndexStats, SearchResult, VectorIndex};
use crate::record::{TaggedDocument, VectorRecord};

/// Squared Euclidean distance between equal-length slices.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exhaustive-search index over (vector, document) records.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    records: Vec<VectorRecord>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Result<Self, VectorError> {
        if dimension == 0 {
            return Err(VectorError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            records: Vec::new(),
        })
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    fn check(&self, embedding: &Embedding, offset: usize) -> Result<(), VectorError> {
        if embedding.dimension() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.dimension(),
            });
        }
        if !embedding.is_finite() {
            return Err(VectorError::InvalidVector(offset));
        }
        Ok(())
    }
}

/// Nearest first; equal distances resolve to the lower position.
fn nearest_first(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn add_batch(
        &mut self,
        batch: Vec<(Embedding, TaggedDocument)>,
    ) -> Result<Range<usize>, VectorError> {
        // Validate everything before touching the record list
        for (offset, (embedding, _)) in batch.iter().enumerate() {
            self.check(embedding, offset)?;
        }

        let start = self.records.len();
        let indexed_at = Utc::now();
        self.records.extend(
            batch
                .into_iter()
                .enumerate()
                .map(|(offset, (embedding, document))| VectorRecord {
                    position: start + offset,
                    embedding,
                    document,
                    indexed_at,
                }),
        );
        let end = self.records.len();

        debug!(start = start, added = end - start, "Appended vectors");
        Ok(start..end)
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError> {
        if self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check(query, 0)?;

        let mut scored: Vec<(f32, usize)> = self
            .records
            .iter()
            .map(|r| (squared_l2(&query.values, &r.embedding.values), r.position))
            .collect();

        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, nearest_first);
            scored.truncate(k);
        }
        scored.sort_unstable_by(nearest_first);

        let results: Vec<SearchResult> = scored
            .into_iter()
            .map(|(dist_sq, position)| SearchResult::new(position, dist_sq.sqrt()))
            .collect();

        debug!(k = k, found = results.len(), "Search complete");
        Ok(results)
    }

    fn get(&self, position: usize) -> Option<&VectorRecord> {
        self.records.get(position)
    }

    fn stats(&self) -> IndexStats {
        let mut tags = BTreeMap::new();
        for record in &self.records {
            *tags.entry(record.document.tag.clone()).or_insert(0) += 1;
        }
        IndexStats {
            vector_count: self.records.len(),
            dimension: self.dimension,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn random_embedding(dim: usize) -> Embedding {
        use rand::Rng;
        let mut rng = rand::rng();
        let values: Vec<f32> = (0..dim).map(|_| rng.random()).collect();
        Embedding::from_values(values)
    }

    fn doc(text: &str) -> TaggedDocument {
        TaggedDocument::new("GENERAL", text)
    }

    fn populated(dim: usize, n: usize) -> FlatIndex {
        let mut index = FlatIndex::new(dim).unwrap();
        let batch = (0..n)
            .map(|i| (random_embedding(dim), doc(&format!("doc {}", i))))
            .collect();
        index.add_batch(batch).unwrap();
        index
    }

    #[test]
    fn test_create_index() {
        let index = FlatIndex::new(384).unwrap();
        assert_eq!(index.dimension(), 384);
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            FlatIndex::new(0),
            Err(VectorError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_add_assigns_sequential_positions() {
        let mut index = FlatIndex::new(4).unwrap();
        let first = index
            .add_batch(vec![(random_embedding(4), doc("a")), (random_embedding(4), doc("b"))])
            .unwrap();
        let second = index.add_batch(vec![(random_embedding(4), doc("c"))]).unwrap();

        assert_eq!(first, 0..2);
        assert_eq!(second, 2..3);
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            let record = index.get(i).unwrap();
            assert_eq!(record.position, i);
            assert_eq!(record.document.text, *text);
        }
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut index = populated(4, 3);
        let range = index.add_batch(Vec::new()).unwrap();
        assert_eq!(range, 3..3);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_dimension_mismatch_rejects_whole_batch() {
        let mut index = populated(64, 2);

        let batch = vec![
            (random_embedding(64), doc("ok")),
            (random_embedding(32), doc("wrong")),
        ];
        let result = index.add_batch(batch);
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 64,
                actual: 32
            })
        ));
        // Nothing from the failed batch was indexed
        assert_eq!(index.len(), 2);
        assert_eq!(index.records().len(), 2);
    }

    #[test]
    fn test_non_finite_vector_rejected() {
        let mut index = FlatIndex::new(2).unwrap();
        let batch = vec![
            (Embedding::from_values(vec![1.0, 0.0]), doc("ok")),
            (Embedding::from_values(vec![f32::NAN, 0.0]), doc("nan")),
        ];
        assert!(matches!(
            index.add_batch(batch),
            Err(VectorError::InvalidVector(1))
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::new(8).unwrap();
        let results = index.search(&random_embedding(8), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_k_zero() {
        let index = populated(8, 4);
        assert!(index.search(&random_embedding(8), 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let index = populated(8, 4);
        let result = index.search(&random_embedding(4), 2);
        assert!(matches!(result, Err(VectorError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_search_returns_k_distinct_sorted() {
        let index = populated(64, 50);
        let query = random_embedding(64);

        for k in [1, 5, 17, 50] {
            let results = index.search(&query, k).unwrap();
            assert_eq!(results.len(), k);

            let positions: HashSet<usize> = results.iter().map(|r| r.position).collect();
            assert_eq!(positions.len(), k);
            assert!(positions.iter().all(|&p| p < 50));

            for pair in results.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
            }
        }
    }

    #[test]
    fn test_search_matches_exhaustive_ranking() {
        let index = populated(16, 30);
        let query = random_embedding(16);

        let mut expected: Vec<(f32, usize)> = index
            .records()
            .iter()
            .map(|r| (squared_l2(&query.values, &r.embedding.values), r.position))
            .collect();
        expected.sort_by(nearest_first);

        let results = index.search(&query, 7).unwrap();
        let got: Vec<usize> = results.iter().map(|r| r.position).collect();
        let want: Vec<usize> = expected.iter().take(7).map(|(_, p)| *p).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        let index = populated(8, 3);
        let results = index.search(&random_embedding(8), 10).unwrap();
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_distance_is_euclidean() {
        let mut index = FlatIndex::new(2).unwrap();
        index
            .add_batch(vec![(Embedding::from_values(vec![3.0, 4.0]), doc("p"))])
            .unwrap();
        let results = index
            .search(&Embedding::from_values(vec![0.0, 0.0]), 1)
            .unwrap();
        assert!((results[0].distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_tie_breaks_to_earlier_insert() {
        let mut index = FlatIndex::new(3).unwrap();
        let same = Embedding::from_values(vec![0.5, 0.5, 0.0]);
        index
            .add_batch(vec![
                (Embedding::from_values(vec![9.0, 9.0, 9.0]), doc("far")),
                (same.clone(), doc("first twin")),
                (same.clone(), doc("second twin")),
            ])
            .unwrap();

        let query = Embedding::from_values(vec![0.0, 1.0, 0.0]);
        let top1 = index.search(&query, 1).unwrap();
        assert_eq!(top1[0].position, 1);

        let top2 = index.search(&query, 2).unwrap();
        assert_eq!(
            top2.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_stats_counts_tags() {
        let mut index = FlatIndex::new(2).unwrap();
        index
            .add_batch(vec![
                (random_embedding(2), TaggedDocument::new("AUTHORIZATION", "a")),
                (random_embedding(2), TaggedDocument::new("SETTLEMENT", "b")),
                (random_embedding(2), TaggedDocument::new("AUTHORIZATION", "c")),
            ])
            .unwrap();

        let stats = index.stats();
        assert_eq!(stats.vector_count, 3);
        assert_eq!(stats.dimension, 2);
        assert_eq!(stats.tags.get("AUTHORIZATION"), Some(&2));
        assert_eq!(stats.tags.get("SETTLEMENT"), Some(&1));
    }
}
