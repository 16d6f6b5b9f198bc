//! Exact nearest-neighbor index over the static corpus.
//!
//! Built once from the static store at startup and read-only afterwards, so it
//! can be shared across requests behind an `Arc` without locking. Search is a
//! flat scan; ties go to the lower position (the earlier-loaded entry).

use ndarray::{aview1, Array2};
use serde::Serialize;

use super::types::KnowledgeEntry;

/// Distance metric used for static matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Euclidean distance.
    L2,
    /// `1 - cosine similarity`, in `[0, 2]`.
    Cosine,
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "cosine" => Ok(Self::Cosine),
            _ => Err(format!("unknown distance metric: {s}")),
        }
    }
}

/// A search hit: position in the index and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// The answer-side payload kept for each indexed vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedAnswer {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

pub struct StaticIndex {
    answers: Vec<IndexedAnswer>,
    vectors: Array2<f32>,
    metric: Metric,
}

impl StaticIndex {
    /// Build from loaded entries. Entries whose embedding length differs from
    /// `dim` are skipped with a warning.
    pub fn build(entries: Vec<KnowledgeEntry>, dim: usize, metric: Metric) -> Self {
        let mut answers = Vec::with_capacity(entries.len());
        let mut flat = Vec::with_capacity(entries.len() * dim);

        for entry in entries {
            if entry.embedding.len() != dim {
                tracing::warn!(
                    id = entry.id,
                    got = entry.embedding.len(),
                    expected = dim,
                    "skipping static entry with mismatched embedding size, re-embed the corpus"
                );
                continue;
            }
            flat.extend_from_slice(&entry.embedding);
            answers.push(IndexedAnswer {
                id: entry.id,
                question: entry.question,
                answer: entry.answer,
            });
        }

        let vectors = Array2::from_shape_vec((answers.len(), dim), flat)
            .unwrap_or_else(|_| Array2::zeros((0, dim)));

        tracing::info!(entries = answers.len(), dim, metric = ?metric, "static index built");
        Self {
            answers,
            vectors,
            metric,
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn entry(&self, position: usize) -> Option<&IndexedAnswer> {
        self.answers.get(position)
    }

    /// The single closest entry, or `None` for an empty index or a query of
    /// the wrong dimension.
    pub fn nearest(&self, query: &[f32]) -> Option<Neighbor> {
        self.nearest_k(query, 1).into_iter().next()
    }

    /// Up to `k` closest entries, closest first.
    pub fn nearest_k(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }
        if query.len() != self.dim() {
            tracing::warn!(got = query.len(), expected = self.dim(), "query dimension mismatch");
            return Vec::new();
        }

        let q = aview1(query);
        let q_norm = q.dot(&q).sqrt();

        let mut hits: Vec<Neighbor> = self
            .vectors
            .outer_iter()
            .enumerate()
            .map(|(position, row)| {
                let distance = match self.metric {
                    Metric::L2 => (&row - &q).mapv(|x| x * x).sum().sqrt(),
                    Metric::Cosine => {
                        let denom = row.dot(&row).sqrt() * q_norm;
                        if denom > 0.0 {
                            1.0 - row.dot(&q) / denom
                        } else {
                            1.0
                        }
                    }
                };
                Neighbor { position, distance }
            })
            .collect();

        // stable sort keeps insertion order among equal distances
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, question: &str, embedding: Vec<f32>) -> KnowledgeEntry {
        KnowledgeEntry {
            id,
            category: None,
            question: question.into(),
            answer: format!("answer {id}"),
            source_url: None,
            embedding,
        }
    }

    #[test]
    fn empty_index_has_no_match() {
        let index = StaticIndex::build(vec![], 3, Metric::L2);
        assert!(index.is_empty());
        assert!(index.nearest(&[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn nearest_returns_closest_by_l2() {
        let index = StaticIndex::build(
            vec![
                entry(1, "a", vec![1.0, 0.0, 0.0]),
                entry(2, "b", vec![0.0, 1.0, 0.0]),
            ],
            3,
            Metric::L2,
        );
        let hit = index.nearest(&[0.1, 0.9, 0.0]).unwrap();
        assert_eq!(hit.position, 1);
        assert_eq!(index.entry(hit.position).unwrap().id, 2);
        assert!((hit.distance - (0.02f32).sqrt()).abs() < 1e-5);
    }

    #[test]
    fn match_position_zero_is_a_real_match() {
        let index = StaticIndex::build(vec![entry(7, "only", vec![0.0, 0.0, 1.0])], 3, Metric::L2);
        let hit = index.nearest(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(hit.position, 0);
    }

    #[test]
    fn ties_go_to_earlier_entry() {
        let index = StaticIndex::build(
            vec![
                entry(1, "first", vec![1.0, 0.0]),
                entry(2, "second", vec![-1.0, 0.0]),
            ],
            2,
            Metric::L2,
        );
        let hit = index.nearest(&[0.0, 1.0]).unwrap();
        assert_eq!(hit.position, 0);
    }

    #[test]
    fn cosine_ignores_magnitude() {
        let index = StaticIndex::build(
            vec![
                entry(1, "long", vec![10.0, 0.0]),
                entry(2, "diag", vec![0.7, 0.7]),
            ],
            2,
            Metric::Cosine,
        );
        let hit = index.nearest(&[0.5, 0.0]).unwrap();
        assert_eq!(hit.position, 0);
        assert!(hit.distance.abs() < 1e-6);

        let l2 = StaticIndex::build(
            vec![
                entry(1, "long", vec![10.0, 0.0]),
                entry(2, "diag", vec![0.7, 0.7]),
            ],
            2,
            Metric::L2,
        );
        assert_eq!(l2.nearest(&[0.5, 0.0]).unwrap().position, 1);
    }

    #[test]
    fn mismatched_dimensions_are_skipped() {
        let index = StaticIndex::build(
            vec![entry(1, "bad", vec![1.0]), entry(2, "good", vec![1.0, 0.0])],
            2,
            Metric::L2,
        );
        assert_eq!(index.len(), 1);
        assert!(index.nearest(&[1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn nearest_k_orders_by_distance() {
        let index = StaticIndex::build(
            vec![
                entry(1, "far", vec![3.0, 0.0]),
                entry(2, "near", vec![1.0, 0.0]),
                entry(3, "mid", vec![2.0, 0.0]),
            ],
            2,
            Metric::L2,
        );
        let ids: Vec<i64> = index
            .nearest_k(&[0.0, 0.0], 2)
            .iter()
            .map(|n| index.entry(n.position).unwrap().id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn metric_parses() {
        assert_eq!("L2".parse::<Metric>().unwrap(), Metric::L2);
        assert_eq!("cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert!("manhattan".parse::<Metric>().is_err());
    }
}
