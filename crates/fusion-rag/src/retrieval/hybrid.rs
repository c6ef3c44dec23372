//! Weighted score fusion over parallel dense and sparse searches

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::RecordIndex;
use crate::types::{RetrievalHit, RetrievedChunk};

/// Issues parallel similarity queries against the dense and sparse indexes,
/// fuses the per-chunk scores with a weighting coefficient, and returns the
/// top-K payloads.
pub struct HybridRetriever {
    dense: Arc<dyn RecordIndex>,
    sparse: Arc<dyn RecordIndex>,
    namespace: String,
}

impl HybridRetriever {
    /// Create a new retriever
    pub fn new(
        dense: Arc<dyn RecordIndex>,
        sparse: Arc<dyn RecordIndex>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            dense,
            sparse,
            namespace: namespace.into(),
        }
    }

    /// Retrieve the top-`top_k` chunks for `query`.
    ///
    /// `alpha` is the dense-side weight: a chunk's fused score is
    /// `alpha * dense + (1 - alpha) * sparse`, where a side that did not
    /// return the chunk contributes zero. Both searches run in parallel and
    /// either failing fails the call; an empty result from both is a valid
    /// outcome and yields an empty vec.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        alpha: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        if top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::Config(format!(
                "alpha must be within [0, 1], got {}",
                alpha
            )));
        }

        let (dense_hits, sparse_hits) = tokio::try_join!(
            self.dense.search_records(&self.namespace, query, top_k),
            self.sparse.search_records(&self.namespace, query, top_k),
        )?;

        tracing::debug!(
            dense = dense_hits.len(),
            sparse = sparse_hits.len(),
            "Fusing similarity hits"
        );

        Ok(Self::fuse(dense_hits, sparse_hits, top_k, alpha))
    }

    /// Merge the two hit lists into one ranking.
    ///
    /// Insertion order (dense hits first, then sparse-only hits) is kept so
    /// the stable sort breaks score ties deterministically. When both sides
    /// return the same identifier the later payload wins; the stored record
    /// is the same either way.
    fn fuse(
        dense_hits: Vec<RetrievalHit>,
        sparse_hits: Vec<RetrievalHit>,
        top_k: usize,
        alpha: f32,
    ) -> Vec<RetrievedChunk> {
        let mut order: Vec<String> = Vec::new();
        let mut scores: HashMap<String, f32> = HashMap::new();
        let mut payloads: HashMap<String, RetrievalHit> = HashMap::new();

        for hit in dense_hits {
            if !scores.contains_key(&hit.id) {
                order.push(hit.id.clone());
            }
            *scores.entry(hit.id.clone()).or_insert(0.0) += alpha * hit.score;
            payloads.insert(hit.id.clone(), hit);
        }
        for hit in sparse_hits {
            if !scores.contains_key(&hit.id) {
                order.push(hit.id.clone());
            }
            *scores.entry(hit.id.clone()).or_insert(0.0) += (1.0 - alpha) * hit.score;
            payloads.insert(hit.id.clone(), hit);
        }

        let mut ranked: Vec<(String, f32)> = order
            .into_iter()
            .map(|id| {
                let score = scores[&id];
                (id, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .filter_map(|(id, score)| {
                payloads
                    .remove(&id)
                    .map(|hit| RetrievedChunk::from_hit(hit, score))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Map};

    /// Returns a fixed hit list for every search
    struct StaticIndex {
        label: &'static str,
        hits: Vec<RetrievalHit>,
        fail: bool,
    }

    impl StaticIndex {
        fn with_hits(label: &'static str, hits: Vec<RetrievalHit>) -> Arc<Self> {
            Arc::new(Self {
                label,
                hits,
                fail: false,
            })
        }

        fn failing(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                hits: Vec::new(),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl RecordIndex for StaticIndex {
        async fn upsert_records(
            &self,
            _namespace: &str,
            _records: &[crate::types::ChunkRecord],
        ) -> Result<()> {
            Ok(())
        }

        async fn search_records(
            &self,
            _namespace: &str,
            _query: &str,
            _top_k: usize,
        ) -> Result<Vec<RetrievalHit>> {
            if self.fail {
                return Err(Error::Search(format!("{} search rejected", self.label)));
            }
            Ok(self.hits.clone())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    fn hit(id: &str, score: f32, text: &str) -> RetrievalHit {
        let mut fields = Map::new();
        fields.insert("text".to_string(), json!(text));
        RetrievalHit {
            id: id.to_string(),
            score,
            fields,
        }
    }

    fn retriever(
        dense: Vec<RetrievalHit>,
        sparse: Vec<RetrievalHit>,
    ) -> HybridRetriever {
        HybridRetriever::new(
            StaticIndex::with_hits("dense", dense),
            StaticIndex::with_hits("sparse", sparse),
            "test",
        )
    }

    #[tokio::test]
    async fn test_fused_score_arithmetic() {
        let retriever = retriever(
            vec![hit("doc0#p0#c0", 0.9, "X is a widget.")],
            vec![hit("doc0#p0#c0", 0.5, "X is a widget.")],
        );

        let results = retriever.retrieve("what is X", 1, 0.7).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc0#p0#c0");
        assert_eq!(results[0].text, "X is a widget.");
        assert!((results[0].score - 0.78).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_alpha_one_matches_dense_ranking() {
        let retriever = retriever(
            vec![hit("a", 0.9, "a"), hit("b", 0.6, "b"), hit("c", 0.3, "c")],
            vec![hit("c", 0.99, "c"), hit("b", 0.8, "b")],
        );

        let results = retriever.retrieve("q", 3, 1.0).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        // Sparse scores are weighted to zero, so dense order stands
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_alpha_zero_matches_sparse_ranking() {
        let retriever = retriever(
            vec![hit("a", 0.9, "a"), hit("b", 0.6, "b")],
            vec![hit("c", 0.99, "c"), hit("b", 0.8, "b"), hit("a", 0.1, "a")],
        );

        let results = retriever.retrieve("q", 3, 0.0).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_one_sided_hit_keeps_weighted_score() {
        let retriever = retriever(
            vec![hit("dense-only", 0.8, "dense text")],
            vec![hit("sparse-only", 0.6, "sparse text")],
        );

        let results = retriever.retrieve("q", 2, 0.7).await.unwrap();
        assert_eq!(results.len(), 2);

        let dense_only = results.iter().find(|r| r.id == "dense-only").unwrap();
        assert!((dense_only.score - 0.7 * 0.8).abs() < 1e-6);

        let sparse_only = results.iter().find(|r| r.id == "sparse-only").unwrap();
        assert!((sparse_only.score - 0.3 * 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_truncates_to_top_k() {
        let retriever = retriever(
            vec![hit("a", 0.9, "a"), hit("b", 0.8, "b"), hit("c", 0.7, "c")],
            vec![hit("d", 0.95, "d")],
        );

        let results = retriever.retrieve("q", 2, 0.5).await.unwrap();
        assert_eq!(results.len(), 2);
        // d: 0.5 * 0.95 = 0.475 edges out a: 0.5 * 0.9 = 0.45
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a"]);
    }

    #[tokio::test]
    async fn test_empty_searches_yield_empty_result() {
        let retriever = retriever(Vec::new(), Vec::new());
        let results = retriever.retrieve("nothing indexed", 5, 0.7).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failed_search_fails_the_call() {
        let retriever = HybridRetriever::new(
            StaticIndex::with_hits("dense", vec![hit("a", 0.9, "a")]),
            StaticIndex::failing("sparse"),
            "test",
        );

        let err = retriever.retrieve("q", 1, 0.7).await.unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected() {
        let retriever = retriever(Vec::new(), Vec::new());
        assert!(retriever.retrieve("q", 0, 0.7).await.is_err());
        assert!(retriever.retrieve("q", 1, 1.2).await.is_err());
        assert!(retriever.retrieve("q", 1, -0.1).await.is_err());
    }

    #[tokio::test]
    async fn test_payload_retention_later_write_wins() {
        let mut dense_hit = hit("shared", 0.9, "dense payload");
        dense_hit
            .fields
            .insert("side".to_string(), json!("dense"));
        let mut sparse_hit = hit("shared", 0.5, "sparse payload");
        sparse_hit
            .fields
            .insert("side".to_string(), json!("sparse"));

        let retriever = retriever(vec![dense_hit], vec![sparse_hit]);
        let results = retriever.retrieve("q", 1, 0.7).await.unwrap();

        assert_eq!(results[0].fields["side"], "sparse");
        assert_eq!(results[0].text, "sparse payload");
    }
}
