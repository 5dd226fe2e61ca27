//! Knowledge base and the retrieval/ranking helper.
//!
//! The catalog is embedded once at construction; every query is a dot product
//! against the stored unit vectors (which equals cosine similarity). Category
//! filtering is masking, not exclusion: non-matching items keep a zero score
//! and can still surface when fewer than `k` items match the filter.

pub mod catalog;
mod error;

#[cfg(test)]
mod tests;

pub use error::KnowledgeError;

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::embedding::SentenceEmbedder;

/// One catalog entry. Immutable, defined at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeItem {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
}

impl KnowledgeItem {
    /// Creates a new item.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Text embedded for this item: `"{category} | {title} | {description}"`.
    pub fn embedding_text(&self) -> String {
        format!("{} | {} | {}", self.category, self.title, self.description)
    }
}

/// An item paired with its similarity score, in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub item: KnowledgeItem,
    pub score: f32,
}

/// In-memory knowledge base with a precomputed embedding matrix.
///
/// Constructed once at process start; read-only afterwards.
pub struct KnowledgeBase {
    items: Vec<KnowledgeItem>,
    embeddings: Vec<Vec<f32>>,
    embedder: SentenceEmbedder,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("items", &self.items.len())
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl KnowledgeBase {
    /// Embeds `items` and builds the knowledge base.
    ///
    /// Invariant: the embedding matrix has exactly one row per item, each with
    /// the embedder's output dimension. Violations are construction errors.
    pub fn build(
        embedder: SentenceEmbedder,
        items: Vec<KnowledgeItem>,
    ) -> Result<Self, KnowledgeError> {
        let texts: Vec<String> = items.iter().map(KnowledgeItem::embedding_text).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = embedder.embed_batch(&text_refs)?;

        if embeddings.len() != items.len() {
            return Err(KnowledgeError::RowCountMismatch {
                expected: items.len(),
                actual: embeddings.len(),
            });
        }

        let expected_dim = embedder.embedding_dim();
        for (item, row) in items.iter().zip(&embeddings) {
            if row.len() != expected_dim {
                return Err(KnowledgeError::DimensionMismatch {
                    id: item.id.clone(),
                    expected: expected_dim,
                    actual: row.len(),
                });
            }
        }

        info!(
            items = items.len(),
            embedding_dim = expected_dim,
            "Knowledge base embedded"
        );

        Ok(Self {
            items,
            embeddings,
            embedder,
        })
    }

    /// Builds the knowledge base over the builtin catalog.
    pub fn with_builtin_catalog(embedder: SentenceEmbedder) -> Result<Self, KnowledgeError> {
        Self::build(embedder, catalog::builtin_items())
    }

    /// Ranks the catalog against `query` and returns up to `k` items by
    /// descending similarity.
    ///
    /// With a `category` filter, non-matching scores are multiplied by zero
    /// (masking, not exclusion). `k` larger than the catalog returns every
    /// item; an empty query embeds to a low-signal vector and still ranks.
    pub fn search(
        &self,
        query: &str,
        category: Option<&str>,
        k: usize,
    ) -> Result<Vec<ScoredItem>, KnowledgeError> {
        let query_embedding = self.embedder.embed(query)?;

        let mut scored: Vec<ScoredItem> = self
            .items
            .iter()
            .zip(&self.embeddings)
            .map(|(item, row)| {
                let mut score = dot(&query_embedding, row);
                if let Some(category) = category {
                    let mask = if item.category == category { 1.0 } else { 0.0 };
                    score *= mask;
                }
                ScoredItem {
                    item: item.clone(),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(
            query_len = query.len(),
            category = category.unwrap_or("<none>"),
            k,
            returned = scored.len(),
            top_score = scored.first().map(|s| s.score),
            "Knowledge-base search complete"
        );

        Ok(scored)
    }

    /// Returns the catalog items in order.
    pub fn items(&self) -> &[KnowledgeItem] {
        &self.items
    }

    /// Returns the number of catalog items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the embedder backing this knowledge base.
    pub fn embedder(&self) -> &SentenceEmbedder {
        &self.embedder
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
