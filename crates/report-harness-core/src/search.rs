//! Relevance search over an [`IndexSnapshot`].
//!
//! # Ranking
//!
//! 1. Normalize the query with the snapshot's own normalizer.
//! 2. Project it into the snapshot's vector space.
//! 3. Score every line by cosine similarity (0 when either side is the
//!    zero vector), in parallel.
//! 4. Sort by score descending, then by line index ascending.
//! 5. Keep the first `top_k`, then drop those scoring exactly 0.
//!
//! [`search`] maps the survivors back to their original line text and
//! falls back to [`NO_RELATED_INFO`] when nothing survives.

use rayon::prelude::*;
use serde::Serialize;
use sprs::CsVec;

use crate::error::PreconditionError;
use crate::index::IndexSnapshot;

/// Returned as the only result when no line is related to the query.
pub const NO_RELATED_INFO: &str = "관련된 정보가 없습니다.";

pub const DEFAULT_TOP_K: usize = 3;

/// One ranked line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Zero-based line index in the document.
    pub line: usize,
    /// Cosine similarity in `(0, 1]`.
    pub score: f64,
    /// Original, un-normalized line text.
    pub text: String,
}

/// Cosine similarity of two sparse vectors; 0 if either has zero norm.
pub fn cosine(a: &CsVec<f64>, b: &CsVec<f64>) -> f64 {
    let norms = a.l2_norm() * b.l2_norm();
    if norms > 0.0 {
        a.dot(b) / norms
    } else {
        0.0
    }
}

/// Rank lines for a query that has already been normalized.
pub fn rank_normalized(
    snapshot: &IndexSnapshot,
    normalized_query: &str,
    top_k: usize,
) -> Result<Vec<SearchHit>, PreconditionError> {
    let space = snapshot.space();
    let corpus = snapshot.corpus();
    let query = space.transform(normalized_query);

    // all rows come from this space's transform
    if let Some(found) = corpus
        .vectors()
        .first()
        .map(|v| v.dim())
        .filter(|&d| d != space.dimension())
    {
        return Err(PreconditionError::DimensionMismatch {
            expected: space.dimension(),
            found,
        });
    }

    let mut scored: Vec<(usize, f64)> = corpus
        .vectors()
        .par_iter()
        .enumerate()
        .map(|(i, v)| {
            debug_assert_eq!(v.dim(), query.dim());
            (i, cosine(&query, v))
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(top_k);

    let hits: Vec<SearchHit> = scored
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .filter_map(|(line, score)| {
            corpus.line(line).map(|text| SearchHit {
                line,
                score,
                text: text.to_string(),
            })
        })
        .collect();

    tracing::debug!(
        normalized_query,
        top_k,
        hits = hits.len(),
        generation = snapshot.generation(),
        "ranked"
    );
    Ok(hits)
}

/// Rank lines for `query`, keeping only positively scored ones.
pub fn rank(
    snapshot: &IndexSnapshot,
    query: &str,
    top_k: usize,
) -> Result<Vec<SearchHit>, PreconditionError> {
    let normalized = snapshot.normalizer().normalize(query);
    rank_normalized(snapshot, &normalized, top_k)
}

/// Original text of the best lines, or the single no-match sentinel.
pub fn search(
    snapshot: &IndexSnapshot,
    query: &str,
    top_k: usize,
) -> Result<Vec<String>, PreconditionError> {
    Ok(texts_or_sentinel(rank(snapshot, query, top_k)?))
}

/// [`search`] results joined with newlines, ready to splice into a prompt.
pub fn context(
    snapshot: &IndexSnapshot,
    query: &str,
    top_k: usize,
) -> Result<String, PreconditionError> {
    Ok(search(snapshot, query, top_k)?.join("\n"))
}

/// Hit texts in rank order; the sentinel alone when there are none.
pub fn texts_or_sentinel(hits: Vec<SearchHit>) -> Vec<String> {
    if hits.is_empty() {
        vec![NO_RELATED_INFO.to_string()]
    } else {
        hits.into_iter().map(|h| h.text).collect()
    }
}
