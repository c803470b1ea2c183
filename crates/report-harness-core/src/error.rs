//! Error kinds raised by the core.
//!
//! Only two conditions are errors: a fit that cannot produce a usable
//! vector space ([`IndexingError`]) and a search issued without a valid
//! snapshot ([`PreconditionError`]). Empty queries, blank lines and
//! zero-similarity results are ordinary data.

use thiserror::Error;

/// Fitting a vector space over a document failed.
///
/// Fatal to that build only: a handle keeps publishing its previous
/// snapshot when a rebuild returns this.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexingError {
    #[error("document has no lines to index")]
    EmptyDocument,

    #[error("empty vocabulary; the document contains no noun or adjective features")]
    EmptyVocabulary,

    #[error(
        "after pruning, no terms remain (min_df={min_df}, max_df={max_df}, lines={lines}); \
         try a lower min_df or a higher max_df"
    )]
    NoTermsAfterPruning {
        min_df: String,
        max_df: String,
        lines: usize,
    },

    #[error("max_df corresponds to {max_count} lines, fewer than min_df's {min_count}")]
    InvertedDocumentFrequency { min_count: f64, max_count: f64 },

    #[error("invalid vectorizer parameter: {0}")]
    InvalidParams(String),
}

/// Search was invoked without a fitted, consistent snapshot.
///
/// This is a programming error on the caller's side, not a runtime
/// failure worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no index snapshot has been published yet")]
    NotIndexed,

    #[error("corpus vector has dimension {found}, vector space has {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
