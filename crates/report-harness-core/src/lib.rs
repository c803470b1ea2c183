//! # Report Harness Core
//!
//! Line-level retrieval over a single evolving document: Korean
//! morphological normalization, a TF-IDF vector space over unigrams and
//! bigrams, and cosine-similarity ranking with a relevance floor.
//!
//! This crate performs no I/O and has no async runtime. The application
//! reads the document, hands its text to an [`IndexHandle`], and asks the
//! handle for the lines relevant to a query.
//!
//! ```rust
//! use std::sync::Arc;
//! use report_harness_core::{IndexHandle, Normalizer, RuleAnalyzer, TfidfParams};
//!
//! let normalizer = Arc::new(Normalizer::new(Arc::new(RuleAnalyzer::new())));
//! let handle = IndexHandle::new(normalizer, TfidfParams::default());
//! handle.init("오늘 날씨가 좋다\n주식 시장이 상승했다\n고양이가 귀엽다").unwrap();
//!
//! let lines = handle.search("주식 시장 전망", 3).unwrap();
//! assert_eq!(lines, vec!["주식 시장이 상승했다"]);
//! ```

pub mod analyzer;
pub mod error;
pub mod handle;
pub mod index;
pub mod normalize;
pub mod search;
pub mod vectorizer;

pub use analyzer::{Lexicon, MorphAnalyzer, Morpheme, PosTag, RuleAnalyzer, UserDictionary};
pub use error::{IndexingError, PreconditionError};
pub use handle::IndexHandle;
pub use index::{build, split_lines, Corpus, IndexSnapshot};
pub use normalize::Normalizer;
pub use search::{SearchHit, DEFAULT_TOP_K, NO_RELATED_INFO};
pub use vectorizer::{DocFreq, TfidfParams, VectorSpace};
