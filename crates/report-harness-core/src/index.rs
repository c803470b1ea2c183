//! Corpus indexing: document text → [`IndexSnapshot`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use sprs::CsVec;

use crate::error::IndexingError;
use crate::normalize::Normalizer;
use crate::vectorizer::{TfidfParams, VectorSpace};

const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// Split on every line boundary a text editor would honor.
///
/// `\r\n` counts as one break and a trailing break does not start a new
/// (empty) line; an empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let is_break = LINE_BREAKS.contains(&c);
        if !is_break {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                end = j + 1;
            }
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Lines of one document with their normalized form and vector.
///
/// All three sequences are index-aligned with the document's line order.
#[derive(Debug, Clone)]
pub struct Corpus {
    lines: Vec<String>,
    normalized: Vec<String>,
    vectors: Vec<CsVec<f64>>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, i: usize) -> Option<&str> {
        self.lines.get(i).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }

    pub fn vectors(&self) -> &[CsVec<f64>] {
        &self.vectors
    }
}

/// An immutable, searchable index of one document.
///
/// The corpus vectors and the vector space always come from the same fit.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    corpus: Corpus,
    space: VectorSpace,
    normalizer: Arc<Normalizer>,
    generation: u64,
    fingerprint: String,
    built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Build counter assigned by the owning handle (0 for standalone builds).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// SHA-256 hex digest of the indexed document text.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Index `document`: split into lines, normalize each, fit, transform.
pub fn build(
    document: &str,
    normalizer: Arc<Normalizer>,
    params: TfidfParams,
) -> Result<IndexSnapshot, IndexingError> {
    let started = Instant::now();
    let lines: Vec<String> = split_lines(document)
        .into_iter()
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return Err(IndexingError::EmptyDocument);
    }

    let normalized: Vec<String> = lines.par_iter().map(|l| normalizer.normalize(l)).collect();
    let (space, vectors) = VectorSpace::fit(&normalized, params)?;

    let fingerprint = hex::encode(Sha256::digest(document.as_bytes()));
    tracing::info!(
        lines = lines.len(),
        features = space.dimension(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        fingerprint = &fingerprint[..12],
        "index built"
    );

    Ok(IndexSnapshot {
        corpus: Corpus {
            lines,
            normalized,
            vectors,
        },
        space,
        normalizer,
        generation: 0,
        fingerprint,
        built_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::RuleAnalyzer;

    fn normalizer() -> Arc<Normalizer> {
        Arc::new(Normalizer::new(Arc::new(RuleAnalyzer::new())))
    }

    #[test]
    fn test_split_lines_universal_newlines() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\u{2028}b\u{0c}c"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_build_keeps_blank_lines_aligned() {
        let doc = "오늘 날씨가 좋다\n\n주식 시장이 상승했다\n고양이가 귀엽다\n";
        let snap = build(doc, normalizer(), TfidfParams::default()).unwrap();
        assert_eq!(snap.corpus().len(), 4);
        assert_eq!(snap.corpus().normalized()[1], "");
        assert_eq!(snap.corpus().normalized()[2], "주식 시장 상승");
        assert_eq!(snap.corpus().vectors()[1].nnz(), 0);
        assert_eq!(snap.corpus().line(3), Some("고양이가 귀엽다"));
        assert_eq!(snap.generation(), 0);
        assert_eq!(snap.fingerprint().len(), 64);
    }

    #[test]
    fn test_build_empty_document() {
        let err = build("", normalizer(), TfidfParams::default()).unwrap_err();
        assert_eq!(err, IndexingError::EmptyDocument);
    }

    #[test]
    fn test_build_without_content_words() {
        let err = build("매우\n그리고\n", normalizer(), TfidfParams::default()).unwrap_err();
        assert_eq!(err, IndexingError::EmptyVocabulary);
    }

    #[test]
    fn test_build_is_idempotent() {
        let doc = "오늘 날씨가 좋다\n주식 시장이 상승했다\n고양이가 귀엽다";
        let a = build(doc, normalizer(), TfidfParams::default()).unwrap();
        let b = build(doc, normalizer(), TfidfParams::default()).unwrap();
        assert_eq!(a.space().vocabulary(), b.space().vocabulary());
        assert_eq!(a.space().idf(), b.space().idf());
        assert_eq!(a.corpus().vectors(), b.corpus().vectors());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
