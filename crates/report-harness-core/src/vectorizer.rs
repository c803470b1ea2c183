//! TF-IDF vector space over normalized lines.
//!
//! # Feature extraction
//!
//! A normalized line is cut into tokens with the token pattern
//! (`\b\w\w+\b` by default, so one-character tokens never become
//! features), then every contiguous n-gram in `ngram_range` is emitted
//! with its tokens joined by a single space.
//!
//! # Fitting
//!
//! 1. Count document frequency (df) per feature, one document per line.
//! 2. Convert the cutoffs to counts: a [`DocFreq::Fraction`] is multiplied
//!    by the number of lines, a [`DocFreq::Count`] is taken as is.
//! 3. Keep features with `min_count <= df <= max_count`, sorted
//!    lexicographically; the position in that order is the dimension index.
//! 4. `idf = ln((1 + n) / (1 + df)) + 1`.
//!
//! A line's vector is `count × idf` per feature, L2-normalized. Lines with
//! no in-vocabulary feature become the zero vector.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sprs::CsVec;

use crate::error::IndexingError;

/// Default token pattern: two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// A document-frequency cutoff.
///
/// Deserializes from a TOML/JSON integer as [`DocFreq::Count`] and from a
/// float as [`DocFreq::Fraction`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocFreq {
    /// Absolute number of lines.
    Count(usize),
    /// Share of lines, in `[0, 1]`.
    Fraction(f64),
}

impl DocFreq {
    fn as_count(&self, n_lines: usize) -> f64 {
        match *self {
            DocFreq::Count(c) => c as f64,
            DocFreq::Fraction(f) => f * n_lines as f64,
        }
    }
}

impl fmt::Display for DocFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFreq::Count(c) => write!(f, "{}", c),
            DocFreq::Fraction(x) => write!(f, "{}", x),
        }
    }
}

/// Fitting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Inclusive `(min_n, max_n)`.
    pub ngram_range: (usize, usize),
    pub min_df: DocFreq,
    pub max_df: DocFreq,
    pub token_pattern: String,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            min_df: DocFreq::Fraction(0.05),
            max_df: DocFreq::Fraction(0.95),
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
        }
    }
}

impl TfidfParams {
    pub fn validate(&self) -> Result<(), IndexingError> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(IndexingError::InvalidParams(format!(
                "ngram_range ({}, {}) must satisfy 1 <= min <= max",
                lo, hi
            )));
        }
        for (name, df) in [("min_df", self.min_df), ("max_df", self.max_df)] {
            if let DocFreq::Fraction(f) = df {
                if !(0.0..=1.0).contains(&f) {
                    return Err(IndexingError::InvalidParams(format!(
                        "{} = {} is outside [0, 1]",
                        name, f
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A fitted vocabulary with its IDF weights.
///
/// Immutable once built; refitting produces a new value.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    params: TfidfParams,
    token_re: Regex,
}

impl VectorSpace {
    /// Fit a space over `docs` and return it with one vector per doc.
    pub fn fit<S>(docs: &[S], params: TfidfParams) -> Result<(Self, Vec<CsVec<f64>>), IndexingError>
    where
        S: AsRef<str> + Sync,
    {
        params.validate()?;
        let token_re = Regex::new(&params.token_pattern)
            .map_err(|e| IndexingError::InvalidParams(format!("token_pattern: {}", e)))?;
        if docs.is_empty() {
            return Err(IndexingError::EmptyDocument);
        }

        let counts: Vec<HashMap<String, usize>> = docs
            .par_iter()
            .map(|d| count_features(&token_re, params.ngram_range, d.as_ref()))
            .collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for line in &counts {
            for feature in line.keys() {
                *df.entry(feature.as_str()).or_insert(0) += 1;
            }
        }
        if df.is_empty() {
            return Err(IndexingError::EmptyVocabulary);
        }

        let n = docs.len();
        let max_count = params.max_df.as_count(n);
        let min_count = params.min_df.as_count(n);
        if max_count < min_count {
            return Err(IndexingError::InvertedDocumentFrequency {
                min_count,
                max_count,
            });
        }

        let kept: Vec<(&str, usize)> = df
            .into_iter()
            .filter(|(_, d)| {
                let d = *d as f64;
                min_count <= d && d <= max_count
            })
            .collect();
        if kept.is_empty() {
            return Err(IndexingError::NoTermsAfterPruning {
                min_df: params.min_df.to_string(),
                max_df: params.max_df.to_string(),
                lines: n,
            });
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (i, (feature, d)) in kept.into_iter().enumerate() {
            vocabulary.insert(feature.to_string(), i);
            idf.push(((1.0 + n as f64) / (1.0 + d as f64)).ln() + 1.0);
        }

        let space = Self {
            vocabulary,
            idf,
            params,
            token_re,
        };
        let vectors = counts.par_iter().map(|c| space.weigh(c)).collect();
        Ok((space, vectors))
    }

    /// Project normalized text into this space; unknown features are dropped.
    pub fn transform(&self, text: &str) -> CsVec<f64> {
        self.weigh(&count_features(
            &self.token_re,
            self.params.ngram_range,
            text,
        ))
    }

    /// The n-gram features of `text`, in extraction order, before any
    /// vocabulary filtering.
    pub fn features(&self, text: &str) -> Vec<String> {
        extract_features(&self.token_re, self.params.ngram_range, text)
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn params(&self) -> &TfidfParams {
        &self.params
    }

    /// The `n` rarest features (highest IDF), ties in vocabulary order.
    pub fn top_features(&self, n: usize) -> Vec<(&str, f64)> {
        let mut features: Vec<(&str, f64)> = self
            .vocabulary
            .iter()
            .map(|(f, &i)| (f.as_str(), self.idf[i]))
            .collect();
        features.sort_by(|a, b| b.1.total_cmp(&a.1));
        features.truncate(n);
        features
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> CsVec<f64> {
        let mut entries: Vec<(usize, f64)> = counts
            .iter()
            .filter_map(|(f, &c)| self.vocabulary.get(f).map(|&i| (i, c as f64 * self.idf[i])))
            .collect();
        entries.sort_by_key(|(i, _)| *i);

        let (indices, data): (Vec<usize>, Vec<f64>) = entries.into_iter().unzip();
        let mut row = CsVec::new(self.dimension(), indices, data);
        row.unit_normalize();
        row
    }
}

fn extract_features(token_re: &Regex, (lo, hi): (usize, usize), text: &str) -> Vec<String> {
    let tokens: Vec<&str> = token_re.find_iter(text).map(|m| m.as_str()).collect();
    let mut features = Vec::new();
    for n in lo..=hi.min(tokens.len()) {
        for window in tokens.windows(n) {
            features.push(window.join(" "));
        }
    }
    features
}

fn count_features(token_re: &Regex, range: (usize, usize), text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for feature in extract_features(token_re, range, text) {
        *counts.entry(feature).or_insert(0) += 1;
    }
    counts
}
