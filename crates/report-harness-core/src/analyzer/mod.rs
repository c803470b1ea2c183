//! Morphological analysis capability.
//!
//! The normalizer never talks to a concrete analyzer: it holds an
//! `Arc<dyn MorphAnalyzer>` and only asks for `(surface, tag)` pairs.
//! This keeps the normalization contract testable with a scripted
//! analyzer and lets the application swap dictionaries at startup.
//!
//! The built-in implementation is [`RuleAnalyzer`], a lemmatizing Korean
//! analyzer driven by a [`Lexicon`] of particles, predicate endings,
//! adjective stems and closed-class words.
//!
//! # Example
//!
//! ```rust
//! use report_harness_core::analyzer::{MorphAnalyzer, PosTag, RuleAnalyzer};
//!
//! let analyzer = RuleAnalyzer::new();
//! let morphemes = analyzer.analyze("주식 시장이 상승했다");
//! let nouns: Vec<&str> = morphemes
//!     .iter()
//!     .filter(|m| m.tag == PosTag::Noun)
//!     .map(|m| m.surface.as_str())
//!     .collect();
//! assert_eq!(nouns, vec!["주식", "시장", "상승"]);
//! ```

pub mod hangul;
pub mod lexicon;
pub mod rule;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use lexicon::{Lexicon, UserDictionary};
pub use rule::RuleAnalyzer;

/// Grammatical category attached to a morpheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosTag {
    Noun,
    Adjective,
    Verb,
    Adverb,
    Determiner,
    Conjunction,
    Exclamation,
    /// Postpositional particle (조사).
    Josa,
    /// Verbal or adjectival ending (어미).
    Eomi,
    Suffix,
    Number,
    /// Latin-script word.
    Alpha,
    Punctuation,
    /// Any other script.
    Foreign,
}

impl PosTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Noun => "noun",
            PosTag::Adjective => "adjective",
            PosTag::Verb => "verb",
            PosTag::Adverb => "adverb",
            PosTag::Determiner => "determiner",
            PosTag::Conjunction => "conjunction",
            PosTag::Exclamation => "exclamation",
            PosTag::Josa => "josa",
            PosTag::Eomi => "eomi",
            PosTag::Suffix => "suffix",
            PosTag::Number => "number",
            PosTag::Alpha => "alpha",
            PosTag::Punctuation => "punctuation",
            PosTag::Foreign => "foreign",
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim().to_lowercase().as_str() {
            "noun" => PosTag::Noun,
            "adjective" => PosTag::Adjective,
            "verb" => PosTag::Verb,
            "adverb" => PosTag::Adverb,
            "determiner" => PosTag::Determiner,
            "conjunction" => PosTag::Conjunction,
            "exclamation" => PosTag::Exclamation,
            "josa" => PosTag::Josa,
            "eomi" => PosTag::Eomi,
            "suffix" => PosTag::Suffix,
            "number" => PosTag::Number,
            "alpha" => PosTag::Alpha,
            "punctuation" => PosTag::Punctuation,
            "foreign" => PosTag::Foreign,
            other => return Err(format!("unknown part-of-speech tag: '{}'", other)),
        };
        Ok(tag)
    }
}

/// One analyzed unit: the lemmatized surface form and its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Morpheme {
    pub surface: String,
    pub tag: PosTag,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, tag: PosTag) -> Self {
        Self {
            surface: surface.into(),
            tag,
        }
    }
}

/// A morphological analyzer producing lemmatized `(token, category)` pairs.
///
/// Implementations must be pure with respect to their input and safe to
/// share across threads; the normalizer calls `analyze` concurrently from
/// every search request.
pub trait MorphAnalyzer: Send + Sync {
    /// Short identifier, used in logs and `/health`.
    fn name(&self) -> &str;

    /// Segment `text` into morphemes using base (lemmatized) forms.
    fn analyze(&self, text: &str) -> Vec<Morpheme>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_tag_parse_round_trip() {
        for tag in [PosTag::Noun, PosTag::Adjective, PosTag::Josa, PosTag::Alpha] {
            assert_eq!(tag.as_str().parse::<PosTag>().unwrap(), tag);
        }
        assert_eq!(" Noun ".parse::<PosTag>().unwrap(), PosTag::Noun);
    }

    #[test]
    fn test_pos_tag_parse_unknown() {
        let err = "particle".parse::<PosTag>().unwrap_err();
        assert!(err.contains("particle"));
    }
}
