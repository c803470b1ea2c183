//! Text normalization: raw line → space-joined content lemmas.
//!
//! Both document lines and queries go through the same [`Normalizer`], so
//! a query can only match a line on the lemmas the analyzer kept for both.

use std::sync::Arc;

use crate::analyzer::{MorphAnalyzer, PosTag};

/// Categories kept when no explicit set is configured.
pub const DEFAULT_RETAIN: [PosTag; 2] = [PosTag::Noun, PosTag::Adjective];

/// Reduces text to the lemmas of the retained categories.
#[derive(Clone)]
pub struct Normalizer {
    analyzer: Arc<dyn MorphAnalyzer>,
    retain: Vec<PosTag>,
}

impl Normalizer {
    /// Normalizer keeping nouns and adjectives.
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>) -> Self {
        Self::with_retain(analyzer, DEFAULT_RETAIN.to_vec())
    }

    pub fn with_retain(analyzer: Arc<dyn MorphAnalyzer>, retain: Vec<PosTag>) -> Self {
        Self { analyzer, retain }
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    pub fn retain(&self) -> &[PosTag] {
        &self.retain
    }

    /// Lower-case, collapse whitespace, analyze, keep retained lemmas.
    ///
    /// Returns an empty string when nothing qualifies.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = text
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if collapsed.is_empty() {
            return String::new();
        }

        self.analyzer
            .analyze(&collapsed)
            .into_iter()
            .filter(|m| self.retain.contains(&m.tag))
            .map(|m| m.surface)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("analyzer", &self.analyzer.name())
            .field("retain", &self.retain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Morpheme, RuleAnalyzer};

    /// Tags every whitespace-separated word by a fixed table.
    struct Scripted;

    impl MorphAnalyzer for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn analyze(&self, text: &str) -> Vec<Morpheme> {
            text.split(' ')
                .map(|w| match w {
                    "run" => Morpheme::new("run", PosTag::Verb),
                    "quick" => Morpheme::new("quick", PosTag::Adjective),
                    "the" => Morpheme::new("the", PosTag::Determiner),
                    other => Morpheme::new(other, PosTag::Noun),
                })
                .collect()
        }
    }

    #[test]
    fn test_keeps_nouns_and_adjectives() {
        let n = Normalizer::new(Arc::new(Scripted));
        assert_eq!(n.normalize("The  Quick\n\tFOX run"), "quick fox");
    }

    #[test]
    fn test_blank_input_is_empty() {
        let n = Normalizer::new(Arc::new(Scripted));
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("  \r\n "), "");
        assert_eq!(n.normalize("run"), "");
    }

    #[test]
    fn test_custom_retain_set() {
        let n = Normalizer::with_retain(Arc::new(Scripted), vec![PosTag::Verb]);
        assert_eq!(n.normalize("the fox run"), "run");
    }

    #[test]
    fn test_korean_lines() {
        let n = Normalizer::new(Arc::new(RuleAnalyzer::new()));
        assert_eq!(n.normalize("오늘 날씨가 좋다"), "오늘 날씨 좋다");
        assert_eq!(n.normalize("주식 시장이 상승했다"), "주식 시장 상승");
        assert_eq!(n.normalize("고양이가 귀엽다"), "고양이 귀엽다");
        assert_eq!(n.normalize("주식 시장 전망"), "주식 시장 전망");
    }

    #[test]
    fn test_common_verbs_are_dropped() {
        let n = Normalizer::new(Arc::new(RuleAnalyzer::new()));
        assert_eq!(n.normalize("고객을 위한 전략"), "고객 전략");
        assert_eq!(n.normalize("시장에 대한 전망"), "시장 전망");
        assert_eq!(n.normalize("분석을 통해 확인"), "분석 확인");
        assert_eq!(n.normalize("그가 말하는 내용"), "그 내용");
        assert_eq!(n.normalize("지난해 수익"), "지난해 수익");
    }
}
