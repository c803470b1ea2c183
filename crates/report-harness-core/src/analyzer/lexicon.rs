//! Dictionary resource for [`RuleAnalyzer`](super::RuleAnalyzer).
//!
//! The built-in tables cover the closed word classes of Korean (particles,
//! adverbs, determiners, conjunctions), the common adjective stems, and a
//! set of nouns whose final syllable would otherwise be mistaken for a
//! particle (`주가`, `성과`, `고양이`). Everything else is open-class and is
//! resolved by the analyzer's suffix rules.
//!
//! The lexicon is loaded once at startup and never mutated afterwards; a
//! [`UserDictionary`] can extend it before it is handed to the analyzer.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::PosTag;

/// Postpositional particles, compounds included.
const PARTICLES: &[&str] = &[
    "에서부터", "으로부터", "에게서", "한테서", "이라고", "이라는", "이라면", "에서는",
    "에서도", "에서의", "으로는", "으로도", "으로서", "으로써", "에게는", "까지는", "부터는",
    "이었다", "이었던", "입니다", "이며", "이고", "이다", "에서", "에게", "한테", "으로",
    "까지", "부터", "처럼", "보다", "마다", "조차", "마저", "이나", "이랑", "에는", "에도",
    "와는", "과는", "로는", "로도", "로서", "로써", "와의", "과의", "은", "는", "이", "가",
    "을", "를", "의", "에", "와", "과", "도", "만", "로", "랑",
];

/// Adjective stems (`좋다` → `좋`). `있다`/`없다` are adjectives here, as in
/// most Korean part-of-speech tag sets.
const ADJECTIVE_STEMS: &[&str] = &[
    "좋", "나쁘", "크", "작", "많", "적", "높", "낮", "길", "짧", "넓", "좁", "깊", "얕",
    "빠르", "느리", "쉽", "어렵", "귀엽", "예쁘", "아름답", "새롭", "젊", "늙", "같", "다르",
    "없", "있", "싫", "옳", "굵", "얇", "밝", "어둡", "맑", "흐리", "춥", "덥", "차갑",
    "뜨겁", "가볍", "무겁", "즐겁", "반갑", "고맙", "부드럽", "괜찮", "비싸", "싸", "멀",
    "가깝", "강하", "약하", "착하", "기쁘", "슬프", "아프", "바쁘", "고프", "배고프",
];

/// Roots that form adjectives with `하다` (`중요한` → `중요하다`).
const HA_ADJECTIVE_ROOTS: &[&str] = &[
    "중요", "필요", "다양", "적절", "안전", "위험", "유리", "불리", "확실", "불확실", "충분",
    "부족", "가능", "불가능", "유사", "비슷", "편리", "간단", "복잡", "정확", "명확", "적합",
    "건전", "활발", "신중", "우수", "탁월", "튼튼", "견고", "꾸준", "원활", "완만", "급격",
    "뚜렷", "저렴", "풍부", "유망", "안정", "불안정", "양호", "미미", "미약", "강력", "상당",
    "심각", "독특", "특별", "일정", "동일", "유효", "무난", "적당",
];

const ADVERBS: &[&str] = &[
    "매우", "정말", "아주", "너무", "가장", "더", "덜", "잘", "못", "또", "또한", "다시",
    "이미", "아직", "벌써", "항상", "늘", "자주", "가끔", "특히", "주로", "대체로", "다소",
    "약간", "조금", "많이", "크게", "함께", "모두", "각각", "바로", "곧", "이제", "계속",
    "점점", "점차", "꾸준히", "결국", "반드시", "무척",
    "상당히", "비교적", "거의", "오직", "단지", "그냥", "아마", "혹시", "물론",
];

const DETERMINERS: &[&str] = &[
    "이", "그", "저", "이런", "그런", "저런", "어떤", "무슨", "모든", "각", "여러", "몇",
    "새", "헌", "온갖", "한", "두", "세", "네", "다른",
];

const CONJUNCTIONS: &[&str] = &[
    "그리고", "그러나", "하지만", "그런데", "그래서", "따라서", "또는", "혹은", "및",
    "그러므로", "즉", "게다가", "반면", "그렇지만",
];

const EXCLAMATIONS: &[&str] = &["아", "어", "오", "와", "네", "예", "아니요", "응", "음", "글쎄"];

/// Nouns that would be split by the particle rule or misread as predicates.
const NOUNS: &[&str] = &[
    // final syllable looks like a particle
    "주가", "평가", "물가", "원가", "시가", "종가", "고가", "저가", "단가", "대가", "증가",
    "추가", "국가", "작가", "전문가", "투자가", "휴가", "정가", "호가", "성과", "결과",
    "효과", "고양이", "길이", "높이", "넓이", "깊이", "놀이", "먹이", "어린이", "회의",
    "주의", "논의", "합의", "정의", "의의", "유의", "동의", "문의", "강의", "정도", "속도",
    "온도", "제도", "지도", "의도", "태도", "한도", "빈도", "용도", "강도", "각도", "경로",
    "도로", "진로", "통로", "불만", "비만", "백만", "천만", "수백만", "수천만", "이만",
    "이자", "이익", "이후", "이전", "이상", "이하", "이내", "이유", "가치", "가격", "가계",
    // ends in a predicate-looking syllable
    "바다", "판다", "소다",
    // ends in a 하다 form after a single syllable
    "올해", "지난해", "새해", "매해", "한해", "손해", "피해", "이해", "오해", "방해", "침해",
    "재해", "공해", "분해", "견해", "제한", "권한", "기한", "시한", "상한", "하한", "무한",
    "최소한", "최대한", "역할", "분할",
    // domain vocabulary
    "주식", "시장", "자산", "투자", "고객", "비율", "채권", "증권", "수익", "수익률", "위험도",
    "전략", "보고서", "포트폴리오", "거래", "등급", "성향", "분석", "전망", "금리", "환율",
    "배당", "펀드", "예금", "적금", "우량주", "단타", "지분", "채무", "파생", "금전", "총자산",
];

/// Entries a deployment adds on top of the built-in tables.
///
/// Deserialized from the `[analyzer].user_dictionary` TOML file:
///
/// ```toml
/// nouns = ["코스피", "나스닥"]
/// adjectives = ["든든하다"]
/// adverbs = ["꽤"]
/// particles = ["께서"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserDictionary {
    pub nouns: Vec<String>,
    /// Adjectives as stems or dictionary forms (`든든하다`, `든든하`, `좋`).
    pub adjectives: Vec<String>,
    pub adverbs: Vec<String>,
    pub particles: Vec<String>,
}

/// Word lists consulted by the rule analyzer.
#[derive(Debug, Clone)]
pub struct Lexicon {
    nouns: HashSet<String>,
    adjective_stems: HashSet<String>,
    ha_adjective_roots: HashSet<String>,
    closed_class: HashMap<String, PosTag>,
    /// Sorted longest first so suffix matching picks compound particles.
    particles: Vec<String>,
}

impl Lexicon {
    /// The built-in dictionary.
    pub fn builtin() -> Self {
        let mut closed_class = HashMap::new();
        // Later inserts win on overlap ("네" is a determiner, not an exclamation).
        for (words, tag) in [
            (EXCLAMATIONS, PosTag::Exclamation),
            (CONJUNCTIONS, PosTag::Conjunction),
            (DETERMINERS, PosTag::Determiner),
            (ADVERBS, PosTag::Adverb),
        ] {
            for w in words {
                closed_class.insert((*w).to_string(), tag);
            }
        }

        let mut lexicon = Self {
            nouns: NOUNS.iter().map(|s| s.to_string()).collect(),
            adjective_stems: ADJECTIVE_STEMS.iter().map(|s| s.to_string()).collect(),
            ha_adjective_roots: HA_ADJECTIVE_ROOTS.iter().map(|s| s.to_string()).collect(),
            closed_class,
            particles: PARTICLES.iter().map(|s| s.to_string()).collect(),
        };
        lexicon.sort_particles();
        lexicon
    }

    /// Merge user entries into this lexicon.
    pub fn extend(&mut self, dict: &UserDictionary) {
        for noun in &dict.nouns {
            let noun = noun.trim();
            if !noun.is_empty() {
                self.closed_class.remove(noun);
                self.nouns.insert(noun.to_string());
            }
        }
        for adjective in &dict.adjectives {
            let stem = adjective.trim();
            let stem = stem.strip_suffix('다').unwrap_or(stem);
            if let Some(root) = stem.strip_suffix('하').filter(|r| !r.is_empty()) {
                self.ha_adjective_roots.insert(root.to_string());
            } else if !stem.is_empty() {
                self.adjective_stems.insert(stem.to_string());
            }
        }
        for adverb in &dict.adverbs {
            let adverb = adverb.trim();
            if !adverb.is_empty() {
                self.closed_class.insert(adverb.to_string(), PosTag::Adverb);
            }
        }
        for particle in &dict.particles {
            let particle = particle.trim();
            if !particle.is_empty() && !self.particles.iter().any(|p| p == particle) {
                self.particles.push(particle.to_string());
            }
        }
        self.sort_particles();
    }

    pub fn is_noun(&self, word: &str) -> bool {
        self.nouns.contains(word)
    }

    pub fn is_adjective_stem(&self, stem: &str) -> bool {
        self.adjective_stems.contains(stem)
    }

    pub fn is_ha_adjective_root(&self, root: &str) -> bool {
        self.ha_adjective_roots.contains(root)
    }

    /// Tag of an adverb, determiner, conjunction or exclamation.
    pub fn closed_class(&self, word: &str) -> Option<PosTag> {
        self.closed_class.get(word).copied()
    }

    pub fn particles(&self) -> &[String] {
        &self.particles
    }

    fn sort_particles(&mut self) {
        self.particles.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_longest_first() {
        let lex = Lexicon::builtin();
        let lens: Vec<usize> = lex.particles().iter().map(|p| p.chars().count()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(lex.particles()[0].chars().count(), 4);
    }

    #[test]
    fn test_extend_from_toml() {
        let dict: UserDictionary = toml::from_str(
            r#"
nouns = ["코스피"]
adjectives = ["든든하다", "푸르다"]
adverbs = ["꽤"]
particles = ["께서"]
"#,
        )
        .unwrap();
        let mut lex = Lexicon::builtin();
        lex.extend(&dict);

        assert!(lex.is_noun("코스피"));
        assert!(lex.is_ha_adjective_root("든든"));
        assert!(lex.is_adjective_stem("푸르"));
        assert_eq!(lex.closed_class("꽤"), Some(PosTag::Adverb));
        assert!(lex.particles().iter().any(|p| p == "께서"));
    }

    #[test]
    fn test_user_noun_overrides_closed_class() {
        let mut lex = Lexicon::builtin();
        assert_eq!(lex.closed_class("다소"), Some(PosTag::Adverb));
        lex.extend(&UserDictionary {
            nouns: vec!["다소".to_string()],
            ..Default::default()
        });
        assert_eq!(lex.closed_class("다소"), None);
        assert!(lex.is_noun("다소"));
    }

    #[test]
    fn test_empty_user_dictionary_is_noop() {
        let dict: UserDictionary = toml::from_str("").unwrap();
        let mut lex = Lexicon::builtin();
        let before = lex.particles().len();
        lex.extend(&dict);
        assert_eq!(lex.particles().len(), before);
    }
}
