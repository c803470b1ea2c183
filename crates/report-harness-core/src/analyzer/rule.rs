//! Rule-based lemmatizing Korean analyzer.
//!
//! Text is first cut into character-class runs (Hangul, Latin, digits,
//! other letters, punctuation). Every Hangul run is one eojeol (word) and
//! is resolved by the first rule that applies:
//!
//! 1. closed-class or noun lexicon hit → whole word;
//! 2. `X적인` / `X적으로` → `X` noun + `적` suffix + particle;
//! 3. `X하다` / `X되다` conjugations → `X` noun + `하다`/`되다` verb, or a
//!    single `X하다` adjective when `X` is an adjectival root, or a single
//!    `X하다` verb when `X` is one syllable (`위한`, `통해`, `말하는`);
//! 4. adjective stem + ending → `stem다` adjective;
//! 5. verb stem + ending → `stem다` verb;
//! 6. noun + particle (batchim agreement checked) → noun + josa;
//! 7. any other predicate ending → verb;
//! 8. otherwise → noun.

use super::hangul::{self, FINAL_BIEUP, FINAL_MIEUM, FINAL_NIEUN, FINAL_RIEUL};
use super::lexicon::Lexicon;
use super::{MorphAnalyzer, Morpheme, PosTag};

/// Endings after a predicate stem (adjective or verb).
const PREDICATE_ENDINGS: &[&str] = &[
    "다", "습니다", "고", "게", "지", "은", "는", "는다", "던", "았다", "었다", "았고", "었고",
    "았던", "었던", "았습니다", "었습니다", "아요", "어요", "아서", "어서", "네요", "군요",
    "으며", "며", "으면", "면", "지만", "을", "으니", "니", "겠다", "기에", "어", "아", "도록",
    "려고", "면서", "는데", "으나", "거나",
];

/// What may follow a stem whose last syllable absorbed `ㄴ`/`ㄹ`/`ㅂ`/`ㅁ`
/// (`큰`, `큽니다`, `클까`).
const FUSED_TAILS: &[&str] = &["", "니다", "니까", "데", "지", "까", "다"];

/// What may follow the `운`/`워` syllable of a `ㅂ`-irregular form.
const BIEUP_IRREGULAR_SYLLABLES: &[char] = &['운', '워', '웠', '우'];
const BIEUP_IRREGULAR_TAILS: &[&str] = &["", "요", "서", "도", "다", "면", "며", "니", "니까", "지만"];

const HA_ENDINGS: &[&str] = &[
    "하였습니다", "했습니다", "합니다", "하였다", "했다", "하다", "한다", "하는", "하고", "하며",
    "하여", "해서", "해야", "하면", "하지", "하게", "하기", "해요", "했던", "하던", "했고",
    "했으며", "하겠다", "할", "한", "해",
];

const DOE_ENDINGS: &[&str] = &[
    "되었습니다", "됐습니다", "됩니다", "되었다", "됐다", "된다", "되는", "되고", "되며", "되어",
    "되면", "되지", "되게", "되기", "된", "될", "돼", "되다", "되던", "됐던",
];

const JEOK_ENDINGS: &[&str] = &["적인", "적으로", "적이다", "적이고", "적이며", "적이나", "적일"];

/// Endings that mark a predicate even when the stem is unknown.
const VERB_ENDINGS: &[&str] = &[
    "습니다", "었습니다", "았습니다", "였습니다", "겠습니다", "었다", "았다", "였다", "겠다",
    "는다", "어요", "아요", "여요", "세요", "네요", "지요", "면서", "으면", "려고", "도록",
    "지만", "는데", "어서", "아서", "기에", "었고", "았고", "었던", "았던",
];

const VERB_STEMS: &[&str] = &[
    "오르", "내리", "떨어지", "보이", "늘어나", "줄어들", "가지", "만들", "나타나",
    "이루어지", "나오", "들어가", "따르", "바꾸", "받", "먹", "읽", "찾", "갖", "모으", "넘",
    "움직이", "기록하", "보여주", "이어지", "커지", "작아지", "높아지", "낮아지", "살펴보",
    "지나",
];

/// Particles that only attach after a final consonant.
const AFTER_BATCHIM: &[&str] = &[
    "이", "은", "을", "과", "과는", "과의", "으로", "으로는", "으로도", "으로서", "으로써",
    "으로부터", "이랑", "이나",
];

/// Particles that only attach after a vowel.
const AFTER_VOWEL: &[&str] = &["가", "는", "를", "와", "와는", "와의", "랑"];

/// `로` forms attach after a vowel or a final `ㄹ`.
const RO_FAMILY: &[&str] = &["로", "로는", "로도", "로서", "로써"];

/// Single-syllable particles allowed to leave a one-syllable noun behind.
const CASE_MARKERS: &[&str] = &["이", "가", "을", "를", "은", "는", "에", "의"];

/// Lemmatizing analyzer over a [`Lexicon`].
#[derive(Debug, Clone)]
pub struct RuleAnalyzer {
    lexicon: Lexicon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Hangul,
    Jamo,
    Latin,
    Digit,
    Foreign,
    Punct,
}

fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Space
    } else if hangul::is_syllable(c) {
        CharClass::Hangul
    } else if hangul::is_jamo(c) {
        CharClass::Jamo
    } else if c.is_numeric() {
        CharClass::Digit
    } else if c.is_alphabetic() && (c as u32) < 0x0250 {
        CharClass::Latin
    } else if c.is_alphanumeric() {
        CharClass::Foreign
    } else {
        CharClass::Punct
    }
}

fn ends_with_any<'a>(word: &str, endings: &[&'a str]) -> Option<&'a str> {
    endings
        .iter()
        .filter(|e| word.ends_with(**e) && word.len() > e.len())
        .max_by_key(|e| e.chars().count())
        .copied()
}

impl RuleAnalyzer {
    /// Analyzer over the built-in lexicon.
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::builtin())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn analyze_word(&self, word: &str, out: &mut Vec<Morpheme>) {
        if let Some(tag) = self.lexicon.closed_class(word) {
            out.push(Morpheme::new(word, tag));
            return;
        }
        if self.lexicon.is_noun(word) {
            out.push(Morpheme::new(word, PosTag::Noun));
            return;
        }

        if let Some(ending) = ends_with_any(word, JEOK_ENDINGS) {
            let root = &word[..word.len() - ending.len()];
            if root.chars().count() >= 2 {
                out.push(Morpheme::new(root, PosTag::Noun));
                out.push(Morpheme::new("적", PosTag::Suffix));
                out.push(Morpheme::new(&ending["적".len()..], PosTag::Josa));
                return;
            }
        }

        if let Some(morphemes) = self.split_light_verb(word) {
            out.extend(morphemes);
            return;
        }

        let chars: Vec<char> = word.chars().collect();
        if let Some(stem) = self.predicate_stem(&chars, |s| self.is_adjective(s)) {
            out.push(Morpheme::new(format!("{}다", stem), PosTag::Adjective));
            return;
        }
        if let Some(stem) = self.predicate_stem(&chars, |s| VERB_STEMS.contains(&s)) {
            out.push(Morpheme::new(format!("{}다", stem), PosTag::Verb));
            return;
        }

        if let Some((noun, particle)) = self.split_particle(word) {
            out.push(Morpheme::new(noun, PosTag::Noun));
            out.push(Morpheme::new(particle, PosTag::Josa));
            return;
        }

        if ends_with_any(word, VERB_ENDINGS).is_some()
            || (chars.len() >= 2 && word.ends_with('다'))
        {
            out.push(Morpheme::new(word, PosTag::Verb));
            return;
        }

        out.push(Morpheme::new(word, PosTag::Noun));
    }

    /// `상승했다` → `상승`/Noun + `하다`/Verb; `중요한` → `중요하다`/Adjective;
    /// `위한` → `위하다`/Verb.
    fn split_light_verb(&self, word: &str) -> Option<Vec<Morpheme>> {
        let (ending, lemma) = match ends_with_any(word, HA_ENDINGS) {
            Some(e) => (e, "하다"),
            None => (ends_with_any(word, DOE_ENDINGS)?, "되다"),
        };
        let root = &word[..word.len() - ending.len()];
        let lemma_form = format!("{}{}", root, lemma);
        if lemma == "하다" && self.is_adjective(&format!("{}하", root)) {
            return Some(vec![Morpheme::new(lemma_form, PosTag::Adjective)]);
        }
        // a one-syllable root is not a noun of its own: 위하다, 대하다, 말하다
        if root.chars().count() < 2 {
            return Some(vec![Morpheme::new(lemma_form, PosTag::Verb)]);
        }
        Some(vec![
            Morpheme::new(root, PosTag::Noun),
            Morpheme::new(lemma, PosTag::Verb),
        ])
    }

    fn is_adjective(&self, stem: &str) -> bool {
        if self.lexicon.is_adjective_stem(stem) {
            return true;
        }
        if let Some(root) = stem.strip_suffix('하') {
            return self.lexicon.is_ha_adjective_root(root);
        }
        stem.chars().count() >= 2
            && (stem.ends_with("스럽") || stem.ends_with("롭") || stem.ends_with("답"))
    }

    /// Find the stem of a conjugated predicate, if `is_stem` accepts one.
    fn predicate_stem(&self, chars: &[char], is_stem: impl Fn(&str) -> bool) -> Option<String> {
        // regular: stem + ending
        for split in 1..chars.len() {
            let stem: String = chars[..split].iter().collect();
            let ending: String = chars[split..].iter().collect();
            if PREDICATE_ENDINGS.contains(&ending.as_str()) && is_stem(&stem) {
                return Some(stem);
            }
        }

        // fused final consonant: 큰, 다른, 큽니다
        for split in 1..=chars.len() {
            let last = chars[split - 1];
            let fused = hangul::final_consonant(last).filter(|f| {
                matches!(*f, FINAL_NIEUN | FINAL_RIEUL | FINAL_BIEUP | FINAL_MIEUM)
            });
            if fused.is_none() {
                continue;
            }
            let tail: String = chars[split..].iter().collect();
            if !FUSED_TAILS.contains(&tail.as_str()) {
                continue;
            }
            if let Some(open) = hangul::with_final(last, 0) {
                let mut stem: String = chars[..split - 1].iter().collect();
                stem.push(open);
                if is_stem(&stem) {
                    return Some(stem);
                }
            }
        }

        // ㅂ-irregular: 귀여운, 어려워, 새로웠다
        for k in 1..chars.len() {
            if !BIEUP_IRREGULAR_SYLLABLES.contains(&chars[k]) {
                continue;
            }
            let prev = chars[k - 1];
            if hangul::final_consonant(prev) != Some(0) {
                continue;
            }
            let tail: String = chars[k + 1..].iter().collect();
            if !BIEUP_IRREGULAR_TAILS.contains(&tail.as_str()) {
                continue;
            }
            if let Some(closed) = hangul::with_final(prev, FINAL_BIEUP) {
                let mut stem: String = chars[..k - 1].iter().collect();
                stem.push(closed);
                if is_stem(&stem) {
                    return Some(stem);
                }
            }
        }

        None
    }

    /// Longest particle whose allomorph agrees with the preceding syllable.
    fn split_particle<'w>(&self, word: &'w str) -> Option<(&'w str, &'w str)> {
        for particle in self.lexicon.particles() {
            let Some(rest) = word.strip_suffix(particle.as_str()) else {
                continue;
            };
            let Some(last) = rest.chars().last() else {
                continue;
            };
            let p = particle.as_str();
            let batchim = hangul::has_batchim(last);
            if AFTER_BATCHIM.contains(&p) && !batchim {
                continue;
            }
            if AFTER_VOWEL.contains(&p) && batchim {
                continue;
            }
            if RO_FAMILY.contains(&p)
                && batchim
                && hangul::final_consonant(last) != Some(FINAL_RIEUL)
            {
                continue;
            }
            let rest_len = rest.chars().count();
            if p.chars().count() == 1 && rest_len < 2 && !CASE_MARKERS.contains(&p) {
                continue;
            }
            return Some((rest, &word[rest.len()..]));
        }
        None
    }
}

impl Default for RuleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphAnalyzer for RuleAnalyzer {
    fn name(&self) -> &str {
        "rule-ko"
    }

    fn analyze(&self, text: &str) -> Vec<Morpheme> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let class = classify(chars[i]);
            if class == CharClass::Space {
                i += 1;
                continue;
            }
            let start = i;
            i += 1;
            while i < chars.len() {
                if classify(chars[i]) == class {
                    i += 1;
                    continue;
                }
                // 1,234.5 stays one number
                if class == CharClass::Digit
                    && matches!(chars[i], '.' | ',')
                    && chars
                        .get(i + 1)
                        .is_some_and(|n| classify(*n) == CharClass::Digit)
                {
                    i += 2;
                    continue;
                }
                break;
            }

            let run: String = chars[start..i].iter().collect();
            match class {
                CharClass::Hangul => self.analyze_word(&run, &mut out),
                CharClass::Jamo => out.push(Morpheme::new(run, PosTag::Exclamation)),
                CharClass::Latin => out.push(Morpheme::new(run, PosTag::Alpha)),
                CharClass::Digit => out.push(Morpheme::new(run, PosTag::Number)),
                CharClass::Foreign => out.push(Morpheme::new(run, PosTag::Foreign)),
                CharClass::Punct => out.push(Morpheme::new(run, PosTag::Punctuation)),
                CharClass::Space => {}
            }
        }

        out
    }
}
