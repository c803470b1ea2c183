//! Hangul syllable arithmetic.
//!
//! Precomposed syllables occupy `U+AC00..=U+D7A3` and are laid out as
//! `base + (initial × 21 + medial) × 28 + final`. Only the final
//! consonant (batchim) matters to the analyzer: particle allomorphs and
//! irregular conjugations are chosen by it.

const SYLLABLE_FIRST: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const FINAL_COUNT: u32 = 28;

/// Final consonant indices (0 = no batchim).
pub const FINAL_NIEUN: u32 = 4;
pub const FINAL_RIEUL: u32 = 8;
pub const FINAL_MIEUM: u32 = 16;
pub const FINAL_BIEUP: u32 = 17;

/// Precomposed Hangul syllable.
pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_FIRST..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Conjoining or compatibility jamo (e.g. `ㅋ`, `ㅠ`).
pub fn is_jamo(c: char) -> bool {
    matches!(c as u32, 0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xD7B0..=0xD7FF)
}

/// Index of the final consonant, or `None` for non-syllables.
pub fn final_consonant(c: char) -> Option<u32> {
    if is_syllable(c) {
        Some((c as u32 - SYLLABLE_FIRST) % FINAL_COUNT)
    } else {
        None
    }
}

pub fn has_batchim(c: char) -> bool {
    final_consonant(c).is_some_and(|f| f != 0)
}

/// Replace the final consonant of `c` (use `0` to remove it).
pub fn with_final(c: char, final_index: u32) -> Option<char> {
    if !is_syllable(c) || final_index >= FINAL_COUNT {
        return None;
    }
    let base = c as u32 - (c as u32 - SYLLABLE_FIRST) % FINAL_COUNT;
    char::from_u32(base + final_index)
}
