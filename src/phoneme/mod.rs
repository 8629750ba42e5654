//! Rule-based phoneme extraction.
//!
//! Converts raw text into an ordered sequence of approximate phonemes with
//! estimated intrinsic durations. This is deliberately not a dictionary or
//! neural G2P: graphemes are matched longest-pattern-first against a static
//! table, which is accurate enough to drive mouth shapes in sync with
//! synthesized audio.

use crate::config::PhonemeConfig;
use crate::error::Result;

/// Broad articulatory class of a phoneme, used for duration modeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonemeClass {
    /// Open/low vowels (longest).
    OpenVowel,
    /// All other vowels.
    Vowel,
    /// Liquids, nasals, and glides.
    LiquidNasal,
    /// Fricatives.
    Fricative,
    /// Plosive stops (shortest).
    Stop,
    /// Affricates.
    Affricate,
    /// Silence / pause.
    Silence,
}

impl PhonemeClass {
    /// Intrinsic base duration for this class in seconds.
    ///
    /// Silence durations are always assigned explicitly by the extractor,
    /// so the silence base is zero.
    pub fn base_duration_s(&self) -> f32 {
        match self {
            PhonemeClass::OpenVowel => 0.22,
            PhonemeClass::Vowel => 0.20,
            PhonemeClass::LiquidNasal => 0.15,
            PhonemeClass::Fricative => 0.18,
            PhonemeClass::Stop => 0.12,
            PhonemeClass::Affricate => 0.15,
            PhonemeClass::Silence => 0.0,
        }
    }
}

/// Approximate phoneme symbols (ARPABET-flavored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phoneme {
    /// Pause / inter-word gap.
    Silence,
    // Stops
    P,
    B,
    T,
    D,
    K,
    G,
    // Nasals, liquids, glides
    M,
    N,
    Ng,
    L,
    R,
    W,
    Y,
    // Fricatives
    F,
    V,
    Th,
    Dh,
    S,
    Z,
    Sh,
    Zh,
    H,
    // Affricates
    Ch,
    Jh,
    // Vowels
    Aa,
    Ae,
    Ah,
    Ao,
    Aw,
    Ay,
    Eh,
    Er,
    Ey,
    Ih,
    Iy,
    Ow,
    Oy,
    Uh,
    Uw,
}

impl Phoneme {
    /// Articulatory class of this phoneme.
    pub fn class(&self) -> PhonemeClass {
        use Phoneme::*;
        match self {
            Silence => PhonemeClass::Silence,
            Aa | Ae | Ao | Aw | Ay => PhonemeClass::OpenVowel,
            Ah | Eh | Er | Ey | Ih | Iy | Ow | Oy | Uh | Uw => PhonemeClass::Vowel,
            M | N | Ng | L | R | W | Y => PhonemeClass::LiquidNasal,
            F | V | Th | Dh | S | Z | Sh | Zh | H => PhonemeClass::Fricative,
            P | B | T | D | K | G => PhonemeClass::Stop,
            Ch | Jh => PhonemeClass::Affricate,
        }
    }

    /// Whether this phoneme is a vowel (open or otherwise).
    pub fn is_vowel(&self) -> bool {
        matches!(self.class(), PhonemeClass::OpenVowel | PhonemeClass::Vowel)
    }
}

/// A phoneme with its modeled duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPhoneme {
    /// The phoneme symbol.
    pub phoneme: Phoneme,
    /// Modeled duration in seconds, before audio-duration scaling.
    pub duration_s: f32,
}

impl TimedPhoneme {
    fn silence(duration_s: f32) -> Self {
        Self {
            phoneme: Phoneme::Silence,
            duration_s,
        }
    }
}

/// Source of phoneme sequences for timeline construction.
///
/// The default implementation is [`RuleExtractor`]; timeline construction
/// recovers from any extractor error via a coarse per-word fallback, so a
/// failing extractor degrades the animation rather than the utterance.
pub trait PhonemeExtractor {
    /// Extract an ordered phoneme sequence with estimated durations.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails; callers fall back to
    /// [`fallback_extract`].
    fn extract(&self, text: &str) -> Result<Vec<TimedPhoneme>>;
}

/// Grapheme-table extractor (the default).
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    config: PhonemeConfig,
}

impl RuleExtractor {
    /// Create a rule extractor with the given pause configuration.
    pub fn new(config: PhonemeConfig) -> Self {
        Self { config }
    }
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new(PhonemeConfig::default())
    }
}

impl PhonemeExtractor for RuleExtractor {
    fn extract(&self, text: &str) -> Result<Vec<TimedPhoneme>> {
        Ok(extract_with(&self.config, text))
    }
}

// ---------------------------------------------------------------------------
// Grapheme pattern table
// ---------------------------------------------------------------------------

/// Grapheme → phoneme patterns.
///
/// Matching is longest-pattern-first; the table order only breaks ties
/// between patterns of equal length. Every pattern is lowercase ASCII, as is
/// the cleaned word it is matched against.
const PATTERNS: &[(&str, Phoneme)] = &[
    // Four- and three-letter clusters
    ("ough", Phoneme::Ow),
    ("tch", Phoneme::Ch),
    ("igh", Phoneme::Ay),
    ("eau", Phoneme::Ow),
    ("dge", Phoneme::Jh),
    // Digraphs: consonants
    ("ch", Phoneme::Ch),
    ("sh", Phoneme::Sh),
    ("th", Phoneme::Th),
    ("ph", Phoneme::F),
    ("wh", Phoneme::W),
    ("ck", Phoneme::K),
    ("ng", Phoneme::Ng),
    ("qu", Phoneme::K),
    // Digraphs: vowel clusters
    ("ee", Phoneme::Iy),
    ("ea", Phoneme::Iy),
    ("ai", Phoneme::Ey),
    ("ay", Phoneme::Ey),
    ("ey", Phoneme::Ey),
    ("oa", Phoneme::Ow),
    ("ow", Phoneme::Aw),
    ("ou", Phoneme::Aw),
    ("oo", Phoneme::Uw),
    ("oi", Phoneme::Oy),
    ("oy", Phoneme::Oy),
    ("au", Phoneme::Ao),
    ("aw", Phoneme::Ao),
    ("ew", Phoneme::Uw),
    ("ir", Phoneme::Er),
    ("ur", Phoneme::Er),
    ("er", Phoneme::Er),
    ("ar", Phoneme::Aa),
    ("or", Phoneme::Ao),
    // Single letters
    ("a", Phoneme::Ae),
    ("e", Phoneme::Eh),
    ("i", Phoneme::Ih),
    ("o", Phoneme::Ow),
    ("u", Phoneme::Ah),
    ("y", Phoneme::Iy),
    ("b", Phoneme::B),
    ("c", Phoneme::K),
    ("d", Phoneme::D),
    ("f", Phoneme::F),
    ("g", Phoneme::G),
    ("h", Phoneme::H),
    ("j", Phoneme::Jh),
    ("k", Phoneme::K),
    ("l", Phoneme::L),
    ("m", Phoneme::M),
    ("n", Phoneme::N),
    ("p", Phoneme::P),
    ("q", Phoneme::K),
    ("r", Phoneme::R),
    ("s", Phoneme::S),
    ("t", Phoneme::T),
    ("v", Phoneme::V),
    ("w", Phoneme::W),
    ("x", Phoneme::K),
    ("z", Phoneme::Z),
];

/// Find the longest pattern anchored at the start of `rest`.
///
/// Ties on length resolve to the earlier table entry, so priority is the
/// explicit length key rather than table order.
fn match_longest(rest: &str) -> Option<(usize, Phoneme)> {
    let mut best: Option<(usize, Phoneme)> = None;
    for &(pattern, phoneme) in PATTERNS {
        if rest.starts_with(pattern) {
            match best {
                Some((len, _)) if pattern.len() <= len => {}
                _ => best = Some((pattern.len(), phoneme)),
            }
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Closed set of function words that take a shortened neighboring pause.
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "of", "to", "in", "on", "at", "by", "for", "with",
    "as", "is", "are", "was", "be",
];

/// Words longer than this get compressed phoneme durations.
const LONG_WORD_LEN: usize = 5;
/// Words longer than this with more than two phonemes de-emphasize their tail.
const MULTI_SYLLABLE_WORD_LEN: usize = 3;
/// Duration multiplier for long words and non-initial syllables.
const DE_EMPHASIS: f32 = 0.85;

fn is_function_word(word: &str) -> bool {
    FUNCTION_WORDS.contains(&word)
}

/// Lowercase a token and strip everything except letters and apostrophes.
fn clean_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '\'')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Phonemize one cleaned word, appending timed phonemes to `out`.
fn word_phonemes(word: &str, out: &mut Vec<TimedPhoneme>) {
    let mut phonemes = Vec::new();
    let mut rest = word;
    while !rest.is_empty() {
        if let Some((len, phoneme)) = match_longest(rest) {
            phonemes.push(phoneme);
            rest = &rest[len..];
        } else {
            // No pattern (e.g. apostrophe): skip one character. The cleaned
            // word is ASCII, so a one-byte step is a char step.
            rest = &rest[1..];
        }
    }

    let long_word = word.len() > LONG_WORD_LEN;
    let de_emphasize_tail = word.len() > MULTI_SYLLABLE_WORD_LEN && phonemes.len() > 2;
    for (i, phoneme) in phonemes.iter().enumerate() {
        let mut duration_s = phoneme.class().base_duration_s();
        if long_word {
            duration_s *= DE_EMPHASIS;
        }
        if de_emphasize_tail && i > 0 {
            duration_s *= DE_EMPHASIS;
        }
        out.push(TimedPhoneme {
            phoneme: *phoneme,
            duration_s,
        });
    }
}

/// Extract timed phonemes from text using the grapheme pattern table.
///
/// Sentences split on `.`/`!`/`?` with a sentence pause between them; words
/// are separated by a pause whose length depends on trailing punctuation and
/// function-word neighbors. A trailing silence is always appended, so the
/// result is non-empty even for empty text.
pub fn extract_with(config: &PhonemeConfig, text: &str) -> Vec<TimedPhoneme> {
    let mut out = Vec::new();
    let mut emitted_sentence = false;

    for sentence in text.split(['.', '!', '?']) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut emitted_word = false;
        let mut prev_raw: Option<&str> = None;

        for raw in &words {
            let clean = clean_word(raw);
            if clean.is_empty() {
                continue;
            }

            if !emitted_word && emitted_sentence {
                out.push(TimedPhoneme::silence(config.sentence_pause_s));
            }

            if let Some(prev) = prev_raw {
                let pause_s = if prev.ends_with(',') || prev.ends_with(';') {
                    config.comma_pause_s
                } else if is_function_word(&clean_word(prev)) || is_function_word(&clean) {
                    config.function_word_pause_s
                } else {
                    config.word_pause_s
                };
                out.push(TimedPhoneme::silence(pause_s));
            }

            word_phonemes(&clean, &mut out);
            emitted_word = true;
            prev_raw = Some(raw);
        }

        if emitted_word {
            emitted_sentence = true;
        }
    }

    out.push(TimedPhoneme::silence(config.trailing_silence_s));
    out
}

// ---------------------------------------------------------------------------
// Fallback extraction
// ---------------------------------------------------------------------------

/// Fixed per-word duration used by the fallback path.
const FALLBACK_WORD_S: f32 = 0.25;
/// Silence between fallback words.
const FALLBACK_GAP_S: f32 = 0.15;
/// Trailing silence on the fallback path.
const FALLBACK_TRAILING_S: f32 = 0.2;

/// Coarse per-word extraction used when the rule extractor fails.
///
/// Each word becomes a single phoneme taken from its first vowel letter (or
/// a default alveolar consonant when it has none). Lossy by design; the
/// result is structurally valid and non-empty for any input.
pub fn fallback_extract(text: &str) -> Vec<TimedPhoneme> {
    let mut out = Vec::new();

    for raw in text.split_whitespace() {
        let clean = clean_word(raw);
        if clean.is_empty() {
            continue;
        }

        let phoneme = clean
            .chars()
            .find_map(|c| match c {
                'a' => Some(Phoneme::Aa),
                'e' => Some(Phoneme::Eh),
                'i' => Some(Phoneme::Ih),
                'o' => Some(Phoneme::Ow),
                'u' => Some(Phoneme::Uw),
                _ => None,
            })
            .unwrap_or(Phoneme::D);

        if !out.is_empty() {
            out.push(TimedPhoneme::silence(FALLBACK_GAP_S));
        }
        out.push(TimedPhoneme {
            phoneme,
            duration_s: FALLBACK_WORD_S,
        });
    }

    out.push(TimedPhoneme::silence(FALLBACK_TRAILING_S));
    out
}
