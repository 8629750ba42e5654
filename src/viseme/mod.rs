//! Viseme mapping for lip-sync animation.
//!
//! A viseme is a visually distinct mouth shape that corresponds to one or
//! more phonemes. This module maps phonemes onto a closed viseme set, a
//! coarser "reduced" set used for the actual animation, and the secondary
//! blend shapes that accompany each mouth shape.

use crate::phoneme::Phoneme;

/// Closed viseme set (VRM-style naming for the blend shapes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Viseme {
    /// Silence (mouth closed).
    Sil = 0,
    /// /p/, /b/, /m/ (lips pressed together).
    PP = 1,
    /// /f/, /v/ (teeth on lip).
    FF = 2,
    /// /θ/, /ð/ (tongue between teeth).
    TH = 3,
    /// /t/, /d/, /n/, /l/, /s/, /z/ (tongue at roof).
    DD = 4,
    /// /k/, /g/, /ŋ/ (back of tongue up).
    KK = 5,
    /// /tʃ/, /dʒ/, /ʃ/, /ʒ/, /r/ (tongue curved).
    CH = 6,
    /// /a/ (mouth open wide).
    AA = 7,
    /// /e/ (mouth medium open).
    E = 8,
    /// /i/ (mouth wide, teeth apart).
    I = 9,
    /// /o/, /u/ (rounded).
    O = 10,
}

/// Secondary blend shapes that accompany a viseme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryMorphs {
    /// Blend-shape names to drive alongside the viseme shape.
    pub morphs: &'static [&'static str],
    /// Base weight in (0, 1] applied to each morph.
    pub weight: f32,
}

impl Viseme {
    /// All visemes in declaration order.
    pub const ALL: [Viseme; 11] = [
        Viseme::Sil,
        Viseme::PP,
        Viseme::FF,
        Viseme::TH,
        Viseme::DD,
        Viseme::KK,
        Viseme::CH,
        Viseme::AA,
        Viseme::E,
        Viseme::I,
        Viseme::O,
    ];

    /// The blend-shape name driven for this viseme.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Viseme::Sil => "viseme_sil",
            Viseme::PP => "viseme_PP",
            Viseme::FF => "viseme_FF",
            Viseme::TH => "viseme_TH",
            Viseme::DD => "viseme_DD",
            Viseme::KK => "viseme_kk",
            Viseme::CH => "viseme_CH",
            Viseme::AA => "viseme_aa",
            Viseme::E => "viseme_E",
            Viseme::I => "viseme_I",
            Viseme::O => "viseme_O",
        }
    }

    /// Reduced ("natural motion") viseme used for animation and merging.
    ///
    /// Several consonant shapes collapse onto fewer categories to limit
    /// mouth-shape churn. Vowels and the remaining consonants are their own
    /// reduction.
    pub fn reduced(&self) -> Viseme {
        match self {
            Viseme::TH => Viseme::DD,
            Viseme::CH => Viseme::KK,
            v => *v,
        }
    }

    /// Whether this viseme is one of the vowel mouth shapes.
    pub fn is_vowel_shape(&self) -> bool {
        matches!(self, Viseme::AA | Viseme::E | Viseme::I | Viseme::O)
    }

    /// Secondary blend shapes for this (unreduced) viseme.
    ///
    /// Always defined; callers looking up a viseme without a meaningful
    /// accompaniment get the silence entry.
    pub fn secondary_morphs(&self) -> SecondaryMorphs {
        match self {
            Viseme::Sil => SecondaryMorphs {
                morphs: &["mouthClose"],
                weight: 0.30,
            },
            Viseme::PP => SecondaryMorphs {
                morphs: &["mouthPressLeft", "mouthPressRight"],
                weight: 0.55,
            },
            Viseme::FF => SecondaryMorphs {
                morphs: &["mouthLowerDownLeft", "mouthLowerDownRight"],
                weight: 0.45,
            },
            Viseme::TH => SecondaryMorphs {
                morphs: &["tongueOut"],
                weight: 0.30,
            },
            Viseme::DD => SecondaryMorphs {
                morphs: &["mouthStretchLeft", "mouthStretchRight"],
                weight: 0.30,
            },
            Viseme::KK => SecondaryMorphs {
                morphs: &["jawOpen"],
                weight: 0.25,
            },
            Viseme::CH => SecondaryMorphs {
                morphs: &["mouthFunnel"],
                weight: 0.40,
            },
            Viseme::AA => SecondaryMorphs {
                morphs: &["jawOpen"],
                weight: 0.60,
            },
            Viseme::E => SecondaryMorphs {
                morphs: &["mouthStretchLeft", "mouthStretchRight"],
                weight: 0.35,
            },
            Viseme::I => SecondaryMorphs {
                morphs: &["mouthSmileLeft", "mouthSmileRight"],
                weight: 0.40,
            },
            Viseme::O => SecondaryMorphs {
                morphs: &["mouthFunnel", "mouthPucker"],
                weight: 0.50,
            },
        }
    }
}

/// Map a phoneme to its (unreduced) viseme.
pub fn for_phoneme(phoneme: Phoneme) -> Viseme {
    use Phoneme::*;
    match phoneme {
        Silence => Viseme::Sil,

        // Bilabial: lips together
        P | B | M => Viseme::PP,

        // Labiodental: teeth on lip
        F | V => Viseme::FF,

        // Dental: tongue between teeth
        Th | Dh => Viseme::TH,

        // Alveolar: tongue at roof
        T | D | N | L | S | Z => Viseme::DD,

        // Velar: back of tongue
        K | G | Ng | H => Viseme::KK,

        // Postalveolar: curled
        Ch | Jh | Sh | Zh | R => Viseme::CH,

        // Approximants adopt the nearest vowel shape
        W => Viseme::O,
        Y => Viseme::I,

        // Vowels
        Aa | Ao | Aw => Viseme::AA,
        Ae | Ah | Eh | Er => Viseme::E,
        Ay | Ey | Ih | Iy => Viseme::I,
        Ow | Oy | Uh | Uw => Viseme::O,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn bilabials_map_to_pp() {
        for p in [Phoneme::B, Phoneme::P, Phoneme::M] {
            assert_eq!(for_phoneme(p), Viseme::PP);
        }
    }

    #[test]
    fn silence_maps_to_sil() {
        assert_eq!(for_phoneme(Phoneme::Silence), Viseme::Sil);
    }

    #[test]
    fn reduction_collapses_th_and_ch() {
        assert_eq!(Viseme::TH.reduced(), Viseme::DD);
        assert_eq!(Viseme::CH.reduced(), Viseme::KK);
    }

    #[test]
    fn reduction_is_identity_elsewhere() {
        for v in Viseme::ALL {
            if v != Viseme::TH && v != Viseme::CH {
                assert_eq!(v.reduced(), v);
            }
        }
    }

    #[test]
    fn reduction_is_idempotent() {
        for v in Viseme::ALL {
            assert_eq!(v.reduced().reduced(), v.reduced());
        }
    }

    #[test]
    fn secondary_morph_weights_in_range() {
        for v in Viseme::ALL {
            let set = v.secondary_morphs();
            assert!(!set.morphs.is_empty());
            assert!(set.weight > 0.0 && set.weight <= 1.0, "{v:?}");
        }
    }

    #[test]
    fn shape_names_are_unique() {
        let mut names: Vec<&str> = Viseme::ALL.iter().map(|v| v.shape_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Viseme::ALL.len());
    }

    #[test]
    fn vowel_shapes_classified() {
        assert!(Viseme::AA.is_vowel_shape());
        assert!(Viseme::O.is_vowel_shape());
        assert!(!Viseme::PP.is_vowel_shape());
        assert!(!Viseme::Sil.is_vowel_shape());
    }
}
