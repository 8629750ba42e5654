//! Timeline compression: merge runs of identical reduced visemes and clamp
//! minimum hold durations.

use crate::config::TimelineConfig;
use crate::phoneme::{Phoneme, TimedPhoneme};
use crate::viseme::{self, Viseme};

/// A duration-annotated viseme run, before absolute timing is assigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressedViseme {
    /// Phoneme that opened this run; carries vowel/consonant class for the
    /// coarticulation pass.
    pub phoneme: Phoneme,
    /// Unreduced viseme of the opening phoneme.
    pub viseme: Viseme,
    /// Reduced viseme shared by every phoneme merged into this run.
    pub reduced: Viseme,
    /// Total modeled duration in seconds.
    pub duration_s: f32,
}

/// Compress a phoneme sequence into reduced-viseme runs.
///
/// Consecutive phonemes whose reduced visemes match are merged by summing
/// durations, so no two adjacent runs share a reduced viseme. Non-silence
/// runs are then clamped up to the configured minimum hold, which keeps
/// mouth shapes on screen long enough to register.
pub fn reduce_visemes(phonemes: &[TimedPhoneme], config: &TimelineConfig) -> Vec<CompressedViseme> {
    let mut runs: Vec<CompressedViseme> = Vec::new();

    for timed in phonemes {
        let unreduced = viseme::for_phoneme(timed.phoneme);
        let reduced = unreduced.reduced();

        if let Some(last) = runs.last_mut()
            && last.reduced == reduced
        {
            last.duration_s += timed.duration_s;
            continue;
        }

        runs.push(CompressedViseme {
            phoneme: timed.phoneme,
            viseme: unreduced,
            reduced,
            duration_s: timed.duration_s,
        });
    }

    for run in &mut runs {
        if run.reduced != Viseme::Sil && run.duration_s < config.min_hold_s {
            run.duration_s = config.min_hold_s;
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn timed(phoneme: Phoneme, duration_s: f32) -> TimedPhoneme {
        TimedPhoneme {
            phoneme,
            duration_s,
        }
    }

    #[test]
    fn merges_identical_reduced_visemes() {
        // B and M both reduce to PP.
        let runs = reduce_visemes(
            &[timed(Phoneme::B, 0.12), timed(Phoneme::M, 0.15)],
            &TimelineConfig::default(),
        );
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].reduced, Viseme::PP);
        assert!((runs[0].duration_s - 0.27).abs() < 1e-6);
    }

    #[test]
    fn merges_across_reduction_boundaries() {
        // Th reduces to DD, so Th followed by T is one run.
        let runs = reduce_visemes(
            &[timed(Phoneme::Th, 0.18), timed(Phoneme::T, 0.12)],
            &TimelineConfig::default(),
        );
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].reduced, Viseme::DD);
        // The opening phoneme's unreduced viseme is retained.
        assert_eq!(runs[0].viseme, Viseme::TH);
    }

    #[test]
    fn no_adjacent_duplicates_after_compression() {
        let phonemes = [
            timed(Phoneme::Aa, 0.22),
            timed(Phoneme::B, 0.12),
            timed(Phoneme::P, 0.12),
            timed(Phoneme::Silence, 0.1),
            timed(Phoneme::Silence, 0.1),
            timed(Phoneme::Iy, 0.2),
        ];
        let runs = reduce_visemes(&phonemes, &TimelineConfig::default());
        for pair in runs.windows(2) {
            assert_ne!(pair[0].reduced, pair[1].reduced);
        }
    }

    #[test]
    fn non_silence_runs_meet_minimum_hold() {
        let runs = reduce_visemes(&[timed(Phoneme::T, 0.05)], &TimelineConfig::default());
        assert!((runs[0].duration_s - 0.15).abs() < 1e-6);
    }

    #[test]
    fn silence_runs_are_not_clamped() {
        let runs = reduce_visemes(
            &[timed(Phoneme::Silence, 0.05)],
            &TimelineConfig::default(),
        );
        assert!((runs[0].duration_s - 0.05).abs() < 1e-6);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(reduce_visemes(&[], &TimelineConfig::default()).is_empty());
    }
}
