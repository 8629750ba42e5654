//! Timing calculation: rescale modeled durations to the audio duration,
//! apply coarticulation overlap, and fit the tail to the audio boundary.

use crate::config::TimelineConfig;
use crate::viseme::Viseme;

use super::compress::CompressedViseme;
use super::VisemeSegment;

/// Assign absolute start/end times to compressed viseme runs.
///
/// The modeled durations are scaled so the sequence fills `audio_duration_s`,
/// but never compressed below the configured scale floor: very short audio
/// truncates the tail instead of blurring every shape. Adjacent non-silence
/// segments overlap slightly (articulators start moving early), with the
/// pull-back clamped so a segment never starts before the previous segment's
/// midpoint or before zero.
///
/// Postconditions: segments are time-ordered, no start is negative, and the
/// final segment ends exactly at `audio_duration_s`.
pub fn calculate_viseme_timing(
    runs: &[CompressedViseme],
    audio_duration_s: f32,
    config: &TimelineConfig,
) -> Vec<VisemeSegment> {
    let total_s: f32 = runs.iter().map(|r| r.duration_s).sum();
    if runs.is_empty() || total_s <= 0.0 {
        return vec![silence_segment(0.0, audio_duration_s)];
    }

    let scale = (audio_duration_s / total_s).max(config.min_scale);

    let mut segments: Vec<VisemeSegment> = Vec::with_capacity(runs.len());
    let mut prev_is_vowel = false;

    for run in runs {
        let scaled_s = run.duration_s * scale;
        let is_vowel = run.phoneme.is_vowel();

        let start_s = match segments.last() {
            None => 0.0,
            Some(prev) => {
                let mut start = prev.end_s;
                if prev.viseme != Viseme::Sil && run.viseme != Viseme::Sil {
                    let overlap = if !prev_is_vowel && !is_vowel {
                        config.consonant_overlap_s
                    } else if prev_is_vowel != is_vowel {
                        config.vowel_consonant_overlap_s
                    } else {
                        0.0
                    };
                    start -= overlap;
                }
                // Never retreat past the previous segment's midpoint; for
                // very short segments an unclamped pull-back could invert
                // the ordering.
                let midpoint = (prev.start_s + prev.end_s) * 0.5;
                start.max(midpoint).max(0.0)
            }
        };

        segments.push(VisemeSegment {
            viseme: run.viseme,
            reduced: run.reduced,
            start_s,
            end_s: start_s + scaled_s,
        });
        prev_is_vowel = is_vowel;
    }

    fit_tail(&mut segments, audio_duration_s);
    segments
}

/// Clamp or pad the tail so the timeline ends exactly at the audio boundary.
fn fit_tail(segments: &mut Vec<VisemeSegment>, audio_duration_s: f32) {
    while segments
        .last()
        .is_some_and(|s| s.start_s >= audio_duration_s)
    {
        segments.pop();
    }

    match segments.last_mut() {
        None => segments.push(silence_segment(0.0, audio_duration_s)),
        Some(last) if last.end_s > audio_duration_s => last.end_s = audio_duration_s,
        Some(last) if last.end_s < audio_duration_s => {
            if last.reduced == Viseme::Sil {
                // Extend trailing silence rather than appending a sliver.
                last.end_s = audio_duration_s;
            } else {
                let gap_start = last.end_s;
                segments.push(silence_segment(gap_start, audio_duration_s));
            }
        }
        Some(_) => {}
    }
}

fn silence_segment(start_s: f32, end_s: f32) -> VisemeSegment {
    VisemeSegment {
        viseme: Viseme::Sil,
        reduced: Viseme::Sil,
        start_s,
        end_s,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::phoneme::Phoneme;

    fn run(phoneme: Phoneme, duration_s: f32) -> CompressedViseme {
        let viseme = crate::viseme::for_phoneme(phoneme);
        CompressedViseme {
            phoneme,
            viseme,
            reduced: viseme.reduced(),
            duration_s,
        }
    }

    #[test]
    fn scales_to_fill_audio_exactly() {
        let runs = [run(Phoneme::Aa, 0.2), run(Phoneme::B, 0.2), run(Phoneme::Silence, 0.1)];
        let segments = calculate_viseme_timing(&runs, 2.0, &TimelineConfig::default());
        let last = segments.last().unwrap();
        assert!((last.end_s - 2.0).abs() < 1e-5);
        assert_eq!(segments[0].start_s, 0.0);
    }

    #[test]
    fn short_audio_truncates_instead_of_compressing() {
        // Modeled 1.0s into 0.2s of audio: the scale floor keeps segments at
        // 90% of modeled length and the tail is cut at the boundary.
        let runs = [
            run(Phoneme::Aa, 0.25),
            run(Phoneme::B, 0.25),
            run(Phoneme::Iy, 0.25),
            run(Phoneme::D, 0.25),
        ];
        let segments = calculate_viseme_timing(&runs, 0.2, &TimelineConfig::default());
        let last = segments.last().unwrap();
        assert!((last.end_s - 0.2).abs() < 1e-5);
        assert!(segments.len() < runs.len());
        for segment in &segments {
            assert!(segment.start_s < segment.end_s);
        }
    }

    #[test]
    fn scaling_is_unbounded_upward() {
        let runs = [run(Phoneme::Aa, 0.2)];
        let config = TimelineConfig::default();
        let segments = calculate_viseme_timing(&runs, 5.0, &config);
        assert!((segments.last().unwrap().end_s - 5.0).abs() < 1e-4);
    }

    #[test]
    fn trailing_silence_extends_to_boundary() {
        // With the scale floored at 0.9 and audio shorter than modeled,
        // clamping applies; with audio slightly longer than modeled * 1.0,
        // the trailing silence run absorbs the gap.
        let runs = [run(Phoneme::Aa, 0.2), run(Phoneme::Silence, 0.1)];
        let segments = calculate_viseme_timing(&runs, 3.0, &TimelineConfig::default());
        let last = segments.last().unwrap();
        assert_eq!(last.reduced, Viseme::Sil);
        assert!((last.end_s - 3.0).abs() < 1e-4);
    }

    #[test]
    fn consonant_pairs_overlap_more_than_vowel_pairs() {
        let config = TimelineConfig::default();
        let cc = calculate_viseme_timing(&[run(Phoneme::B, 0.3), run(Phoneme::D, 0.3)], 0.6, &config);
        let cc_overlap = cc[0].end_s - cc[1].start_s;
        assert!((cc_overlap - 0.05).abs() < 1e-6);

        let vc = calculate_viseme_timing(&[run(Phoneme::Aa, 0.3), run(Phoneme::D, 0.3)], 0.6, &config);
        let vc_overlap = vc[0].end_s - vc[1].start_s;
        assert!((vc_overlap - 0.02).abs() < 1e-6);
        assert!(cc_overlap > vc_overlap);
    }

    #[test]
    fn silence_neighbors_do_not_overlap() {
        let config = TimelineConfig::default();
        let segments = calculate_viseme_timing(
            &[run(Phoneme::B, 0.3), run(Phoneme::Silence, 0.2), run(Phoneme::D, 0.3)],
            0.8,
            &config,
        );
        assert!((segments[1].start_s - segments[0].end_s).abs() < 1e-6);
        assert!((segments[2].start_s - segments[1].end_s).abs() < 1e-6);
    }

    #[test]
    fn overlap_never_retreats_past_previous_midpoint() {
        let mut config = TimelineConfig::default();
        config.consonant_overlap_s = 10.0; // pathological pull-back
        let segments =
            calculate_viseme_timing(&[run(Phoneme::B, 0.2), run(Phoneme::D, 0.2)], 0.4, &config);
        let midpoint = (segments[0].start_s + segments[0].end_s) * 0.5;
        assert!(segments[1].start_s >= midpoint - 1e-6);
        assert!(segments[1].start_s >= segments[0].start_s);
    }

    #[test]
    fn empty_input_yields_full_silence() {
        let segments = calculate_viseme_timing(&[], 1.5, &TimelineConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].reduced, Viseme::Sil);
        assert_eq!(segments[0].start_s, 0.0);
        assert!((segments[0].end_s - 1.5).abs() < 1e-6);
    }

    #[test]
    fn no_negative_starts() {
        let mut config = TimelineConfig::default();
        config.consonant_overlap_s = 1.0;
        let segments =
            calculate_viseme_timing(&[run(Phoneme::B, 0.05), run(Phoneme::D, 0.05)], 0.1, &config);
        for segment in &segments {
            assert!(segment.start_s >= 0.0);
        }
    }
}
