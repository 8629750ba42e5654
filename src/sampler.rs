//! Time-based viseme sampling.
//!
//! Queried once per animation frame with the elapsed audio time; returns the
//! active mouth shape with a position-based intensity envelope. Out-of-range
//! queries return a soft silence sample rather than an error, so playback
//! degrades to a closed mouth instead of failing.

use crate::timeline::VisemeTimeline;
use crate::viseme::{SecondaryMorphs, Viseme};

/// Peak of the intensity envelope during a segment's hold phase.
const HOLD_INTENSITY: f32 = 0.95;
/// Fraction of a segment spent easing in (and, mirrored, easing out).
const RAMP_FRACTION: f32 = 0.25;
/// Exponent shaping the ease-in/ease-out ramps.
const RAMP_EXPONENT: f32 = 1.2;
/// Intensity of the default silence sample; non-zero so a missed lookup
/// does not snap the mouth fully closed.
const DEFAULT_SILENCE_INTENSITY: f32 = 0.15;

/// A sampled mouth shape for one frame. Ephemeral; recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledViseme {
    /// Reduced viseme naming the blend shape to drive.
    pub viseme: Viseme,
    /// Intensity in `[0, 1]` after the envelope and per-viseme scale.
    pub intensity: f32,
    /// Secondary blend shapes for the active (unreduced) viseme.
    pub secondary: Option<SecondaryMorphs>,
}

impl SampledViseme {
    /// The soft default returned when no segment covers the query time.
    pub fn silence() -> Self {
        Self {
            viseme: Viseme::Sil,
            intensity: DEFAULT_SILENCE_INTENSITY,
            secondary: None,
        }
    }
}

/// Sample the timeline at `t_s` seconds of elapsed audio.
///
/// The first segment covering `t_s` (inclusive on both ends) wins, so a
/// query landing exactly on a shared boundary resolves to the earlier
/// segment. Empty timelines and uncovered times return the silence default.
pub fn sample_at(timeline: &VisemeTimeline, t_s: f32) -> SampledViseme {
    let Some(segment) = timeline
        .segments()
        .iter()
        .find(|s| s.start_s <= t_s && t_s <= s.end_s)
    else {
        return SampledViseme::silence();
    };

    let span_s = segment.end_s - segment.start_s;
    let p = if span_s > 0.0 {
        (t_s - segment.start_s) / span_s
    } else {
        0.0
    };

    SampledViseme {
        viseme: segment.reduced,
        intensity: envelope(p) * intensity_scale(segment.viseme),
        secondary: Some(segment.viseme.secondary_morphs()),
    }
}

/// Intensity envelope over the segment position `p` in `[0, 1]`:
/// ease in, hold, ease out.
fn envelope(p: f32) -> f32 {
    if p < RAMP_FRACTION {
        (p / RAMP_FRACTION).powf(RAMP_EXPONENT) * HOLD_INTENSITY
    } else if p <= 1.0 - RAMP_FRACTION {
        HOLD_INTENSITY
    } else {
        ((1.0 - p) / RAMP_FRACTION).max(0.0).powf(RAMP_EXPONENT) * HOLD_INTENSITY
    }
}

/// Per-viseme intensity scale, keyed on the unreduced viseme.
///
/// Open shapes read stronger than closed ones at the same envelope value.
fn intensity_scale(viseme: Viseme) -> f32 {
    match viseme {
        Viseme::Sil => 0.10,
        Viseme::AA => 0.65,
        Viseme::O => 0.55,
        Viseme::E | Viseme::I => 0.45,
        Viseme::PP => 0.25,
        _ => 0.35,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::config::LipSyncConfig;
    use crate::timeline::create_viseme_timeline;

    fn timeline(text: &str, duration: f32) -> VisemeTimeline {
        create_viseme_timeline(text, duration, &LipSyncConfig::default()).unwrap()
    }

    #[test]
    fn empty_timeline_returns_soft_silence() {
        let sample = sample_at(&VisemeTimeline::default(), 0.5);
        assert_eq!(sample.viseme, Viseme::Sil);
        assert!((sample.intensity - 0.15).abs() < 1e-6);
        assert!(sample.secondary.is_none());
    }

    #[test]
    fn out_of_range_returns_soft_silence() {
        let tl = timeline("hello", 1.0);
        let sample = sample_at(&tl, 99.0);
        assert_eq!(sample.viseme, Viseme::Sil);
        assert!((sample.intensity - 0.15).abs() < 1e-6);
        let before = sample_at(&tl, -0.5);
        assert!((before.intensity - 0.15).abs() < 1e-6);
    }

    #[test]
    fn envelope_ramps_holds_and_fades() {
        assert_eq!(envelope(0.0), 0.0);
        assert!(envelope(0.1) > 0.0 && envelope(0.1) < 0.95);
        assert!((envelope(0.25) - 0.95).abs() < 1e-6);
        assert!((envelope(0.5) - 0.95).abs() < 1e-6);
        assert!((envelope(0.75) - 0.95).abs() < 1e-6);
        assert!(envelope(0.9) > 0.0 && envelope(0.9) < 0.95);
        assert!(envelope(1.0).abs() < 1e-6);
    }

    #[test]
    fn envelope_is_monotonic_on_ramps() {
        let mut prev = envelope(0.0);
        for i in 1..=25 {
            let v = envelope(i as f32 * 0.01);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn intensity_stays_within_bounds() {
        let tl = timeline("The quick brown fox jumps over the lazy dog.", 3.0);
        let mut t = 0.0;
        while t <= 3.0 {
            let sample = sample_at(&tl, t);
            assert!(sample.intensity >= 0.0);
            assert!(sample.intensity <= 0.95 * 0.65 + 1e-6);
            t += 0.016;
        }
    }

    #[test]
    fn open_vowel_scale_is_strongest() {
        assert!(intensity_scale(Viseme::AA) > intensity_scale(Viseme::O));
        assert!(intensity_scale(Viseme::O) > intensity_scale(Viseme::E));
        assert!(intensity_scale(Viseme::PP) < intensity_scale(Viseme::DD));
        assert!(intensity_scale(Viseme::Sil) < intensity_scale(Viseme::PP));
    }

    #[test]
    fn shared_boundary_resolves_to_earlier_segment() {
        let tl = timeline("Hello there.", 2.0);
        let segments = tl.segments();
        // Find a boundary shared exactly by two adjacent segments.
        let shared = segments
            .windows(2)
            .find(|pair| pair[0].end_s == pair[1].start_s);
        if let Some(pair) = shared {
            let sample = sample_at(&tl, pair[0].end_s);
            assert_eq!(sample.viseme, pair[0].reduced);
        }
    }

    #[test]
    fn sample_carries_secondary_morphs_of_unreduced_viseme() {
        // "though" opens with Th, which reduces to DD but keeps TH's
        // secondary morphs.
        let tl = timeline("though", 1.0);
        let first = tl.segments()[0];
        assert_eq!(first.viseme, Viseme::TH);
        assert_eq!(first.reduced, Viseme::DD);
        let mid = (first.start_s + first.end_s) * 0.5;
        let sample = sample_at(&tl, mid);
        assert_eq!(sample.viseme, Viseme::DD);
        let secondary = sample.secondary.unwrap();
        assert_eq!(secondary, Viseme::TH.secondary_morphs());
    }
}
