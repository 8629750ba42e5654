//! Viseme timeline construction.
//!
//! One timeline is built per utterance from `(text, audio_duration)`:
//! phoneme extraction → viseme mapping → compression → timing. The playback
//! engine owns the timeline for the duration of the utterance's audio and
//! discards it on end or interruption.

pub mod compress;
pub mod timing;

use crate::config::LipSyncConfig;
use crate::error::{LipSyncError, Result};
use crate::phoneme::{self, PhonemeExtractor, RuleExtractor};
use crate::viseme::Viseme;
use tracing::{debug, warn};

/// One timed mouth shape within an utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisemeSegment {
    /// Unreduced viseme; keys intensity scaling and secondary morph lookup.
    pub viseme: Viseme,
    /// Reduced viseme; names the blend shape actually animated.
    pub reduced: Viseme,
    /// Segment start in seconds from utterance start.
    pub start_s: f32,
    /// Segment end in seconds from utterance start.
    pub end_s: f32,
}

/// An ordered sequence of timed viseme segments for one utterance.
///
/// Invariants: segments are in non-decreasing `start_s` order, every segment
/// has `start_s < end_s`, and the final `end_s` equals the audio duration
/// the timeline was built for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisemeTimeline {
    segments: Vec<VisemeSegment>,
}

impl VisemeTimeline {
    pub(crate) fn new(segments: Vec<VisemeSegment>) -> Self {
        Self { segments }
    }

    /// The timed segments in playback order.
    pub fn segments(&self) -> &[VisemeSegment] {
        &self.segments
    }

    /// Whether the timeline has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the final segment, i.e. the audio duration. Zero when empty.
    pub fn duration_s(&self) -> f32 {
        self.segments.last().map_or(0.0, |s| s.end_s)
    }
}

/// Build a viseme timeline for an utterance.
///
/// Empty text degenerates to a single silence segment spanning the full
/// duration. Extraction failures are recovered via the coarse per-word
/// fallback and never propagate.
///
/// # Errors
///
/// Returns an error if `audio_duration_s` is not a positive finite number.
pub fn create_viseme_timeline(
    text: &str,
    audio_duration_s: f32,
    config: &LipSyncConfig,
) -> Result<VisemeTimeline> {
    let extractor = RuleExtractor::new(config.phoneme.clone());
    create_viseme_timeline_with(&extractor, text, audio_duration_s, config)
}

/// Build a viseme timeline using a caller-supplied phoneme extractor.
///
/// Exposed so tests (and alternative G2P sources) can replace the rule
/// extractor; an extractor error triggers the fallback path instead of
/// failing the utterance.
///
/// # Errors
///
/// Returns an error if `audio_duration_s` is not a positive finite number.
pub fn create_viseme_timeline_with(
    extractor: &dyn PhonemeExtractor,
    text: &str,
    audio_duration_s: f32,
    config: &LipSyncConfig,
) -> Result<VisemeTimeline> {
    if !audio_duration_s.is_finite() || audio_duration_s <= 0.0 {
        return Err(LipSyncError::Timeline(format!(
            "audio duration must be positive, got {audio_duration_s}"
        )));
    }

    let timed = match extractor.extract(text) {
        Ok(timed) if !timed.is_empty() => timed,
        Ok(_) => {
            warn!("phoneme extractor returned an empty sequence, using fallback");
            phoneme::fallback_extract(text)
        }
        Err(e) => {
            warn!("phoneme extraction failed, using fallback: {e}");
            phoneme::fallback_extract(text)
        }
    };

    let compressed = compress::reduce_visemes(&timed, &config.timeline);
    let segments = timing::calculate_viseme_timing(&compressed, audio_duration_s, &config.timeline);
    debug!(
        segments = segments.len(),
        audio_duration_s, "created viseme timeline"
    );
    Ok(VisemeTimeline::new(segments))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn rejects_non_positive_duration() {
        let config = LipSyncConfig::default();
        assert!(create_viseme_timeline("hello", 0.0, &config).is_err());
        assert!(create_viseme_timeline("hello", -1.0, &config).is_err());
        assert!(create_viseme_timeline("hello", f32::NAN, &config).is_err());
    }

    #[test]
    fn empty_text_is_one_silence_segment() {
        let config = LipSyncConfig::default();
        let timeline = create_viseme_timeline("", 1.0, &config).unwrap();
        let segments = timeline.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].viseme, Viseme::Sil);
        assert_eq!(segments[0].start_s, 0.0);
        assert!((segments[0].end_s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn timeline_ends_exactly_at_audio_duration() {
        let config = LipSyncConfig::default();
        for duration in [0.4, 1.0, 2.0, 7.5] {
            let timeline = create_viseme_timeline("Hello there.", duration, &config).unwrap();
            assert!((timeline.duration_s() - duration).abs() < 1e-5, "{duration}");
        }
    }

    #[test]
    fn segments_are_ordered_and_positive() {
        let config = LipSyncConfig::default();
        let timeline =
            create_viseme_timeline("The quick brown fox jumps over the lazy dog.", 3.0, &config)
                .unwrap();
        let segments = timeline.segments();
        assert!(!segments.is_empty());
        for pair in segments.windows(2) {
            assert!(pair[0].start_s <= pair[1].start_s);
        }
        for segment in segments {
            assert!(segment.start_s >= 0.0);
            assert!(segment.start_s < segment.end_s);
        }
    }

    #[test]
    fn extractor_failure_uses_fallback() {
        struct Failing;
        impl PhonemeExtractor for Failing {
            fn extract(&self, _text: &str) -> Result<Vec<crate::phoneme::TimedPhoneme>> {
                Err(LipSyncError::Phoneme("injected failure".into()))
            }
        }

        let config = LipSyncConfig::default();
        let timeline =
            create_viseme_timeline_with(&Failing, "test words here", 2.0, &config).unwrap();
        assert!(!timeline.is_empty());
        assert!((timeline.duration_s() - 2.0).abs() < 1e-5);
        for segment in timeline.segments() {
            assert!(segment.start_s < segment.end_s);
        }
    }
}
