//! Configuration types for the lip-sync pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for timeline synthesis and playback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    /// Phoneme extraction settings (pause durations).
    pub phoneme: PhonemeConfig,
    /// Timeline compression and timing settings.
    pub timeline: TimelineConfig,
    /// Per-frame playback smoothing settings.
    pub playback: PlaybackConfig,
    /// Idle eye behavior settings (blink + saccades).
    pub idle: IdleConfig,
}

/// Phoneme extraction configuration.
///
/// These control the silence inserted around sentences and words; the
/// per-phoneme base durations are intrinsic to the phoneme classes and are
/// not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonemeConfig {
    /// Silence inserted between sentences in seconds.
    pub sentence_pause_s: f32,
    /// Silence after a word with a trailing comma or semicolon.
    pub comma_pause_s: f32,
    /// Silence next to a function word (articles, conjunctions, prepositions).
    pub function_word_pause_s: f32,
    /// Default inter-word silence.
    pub word_pause_s: f32,
    /// Silence appended after the final word.
    pub trailing_silence_s: f32,
}

impl Default for PhonemeConfig {
    fn default() -> Self {
        Self {
            sentence_pause_s: 0.3,
            comma_pause_s: 0.2,
            function_word_pause_s: 0.05,
            word_pause_s: 0.1,
            trailing_silence_s: 0.25,
        }
    }
}

/// Timeline compression and timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Minimum duration for a non-silence viseme segment in seconds.
    ///
    /// Shorter segments read as flicker rather than articulation, so the
    /// compressor clamps them up to this value before timing.
    pub min_hold_s: f32,
    /// Floor for the audio-duration scale factor.
    ///
    /// Modeled durations are never compressed below this fraction of their
    /// length; very short audio yields tail truncation instead of a blur of
    /// imperceptible shapes.
    pub min_scale: f32,
    /// Coarticulation pull-back for consonant→consonant transitions (seconds).
    pub consonant_overlap_s: f32,
    /// Coarticulation pull-back for vowel↔consonant transitions (seconds).
    pub vowel_consonant_overlap_s: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_hold_s: 0.15,
            min_scale: 0.9,
            consonant_overlap_s: 0.05,
            vowel_consonant_overlap_s: 0.02,
        }
    }
}

/// Playback smoothing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Duration of the speech→rest transition in seconds.
    pub transition_duration_s: f32,
    /// Extra time past the audio duration before forcing end-of-speech when
    /// no "ended" event arrives.
    pub end_safety_margin_s: f32,
    /// Per-frame probability of triggering a brow micro-expression.
    pub micro_expression_chance: f32,
    /// Duration of a brow micro-expression pulse in seconds.
    pub micro_expression_duration_s: f32,
    /// Scale applied to secondary morph weights during speech.
    pub secondary_scale: f32,
    /// Amplitude of the sinusoidal jaw-side sway.
    pub jaw_sway_amplitude: f32,
    /// Angular rate of the jaw sway in radians per second.
    pub jaw_sway_rate: f32,
    /// Extra jaw-open influence for the wide-open "aa" viseme.
    pub jaw_open_boost_aa: f32,
    /// Extra jaw-open influence for the other vowel visemes.
    pub jaw_open_boost_vowel: f32,
    /// Constant mouth-close influence kept under everything mid-speech.
    pub rest_mouth_close: f32,
    /// Constant lower-lip roll influence kept under everything mid-speech.
    pub rest_lip_roll: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            transition_duration_s: 0.3,
            end_safety_margin_s: 0.5,
            micro_expression_chance: 0.003,
            micro_expression_duration_s: 0.4,
            secondary_scale: 0.85,
            jaw_sway_amplitude: 0.03,
            jaw_sway_rate: 7.0,
            jaw_open_boost_aa: 0.30,
            jaw_open_boost_vowel: 0.12,
            rest_mouth_close: 0.06,
            rest_lip_roll: 0.04,
        }
    }
}

/// Idle eye behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Minimum seconds between blinks.
    pub blink_interval_min_s: f32,
    /// Maximum seconds between blinks.
    pub blink_interval_max_s: f32,
    /// Duration of one blink (close + open).
    pub blink_duration_s: f32,
    /// Minimum seconds between saccades.
    pub saccade_interval_min_s: f32,
    /// Maximum seconds between saccades.
    pub saccade_interval_max_s: f32,
    /// Maximum eye-look offset per axis.
    pub saccade_amplitude: f32,
    /// Exponential smoothing rate for eye-look motion (per second).
    pub saccade_smoothing: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            blink_interval_min_s: 2.0,
            blink_interval_max_s: 6.0,
            blink_duration_s: 0.15,
            saccade_interval_min_s: 0.8,
            saccade_interval_max_s: 4.0,
            saccade_amplitude: 0.25,
            saccade_smoothing: 10.0,
        }
    }
}

impl LipSyncConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::LipSyncError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LipSyncError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/lipsync/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("lipsync").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lipsync")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/lipsync-config/config.toml")
        }
    }
}
