//! Lipsync: phoneme-to-viseme timeline synthesis and real-time playback.
//!
//! This crate drives a virtual character's mouth in sync with synthesized
//! speech. Given an utterance's text and the duration of its rendered audio,
//! it builds a time-stamped viseme timeline:
//! Text → phonemes → visemes → compression → timing
//!
//! During playback the timeline is sampled once per animation frame and fed
//! through a smoothing engine that writes blend-shape influences to an
//! external rig, with coarticulation overlap, anti-jitter history blending,
//! jaw/micro-expression augmentation, and an eased transition back to a
//! resting face when speech ends.
//!
//! The crate synthesizes no audio and loads no models: the speech provider
//! and the 3D rig are external collaborators reached through
//! [`playback::AudioEvent`] and the [`rig::BlendShapeRig`] trait.

pub mod config;
pub mod error;
pub mod phoneme;
pub mod playback;
pub mod rig;
pub mod sampler;
pub mod timeline;
pub mod viseme;

pub use config::LipSyncConfig;
pub use error::{LipSyncError, Result};
pub use playback::{AudioEvent, AudioEventQueue, EngineState, PlaybackEngine};
pub use rig::{BlendShapeRig, MorphMap};
pub use sampler::{sample_at, SampledViseme};
pub use timeline::{create_viseme_timeline, create_viseme_timeline_with, VisemeSegment, VisemeTimeline};
pub use viseme::Viseme;
