//! Real-time playback smoothing.
//!
//! The [`PlaybackEngine`] consumes one sampled viseme per animation frame,
//! keeps a short rolling history for anti-jitter blending, layers jaw and
//! micro-expression motion on top, and eases the face back to rest when
//! speech ends. All state lives in the engine and is mutated only from the
//! per-frame [`PlaybackEngine::update`] and the audio event handlers, which
//! run on the same logical thread.

pub mod events;
pub mod idle;

pub use events::{AudioEvent, AudioEventQueue, AudioEventSender};

use crate::config::{LipSyncConfig, PlaybackConfig};
use crate::error::{LipSyncError, Result};
use crate::rig::BlendShapeRig;
use crate::sampler::{self, SampledViseme};
use crate::timeline::VisemeTimeline;
use crate::viseme::Viseme;
use idle::EyeIdle;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Depth of the rolling sample window.
const HISTORY_LEN: usize = 4;
/// Blend weights across the window, oldest first. Sums to 1; the newest
/// sample dominates so the mouth stays responsive.
const HISTORY_WEIGHTS: [f32; HISTORY_LEN] = [0.05, 0.10, 0.20, 0.65];
/// Peak influence of a brow micro-expression pulse.
const MICRO_EXPRESSION_PEAK: f32 = 0.25;

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No utterance yet.
    Idle,
    /// An utterance's timeline is being played.
    Speaking,
    /// Easing from the last spoken frame to the resting face.
    TransitioningToRest,
    /// Resting face; only eye idle runs.
    Resting,
}

/// Per-character playback state machine.
pub struct PlaybackEngine {
    config: PlaybackConfig,
    state: EngineState,
    /// Current utterance's timeline; `None` outside Speaking.
    timeline: Option<VisemeTimeline>,
    /// Rolling window of the last [`HISTORY_LEN`] samples.
    history: VecDeque<SampledViseme>,
    /// Elapsed audio time within the current utterance.
    elapsed_s: f32,
    /// Authoritative audio duration of the current utterance.
    audio_duration_s: f32,
    /// Elapsed time within the rest transition.
    transition_elapsed_s: f32,
    /// Influences captured at transition start.
    snapshot: HashMap<String, f32>,
    /// Speech influences written last frame; used to zero stale shapes.
    influences: HashMap<String, f32>,
    /// Elapsed time within the current micro-expression pulse, if any.
    micro_expression_s: Option<f32>,
    rng: SmallRng,
    idle: EyeIdle,
}

impl PlaybackEngine {
    /// Create an engine with an entropy-seeded RNG.
    pub fn new(config: &LipSyncConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create an engine with a fixed RNG seed, for deterministic tests.
    pub fn with_seed(config: &LipSyncConfig, seed: u64) -> Self {
        Self {
            config: config.playback.clone(),
            state: EngineState::Idle,
            timeline: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
            elapsed_s: 0.0,
            audio_duration_s: 0.0,
            transition_elapsed_s: 0.0,
            snapshot: HashMap::new(),
            influences: HashMap::new(),
            micro_expression_s: None,
            rng: SmallRng::seed_from_u64(seed),
            idle: EyeIdle::new(config.idle.clone()),
        }
    }

    /// Observable state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether an utterance is currently playing.
    pub fn is_speaking(&self) -> bool {
        self.state == EngineState::Speaking
    }

    /// Begin playing an utterance.
    ///
    /// Any in-flight utterance or rest transition is discarded immediately;
    /// there is no queuing. The history window is seeded with the timeline's
    /// first sample so the initial blend has no stale contributions.
    pub fn speak(&mut self, timeline: VisemeTimeline) {
        let first = sampler::sample_at(&timeline, 0.0);
        self.history.clear();
        for _ in 0..HISTORY_LEN {
            self.history.push_back(first);
        }
        self.audio_duration_s = timeline.duration_s();
        self.timeline = Some(timeline);
        self.elapsed_s = 0.0;
        self.transition_elapsed_s = 0.0;
        self.snapshot.clear();
        self.micro_expression_s = None;
        self.state = EngineState::Speaking;
        info!(audio_duration_s = self.audio_duration_s, "utterance started");
    }

    /// Handle a discrete audio player event.
    ///
    /// # Errors
    ///
    /// Returns the player's error for [`AudioEvent::Error`]; the engine
    /// still cleans up and transitions to rest so the face never sticks
    /// mid-speech.
    pub fn handle_event(&mut self, event: AudioEvent) -> Result<()> {
        match event {
            AudioEvent::Started => {
                if self.state == EngineState::Speaking {
                    // Audio start is the time reference for sampling.
                    self.elapsed_s = 0.0;
                    debug!("audio started");
                }
                Ok(())
            }
            AudioEvent::Ended => {
                self.begin_rest_transition();
                Ok(())
            }
            AudioEvent::Error(message) => {
                self.begin_rest_transition();
                Err(LipSyncError::Audio(message))
            }
        }
    }

    /// Drain and handle all pending events from the queue.
    ///
    /// # Errors
    ///
    /// Returns the last audio error encountered, after processing every
    /// event.
    pub fn process_events(&mut self, queue: &AudioEventQueue) -> Result<()> {
        let mut result = Ok(());
        for event in queue.drain() {
            if let Err(e) = self.handle_event(event) {
                result = Err(e);
            }
        }
        result
    }

    /// Advance the engine by one frame of `dt_s` seconds and write
    /// blend-shape influences to the rig.
    pub fn update(&mut self, dt_s: f32, rig: &mut dyn BlendShapeRig) {
        match self.state {
            EngineState::Speaking => self.update_speaking(dt_s, rig),
            EngineState::TransitioningToRest => self.update_transition(dt_s, rig),
            EngineState::Idle | EngineState::Resting => {}
        }
        self.idle.update(dt_s, &mut self.rng, rig);
    }

    fn update_speaking(&mut self, dt_s: f32, rig: &mut dyn BlendShapeRig) {
        self.elapsed_s += dt_s;

        let deadline_s = self.audio_duration_s + self.config.end_safety_margin_s;
        let sample = match self.timeline.as_ref() {
            Some(timeline)
                if self.elapsed_s < timeline.duration_s() && self.elapsed_s < deadline_s =>
            {
                sampler::sample_at(timeline, self.elapsed_s)
            }
            _ => {
                self.begin_rest_transition();
                return;
            }
        };

        self.history.push_back(sample);
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }

        let mut frame: HashMap<String, f32> = HashMap::new();

        // Weighted blend of viseme intensities across the window.
        for viseme in Viseme::ALL {
            let shape = viseme.shape_name();
            let mut blended = 0.0;
            for (weight, past) in HISTORY_WEIGHTS.iter().zip(self.history.iter()) {
                if past.viseme == viseme {
                    blended += weight * past.intensity;
                }
            }
            frame.insert(shape.to_owned(), blended);
        }

        // Rest influence under everything so the mouth never goes slack.
        accumulate(&mut frame, "mouthClose", self.config.rest_mouth_close);
        accumulate(&mut frame, "mouthRollLower", self.config.rest_lip_roll);

        // Secondary morphs from the newest sample.
        if let Some(secondary) = sample.secondary {
            let value = sample.intensity * secondary.weight * self.config.secondary_scale;
            for morph in secondary.morphs {
                accumulate(&mut frame, morph, value);
            }
        }

        // Low-amplitude jaw sway.
        let sway = (self.elapsed_s * self.config.jaw_sway_rate).sin()
            * self.config.jaw_sway_amplitude
            * sample.intensity;
        if sway >= 0.0 {
            accumulate(&mut frame, "jawLeft", sway);
        } else {
            accumulate(&mut frame, "jawRight", -sway);
        }

        // Jaw-open boost for the open mouth shapes.
        match sample.viseme {
            Viseme::AA => accumulate(
                &mut frame,
                "jawOpen",
                sample.intensity * self.config.jaw_open_boost_aa,
            ),
            Viseme::E | Viseme::O => accumulate(
                &mut frame,
                "jawOpen",
                sample.intensity * self.config.jaw_open_boost_vowel,
            ),
            _ => {}
        }

        // Occasional brow pulse.
        if self.micro_expression_s.is_none()
            && self.rng.gen_range(0.0..1.0f32) < self.config.micro_expression_chance
        {
            self.micro_expression_s = Some(0.0);
        }
        if let Some(elapsed) = self.micro_expression_s {
            let elapsed = elapsed + dt_s;
            if elapsed >= self.config.micro_expression_duration_s {
                self.micro_expression_s = None;
            } else {
                self.micro_expression_s = Some(elapsed);
                let pulse = (std::f32::consts::PI * elapsed
                    / self.config.micro_expression_duration_s)
                    .sin()
                    * MICRO_EXPRESSION_PEAK;
                accumulate(&mut frame, "browInnerUp", pulse);
            }
        }

        self.commit_frame(frame, rig);
    }

    fn update_transition(&mut self, dt_s: f32, rig: &mut dyn BlendShapeRig) {
        self.transition_elapsed_s += dt_s;
        let progress =
            (self.transition_elapsed_s / self.config.transition_duration_s).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - progress).powi(3);

        let mut frame: HashMap<String, f32> = HashMap::with_capacity(self.snapshot.len());
        for (name, &from) in &self.snapshot {
            let to = rest_target(name);
            frame.insert(name.clone(), from + (to - from) * eased);
        }
        self.commit_frame(frame, rig);

        if progress >= 1.0 {
            for name in self.snapshot.keys() {
                rig.set_influence(name, 0.0);
            }
            self.snapshot.clear();
            self.influences.clear();
            self.state = EngineState::Resting;
            debug!("resting");
        }
    }

    /// Write this frame's influences and zero any shape written last frame
    /// but absent now, so stale morphs never linger on the rig.
    fn commit_frame(&mut self, frame: HashMap<String, f32>, rig: &mut dyn BlendShapeRig) {
        for (name, &value) in &frame {
            rig.set_influence(name, value);
        }
        for name in self.influences.keys() {
            if !frame.contains_key(name) {
                rig.set_influence(name, 0.0);
            }
        }
        self.influences = frame;
    }

    /// End-of-speech cleanup; idempotent across the racing end paths
    /// (timeline end, ended event, safety timeout).
    fn begin_rest_transition(&mut self) {
        if self.state != EngineState::Speaking {
            return;
        }
        debug!(elapsed_s = self.elapsed_s, "speech ended, easing to rest");
        self.timeline = None;
        self.history.clear();
        self.micro_expression_s = None;
        self.snapshot = self.influences.clone();
        self.transition_elapsed_s = 0.0;
        self.state = EngineState::TransitioningToRest;
    }
}

/// Combine influences targeting the same shape by keeping the larger.
fn accumulate(frame: &mut HashMap<String, f32>, name: &str, value: f32) {
    let slot = frame.entry(name.to_owned()).or_insert(0.0);
    if value > *slot {
        *slot = value;
    }
}

/// Resting-face target for a shape at the end of the rest transition.
fn rest_target(name: &str) -> f32 {
    match name {
        "mouthClose" => 0.2,
        "viseme_sil" => 0.15,
        "mouthRollLower" => 0.1,
        _ => 0.0,
    }
}
