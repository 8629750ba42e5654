//! Blend-shape rig abstraction.
//!
//! The playback engine only needs a named float sink: it writes influence
//! values for blend-shape names and never learns how (or whether) the rig
//! renders them. Writes to names the rig does not expose are no-ops, so a
//! model missing a shape degrades the animation instead of failing the
//! utterance.

use std::collections::HashMap;

/// A sink of named blend-shape (morph target) influences.
pub trait BlendShapeRig {
    /// Whether the rig exposes a shape with this name.
    fn has_shape(&self, name: &str) -> bool;

    /// Set a shape's influence. Unknown names are ignored; values are
    /// clamped to `[0, 1]` by the implementation.
    fn set_influence(&mut self, name: &str, value: f32);
}

/// In-memory rig used by tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MorphMap {
    shapes: HashMap<String, f32>,
}

impl MorphMap {
    /// Create a rig exposing the given shape names, all at zero influence.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shapes: names.into_iter().map(|n| (n.into(), 0.0)).collect(),
        }
    }

    /// Create a rig exposing the full shape set the engine can write:
    /// viseme shapes, secondary morphs, jaw, brow, and eye shapes.
    pub fn with_standard_shapes() -> Self {
        Self::new(STANDARD_SHAPES.iter().copied())
    }

    /// Current influence for a shape, if exposed.
    pub fn influence(&self, name: &str) -> Option<f32> {
        self.shapes.get(name).copied()
    }

    /// All exposed shape names.
    pub fn shape_names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }
}

impl BlendShapeRig for MorphMap {
    fn has_shape(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    fn set_influence(&mut self, name: &str, value: f32) {
        if let Some(slot) = self.shapes.get_mut(name) {
            *slot = value.clamp(0.0, 1.0);
        }
    }
}

/// Shape names of a typical ARKit/VRM-style face rig.
pub const STANDARD_SHAPES: &[&str] = &[
    "viseme_sil",
    "viseme_PP",
    "viseme_FF",
    "viseme_TH",
    "viseme_DD",
    "viseme_kk",
    "viseme_CH",
    "viseme_aa",
    "viseme_E",
    "viseme_I",
    "viseme_O",
    "jawOpen",
    "jawLeft",
    "jawRight",
    "mouthClose",
    "mouthFunnel",
    "mouthPucker",
    "mouthPressLeft",
    "mouthPressRight",
    "mouthStretchLeft",
    "mouthStretchRight",
    "mouthLowerDownLeft",
    "mouthLowerDownRight",
    "mouthSmileLeft",
    "mouthSmileRight",
    "mouthRollLower",
    "tongueOut",
    "browInnerUp",
    "eyeBlinkLeft",
    "eyeBlinkRight",
    "eyeLookInLeft",
    "eyeLookInRight",
    "eyeLookOutLeft",
    "eyeLookOutRight",
    "eyeLookUpLeft",
    "eyeLookUpRight",
    "eyeLookDownLeft",
    "eyeLookDownRight",
];
