//! Idle eye behavior: blinks and saccades.
//!
//! Runs independently of the speech state machine and writes only eye
//! shapes, so the face keeps living while the mouth is resting.

use crate::config::IdleConfig;
use crate::rig::BlendShapeRig;
use rand::Rng;
use rand::rngs::SmallRng;

/// Blink timer + saccade generator with its own smoothing.
#[derive(Debug)]
pub struct EyeIdle {
    config: IdleConfig,
    /// Seconds until the next blink starts.
    next_blink_s: f32,
    /// Elapsed time within the current blink, when one is running.
    blink_elapsed_s: Option<f32>,
    /// Seconds until the next saccade target is picked.
    next_saccade_s: f32,
    /// Current smoothed eye-look offset (x right, y up).
    look: (f32, f32),
    /// Saccade target the look is easing toward.
    target: (f32, f32),
}

impl EyeIdle {
    /// Create an idle generator; the first blink/saccade fire after the
    /// minimum intervals.
    pub fn new(config: IdleConfig) -> Self {
        Self {
            next_blink_s: config.blink_interval_min_s,
            blink_elapsed_s: None,
            next_saccade_s: config.saccade_interval_min_s,
            look: (0.0, 0.0),
            target: (0.0, 0.0),
            config,
        }
    }

    /// Advance timers by `dt_s` and write eye shapes to the rig.
    pub fn update(&mut self, dt_s: f32, rng: &mut SmallRng, rig: &mut dyn BlendShapeRig) {
        self.update_blink(dt_s, rng, rig);
        self.update_saccade(dt_s, rng, rig);
    }

    fn update_blink(&mut self, dt_s: f32, rng: &mut SmallRng, rig: &mut dyn BlendShapeRig) {
        let amount = match self.blink_elapsed_s {
            Some(elapsed) => {
                let elapsed = elapsed + dt_s;
                if elapsed >= self.config.blink_duration_s {
                    self.blink_elapsed_s = None;
                    self.next_blink_s = rng
                        .gen_range(self.config.blink_interval_min_s..self.config.blink_interval_max_s);
                    0.0
                } else {
                    self.blink_elapsed_s = Some(elapsed);
                    // Half-sine: closed at the midpoint of the blink.
                    (std::f32::consts::PI * elapsed / self.config.blink_duration_s).sin()
                }
            }
            None => {
                self.next_blink_s -= dt_s;
                if self.next_blink_s <= 0.0 {
                    self.blink_elapsed_s = Some(0.0);
                }
                0.0
            }
        };

        rig.set_influence("eyeBlinkLeft", amount);
        rig.set_influence("eyeBlinkRight", amount);
    }

    fn update_saccade(&mut self, dt_s: f32, rng: &mut SmallRng, rig: &mut dyn BlendShapeRig) {
        self.next_saccade_s -= dt_s;
        if self.next_saccade_s <= 0.0 {
            let amp = self.config.saccade_amplitude;
            self.target = (rng.gen_range(-amp..amp), rng.gen_range(-amp..amp));
            self.next_saccade_s = rng
                .gen_range(self.config.saccade_interval_min_s..self.config.saccade_interval_max_s);
        }

        // Exponential approach toward the saccade target.
        let k = 1.0 - (-self.config.saccade_smoothing * dt_s).exp();
        self.look.0 += (self.target.0 - self.look.0) * k;
        self.look.1 += (self.target.1 - self.look.1) * k;

        let (x, y) = self.look;
        rig.set_influence("eyeLookInLeft", x.max(0.0));
        rig.set_influence("eyeLookOutRight", x.max(0.0));
        rig.set_influence("eyeLookOutLeft", (-x).max(0.0));
        rig.set_influence("eyeLookInRight", (-x).max(0.0));
        rig.set_influence("eyeLookUpLeft", y.max(0.0));
        rig.set_influence("eyeLookUpRight", y.max(0.0));
        rig.set_influence("eyeLookDownLeft", (-y).max(0.0));
        rig.set_influence("eyeLookDownRight", (-y).max(0.0));
    }
}
