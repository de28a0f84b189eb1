//! Eased interpolation sampled once per frame
//!
//! A `Tween` is a plain value: the frame loop calls `tick(dt)` and writes the
//! returned position into the rig. No callbacks, no shared ownership of the
//! value being animated, and progress depends only on wall-clock `dt`.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Easing curve. The `Power4*` family is the quintic curve (exponent 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    CubicOut,
    Power4In,
    /// Decelerating; used for the establishing shot
    Power4Out,
    /// Accelerate then decelerate; used for focus transitions
    #[default]
    Power4InOut,
}

impl Ease {
    /// Map linear progress `t` in [0, 1] to eased progress in [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::Power4In => t.powi(5),
            Ease::Power4Out => 1.0 - (1.0 - t).powi(5),
            Ease::Power4InOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
        }
    }
}

/// Eased move of a 3D point over a fixed wall-clock duration
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Vec3,
    to: Vec3,
    elapsed: Duration,
    duration: Duration,
    ease: Ease,
}

impl Tween {
    pub fn new(from: Vec3, to: Vec3, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            ease,
        }
    }

    pub fn from(&self) -> Vec3 {
        self.from
    }

    pub fn to(&self) -> Vec3 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance by `dt` and return the new sample
    pub fn tick(&mut self, dt: Duration) -> Vec3 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    /// Current sample without advancing
    pub fn value(&self) -> Vec3 {
        if self.is_complete() {
            return self.to;
        }
        self.from.lerp(self.to, self.ease.apply(self.progress()))
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Shift both endpoints, keeping progress (re-bases the tween onto a moving frame)
    pub fn translate(&mut self, delta: Vec3) {
        self.from += delta;
        self.to += delta;
    }

    pub fn complete_immediately(&mut self) {
        self.elapsed = self.duration;
    }
}
