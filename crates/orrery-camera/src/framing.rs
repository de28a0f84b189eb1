//! One-time establishing shot
//!
//! On the first load at the root route the camera jumps far out above the
//! system and glides in to the home pose. It plays once per session; only an
//! explicit `reset` arms it again.

use std::time::Duration;

use glam::Vec3;
use tracing::info;

use crate::anchor::BodyAnchor;
use crate::config::FramingConfig;
use crate::rig::CameraRigState;
use crate::tween::Tween;

#[derive(Debug, Clone, Default)]
pub struct InitialFraming {
    played: bool,
    tween: Option<Tween>,
    home_target: Vec3,
}

impl InitialFraming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_played(&self) -> bool {
        self.played
    }

    pub fn is_playing(&self) -> bool {
        self.tween.is_some()
    }

    /// Jump to the establishing pose and start the glide home.
    ///
    /// No-op (returns false) if the shot already played or no rig is mounted.
    /// `star` becomes the followed anchor without enabling following.
    pub fn start(
        &mut self,
        rigs: &mut CameraRigState,
        star: Option<BodyAnchor>,
        config: &FramingConfig,
    ) -> bool {
        if self.played {
            return false;
        }
        let Some(rig) = rigs.primary_mut() else {
            return false;
        };

        rig.set_position(config.establishing_position);
        rig.set_target(config.home_target);
        rig.update();

        self.home_target = config.home_target;
        self.tween = Some(Tween::new(
            config.establishing_position,
            config.home_position,
            config.duration(),
            config.ease,
        ));
        self.played = true;

        if let Some(star) = star {
            rigs.followed = Some(star);
        }

        info!(
            "Initial framing: {:?} -> {:?} over {:?}",
            config.establishing_position,
            config.home_position,
            config.duration()
        );
        true
    }

    /// Advance the glide. Returns true on the frame it finishes.
    pub fn step(&mut self, rigs: &mut CameraRigState, dt: Duration) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };

        let position = tween.tick(dt);
        if let Some(rig) = rigs.primary_mut() {
            rig.set_position(position);
            rig.set_target(self.home_target);
            rig.update();
        }

        if tween.is_complete() {
            self.tween = None;
            return true;
        }
        false
    }

    /// Stop the glide where it is. Returns whether it was playing.
    pub fn cancel(&mut self) -> bool {
        self.tween.take().is_some()
    }

    /// Allow the shot to play again
    pub fn reset(&mut self) {
        self.played = false;
        self.tween = None;
    }
}
