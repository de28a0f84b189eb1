//! Focus transitions
//!
//! A focus request moves the camera from wherever it is now to a framing pose
//! around the selected body, then hands the camera to the follow step once a
//! wall-clock delay has passed. Only the newest request matters: each accepted
//! request bumps the `Generation`, which both replaces the in-flight tweens and
//! invalidates every task the older requests scheduled.
//!
//! # Lifecycle
//! ```text
//! Idle ──request_focus──▶ Transitioning ──tweens done──▶ Idle
//!                               │
//!                               └─ re-arm task (0 ms or 2.5 s) ─▶ following on
//! ```

use std::time::Duration;

use glam::Vec3;
use tracing::{debug, info};

use crate::anchor::{BodyAnchor, BodyId};
use crate::config::{CameraConfig, FocusConfig};
use crate::coords::viewing_offset_direction;
use crate::error::{FocusFault, FocusResult};
use crate::rig::{CameraPose, CameraRigState};
use crate::schedule::{Generation, TaskQueue};
use crate::tween::Tween;

// =============================================================================
// REQUESTS
// =============================================================================

/// Where a focus request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOrigin {
    /// The route named a body when the camera mounted
    Route,
    /// Explicit user selection
    Selection,
}

/// A request to focus a body.
///
/// `nonce` differs for every request, so selecting the same body twice is two
/// distinct requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub body: BodyId,
    pub nonce: u64,
    pub origin: FocusOrigin,
}

/// Issues focus requests with increasing nonces
#[derive(Debug, Default)]
pub struct FocusTrigger {
    counter: u64,
}

impl FocusTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self, body: impl Into<BodyId>, origin: FocusOrigin) -> FocusRequest {
        self.counter += 1;
        FocusRequest {
            body: body.into(),
            nonce: self.counter,
            origin,
        }
    }

    /// Number of requests issued so far
    pub fn count(&self) -> u64 {
        self.counter
    }
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Simulation time-scale readout (1.0 = real time)
pub trait TimeScaleSource {
    fn time_scale(&self) -> f64;
}

impl TimeScaleSource for f64 {
    fn time_scale(&self) -> f64 {
        *self
    }
}

/// Navigation side effect: reflect the focused body in the browsable route
pub trait RouteWriter {
    fn show_body(&mut self, body: &BodyId);
}

impl RouteWriter for Vec<BodyId> {
    fn show_body(&mut self, body: &BodyId) {
        self.push(body.clone());
    }
}

/// Route writer for hosts without navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoutes;

impl RouteWriter for NoRoutes {
    fn show_body(&mut self, _body: &BodyId) {}
}

// =============================================================================
// POSE MATH
// =============================================================================

/// Framing pose for `anchor` at its current position.
///
/// The star gets a fixed offset; every other body is viewed from the
/// star-facing side at `distance_multiplier` body radii.
pub fn destination_pose(anchor: &BodyAnchor, config: &CameraConfig) -> CameraPose {
    let body_position = anchor.world_position();

    let offset = if anchor.is_star() {
        config.focus.star_offset
    } else {
        let radius = anchor.bounding_radius(config.offset.min_body_radius);
        let direction =
            viewing_offset_direction(body_position, config.offset.system_center, &config.offset);
        direction * radius * config.focus.distance_multiplier
    };

    CameraPose::new(body_position + offset, body_position)
}

/// Closest the user may zoom to a body of `radius`
pub fn min_zoom_distance(radius: f32, focus: &FocusConfig) -> f32 {
    (radius * focus.radius_multiplier).max(focus.floor_distance)
}

/// Delay before following re-arms.
///
/// At accelerated time the body would leave the frame before the tween ends,
/// so following must take over immediately.
pub fn rearm_delay(time_scale: f64, focus: &FocusConfig) -> Duration {
    if time_scale.abs() > focus.fast_time_threshold {
        Duration::ZERO
    } else {
        focus.rearm_delay()
    }
}

// =============================================================================
// TRANSITION
// =============================================================================

/// Deferred work scheduled by an accepted request
#[derive(Debug, Clone)]
pub enum FocusTask {
    /// Hand the camera to the follow step
    RearmFollow(BodyAnchor),
    /// Reveal the rest of the system around the focused body
    Spotlight(BodyId),
}

/// In-flight animated move toward a body
#[derive(Debug, Clone)]
pub struct FocusTransition {
    generation: Generation,
    body: BodyId,
    origin: CameraPose,
    /// Anchor position the tween endpoints are currently expressed against
    reference: Vec3,
    position: Tween,
    target: Tween,
}

impl FocusTransition {
    fn new(
        generation: Generation,
        body: BodyId,
        origin: CameraPose,
        destination: CameraPose,
        focus: &FocusConfig,
    ) -> Self {
        Self {
            generation,
            body,
            origin,
            reference: destination.target,
            position: Tween::new(
                origin.position,
                destination.position,
                focus.position_duration(),
                focus.ease,
            ),
            target: Tween::new(
                origin.target,
                destination.target,
                focus.target_duration(),
                focus.ease,
            ),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn body(&self) -> &BodyId {
        &self.body
    }

    /// Pose the camera had when the request was accepted
    pub fn origin(&self) -> CameraPose {
        self.origin
    }

    /// Pose the tweens are heading to
    pub fn destination(&self) -> CameraPose {
        CameraPose::new(self.position.to(), self.target.to())
    }

    /// Advance both tweens by `dt`
    pub fn sample(&mut self, dt: Duration) -> CameraPose {
        CameraPose::new(self.position.tick(dt), self.target.tick(dt))
    }

    pub fn current(&self) -> CameraPose {
        CameraPose::new(self.position.value(), self.target.value())
    }

    pub fn is_complete(&self) -> bool {
        self.position.is_complete() && self.target.is_complete()
    }

    /// Move both tweens with the body so the transition lands on its live position
    pub fn rebase(&mut self, anchor_position: Vec3) {
        let delta = anchor_position - self.reference;
        if delta != Vec3::ZERO {
            self.position.translate(delta);
            self.target.translate(delta);
            self.reference = anchor_position;
        }
    }
}

/// Outcome of an accepted focus request
#[derive(Debug, Clone, PartialEq)]
pub struct FocusStarted {
    pub generation: Generation,
    /// Generation of the transition this one replaced mid-flight
    pub superseded: Option<Generation>,
    pub destination: CameraPose,
    pub rearm_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPhase {
    Idle,
    Transitioning,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns the active transition and the tasks it scheduled
#[derive(Debug, Default)]
pub struct FocusController {
    generation: Generation,
    active: Option<FocusTransition>,
    tasks: TaskQueue<FocusTask>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FocusPhase {
        if self.active.is_some() {
            FocusPhase::Transitioning
        } else {
            FocusPhase::Idle
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn active(&self) -> Option<&FocusTransition> {
        self.active.as_ref()
    }

    /// Wall clock driving the scheduled tasks
    pub fn now(&self) -> Duration {
        self.tasks.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Begin a transition onto `anchor`.
    ///
    /// Zoom limit, follow suspension, both tweens and the re-arm task are all
    /// set up here; the rig itself only moves when the frame loop samples.
    pub fn request_focus(
        &mut self,
        rigs: &mut CameraRigState,
        anchor: BodyAnchor,
        time_scale: f64,
        config: &CameraConfig,
    ) -> FocusResult<FocusStarted> {
        let rig = rigs.primary_mut().ok_or(FocusFault::RigNotMounted)?;

        let radius = anchor.bounding_radius(config.offset.min_body_radius);
        rig.set_min_distance(min_zoom_distance(radius, &config.focus));
        let origin = rig.pose();

        rigs.suspend_following();

        let destination = destination_pose(&anchor, config);
        let superseded = self.active.take().map(|previous| {
            debug!(
                "Superseding {} transition to {}",
                previous.generation, previous.body
            );
            previous.generation
        });

        self.generation = self.generation.next();
        let generation = self.generation;
        let delay = rearm_delay(time_scale, &config.focus);

        self.tasks
            .schedule(delay, generation, FocusTask::RearmFollow(anchor.clone()));
        self.tasks.schedule(
            config.focus.spotlight_delay(),
            generation,
            FocusTask::Spotlight(anchor.id().clone()),
        );

        info!(
            "Focusing {} ({}): distance {:.4}, re-arm in {:?}",
            anchor.id(),
            generation,
            destination.distance(),
            delay
        );

        self.active = Some(FocusTransition::new(
            generation,
            anchor.id().clone(),
            origin,
            destination,
            &config.focus,
        ));

        Ok(FocusStarted {
            generation,
            superseded,
            destination,
            rearm_delay: delay,
        })
    }

    /// Drop the active transition and retire its scheduled tasks.
    ///
    /// Returns the generation of the dropped transition, if one was running.
    /// The generation only advances when there is something to retire.
    pub fn cancel(&mut self) -> Option<Generation> {
        let dropped = self.active.take().map(|transition| transition.generation);
        if dropped.is_some() || !self.tasks.is_empty() {
            self.generation = self.generation.next();
            debug!("Focus cancelled, now at {}", self.generation);
        }
        dropped
    }

    pub fn advance_clock(&mut self, dt: Duration) {
        self.tasks.advance(dt);
    }

    /// Tasks of the current generation that have come due
    pub fn take_due_tasks(&mut self) -> Vec<FocusTask> {
        self.tasks.take_due(self.generation)
    }

    /// Sample the active transition into the primary rig.
    ///
    /// Returns the finished transition on the frame its tweens complete. While
    /// following is already re-armed onto the transition's body, the tweens
    /// ride along with the body.
    pub fn step_transition(
        &mut self,
        rigs: &mut CameraRigState,
        dt: Duration,
    ) -> Option<FocusTransition> {
        let transition = self.active.as_mut()?;

        if rigs.is_following() {
            if let Some(anchor) = rigs
                .followed
                .as_ref()
                .filter(|anchor| anchor.id() == transition.body())
            {
                transition.rebase(anchor.world_position());
            }
        }

        let pose = transition.sample(dt);
        if let Some(rig) = rigs.primary_mut() {
            rig.set_position(pose.position);
            rig.set_target(pose.target);
            rig.update();
        }

        if transition.is_complete() {
            debug!("Transition {} to {} complete", transition.generation, transition.body);
            return self.active.take();
        }
        None
    }
}
