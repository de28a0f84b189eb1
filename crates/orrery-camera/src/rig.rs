//! Camera rigs and the shared rig state
//!
//! The primary rig is authoritative: it owns camera position, look-at target,
//! and zoom limits. The secondary rig only ever receives a mirrored copy of the
//! primary target (see `sync::mirror_step`); its one contribution is user zoom,
//! which it hands back as a dolly factor.
//!
//! # Usage
//! ```ignore
//! let mut rigs = CameraRigState::new();
//! rigs.mount_primary(Box::new(OrbitRig::from_config(&config.rig, eye, Vec3::ZERO)));
//! rigs.mount_secondary(Box::new(TrackballRig::from_config(&config.rig)));
//! ```

use glam::{Quat, Vec3};

use crate::anchor::BodyAnchor;
use crate::config::RigConfig;
use crate::focus::FocusRequest;

/// Closest the orbit rig may pitch toward the up axis (radians)
const POLE_MARGIN: f32 = 0.05;

/// Camera position plus look-at target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Vector from target to camera
    pub fn offset(&self) -> Vec3 {
        self.position - self.target
    }

    pub fn distance(&self) -> f32 {
        self.offset().length()
    }
}

// =============================================================================
// RIG TRAITS
// =============================================================================

/// Authoritative camera controller
pub trait PrimaryRig {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    fn min_distance(&self) -> f32;
    fn set_min_distance(&mut self, distance: f32);

    /// Re-derive internal state after position/target writes
    fn update(&mut self);

    fn pose(&self) -> CameraPose {
        CameraPose::new(self.position(), self.target())
    }

    /// Orbit around the target from drag input. Rigs without rotation ignore it.
    fn rotate(&mut self, _yaw_input: f32, _pitch_input: f32) {}

    /// Scale the camera-to-target distance (clamped on the next `update`)
    fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            let pose = self.pose();
            self.set_position(pose.target + pose.offset() * factor);
        }
    }
}

/// Subordinate controller that mirrors the primary target
pub trait SecondaryRig {
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    fn update(&mut self);

    /// Queue a user zoom impulse (positive zooms in)
    fn zoom(&mut self, _delta: f32) {}

    /// Distance multiplier requested by user zoom since the last call (1.0 = none)
    fn take_dolly(&mut self) -> f32 {
        1.0
    }
}

// =============================================================================
// ORBIT RIG
// =============================================================================

/// Orbit controller: rotates around its target, distance clamped to zoom limits
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    rotate_speed: f32,
}

impl OrbitRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self::from_config(&RigConfig::default(), position, target)
    }

    pub fn from_config(config: &RigConfig, position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Z,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            rotate_speed: config.rotate_speed,
        }
    }

    /// Axis the rig yaws around (defaults to +Z, the orbital-plane normal)
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up.normalize_or_zero();
        if self.up == Vec3::ZERO {
            self.up = Vec3::Z;
        }
        self
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

impl PrimaryRig for OrbitRig {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn min_distance(&self) -> f32 {
        self.min_distance
    }

    fn set_min_distance(&mut self, distance: f32) {
        self.min_distance = distance;
    }

    fn update(&mut self) {
        let offset = self.position - self.target;
        let distance = offset.length();
        let clamped = distance.clamp(self.min_distance, self.max_distance.max(self.min_distance));

        if distance <= f32::EPSILON {
            self.position = self.target + self.up * clamped;
        } else if clamped != distance {
            self.position = self.target + offset * (clamped / distance);
        }
    }

    /// Pitch stops short of the poles so the view never flips.
    fn rotate(&mut self, yaw_input: f32, pitch_input: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }

        let yaw = Quat::from_axis_angle(self.up, -yaw_input * self.rotate_speed);
        let mut offset = yaw * offset;

        let polar = (offset / distance).dot(self.up).clamp(-1.0, 1.0).acos();
        let new_polar = (polar - pitch_input * self.rotate_speed)
            .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
        // Positive rotation about `offset x up` tilts the offset toward `up`
        let side = offset.cross(self.up).normalize_or_zero();
        if side != Vec3::ZERO {
            offset = Quat::from_axis_angle(side, polar - new_polar) * offset;
        }

        self.position = self.target + offset;
    }
}

// =============================================================================
// TRACKBALL RIG
// =============================================================================

/// Secondary controller: no pan, no rotate; damped zoom only
#[derive(Debug, Clone, PartialEq)]
pub struct TrackballRig {
    target: Vec3,
    zoom_speed: f32,
    damping: f32,
    /// Zoom still to be applied; decays by `damping` each update
    zoom_remaining: f32,
    pending_dolly: f32,
}

impl Default for TrackballRig {
    fn default() -> Self {
        Self::from_config(&RigConfig::default())
    }
}

impl TrackballRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RigConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            zoom_speed: config.zoom_speed,
            damping: config.zoom_damping,
            zoom_remaining: 0.0,
            pending_dolly: 1.0,
        }
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom_remaining.abs() > 1e-6
    }
}

impl SecondaryRig for TrackballRig {
    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn update(&mut self) {
        if !self.is_zooming() {
            self.zoom_remaining = 0.0;
            return;
        }

        let factor = 1.0 - self.zoom_remaining * self.zoom_speed;
        if factor > 0.0 {
            self.pending_dolly *= factor;
        }
        self.zoom_remaining *= 1.0 - self.damping;
    }

    fn zoom(&mut self, delta: f32) {
        self.zoom_remaining += delta;
    }

    fn take_dolly(&mut self) -> f32 {
        std::mem::replace(&mut self.pending_dolly, 1.0)
    }
}

// =============================================================================
// RIG STATE
// =============================================================================

/// Per-session camera state shared by the focus controller and the frame loop.
///
/// `followed` + `following == true` means the camera position is a pure
/// function of the anchor's live position plus the camera-relative offset.
#[derive(Default)]
pub struct CameraRigState {
    primary: Option<Box<dyn PrimaryRig>>,
    secondary: Option<Box<dyn SecondaryRig>>,
    /// Body the camera rigidly follows; `None` means free camera
    pub followed: Option<BodyAnchor>,
    /// Gate for the follow step, forced off during transitions
    pub following: bool,
    /// Latest focus request seen
    pub focus_request: Option<FocusRequest>,
}

impl CameraRigState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount_primary(&mut self, rig: Box<dyn PrimaryRig>) {
        self.primary = Some(rig);
    }

    pub fn mount_secondary(&mut self, rig: Box<dyn SecondaryRig>) {
        self.secondary = Some(rig);
    }

    pub fn unmount_primary(&mut self) -> Option<Box<dyn PrimaryRig>> {
        self.primary.take()
    }

    pub fn unmount_secondary(&mut self) -> Option<Box<dyn SecondaryRig>> {
        self.secondary.take()
    }

    pub fn primary(&self) -> Option<&dyn PrimaryRig> {
        self.primary.as_deref()
    }

    pub fn primary_mut(&mut self) -> Option<&mut (dyn PrimaryRig + 'static)> {
        self.primary.as_deref_mut()
    }

    pub fn secondary(&self) -> Option<&dyn SecondaryRig> {
        self.secondary.as_deref()
    }

    pub fn secondary_mut(&mut self) -> Option<&mut (dyn SecondaryRig + 'static)> {
        self.secondary.as_deref_mut()
    }

    /// Current primary pose, if the rig is mounted
    pub fn pose(&self) -> Option<CameraPose> {
        self.primary().map(|rig| rig.pose())
    }

    /// Whether the follow step will move the camera this frame
    pub fn is_following(&self) -> bool {
        self.following && self.followed.is_some()
    }

    pub fn follow(&mut self, anchor: BodyAnchor) {
        self.followed = Some(anchor);
        self.following = true;
    }

    pub fn suspend_following(&mut self) {
        self.following = false;
    }

    /// Id of the followed body, if any
    pub fn followed_id(&self) -> Option<&crate::anchor::BodyId> {
        self.followed.as_ref().map(|anchor| anchor.id())
    }
}

impl std::fmt::Debug for CameraRigState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRigState")
            .field("pose", &self.pose())
            .field("secondary_mounted", &self.secondary.is_some())
            .field("followed", &self.followed_id())
            .field("following", &self.following)
            .field("focus_request", &self.focus_request)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_update_clamps_distance() {
        let mut rig = OrbitRig::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO);
        rig.set_min_distance(10.0);
        rig.update();
        assert!((rig.distance() - 10.0).abs() < 1e-4);
        assert!(rig.position().z > 0.0);

        rig.max_distance = 20.0;
        rig.set_position(Vec3::new(100.0, 0.0, 0.0));
        rig.update();
        assert!((rig.position() - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_orbit_update_degenerate_position() {
        let mut rig = OrbitRig::new(Vec3::ONE, Vec3::ONE);
        rig.set_min_distance(2.0);
        rig.update();
        assert_eq!(rig.position(), Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_rotate_preserves_distance() {
        let mut rig = OrbitRig::new(Vec3::new(50.0, 0.0, 10.0), Vec3::new(5.0, 5.0, 0.0));
        let before = rig.distance();

        rig.rotate(40.0, -25.0);
        assert!((rig.distance() - before).abs() < 1e-3);
        assert_eq!(rig.target(), Vec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_rotate_stops_short_of_pole() {
        let mut rig = OrbitRig::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        // Far more pitch than needed to reach straight overhead
        rig.rotate(0.0, 10_000.0);

        let dir = rig.position().normalize();
        assert!(dir.dot(Vec3::Z) < 1.0 - 1e-4);
        assert!(dir.dot(Vec3::Z) > 0.99);
    }

    #[test]
    fn test_trackball_zoom_glides_and_decays() {
        let mut rig = TrackballRig::new();
        rig.zoom(0.1);

        rig.update();
        let first = rig.take_dolly();
        assert!(first < 1.0);
        assert_eq!(rig.take_dolly(), 1.0);

        for _ in 0..1000 {
            rig.update();
        }
        rig.take_dolly();
        assert!(!rig.is_zooming());
    }

    #[test]
    fn test_rig_state_follow_gate() {
        use crate::anchor::{BodyAnchor, BodyKind, ManualNode};
        use std::rc::Rc;

        let mut rigs = CameraRigState::new();
        assert!(rigs.pose().is_none());
        assert!(!rigs.is_following());

        rigs.following = true;
        assert!(!rigs.is_following(), "no anchor yet");

        let anchor = BodyAnchor::new(
            "earth",
            BodyKind::Planet,
            Rc::new(ManualNode::new(Vec3::X, 1.0)),
        );
        rigs.follow(anchor);
        assert!(rigs.is_following());

        rigs.suspend_following();
        assert!(!rigs.is_following());
        assert_eq!(rigs.followed_id().map(|id| id.as_str()), Some("earth"));
    }
}
