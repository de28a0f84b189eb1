//! Per-frame rig synchronisation
//!
//! Two steps run every frame, in this order around tween sampling:
//! - `follow_step` keeps the camera rigidly attached to the followed body
//! - `mirror_step` copies the primary target into the secondary rig and folds
//!   the secondary's zoom back into the primary

use glam::Vec3;
use tracing::trace;

use crate::rig::CameraRigState;

/// Move the camera with the followed body.
///
/// The current camera-to-target offset is preserved, so any rotation or zoom
/// the user applied since the last frame survives. Returns the anchor
/// displacement applied, or `None` when following is off or nothing is mounted.
pub fn follow_step(rigs: &mut CameraRigState) -> Option<Vec3> {
    if !rigs.following {
        return None;
    }
    let anchor_position = rigs.followed.as_ref()?.world_position();
    let rig = rigs.primary_mut()?;

    let pose = rig.pose();
    let delta = anchor_position - pose.target;

    rig.set_position(anchor_position + pose.offset());
    rig.set_target(anchor_position);
    rig.update();

    trace!("Follow step moved camera by {:?}", delta);
    Some(delta)
}

/// Mirror the primary target into the secondary rig.
///
/// Returns false when either rig is missing (the step is then a no-op).
pub fn mirror_step(rigs: &mut CameraRigState) -> bool {
    let Some(target) = rigs.primary().map(|rig| rig.target()) else {
        return false;
    };
    let Some(secondary) = rigs.secondary_mut() else {
        return false;
    };

    secondary.set_target(target);
    secondary.update();
    let dolly = secondary.take_dolly();

    if (dolly - 1.0).abs() > f32::EPSILON {
        if let Some(primary) = rigs.primary_mut() {
            primary.dolly(dolly);
            primary.update();
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::anchor::{BodyAnchor, BodyKind, ManualNode};
    use crate::rig::{OrbitRig, PrimaryRig, SecondaryRig, TrackballRig};

    fn rigs_at(position: Vec3, target: Vec3) -> CameraRigState {
        let mut rigs = CameraRigState::new();
        rigs.mount_primary(Box::new(OrbitRig::new(position, target)));
        rigs.mount_secondary(Box::new(TrackballRig::new()));
        rigs
    }

    #[test]
    fn test_follow_preserves_offset() {
        let node = Rc::new(ManualNode::new(Vec3::new(100.0, 0.0, 0.0), 1.0));
        let mut rigs = rigs_at(Vec3::new(95.0, 3.0, 1.0), Vec3::new(100.0, 0.0, 0.0));
        rigs.follow(BodyAnchor::new("earth", BodyKind::Planet, node.clone()));

        node.translate(Vec3::new(0.0, 10.0, 0.0));
        let delta = follow_step(&mut rigs).unwrap();

        assert_eq!(delta, Vec3::new(0.0, 10.0, 0.0));
        let pose = rigs.pose().unwrap();
        assert_eq!(pose.target, Vec3::new(100.0, 10.0, 0.0));
        assert!((pose.position - Vec3::new(95.0, 13.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_follow_noop_when_suspended() {
        let node = Rc::new(ManualNode::new(Vec3::ZERO, 1.0));
        let mut rigs = rigs_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        rigs.follow(BodyAnchor::new("earth", BodyKind::Planet, node.clone()));
        rigs.suspend_following();

        node.translate(Vec3::X);
        assert_eq!(follow_step(&mut rigs), None);
        assert_eq!(rigs.pose().unwrap().target, Vec3::ZERO);
    }

    #[test]
    fn test_mirror_copies_target() {
        let mut rigs = rigs_at(Vec3::new(0.0, 0.0, 10.0), Vec3::new(4.0, 5.0, 6.0));
        assert!(mirror_step(&mut rigs));
        assert_eq!(rigs.secondary().unwrap().target(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_mirror_applies_zoom_to_primary() {
        let mut rigs = rigs_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);
        rigs.secondary_mut().unwrap().zoom(0.2);

        mirror_step(&mut rigs);
        let distance = rigs.pose().unwrap().distance();
        assert!(distance < 100.0, "zoom in should shorten distance, got {distance}");
        assert_eq!(rigs.primary().unwrap().target(), Vec3::ZERO);
    }

    #[test]
    fn test_mirror_without_secondary() {
        let mut rigs = CameraRigState::new();
        rigs.mount_primary(Box::new(OrbitRig::new(Vec3::Z, Vec3::ZERO)));
        assert!(!mirror_step(&mut rigs));
    }
}
