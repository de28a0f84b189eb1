//! Property tests for radius, offset direction and follow preservation

use std::rc::Rc;

use orrery_camera::coords::{bounding_radius, viewing_offset_direction};
use orrery_camera::config::OffsetConfig;
use orrery_camera::sync::follow_step;
use orrery_camera::{BodyAnchor, BodyKind, CameraRigState, ManualNode, OrbitRig, Vec3};
use proptest::prelude::*;

const MIN_RADIUS: f32 = 1e-4;

fn orbit_position(radius: f32, angle: f32, height: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), radius * angle.sin(), height)
}

proptest! {
    #[test]
    fn test_bounding_radius_always_positive(
        geometry in -1000.0f32..1000.0,
        sx in -50.0f32..50.0,
        sy in -50.0f32..50.0,
        sz in -50.0f32..50.0,
    ) {
        let node = ManualNode::new(Vec3::ZERO, geometry).with_scale(Vec3::new(sx, sy, sz));
        let radius = bounding_radius(&node, MIN_RADIUS);
        prop_assert!(radius > 0.0);
        prop_assert!(radius.is_finite());
    }

    #[test]
    fn test_bounding_radius_scale_invariant(
        geometry in 0.01f32..500.0,
        k in 0.05f32..50.0,
    ) {
        let unscaled = ManualNode::new(Vec3::ZERO, geometry);
        // Geometry scaled up by k, displayed size scaled down by k
        let rescaled = ManualNode::new(Vec3::ZERO, geometry * k).with_scale(Vec3::splat(1.0 / k));

        let a = bounding_radius(&unscaled, MIN_RADIUS);
        let b = bounding_radius(&rescaled, MIN_RADIUS);
        prop_assert!((a - b).abs() <= a * 1e-4, "{} vs {}", a, b);
    }

    #[test]
    fn test_offset_direction_is_unit(
        orbit in 1.0f32..50_000.0,
        angle in 0.0f32..std::f32::consts::TAU,
        height in -100.0f32..100.0,
    ) {
        let body = orbit_position(orbit, angle, height.clamp(-orbit * 0.5, orbit * 0.5));
        let dir = viewing_offset_direction(body, Vec3::ZERO, &OffsetConfig::default());
        prop_assert!((dir.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_direction_is_continuous(
        orbit in 10.0f32..50_000.0,
        angle in 0.0f32..std::f32::consts::TAU,
    ) {
        let step = 1e-3;
        let config = OffsetConfig::default();
        let a = viewing_offset_direction(orbit_position(orbit, angle, 0.0), Vec3::ZERO, &config);
        let b = viewing_offset_direction(orbit_position(orbit, angle + step, 0.0), Vec3::ZERO, &config);
        prop_assert!((a - b).length() < 0.01, "jump of {} at angle {}", (a - b).length(), angle);
    }

    #[test]
    fn test_follow_translates_camera_by_anchor_displacement(
        start in (-2000.0f32..2000.0, -2000.0f32..2000.0, -200.0f32..200.0),
        offset in (-500.0f32..500.0, -500.0f32..500.0, -500.0f32..500.0),
        steps in prop::collection::vec((-50.0f32..50.0, -50.0f32..50.0, -5.0f32..5.0), 1..40),
    ) {
        let start = Vec3::new(start.0, start.1, start.2);
        let offset = Vec3::new(offset.0, offset.1, offset.2);
        prop_assume!(offset.length() > 50.0);

        let node = Rc::new(ManualNode::new(start, 1.0));
        let mut rigs = CameraRigState::new();
        rigs.mount_primary(Box::new(OrbitRig::new(start + offset, start)));
        rigs.follow(BodyAnchor::new("body", BodyKind::Planet, node.clone()));

        let mut total = Vec3::ZERO;
        for (dx, dy, dz) in steps {
            let delta = Vec3::new(dx, dy, dz);
            node.translate(delta);
            total += delta;
            follow_step(&mut rigs);
        }

        let rig = rigs.primary().unwrap();
        let moved = rig.position() - (start + offset);
        prop_assert!((moved - total).length() < 0.05, "moved {:?}, anchor moved {:?}", moved, total);

        let final_offset = rig.position() - rig.target();
        prop_assert!((final_offset.length() - offset.length()).abs() < 0.05);
        prop_assert!(final_offset.normalize().dot(offset.normalize()) > 1.0 - 1e-4);
    }
}
