//! Coordinate utilities
//!
//! Pure functions: true body radius from a scene node, and the preferred
//! approach direction for a body relative to the system center.

use glam::Vec3;

use crate::anchor::SceneNode;
use crate::config::OffsetConfig;

/// Body radius in render-space units.
///
/// Geometry bounding-sphere radius times the average of the three axis scales,
/// so the result stays correct when a non-uniform scale approximates a uniform one.
/// Zero, negative, or undefined radii clamp to `min_radius`.
pub fn bounding_radius(node: &dyn SceneNode, min_radius: f32) -> f32 {
    let scale = node.scale();
    let avg_scale = ((scale.x + scale.y + scale.z) / 3.0).abs();
    let radius = node.geometry_radius().unwrap_or(0.0) * avg_scale;

    if radius.is_finite() && radius > min_radius {
        radius
    } else {
        min_radius
    }
}

/// Unit direction from which the camera approaches a non-central body.
///
/// Biased toward the star-facing side and slightly above the orbital plane,
/// giving a consistent three-quarter view wherever the body is on its orbit.
pub fn viewing_offset_direction(
    body_position: Vec3,
    system_center: Vec3,
    offset: &OffsetConfig,
) -> Vec3 {
    let up = offset.world_up.normalize_or_zero();
    let to_center = (system_center - body_position).normalize_or_zero();
    let side = to_center.cross(up).normalize_or_zero();
    let up_ortho = side.cross(to_center).normalize_or_zero();

    let direction =
        (to_center + side * offset.side_amount + up_ortho * offset.up_amount).normalize_or_zero();

    // Body sitting on the system center: no "toward center" direction exists
    if direction == Vec3::ZERO {
        return if up == Vec3::ZERO { Vec3::Z } else { up };
    }
    direction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::ManualNode;

    #[test]
    fn test_bounding_radius_uses_average_scale() {
        let node = ManualNode::new(Vec3::ZERO, 2.0).with_scale(Vec3::new(1.0, 2.0, 3.0));
        assert!((bounding_radius(&node, 1e-4) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_geometry_clamps() {
        let missing = ManualNode::new(Vec3::ZERO, 1.0).with_geometry_radius(None);
        let zero = ManualNode::new(Vec3::ZERO, 0.0);
        let nan = ManualNode::new(Vec3::ZERO, f32::NAN);
        let flat = ManualNode::new(Vec3::ZERO, 3.0).with_scale(Vec3::ZERO);

        for node in [missing, zero, nan, flat] {
            assert_eq!(bounding_radius(&node, 0.01), 0.01);
        }
    }

    #[test]
    fn test_offset_direction_for_planet_on_x_axis() {
        let dir = viewing_offset_direction(
            Vec3::new(1000.0, 0.0, 0.0),
            Vec3::ZERO,
            &OffsetConfig::default(),
        );
        let expected = Vec3::new(-1.0, 0.8, 0.2).normalize();

        assert!((dir - expected).length() < 1e-6, "got {dir:?}");
    }

    #[test]
    fn test_offset_direction_is_unit_and_faces_star() {
        let offset = OffsetConfig::default();
        for body in [
            Vec3::new(0.0, 250.0, 0.0),
            Vec3::new(-40.0, -40.0, 3.0),
            Vec3::new(7000.0, 12.0, -50.0),
        ] {
            let dir = viewing_offset_direction(body, Vec3::ZERO, &offset);
            assert!((dir.length() - 1.0).abs() < 1e-5);
            // Camera sits between the body and the star
            assert!(dir.dot(-body) > 0.0);
            // Slightly above the orbital plane
            assert!(dir.z > 0.0);
        }
    }

    #[test]
    fn test_offset_direction_at_center_falls_back_to_up() {
        let dir = viewing_offset_direction(Vec3::ZERO, Vec3::ZERO, &OffsetConfig::default());
        assert_eq!(dir, Vec3::Z);
    }
}
