//! Stand-in scene for the headless driver.
//!
//! A star plus a few bodies on circular, slightly inclined orbits. Positions
//! are advanced from simulation time (wall time times the time scale), which
//! is the only thing the camera core ever observes of them.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use orrery_camera::{BodyAnchor, BodyId, BodyKind, BodyResolver, ManualNode, Vec3};

/// Orbit of one demo body (render-space units, simulated seconds)
#[derive(Debug, Clone)]
pub struct OrbitParams {
    pub id: &'static str,
    pub kind: BodyKind,
    pub orbit_radius: f64,
    pub period_secs: f64,
    /// Tilt of the orbital plane, radians
    pub inclination: f64,
    pub phase: f64,
    pub radius: f32,
}

const SOLAR_SYSTEM: &[OrbitParams] = &[
    OrbitParams {
        id: "sun",
        kind: BodyKind::Star,
        orbit_radius: 0.0,
        period_secs: 1.0,
        inclination: 0.0,
        phase: 0.0,
        radius: 5.0,
    },
    OrbitParams {
        id: "mercury",
        kind: BodyKind::Planet,
        orbit_radius: 390.0,
        period_secs: 88.0,
        inclination: 0.122,
        phase: 0.4,
        radius: 0.4,
    },
    OrbitParams {
        id: "venus",
        kind: BodyKind::Planet,
        orbit_radius: 720.0,
        period_secs: 225.0,
        inclination: 0.059,
        phase: 2.1,
        radius: 0.95,
    },
    OrbitParams {
        id: "earth",
        kind: BodyKind::Planet,
        orbit_radius: 1000.0,
        period_secs: 365.0,
        inclination: 0.0,
        phase: 0.0,
        radius: 1.0,
    },
    OrbitParams {
        id: "mars",
        kind: BodyKind::Planet,
        orbit_radius: 1520.0,
        period_secs: 687.0,
        inclination: 0.032,
        phase: 3.9,
        radius: 0.53,
    },
    OrbitParams {
        id: "ceres",
        kind: BodyKind::DwarfPlanet,
        orbit_radius: 2770.0,
        period_secs: 1680.0,
        inclination: 0.185,
        phase: 5.2,
        radius: 0.07,
    },
];

struct DemoBody {
    orbit: OrbitParams,
    node: Rc<ManualNode>,
}

impl DemoBody {
    fn position_at(&self, sim_time: f64) -> Vec3 {
        let orbit = &self.orbit;
        if orbit.orbit_radius == 0.0 {
            return Vec3::ZERO;
        }
        let angle = orbit.phase + TAU * sim_time / orbit.period_secs;
        let (sin, cos) = angle.sin_cos();
        let x = orbit.orbit_radius * cos;
        let y = orbit.orbit_radius * sin * orbit.inclination.cos();
        let z = orbit.orbit_radius * sin * orbit.inclination.sin();
        Vec3::new(x as f32, y as f32, z as f32)
    }
}

/// Demo bodies plus a "still loading" gate on anchor resolution
pub struct DemoScene {
    bodies: Vec<DemoBody>,
    anchors: HashMap<BodyId, BodyAnchor>,
    sim_time: f64,
    loaded: bool,
}

impl DemoScene {
    pub fn solar_system() -> Self {
        Self::from_orbits(SOLAR_SYSTEM)
    }

    pub fn from_orbits(orbits: &[OrbitParams]) -> Self {
        let mut bodies = Vec::with_capacity(orbits.len());
        let mut anchors = HashMap::with_capacity(orbits.len());

        for orbit in orbits {
            let node = Rc::new(ManualNode::new(Vec3::ZERO, orbit.radius));
            let body = DemoBody {
                orbit: orbit.clone(),
                node: node.clone(),
            };
            node.set_position(body.position_at(0.0));
            anchors.insert(BodyId::new(orbit.id), BodyAnchor::new(orbit.id, orbit.kind, node));
            bodies.push(body);
        }

        Self {
            bodies,
            anchors,
            sim_time: 0.0,
            loaded: false,
        }
    }

    /// Advance simulated time by `dt * time_scale` and move every body
    pub fn advance(&mut self, dt: Duration, time_scale: f64) {
        self.sim_time += dt.as_secs_f64() * time_scale;
        for body in &self.bodies {
            body.node.set_position(body.position_at(self.sim_time));
        }
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Anchors resolve only after this is called
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn body_ids(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|body| body.orbit.id)
    }
}

impl BodyResolver for DemoScene {
    fn resolve(&self, id: &BodyId) -> Option<BodyAnchor> {
        if !self.loaded {
            return None;
        }
        self.anchors.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_hidden_until_loaded() {
        let mut scene = DemoScene::solar_system();
        let earth = BodyId::new("earth");
        assert!(scene.resolve(&earth).is_none());

        scene.mark_loaded();
        let anchor = scene.resolve(&earth).unwrap();
        assert!((anchor.world_position() - Vec3::new(1000.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_bodies_stay_on_their_orbits() {
        let mut scene = DemoScene::solar_system();
        scene.mark_loaded();
        scene.advance(Duration::from_secs(40), 3.0);

        let mars = scene.resolve(&BodyId::new("mars")).unwrap();
        assert!((mars.world_position().length() - 1520.0).abs() < 0.1);
        assert_eq!(scene.resolve(&BodyId::new("sun")).unwrap().world_position(), Vec3::ZERO);
        assert!((scene.sim_time() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_time_scale_runs_backwards() {
        let mut scene = DemoScene::solar_system();
        scene.mark_loaded();
        let earth = scene.resolve(&BodyId::new("earth")).unwrap();

        scene.advance(Duration::from_secs(10), -1.0);
        assert!(earth.world_position().y < 0.0);
    }
}
