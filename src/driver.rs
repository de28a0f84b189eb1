//! Frame loop for the headless driver

use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{debug, info};

use orrery_camera::{
    BodyId, CameraConfig, CameraEngine, Collaborators, OrbitRig, Route, TrackballRig,
};

use crate::demo_scene::DemoScene;

/// Knobs for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: u32,
    pub fps: f64,
    pub time_scale: f64,
    /// Bodies selected in order, one every `focus_every` frames
    pub focus: Vec<String>,
    pub focus_every: u32,
    pub route: Option<String>,
    /// Frames before the scene reports loaded
    pub load_frames: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            fps: 60.0,
            time_scale: 1.0,
            focus: Vec::new(),
            focus_every: 180,
            route: None,
            load_frames: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameEvent {
    pub frame: u32,
    pub event: String,
}

/// Summary printed at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub frames: u32,
    pub wall_seconds: f64,
    pub sim_seconds: f64,
    pub position: Option<[f32; 3]>,
    pub target: Option<[f32; 3]>,
    pub followed: Option<String>,
    pub following: bool,
    pub route: String,
    pub generation: u64,
    pub events: Vec<FrameEvent>,
}

pub fn run(options: &RunOptions, config: CameraConfig) -> Result<RunReport> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        bail!("--fps must be positive, got {}", options.fps);
    }
    let dt = Duration::from_secs_f64(1.0 / options.fps);

    let mut scene = DemoScene::solar_system();
    let mut engine = CameraEngine::new(config);
    mount_rigs(&mut engine);

    let route = options
        .route
        .as_ref()
        .map(|body| Route::Body(BodyId::new(body.as_str())))
        .unwrap_or_default();
    engine.mount(route);

    let mut routes: Vec<BodyId> = Vec::new();
    let mut selections = options.focus.iter();
    let mut events = Vec::new();

    info!(
        "Running {} frames at {} fps, time scale {}",
        options.frames, options.fps, options.time_scale
    );

    for frame in 0..options.frames {
        if frame == options.load_frames && !scene.is_loaded() {
            info!("Scene loaded ({} bodies)", scene.body_ids().count());
            scene.mark_loaded();
            engine.scene_loaded();
        }
        scene.advance(dt, options.time_scale);

        if options.focus_every > 0 && frame > 0 && frame % options.focus_every == 0 {
            if let Some(body) = selections.next() {
                let mut collab = Collaborators {
                    bodies: &scene,
                    time: &options.time_scale,
                    routes: &mut routes,
                };
                if let Err(fault) = engine.select_body(body.as_str(), &mut collab) {
                    debug!("Selection of {} deferred: {}", body, fault);
                }
            }
        }

        let mut collab = Collaborators {
            bodies: &scene,
            time: &options.time_scale,
            routes: &mut routes,
        };
        for event in engine.frame(dt, &mut collab) {
            info!("[frame {}] {:?}", frame, event);
            events.push(FrameEvent {
                frame,
                event: format!("{event:?}"),
            });
        }

        if let Some(pose) = engine.rigs().pose() {
            debug!(
                "[frame {}] position {:?} target {:?}",
                frame, pose.position, pose.target
            );
        }
    }

    let pose = engine.rigs().pose();
    Ok(RunReport {
        frames: options.frames,
        wall_seconds: engine.now().as_secs_f64(),
        sim_seconds: scene.sim_time(),
        position: pose.map(|pose| pose.position.to_array()),
        target: pose.map(|pose| pose.target.to_array()),
        followed: engine.rigs().followed_id().map(|id| id.to_string()),
        following: engine.rigs().is_following(),
        route: match engine.route() {
            Route::Root => "/".to_string(),
            Route::Body(body) => format!("/{body}"),
        },
        generation: engine.generation().0,
        events,
    })
}

fn mount_rigs(engine: &mut CameraEngine) {
    let rig_config = engine.config().rig.clone();
    let home = engine.config().framing.home_position;
    let home_target = engine.config().framing.home_target;

    let rigs = engine.rigs_mut();
    rigs.mount_primary(Box::new(OrbitRig::from_config(&rig_config, home, home_target)));
    rigs.mount_secondary(Box::new(TrackballRig::from_config(&rig_config)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_root_run_plays_initial_framing() {
        let options = RunOptions {
            frames: 240,
            ..RunOptions::default()
        };
        let report = run(&options, CameraConfig::default()).unwrap();

        assert!(report.events.iter().any(|e| e.event == "InitialFramingStarted"));
        assert!(report.events.iter().any(|e| e.event == "InitialFramingFinished"));
        assert_eq!(report.followed.as_deref(), Some("sun"));
        assert!(!report.following);
        assert_eq!(report.route, "/");
    }

    #[test]
    fn test_route_mount_auto_focuses() {
        let options = RunOptions {
            frames: 300,
            route: Some("mars".to_string()),
            ..RunOptions::default()
        };
        let report = run(&options, CameraConfig::default()).unwrap();

        assert_eq!(report.followed.as_deref(), Some("mars"));
        assert!(report.following);
        assert_eq!(report.generation, 1);
        assert_eq!(report.route, "/mars");
    }

    #[test]
    fn test_selections_supersede_in_order() {
        let options = RunOptions {
            frames: 400,
            time_scale: 20.0,
            focus: vec!["earth".to_string(), "venus".to_string()],
            focus_every: 60,
            ..RunOptions::default()
        };
        let report = run(&options, CameraConfig::default()).unwrap();

        assert_eq!(report.followed.as_deref(), Some("venus"));
        assert_eq!(report.generation, 2);
        assert_eq!(report.route, "/venus");
        assert!(report
            .events
            .iter()
            .any(|e| e.event.starts_with("TransitionSuperseded")));
    }

    #[test]
    fn test_rejects_zero_fps() {
        let options = RunOptions {
            fps: 0.0,
            ..RunOptions::default()
        };
        assert!(run(&options, CameraConfig::default()).is_err());
    }
}
