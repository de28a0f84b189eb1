//! Orrery camera core
//!
//! Focus transitions, orbital following and rig synchronisation for a
//! planetary-system viewer. This crate contains ONLY camera logic: bodies,
//! time scale and routing are collaborators supplied by the host, and nothing
//! here renders.
//!
//! The host owns a `CameraEngine`, mounts rigs into it, and calls
//! `CameraEngine::frame` once per displayed frame.

pub mod anchor;
pub mod config;
pub mod coords;
pub mod engine;
pub mod error;
pub mod focus;
pub mod framing;
pub mod rig;
pub mod schedule;
pub mod sync;
pub mod tween;

pub use anchor::{BodyAnchor, BodyId, BodyKind, BodyResolver, ManualNode, SceneNode};
pub use config::{global_config, CameraConfig, ConfigLoader};
pub use engine::{CameraEngine, CameraEvent, Collaborators, Route};
pub use error::{ConfigError, FocusFault, FocusResult};
pub use focus::{
    destination_pose, rearm_delay, FocusController, FocusOrigin, FocusPhase, FocusRequest,
    FocusTrigger, NoRoutes, RouteWriter, TimeScaleSource,
};
pub use framing::InitialFraming;
pub use rig::{CameraPose, CameraRigState, OrbitRig, PrimaryRig, SecondaryRig, TrackballRig};
pub use schedule::Generation;
pub use tween::{Ease, Tween};

// Re-exported so hosts need not pin their own glam version
pub use glam::Vec3;
