//! Frame driver
//!
//! `CameraEngine` is the single entry point the host calls: focus requests go
//! in through `mount` / `select_body`, and `frame(dt)` is called once per
//! displayed frame. Everything runs on the caller's thread; nothing blocks.
//!
//! Per-frame order:
//! 1. advance the wall clock
//! 2. start the initial framing if the scene just loaded at the root route and
//!    no focus request is parked
//! 3. retry a parked focus request
//! 4. run due scheduled tasks (re-arm, spotlight)
//! 5. follow step
//! 6. sample tweens into the primary rig
//! 7. mirror step

use std::time::Duration;

use tracing::{debug, info};

use crate::anchor::{BodyId, BodyResolver};
use crate::config::{global_config, CameraConfig};
use crate::error::{FocusFault, FocusResult};
use crate::focus::{
    FocusController, FocusOrigin, FocusPhase, FocusRequest, FocusTask, FocusTrigger, RouteWriter,
    TimeScaleSource,
};
use crate::framing::InitialFraming;
use crate::rig::CameraRigState;
use crate::schedule::Generation;
use crate::sync;

/// Browsable route the camera was mounted under
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// System overview, no body selected
    #[default]
    Root,
    Body(BodyId),
}

/// Output protocol of one engine frame, consumed by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    TransitionStarted { body: BodyId, generation: Generation },
    /// A transition was replaced before its tweens finished
    TransitionSuperseded { generation: Generation },
    TransitionFinished { body: BodyId, generation: Generation },
    FollowRearmed { body: BodyId },
    /// Reveal per-system lighting around the focused body
    SystemSpotlight { body: BodyId },
    InitialFramingStarted,
    InitialFramingFinished,
}

/// External collaborators, borrowed for the duration of one call
pub struct Collaborators<'a> {
    pub bodies: &'a dyn BodyResolver,
    pub time: &'a dyn TimeScaleSource,
    pub routes: &'a mut dyn RouteWriter,
}

/// Camera focus, following and framing for one session
#[derive(Debug)]
pub struct CameraEngine {
    config: CameraConfig,
    rigs: CameraRigState,
    focus: FocusController,
    framing: InitialFraming,
    trigger: FocusTrigger,
    route: Route,
    scene_loaded: bool,
    /// Request waiting for its anchor or for the rig to mount
    pending: Option<FocusRequest>,
    events: Vec<CameraEvent>,
}

impl Default for CameraEngine {
    fn default() -> Self {
        Self::new(global_config().clone())
    }
}

impl CameraEngine {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            rigs: CameraRigState::new(),
            focus: FocusController::new(),
            framing: InitialFraming::new(),
            trigger: FocusTrigger::new(),
            route: Route::Root,
            scene_loaded: false,
            pending: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn rigs(&self) -> &CameraRigState {
        &self.rigs
    }

    /// Mount/unmount rigs, or read back state, through this
    pub fn rigs_mut(&mut self) -> &mut CameraRigState {
        &mut self.rigs
    }

    pub fn focus_phase(&self) -> FocusPhase {
        self.focus.phase()
    }

    pub fn generation(&self) -> Generation {
        self.focus.generation()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn pending_request(&self) -> Option<&FocusRequest> {
        self.pending.as_ref()
    }

    pub fn is_framing(&self) -> bool {
        self.framing.is_playing()
    }

    /// Wall-clock time accumulated through `frame`
    pub fn now(&self) -> Duration {
        self.focus.now()
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Mount the camera under `route`.
    ///
    /// A route naming a body queues an auto-focus; it runs on the first frame
    /// its anchor resolves, without writing the route back.
    pub fn mount(&mut self, route: Route) {
        info!("Camera mounted at {:?}", route);
        if let Route::Body(body) = &route {
            let request = self.trigger.fire(body.clone(), FocusOrigin::Route);
            self.rigs.focus_request = Some(request.clone());
            self.pending = Some(request);
        }
        self.route = route;
    }

    /// Route changed externally (navigation). Never replays the framing.
    pub fn set_route(&mut self, route: Route) {
        self.route = route;
    }

    /// Scene data finished loading; the framing may start on the next frame
    pub fn scene_loaded(&mut self) {
        self.scene_loaded = true;
    }

    /// User selected a body. Starts the transition now if possible, otherwise
    /// parks the request for per-frame retry. Resulting events are returned by
    /// the next `frame`.
    pub fn select_body(
        &mut self,
        body: impl Into<BodyId>,
        collab: &mut Collaborators<'_>,
    ) -> FocusResult<()> {
        let request = self.trigger.fire(body, FocusOrigin::Selection);
        self.rigs.focus_request = Some(request.clone());
        // A newer request always replaces a parked one
        self.pending = None;
        self.try_focus(request, collab)
    }

    /// Orbit input routed to the primary rig
    pub fn rotate(&mut self, yaw_input: f32, pitch_input: f32) {
        if let Some(rig) = self.rigs.primary_mut() {
            rig.rotate(yaw_input, pitch_input);
            rig.update();
        }
    }

    /// Zoom input routed to the secondary rig; applied by the next mirror step
    pub fn zoom(&mut self, delta: f32) {
        if let Some(rig) = self.rigs.secondary_mut() {
            rig.zoom(delta);
        }
    }

    /// Arm the establishing shot again. Plays on the next frame at the root route.
    pub fn replay_initial_framing(&mut self) {
        debug!("Initial framing re-armed");
        self.framing.reset();
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advance one displayed frame by wall-clock `dt`
    pub fn frame(&mut self, dt: Duration, collab: &mut Collaborators<'_>) -> Vec<CameraEvent> {
        self.focus.advance_clock(dt);

        // A parked request owns the camera once it resolves
        if self.scene_loaded
            && self.route == Route::Root
            && self.pending.is_none()
            && !self.framing.has_played()
        {
            self.start_framing(collab);
        }

        if let Some(request) = self.pending.take() {
            debug!("Retrying focus on {}", request.body);
            if let Err(fault) = self.try_focus(request, collab) {
                debug!("Focus retry deferred: {}", fault);
            }
        }

        for task in self.focus.take_due_tasks() {
            match task {
                FocusTask::RearmFollow(anchor) => {
                    info!("Following {}", anchor.id());
                    self.events.push(CameraEvent::FollowRearmed {
                        body: anchor.id().clone(),
                    });
                    self.rigs.follow(anchor);
                }
                FocusTask::Spotlight(body) => {
                    self.events.push(CameraEvent::SystemSpotlight { body });
                }
            }
        }

        sync::follow_step(&mut self.rigs);

        if let Some(done) = self.focus.step_transition(&mut self.rigs, dt) {
            self.events.push(CameraEvent::TransitionFinished {
                body: done.body().clone(),
                generation: done.generation(),
            });
        }
        if self.framing.step(&mut self.rigs, dt) {
            info!("Initial framing finished");
            self.events.push(CameraEvent::InitialFramingFinished);
        }

        sync::mirror_step(&mut self.rigs);

        std::mem::take(&mut self.events)
    }

    /// Start the establishing shot, retiring any focus it replaces
    fn start_framing(&mut self, collab: &Collaborators<'_>) {
        let star = collab.bodies.resolve(&self.config.framing.star);
        if !self.framing.start(&mut self.rigs, star, &self.config.framing) {
            return;
        }
        if let Some(generation) = self.focus.cancel() {
            self.events.push(CameraEvent::TransitionSuperseded { generation });
        }
        self.rigs.suspend_following();
        self.events.push(CameraEvent::InitialFramingStarted);
    }

    fn try_focus(
        &mut self,
        request: FocusRequest,
        collab: &mut Collaborators<'_>,
    ) -> FocusResult<()> {
        let outcome = collab
            .bodies
            .resolve(&request.body)
            .ok_or_else(|| FocusFault::AnchorUnavailable(request.body.clone()))
            .and_then(|anchor| {
                self.focus.request_focus(
                    &mut self.rigs,
                    anchor,
                    collab.time.time_scale(),
                    &self.config,
                )
            });

        let started = match outcome {
            Ok(started) => started,
            Err(fault) => {
                if fault.is_retryable() {
                    debug!("Focus on {} parked: {}", request.body, fault);
                    self.pending = Some(request);
                }
                return Err(fault);
            }
        };

        if self.framing.cancel() {
            debug!("Initial framing interrupted by focus on {}", request.body);
        }
        if let Some(generation) = started.superseded {
            self.events.push(CameraEvent::TransitionSuperseded { generation });
        }
        self.events.push(CameraEvent::TransitionStarted {
            body: request.body.clone(),
            generation: started.generation,
        });

        if request.origin == FocusOrigin::Selection {
            collab.routes.show_body(&request.body);
            self.route = Route::Body(request.body);
        }
        Ok(())
    }
}
