//! Body anchors - live handles to a rendered body's scene node
//!
//! The rendering layer owns the scene nodes. The camera core only borrows them
//! through `BodyAnchor`, which reads the world position fresh on every call and
//! memoizes the bounding radius (body geometry is static after load).

use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::coords;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a body as used by routes and selection events (e.g. "mars")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BodyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What kind of body an anchor refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// The central star. Has no meaningful "toward center" direction.
    Star,
    #[default]
    Planet,
    DwarfPlanet,
    Moon,
}

impl BodyKind {
    pub fn is_star(&self) -> bool {
        matches!(self, BodyKind::Star)
    }
}

// =============================================================================
// SCENE NODE
// =============================================================================

/// The slice of a renderable scene node the camera core needs.
pub trait SceneNode {
    /// World-space position. Must be recomputed on every call, never cached.
    fn world_position(&self) -> Vec3;

    /// Bounding-sphere radius of the node's geometry in model space,
    /// or `None` if it cannot be computed.
    fn geometry_radius(&self) -> Option<f32>;

    /// Per-axis scale applied to the geometry.
    fn scale(&self) -> Vec3;
}

/// Scene node whose position is pushed in by its owner every frame.
///
/// Used by the headless harness and by tests; a real renderer implements
/// `SceneNode` on its own node type.
#[derive(Debug)]
pub struct ManualNode {
    position: Cell<Vec3>,
    geometry_radius: Option<f32>,
    scale: Vec3,
}

impl ManualNode {
    pub fn new(position: Vec3, geometry_radius: f32) -> Self {
        Self {
            position: Cell::new(position),
            geometry_radius: Some(geometry_radius),
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the geometry radius (`None` models geometry with no bounds)
    pub fn with_geometry_radius(mut self, radius: Option<f32>) -> Self {
        self.geometry_radius = radius;
        self
    }

    pub fn set_position(&self, position: Vec3) {
        self.position.set(position);
    }

    pub fn translate(&self, delta: Vec3) {
        self.position.set(self.position.get() + delta);
    }
}

impl SceneNode for ManualNode {
    fn world_position(&self) -> Vec3 {
        self.position.get()
    }

    fn geometry_radius(&self) -> Option<f32> {
        self.geometry_radius
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }
}

// =============================================================================
// BODY ANCHOR
// =============================================================================

/// Live, borrowed reference to a body's scene node.
///
/// Clones share the same node and the same memoized radius.
#[derive(Clone)]
pub struct BodyAnchor {
    id: BodyId,
    kind: BodyKind,
    node: Rc<dyn SceneNode>,
    radius: Rc<OnceCell<f32>>,
}

impl BodyAnchor {
    pub fn new(id: impl Into<BodyId>, kind: BodyKind, node: Rc<dyn SceneNode>) -> Self {
        Self {
            id: id.into(),
            kind,
            node,
            radius: Rc::new(OnceCell::new()),
        }
    }

    pub fn id(&self) -> &BodyId {
        &self.id
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_star(&self) -> bool {
        self.kind.is_star()
    }

    /// Current world position of the body (read through to the node)
    pub fn world_position(&self) -> Vec3 {
        self.node.world_position()
    }

    /// True body radius in render-space units, computed once.
    ///
    /// `min_radius` clamps degenerate geometry and only applies on the first call.
    pub fn bounding_radius(&self, min_radius: f32) -> f32 {
        *self
            .radius
            .get_or_init(|| coords::bounding_radius(self.node.as_ref(), min_radius))
    }

    /// Check if both anchors refer to the same scene node
    pub fn same_body(&self, other: &BodyAnchor) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for BodyAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyAnchor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("radius", &self.radius.get())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolves a body id to its anchor, or `None` while the scene is still loading.
pub trait BodyResolver {
    fn resolve(&self, id: &BodyId) -> Option<BodyAnchor>;
}

impl BodyResolver for HashMap<BodyId, BodyAnchor> {
    fn resolve(&self, id: &BodyId) -> Option<BodyAnchor> {
        self.get(id).cloned()
    }
}
