//! Capability interface between the scene engine and a globe renderer.
//!
//! The engine never reaches into renderer internals: everything it needs,
//! from sizing to scene-graph nodes and disposable GPU-style resources, goes
//! through [`GlobeRenderer`].

use std::fmt;
use std::time::Duration;

use glam::DVec3;

use crate::config::{ControlConfig, ImageryConfig};
use crate::scene::label::TextCanvas;
use crate::scene::overlay::{BoundaryOverlay, OverlayStyle};
use crate::scene::sync::{DerivedPoint, RingStyle, VisualTable};

/// Handle to a renderer-owned resource (geometry, material or texture)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u64);

/// Handle to a node in the renderer's scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Description of a resource to allocate
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDesc {
    SphereGeometry { radius: f64, segments: u32 },
    PhongMaterial { color: String, shininess: f64 },
    SpriteMaterial { map: Option<ResourceId>, transparent: bool, depth_test: bool },
    CanvasTexture(TextCanvas),
    ImageTexture(Vec<u8>),
}

/// Scene-graph node referencing previously allocated resources
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Mesh {
        geometry: ResourceId,
        materials: Vec<ResourceId>,
        position: DVec3,
    },
    Sprite {
        material: ResourceId,
        /// Width and height in scene units
        scale: (f64, f64),
        position: DVec3,
    },
}

/// Which place the camera is aimed at. Two targets with the same key are the
/// same camera motion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CameraKey {
    Selected(String),
    Current(String),
}

impl fmt::Display for CameraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraKey::Selected(id) => write!(f, "selected:{}", id),
            CameraKey::Current(id) => write!(f, "current:{}", id),
        }
    }
}

/// Point of view, altitude in globe radii above the surface
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTarget {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub key: CameraKey,
}

/// Everything the engine asks of a globe renderer.
///
/// Positions are in world space with the globe centered at the origin.
pub trait GlobeRenderer {
    /// Resize the drawing surface, in device pixels
    fn set_size(&mut self, width: u32, height: u32);

    /// Base imagery: low-resolution ground, background and atmosphere
    fn set_imagery(&mut self, imagery: &ImageryConfig);

    /// Swap in a higher-resolution ground texture. Returns `false` if the
    /// data could not be used, leaving the current ground in place.
    fn set_ground_texture(&mut self, data: &[u8]) -> bool;

    fn configure_controls(&mut self, controls: &ControlConfig);

    fn set_auto_rotate(&mut self, enabled: bool, speed: f64);

    /// Camera distance from the orbit target, if a camera exists
    fn camera_distance(&self) -> Option<f64>;

    fn camera_world_position(&self) -> Option<DVec3>;

    fn set_points(&mut self, points: &[DerivedPoint], style: &VisualTable);

    fn set_rings(&mut self, rings: &[DerivedPoint], style: &RingStyle);

    fn set_overlays(&mut self, overlays: &[BoundaryOverlay], style: &OverlayStyle);

    /// Animate the camera to `target` over `duration`
    fn set_camera_target(&mut self, target: &CameraTarget, duration: Duration);

    /// Id of the point drawn at the given pixel, if any
    fn pick_point(&self, x: i32, y: i32) -> Option<String>;

    fn globe_radius(&self) -> f64;

    fn create_resource(&mut self, desc: ResourceDesc) -> ResourceId;

    /// Free a resource. Resources are never reclaimed implicitly.
    fn dispose_resource(&mut self, id: ResourceId);

    fn add_node(&mut self, node: SceneNode) -> NodeId;

    fn remove_node(&mut self, id: NodeId);

    fn set_node_position(&mut self, id: NodeId, position: DVec3);

    fn set_node_visible(&mut self, id: NodeId, visible: bool);

    fn body_world_position(&self, id: NodeId) -> Option<DVec3>;

    /// Attach a texture to a material
    fn set_material_map(&mut self, material: ResourceId, texture: ResourceId);

    /// Drop everything drawn into the host container
    fn clear_container(&mut self);
}
