//! Renderer double that records every call.

use std::collections::HashMap;
use std::time::Duration;

use glam::DVec3;

use crate::config::{ControlConfig, ImageryConfig};
use crate::scene::overlay::{BoundaryOverlay, OverlayStyle};
use crate::scene::renderer::{CameraTarget, GlobeRenderer, NodeId, ResourceDesc, ResourceId, SceneNode};
use crate::scene::sync::{DerivedPoint, RingStyle, VisualTable};

#[derive(Debug, Clone)]
pub struct NodeState {
    pub position: DVec3,
    pub visible: bool,
}

pub struct RecordingRenderer {
    pub radius: f64,
    pub sizes: Vec<(u32, u32)>,
    pub imagery_set: usize,
    pub controls_configured: usize,
    pub ground_textures: Vec<Vec<u8>>,
    pub accept_ground: bool,
    pub auto_rotate: Option<(bool, f64)>,
    pub distance: Option<f64>,
    pub camera: Option<DVec3>,
    pub points: Vec<Vec<DerivedPoint>>,
    pub rings: Vec<Vec<DerivedPoint>>,
    pub overlays: Vec<Vec<BoundaryOverlay>>,
    pub camera_targets: Vec<(CameraTarget, Duration)>,
    pub pickable: HashMap<(i32, i32), String>,
    pub resources: HashMap<ResourceId, ResourceDesc>,
    pub nodes: HashMap<NodeId, NodeState>,
    pub material_maps: HashMap<ResourceId, ResourceId>,
    pub containers_cleared: usize,
    next_id: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::with_radius(100.0)
    }

    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius,
            sizes: Vec::new(),
            imagery_set: 0,
            controls_configured: 0,
            ground_textures: Vec::new(),
            accept_ground: true,
            auto_rotate: None,
            distance: Some(radius * 2.5),
            camera: Some(DVec3::new(0.0, 0.0, radius * 2.5)),
            points: Vec::new(),
            rings: Vec::new(),
            overlays: Vec::new(),
            camera_targets: Vec::new(),
            pickable: HashMap::new(),
            resources: HashMap::new(),
            nodes: HashMap::new(),
            material_maps: HashMap::new(),
            containers_cleared: 0,
            next_id: 0,
        }
    }

    pub fn live_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_position(&self, id: NodeId) -> Option<DVec3> {
        self.nodes.get(&id).map(|n| n.position)
    }

    pub fn node_visible(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|n| n.visible)
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GlobeRenderer for RecordingRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }

    fn set_imagery(&mut self, _imagery: &ImageryConfig) {
        self.imagery_set += 1;
    }

    fn set_ground_texture(&mut self, data: &[u8]) -> bool {
        if self.accept_ground {
            self.ground_textures.push(data.to_vec());
        }
        self.accept_ground
    }

    fn configure_controls(&mut self, _controls: &ControlConfig) {
        self.controls_configured += 1;
    }

    fn set_auto_rotate(&mut self, enabled: bool, speed: f64) {
        self.auto_rotate = Some((enabled, speed));
    }

    fn camera_distance(&self) -> Option<f64> {
        self.distance
    }

    fn camera_world_position(&self) -> Option<DVec3> {
        self.camera
    }

    fn set_points(&mut self, points: &[DerivedPoint], _style: &VisualTable) {
        self.points.push(points.to_vec());
    }

    fn set_rings(&mut self, rings: &[DerivedPoint], _style: &RingStyle) {
        self.rings.push(rings.to_vec());
    }

    fn set_overlays(&mut self, overlays: &[BoundaryOverlay], _style: &OverlayStyle) {
        self.overlays.push(overlays.to_vec());
    }

    fn set_camera_target(&mut self, target: &CameraTarget, duration: Duration) {
        self.camera_targets.push((target.clone(), duration));
    }

    fn pick_point(&self, x: i32, y: i32) -> Option<String> {
        self.pickable.get(&(x, y)).cloned()
    }

    fn globe_radius(&self) -> f64 {
        self.radius
    }

    fn create_resource(&mut self, desc: ResourceDesc) -> ResourceId {
        let id = ResourceId(self.next());
        self.resources.insert(id, desc);
        id
    }

    fn dispose_resource(&mut self, id: ResourceId) {
        assert!(self.resources.remove(&id).is_some(), "double dispose of {:?}", id);
        self.material_maps.retain(|_, texture| *texture != id);
    }

    fn add_node(&mut self, node: SceneNode) -> NodeId {
        let position = match node {
            SceneNode::Mesh { position, .. } | SceneNode::Sprite { position, .. } => position,
        };
        let id = NodeId(self.next());
        self.nodes.insert(id, NodeState { position, visible: true });
        id
    }

    fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    fn set_node_position(&mut self, id: NodeId, position: DVec3) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    fn set_node_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    fn body_world_position(&self, id: NodeId) -> Option<DVec3> {
        self.node_position(id)
    }

    fn set_material_map(&mut self, material: ResourceId, texture: ResourceId) {
        self.material_maps.insert(material, texture);
    }

    fn clear_container(&mut self) {
        self.containers_cleared += 1;
    }
}
