//! Creation and teardown of the 3D scene.
//!
//! Two states: uninitialized (`None`) and mounted. Mounting runs the full
//! construction sequence once; mounting again while mounted does nothing.
//! Teardown releases every resource it acquired and resets the guard so a
//! later mount starts from scratch.

use glam::DVec3;
use tracing::{debug, info};

use crate::config::{BodyConfig, SceneConfig};
use crate::scene::label::rasterize_label;
use crate::scene::occlusion::segment_hits_sphere;
use crate::scene::renderer::{GlobeRenderer, NodeId, ResourceDesc, ResourceId, SceneNode};

/// The body mesh and what it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct BodyResources {
    pub node: NodeId,
    pub geometry: ResourceId,
    pub materials: Vec<ResourceId>,
    /// Texture attached after the async load, if it ever completed
    pub texture: Option<ResourceId>,
    pub radius: f64,
    pub distance: f64,
}

/// The flat label floating next to the body
#[derive(Debug, Clone, PartialEq)]
pub struct LabelResources {
    pub node: NodeId,
    pub texture: ResourceId,
    pub material: ResourceId,
    pub height: f64,
}

/// A mounted scene: the renderer plus everything created in it
pub struct MountedScene<R> {
    pub renderer: R,
    pub body: Option<BodyResources>,
    pub label: Option<LabelResources>,
    pub generation: u64,
    /// Body angle around the polar axis, degrees
    orbit_angle: f64,
}

impl<R: GlobeRenderer> MountedScene<R> {
    fn construct(mut renderer: R, config: &SceneConfig, generation: u64) -> Self {
        renderer.configure_controls(&config.controls);
        renderer.set_imagery(&config.imagery);

        let globe_radius = renderer.globe_radius();
        let body = create_body(&mut renderer, &config.body, globe_radius);
        let label = create_label(&mut renderer, &config.body, globe_radius, &body);
        debug!(globe_radius, body_radius = body.radius, distance = body.distance, "scene constructed");

        Self {
            renderer,
            body: Some(body),
            label: Some(label),
            generation,
            orbit_angle: 0.0,
        }
    }

    /// Attach a freshly loaded body texture. Ignored if the body is gone.
    pub fn attach_body_texture(&mut self, bytes: Vec<u8>) -> bool {
        let Some(body) = self.body.as_mut() else {
            return false;
        };
        let Some(&material) = body.materials.first() else {
            return false;
        };
        let texture = self.renderer.create_resource(ResourceDesc::ImageTexture(bytes));
        self.renderer.set_material_map(material, texture);
        if let Some(old) = body.texture.replace(texture) {
            self.renderer.dispose_resource(old);
        }
        true
    }

    /// Move the body (and its label) along its orbit
    pub fn advance_body(&mut self, dt_secs: f64, speed: f64) {
        if speed == 0.0 {
            return;
        }
        let (Some(body), Some(label)) = (self.body.as_ref(), self.label.as_ref()) else {
            return;
        };
        self.orbit_angle = (self.orbit_angle + speed * dt_secs).rem_euclid(360.0);
        let (sin, cos) = self.orbit_angle.to_radians().sin_cos();
        let center = DVec3::new(body.distance * cos, 0.0, -body.distance * sin);
        self.renderer.set_node_position(body.node, center);
        self.renderer.set_node_position(label.node, center + DVec3::new(0.0, label.height, 0.0));
    }

    /// Show the label only when the globe does not block the camera's view of
    /// the body. Returns the new visibility, or `None` if something is missing.
    pub fn update_label_visibility(&mut self) -> Option<bool> {
        let body = self.body.as_ref()?;
        let label = self.label.as_ref()?;
        let camera = self.renderer.camera_world_position()?;
        let body_position = self.renderer.body_world_position(body.node)?;
        let occluded = segment_hits_sphere(camera, body_position, self.renderer.globe_radius());
        self.renderer.set_node_visible(label.node, !occluded);
        Some(!occluded)
    }

    fn teardown(mut self) -> R {
        if let Some(body) = self.body.take() {
            self.renderer.remove_node(body.node);
            self.renderer.dispose_resource(body.geometry);
            for material in body.materials {
                self.renderer.dispose_resource(material);
            }
            if let Some(texture) = body.texture {
                self.renderer.dispose_resource(texture);
            }
        }
        if let Some(label) = self.label.take() {
            self.renderer.remove_node(label.node);
            self.renderer.dispose_resource(label.texture);
            self.renderer.dispose_resource(label.material);
        }
        self.renderer.clear_container();
        self.renderer
    }
}

fn create_body<R: GlobeRenderer>(renderer: &mut R, config: &BodyConfig, globe_radius: f64) -> BodyResources {
    let radius = globe_radius * config.radius_multiplier;
    let distance = globe_radius * config.distance_multiplier;
    let geometry = renderer.create_resource(ResourceDesc::SphereGeometry {
        radius,
        segments: config.segments,
    });
    let material = renderer.create_resource(ResourceDesc::PhongMaterial {
        color: config.color.clone(),
        shininess: config.shininess,
    });
    let node = renderer.add_node(SceneNode::Mesh {
        geometry,
        materials: vec![material],
        position: DVec3::new(distance, 0.0, 0.0),
    });
    BodyResources {
        node,
        geometry,
        materials: vec![material],
        texture: None,
        radius,
        distance,
    }
}

fn create_label<R: GlobeRenderer>(
    renderer: &mut R,
    config: &BodyConfig,
    globe_radius: f64,
    body: &BodyResources,
) -> LabelResources {
    let (canvas_width, canvas_height) = config.label_canvas;
    let canvas = rasterize_label(&config.label, canvas_width, canvas_height);
    let texture = renderer.create_resource(ResourceDesc::CanvasTexture(canvas));
    let material = renderer.create_resource(ResourceDesc::SpriteMaterial {
        map: Some(texture),
        transparent: true,
        depth_test: false,
    });
    let width = globe_radius * config.label_scale;
    let height = body.radius * config.label_offset;
    let node = renderer.add_node(SceneNode::Sprite {
        material,
        scale: (width, width * 0.5),
        position: DVec3::new(body.distance, height, 0.0),
    });
    LabelResources {
        node,
        texture,
        material,
        height,
    }
}

/// Owns the mounted scene, if any, and the mount generation counter
pub struct SceneLifecycle<R> {
    scene: Option<MountedScene<R>>,
    generation: u64,
}

impl<R: GlobeRenderer> SceneLifecycle<R> {
    pub fn new() -> Self {
        Self {
            scene: None,
            generation: 0,
        }
    }

    /// Build the scene. Returns the new generation, or `None` if a scene is
    /// already mounted (in which case `build` is not called).
    pub fn mount(&mut self, build: impl FnOnce() -> R, config: &SceneConfig) -> Option<u64> {
        if self.scene.is_some() {
            debug!("scene already mounted, ignoring mount");
            return None;
        }
        self.generation += 1;
        info!(generation = self.generation, "mounting globe scene");
        self.scene = Some(MountedScene::construct(build(), config, self.generation));
        Some(self.generation)
    }

    /// Tear the scene down and hand back the renderer
    pub fn unmount(&mut self) -> Option<R> {
        let scene = self.scene.take()?;
        info!(generation = scene.generation, "unmounting globe scene");
        // completions tagged with the old generation must not match any new mount
        self.generation += 1;
        Some(scene.teardown())
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    /// Whether `generation` belongs to the scene mounted right now
    pub fn is_current(&self, generation: u64) -> bool {
        self.scene.as_ref().is_some_and(|s| s.generation == generation)
    }

    pub fn scene(&self) -> Option<&MountedScene<R>> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut MountedScene<R>> {
        self.scene.as_mut()
    }
}

impl<R: GlobeRenderer> Default for SceneLifecycle<R> {
    fn default() -> Self {
        Self::new()
    }
}
