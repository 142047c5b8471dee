//! Geospatial scene synchronization engine.
//!
//! [`GlobeScene`] keeps a [`GlobeRenderer`] in step with the application's
//! place list and selection. Three schedules drive it on one thread:
//! - reactive updates ([`GlobeScene::update`]) whenever places or selection
//!   change,
//! - the frame loop ([`GlobeScene::tick`]) for auto-rotation and label
//!   occlusion,
//! - asset completions (ground texture, body texture, boundaries), drained at
//!   the start of each tick.

pub mod assets;
pub mod camera;
pub mod label;
pub mod lifecycle;
pub mod occlusion;
pub mod overlay;
pub mod renderer;
pub mod sync;
pub mod viewport;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SceneConfig;
use crate::places::{self, Place};
use assets::{AssetKind, AssetLoader, AssetPayload, AssetSource, Completion};
use camera::CameraDirector;
use lifecycle::SceneLifecycle;
use occlusion::{should_auto_rotate, FrameLoop};
use overlay::OverlayStyle;
use renderer::GlobeRenderer;
use sync::{PointSynchronizer, RingStyle, VisualTable};
use viewport::ViewportController;

type SelectionHandler = Box<dyn FnMut(Option<String>)>;

/// Latest data handed in by the application
#[derive(Debug, Clone, Default)]
struct SceneInputs {
    places: Vec<Place>,
    current_id: Option<String>,
    selected_id: Option<String>,
}

pub struct GlobeScene<R: GlobeRenderer> {
    config: SceneConfig,
    visuals: VisualTable,
    ring_style: RingStyle,
    overlay_style: OverlayStyle,
    lifecycle: SceneLifecycle<R>,
    viewport: ViewportController,
    sync: PointSynchronizer,
    director: CameraDirector,
    frame_loop: FrameLoop,
    loader: AssetLoader,
    inputs: SceneInputs,
    /// Derived-set revision the mounted renderer has seen
    pushed_revision: Option<u64>,
    label_visible: Option<bool>,
    on_select: Option<SelectionHandler>,
}

impl<R: GlobeRenderer> GlobeScene<R> {
    pub fn new(config: SceneConfig, assets: Arc<dyn AssetSource>) -> Self {
        let visuals = VisualTable::new(&config.points);
        let ring_style = RingStyle::new(&config.rings, visuals.clone());
        let overlay_style = OverlayStyle::new(&config.overlay);
        Self {
            sync: PointSynchronizer::new(config.rings.policy),
            director: CameraDirector::new(&config.camera),
            visuals,
            ring_style,
            overlay_style,
            lifecycle: SceneLifecycle::new(),
            viewport: ViewportController::new(),
            frame_loop: FrameLoop::new(),
            loader: AssetLoader::new(assets),
            inputs: SceneInputs::default(),
            pushed_revision: None,
            label_visible: None,
            on_select: None,
            config,
        }
    }

    /// Mount a renderer built by `build`. No-op (and `build` is not called)
    /// if a scene is already mounted.
    pub fn mount(&mut self, build: impl FnOnce() -> R) -> bool {
        let Some(generation) = self.lifecycle.mount(build, &self.config) else {
            return false;
        };
        self.viewport.connect();
        self.frame_loop.start();
        self.director.reset();
        self.pushed_revision = None;

        if let Some(scene) = self.lifecycle.scene_mut() {
            scene.renderer.set_overlays(&[], &self.overlay_style);
            self.viewport.replay(&mut scene.renderer);
        }
        self.request_assets(generation);
        self.push_derived();
        self.update_camera();
        true
    }

    /// Tear the scene down. Returns the renderer if one was mounted.
    pub fn unmount(&mut self) -> Option<R> {
        if !self.lifecycle.is_mounted() {
            return None;
        }
        self.frame_loop.cancel();
        self.viewport.disconnect();
        self.pushed_revision = None;
        self.label_visible = None;
        self.lifecycle.unmount()
    }

    fn request_assets(&mut self, generation: u64) {
        if let Some(path) = &self.config.imagery.ground_high {
            self.loader.request(generation, AssetKind::GroundTexture, path);
        }
        if let Some(path) = &self.config.body.texture {
            self.loader.request(generation, AssetKind::BodyTexture, path);
        }
        if let Some(path) = &self.config.overlay.path {
            self.loader.request(generation, AssetKind::Boundaries, path);
        }
    }

    /// Size report from the host container
    pub fn resize(&mut self, width: i64, height: i64) {
        let Some(scene) = self.lifecycle.scene_mut() else {
            self.viewport.remember(width, height);
            return;
        };
        let was_ready = self.viewport.is_ready();
        if self.viewport.observe(width, height, &mut scene.renderer) && !was_ready {
            self.update_camera();
        }
    }

    /// New places or selection. Cheap to call repeatedly with the same data.
    pub fn update(&mut self, places: &[Place], current_id: Option<&str>, selected_id: Option<&str>) {
        if places != self.inputs.places.as_slice() {
            self.inputs.places = places.to_vec();
        }
        self.inputs.current_id = current_id.map(str::to_string);
        self.inputs.selected_id = selected_id.map(str::to_string);

        self.sync.update(places, current_id, selected_id);
        self.push_derived();
        self.update_camera();
    }

    fn push_derived(&mut self) {
        let Some(scene) = self.lifecycle.scene_mut() else {
            return;
        };
        let revision = self.sync.revision();
        if revision == 0 || self.pushed_revision == Some(revision) {
            return;
        }
        let derived = self.sync.derived();
        debug!(revision, points = derived.points.len(), rings = derived.rings.len(), "pushing derived points");
        scene.renderer.set_points(&derived.points, &self.visuals);
        scene.renderer.set_rings(&derived.rings, &self.ring_style);
        self.pushed_revision = Some(revision);
    }

    fn update_camera(&mut self) {
        let Some(scene) = self.lifecycle.scene_mut() else {
            return;
        };
        let places = &self.inputs.places;
        let selected = self.inputs.selected_id.as_deref().and_then(|id| places::find(places, id));
        let current = self.inputs.current_id.as_deref().and_then(|id| places::find(places, id));
        if let Some(target) = self.director.decide(selected, current, self.viewport.is_ready()) {
            info!(key = %target.key, lat = target.lat, lng = target.lng, altitude = target.altitude, "camera transition");
            scene.renderer.set_camera_target(&target, self.director.duration());
        }
    }

    /// One display refresh
    pub fn tick(&mut self, dt: Duration) {
        if !self.frame_loop.begin_tick() {
            return;
        }
        self.drain_completions();
        let Some(scene) = self.lifecycle.scene_mut() else {
            return;
        };
        let auto_rotate = &self.config.auto_rotate;
        let rotate = should_auto_rotate(scene.renderer.camera_distance(), auto_rotate);
        scene.renderer.set_auto_rotate(rotate, auto_rotate.speed);
        scene.advance_body(dt.as_secs_f64(), self.config.body.orbit_speed);
        self.label_visible = scene.update_label_visibility();
    }

    fn drain_completions(&mut self) {
        while let Some(completion) = self.loader.try_next() {
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        if !self.lifecycle.is_current(completion.generation) {
            debug!(generation = completion.generation, "dropping asset for a scene that is gone");
            return;
        }
        let Some(scene) = self.lifecycle.scene_mut() else {
            return;
        };
        match completion.payload {
            AssetPayload::GroundTexture(Ok(bytes)) => {
                if scene.renderer.set_ground_texture(&bytes) {
                    info!(bytes = bytes.len(), "high resolution ground loaded");
                } else {
                    warn!("high resolution ground unusable, keeping low resolution");
                }
            }
            AssetPayload::GroundTexture(Err(e)) => warn!("high resolution ground failed, keeping low resolution: {}", e),
            AssetPayload::BodyTexture(Ok(bytes)) => {
                scene.attach_body_texture(bytes);
            }
            AssetPayload::BodyTexture(Err(e)) => warn!("body texture failed: {}", e),
            AssetPayload::Boundaries(Ok(overlays)) => {
                info!(count = overlays.len(), "boundary overlays loaded");
                scene.renderer.set_overlays(&overlays, &self.overlay_style);
            }
            AssetPayload::Boundaries(Err(e)) => {
                warn!("boundary overlays unavailable: {}", e);
                scene.renderer.set_overlays(&[], &self.overlay_style);
            }
        }
    }

    /// Register the callback told about user-driven selection changes
    pub fn on_selection_change(&mut self, handler: impl FnMut(Option<String>) + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    fn emit_selection(&mut self, id: Option<String>) {
        if let Some(handler) = self.on_select.as_mut() {
            handler(id);
        }
    }

    /// The user activated the pixel `(x, y)`. Returns the picked point id.
    pub fn activate_at(&mut self, x: i32, y: i32) -> Option<String> {
        let id = self.lifecycle.scene()?.renderer.pick_point(x, y)?;
        self.emit_selection(Some(id.clone()));
        Some(id)
    }

    /// The user asked to clear the selection
    pub fn clear_selection(&mut self) {
        self.emit_selection(None);
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn is_ready(&self) -> bool {
        self.viewport.is_ready()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.lifecycle.scene().map(|s| &s.renderer)
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.lifecycle.scene_mut().map(|s| &mut s.renderer)
    }

    /// Label visibility decided by the last tick
    pub fn label_visible(&self) -> Option<bool> {
        self.label_visible
    }

    pub fn frames(&self) -> u64 {
        self.frame_loop.frames()
    }
}
