use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use glam::DVec3;
use ratatui::style::Color;
use tracing::{debug, warn};

use crate::braille::BrailleCanvas;
use crate::config::{ControlConfig, ImageryConfig};
use crate::data::{coastlines_from_bytes, simple_world};
use crate::hash::scatter;
use crate::map::camera::{CameraPose, CameraRig};
use crate::map::geometry::{draw_circle, draw_circle_outline, draw_line};
use crate::map::globe::{lonlat_to_vec3, walk_great_circle, GlobeViewport};
use crate::scene::occlusion::segment_hits_sphere;
use crate::scene::overlay::{BoundaryOverlay, OverlayStyle};
use crate::scene::renderer::{CameraTarget, GlobeRenderer, NodeId, ResourceDesc, ResourceId, SceneNode};
use crate::scene::sync::{DerivedPoint, RingStyle, VisualAttributes, VisualTable};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Globe radius in world units
pub const GLOBE_RADIUS: f64 = 100.0;
/// Globe radius on screen at distance 1, as a share of half the short side
const SCREEN_FIT: f64 = 2.0;
/// Rings narrower than this would vanish between braille dots
const MIN_RING_SPAN_PX: f64 = 6.0;
const PICK_SLOP_PX: f64 = 2.0;
/// One star per this many pixels of background
const STAR_SPACING: usize = 48;

/// A braille layer drawn in one color
pub struct Layer {
    pub color: Color,
    pub canvas: BrailleCanvas,
}

/// Text placed over the braille layers, in character cells
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: Color,
}

/// Rendered globe layers, back to front
pub struct GlobeLayers {
    pub background: Color,
    pub layers: Vec<Layer>,
    pub labels: Vec<TextLabel>,
    cols: usize,
    rows: usize,
}

impl GlobeLayers {
    fn new(background: Color, cols: usize, rows: usize) -> Self {
        Self {
            background,
            layers: Vec::new(),
            labels: Vec::new(),
            cols,
            rows,
        }
    }

    /// Canvas for `color`, created on first use
    fn canvas(&mut self, color: Color) -> &mut BrailleCanvas {
        let index = match self.layers.iter().position(|l| l.color == color) {
            Some(index) => index,
            None => {
                self.layers.push(Layer {
                    color,
                    canvas: BrailleCanvas::new(self.cols, self.rows),
                });
                self.layers.len() - 1
            }
        };
        &mut self.layers[index].canvas
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.canvas.is_blank()) && self.labels.is_empty()
    }
}

struct StyledPoint {
    point: DerivedPoint,
    attrs: VisualAttributes,
    color: Color,
}

struct StyledRing {
    lat: f64,
    lng: f64,
    color: Color,
}

#[derive(Debug, Clone, Copy)]
struct RingTiming {
    max_radius: f64,
    propagation_speed: f64,
    repeat_period: f64,
}

struct Node {
    kind: SceneNode,
    visible: bool,
}

impl Node {
    fn position(&self) -> DVec3 {
        match self.kind {
            SceneNode::Mesh { position, .. } | SceneNode::Sprite { position, .. } => position,
        }
    }

    fn set_position(&mut self, to: DVec3) {
        match &mut self.kind {
            SceneNode::Mesh { position, .. } | SceneNode::Sprite { position, .. } => *position = to,
        }
    }
}

struct Palette {
    ground: Color,
    background: Color,
    atmosphere: Color,
    overlay: Color,
    label: Color,
}

/// Parse a `#rrggbb` or named color, falling back to white
pub fn parse_color(text: &str) -> Color {
    Color::from_str(text).unwrap_or_else(|_| {
        warn!(color = text, "unrecognized color");
        Color::White
    })
}

/// Globe renderer drawing into braille layers for the terminal
pub struct TerminalGlobe {
    radius: f64,
    size: (u32, u32),
    imagery: ImageryConfig,
    palette: Palette,
    ground: Vec<LineString>,
    rig: CameraRig,
    points: Vec<StyledPoint>,
    rings: Vec<StyledRing>,
    ring_timing: RingTiming,
    overlays: Vec<BoundaryOverlay>,
    overlay_altitude: f64,
    resources: HashMap<ResourceId, ResourceDesc>,
    nodes: HashMap<NodeId, Node>,
    material_maps: HashMap<ResourceId, ResourceId>,
    next_id: u64,
    /// Seconds since creation, drives ring pulses
    elapsed: f64,
}

impl TerminalGlobe {
    pub fn new() -> Self {
        Self {
            radius: GLOBE_RADIUS,
            size: (0, 0),
            imagery: ImageryConfig::default(),
            palette: Palette {
                ground: Color::Cyan,
                background: Color::Reset,
                atmosphere: Color::Blue,
                overlay: Color::DarkGray,
                label: Color::White,
            },
            ground: Vec::new(),
            rig: CameraRig::new(CameraPose {
                lat: 0.0,
                lng: 0.0,
                altitude: 1.5,
            }),
            points: Vec::new(),
            rings: Vec::new(),
            ring_timing: RingTiming {
                max_radius: 0.0,
                propagation_speed: 0.0,
                repeat_period: 1.0,
            },
            overlays: Vec::new(),
            overlay_altitude: 0.0,
            resources: HashMap::new(),
            nodes: HashMap::new(),
            material_maps: HashMap::new(),
            next_id: 0,
            elapsed: 0.0,
        }
    }

    /// Color of text sprites
    pub fn with_label_color(mut self, color: &str) -> Self {
        self.palette.label = parse_color(color);
        self
    }

    pub fn pose(&self) -> CameraPose {
        self.rig.pose()
    }

    /// Advance animations: camera transition or auto-rotation, ring pulses
    pub fn advance(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();
        self.elapsed += dt;
        self.rig.advance(dt);
    }

    /// Orbit by a drag in braille pixels
    pub fn orbit(&mut self, dx: i32, dy: i32) {
        if let Some(vp) = self.viewport() {
            self.rig.orbit(dx as f64, dy as f64, vp.radius);
        }
    }

    /// Zoom by scroll notches, positive towards the globe
    pub fn zoom(&mut self, steps: i32) {
        self.rig.zoom(steps, self.radius);
    }

    /// Viewport for the current camera, or `None` while unsized
    pub fn viewport(&self) -> Option<GlobeViewport> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return None;
        }
        let pose = self.rig.pose();
        let half = width.min(height) as f64 / 2.0;
        let radius = half * SCREEN_FIT / pose.distance();
        Some(GlobeViewport::new(
            pose.lng,
            pose.lat,
            pose.distance(),
            radius,
            width as usize,
            height as usize,
        ))
    }

    fn camera_position(&self) -> DVec3 {
        let pose = self.rig.pose();
        lonlat_to_vec3(pose.lng, pose.lat) * pose.distance() * self.radius
    }

    /// Hover text at braille pixel (x, y): a point label, else the name of the
    /// region under the cursor
    pub fn hover_label(&self, x: i32, y: i32) -> Option<String> {
        if let Some(styled) = self.point_at(x, y) {
            return Some(styled.point.label.clone());
        }
        let (lon, lat) = self.viewport()?.unproject(x, y)?;
        self.overlays
            .iter()
            .find(|o| !o.name.is_empty() && o.contains(lon, lat))
            .map(|o| o.name.clone())
    }

    fn point_at(&self, x: i32, y: i32) -> Option<&StyledPoint> {
        let vp = self.viewport()?;
        self.points
            .iter()
            .filter_map(|styled| {
                let (px, py) = vp.project(styled.point.lng, styled.point.lat, styled.attrs.altitude)?;
                let dist = (((px - x) as f64).powi(2) + ((py - y) as f64).powi(2)).sqrt();
                let reach = marker_radius(&vp, &styled.attrs) as f64 + PICK_SLOP_PX;
                (dist <= reach).then_some((dist, styled))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, styled)| styled)
    }

    /// Render all layers at the current size
    pub fn render(&self) -> GlobeLayers {
        let cols = self.size.0 as usize / 2;
        let rows = self.size.1 as usize / 4;
        let mut layers = GlobeLayers::new(self.palette.background, cols, rows);
        let Some(vp) = self.viewport() else {
            return layers;
        };
        let (cx, cy) = vp.center();

        if self.imagery.show_stars {
            self.draw_stars(layers.canvas(Color::Gray), &vp);
        }
        if self.imagery.show_atmosphere {
            let r = vp.radius * (1.0 + self.imagery.atmosphere_altitude);
            draw_circle_outline(layers.canvas(self.palette.atmosphere), cx, cy, r.round() as i32);
        }

        let ground = layers.canvas(self.palette.ground);
        draw_circle_outline(ground, cx, cy, vp.radius.round() as i32);
        for line in &self.ground {
            draw_sphere_line(ground, &vp, line, 0.0);
        }

        let overlay = layers.canvas(self.palette.overlay);
        for ring in self.overlays.iter().flat_map(|o| o.rings()) {
            draw_sphere_line(overlay, &vp, ring, self.overlay_altitude);
        }

        self.draw_rings(&mut layers, &vp);

        for styled in &self.points {
            if let Some((px, py)) = vp.project(styled.point.lng, styled.point.lat, styled.attrs.altitude) {
                draw_circle(layers.canvas(styled.color), px, py, marker_radius(&vp, &styled.attrs));
            }
        }

        self.draw_nodes(&mut layers, &vp);
        layers
    }

    fn draw_stars(&self, canvas: &mut BrailleCanvas, vp: &GlobeViewport) {
        let (cx, cy) = vp.center();
        let keep_out = vp.radius * (1.0 + self.imagery.atmosphere_altitude) + 1.0;
        let count = (vp.width * vp.height) / STAR_SPACING;
        for i in 0..count as u64 {
            let (x, y) = scatter(i, vp.width, vp.height);
            let d = (((x - cx) as f64).powi(2) + ((y - cy) as f64).powi(2)).sqrt();
            if d > keep_out {
                canvas.set_pixel_signed(x, y);
            }
        }
    }

    fn draw_rings(&self, layers: &mut GlobeLayers, vp: &GlobeViewport) {
        let timing = self.ring_timing;
        if timing.max_radius <= 0.0 || timing.propagation_speed <= 0.0 {
            return;
        }
        let lifetime = timing.max_radius / timing.propagation_speed;
        let span = vp.deg_to_pixels(timing.max_radius).max(MIN_RING_SPAN_PX);
        for ring in &self.rings {
            let Some((px, py)) = vp.project(ring.lng, ring.lat, 0.0) else {
                continue;
            };
            let canvas = layers.canvas(ring.color);
            // each period starts a new ring; older ones are still expanding
            let mut age = self.elapsed.rem_euclid(timing.repeat_period);
            while age < lifetime {
                let r = (age / lifetime) * span;
                draw_circle_outline(canvas, px, py, r.round() as i32);
                age += timing.repeat_period;
            }
        }
    }

    fn draw_nodes(&self, layers: &mut GlobeLayers, vp: &GlobeViewport) {
        let camera = self.camera_position();
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        for id in ids {
            let node = &self.nodes[&id];
            if !node.visible {
                continue;
            }
            let Some(((px, py), scale)) = vp.project_world(node.position(), self.radius) else {
                continue;
            };
            if !vp.is_visible(px, py) {
                continue;
            }
            match &node.kind {
                SceneNode::Mesh { geometry, materials, position } => {
                    if segment_hits_sphere(camera, *position, self.radius) {
                        continue;
                    }
                    let radius = match self.resources.get(geometry) {
                        Some(ResourceDesc::SphereGeometry { radius, .. }) => *radius,
                        _ => continue,
                    };
                    let material = materials.first();
                    let color = match material.and_then(|m| self.resources.get(m)) {
                        Some(ResourceDesc::PhongMaterial { color, .. }) => parse_color(color),
                        _ => Color::White,
                    };
                    let textured = material.is_some_and(|m| self.material_maps.contains_key(m));
                    let r = (radius * scale).round() as i32;
                    let canvas = layers.canvas(color);
                    if textured {
                        draw_circle(canvas, px, py, r);
                    } else {
                        draw_circle_outline(canvas, px, py, r);
                    }
                }
                SceneNode::Sprite { material, .. } => {
                    let Some(text) = self.sprite_text(*material) else {
                        continue;
                    };
                    let width = text.chars().count() as i32;
                    let col = px / 2 - width / 2;
                    let row = py / 4;
                    if col >= 0 && row >= 0 && (row as usize) < layers.rows {
                        layers.labels.push(TextLabel {
                            col: col as u16,
                            row: row as u16,
                            text,
                            color: self.palette.label,
                        });
                    }
                }
            }
        }
    }

    /// Text rasterized into a sprite material's texture
    fn sprite_text(&self, material: ResourceId) -> Option<String> {
        let Some(ResourceDesc::SpriteMaterial { map: Some(texture), .. }) = self.resources.get(&material) else {
            return None;
        };
        let Some(ResourceDesc::CanvasTexture(canvas)) = self.resources.get(texture) else {
            return None;
        };
        let text = canvas.lines().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Default for TerminalGlobe {
    fn default() -> Self {
        Self::new()
    }
}

fn marker_radius(vp: &GlobeViewport, attrs: &VisualAttributes) -> i32 {
    (vp.deg_to_pixels(attrs.radius).round() as i32).max(1)
}

/// Draw a lon/lat polyline on the visible hemisphere, following great circles
fn draw_sphere_line(canvas: &mut BrailleCanvas, vp: &GlobeViewport, line: &[(f64, f64)], altitude: f64) {
    let Some(&(first_lon, first_lat)) = line.first() else {
        return;
    };
    let (mut lon0, mut lat0) = (first_lon, first_lat);
    let mut prev = vp.project(lon0, lat0, altitude);

    for &(lon, lat) in &line[1..] {
        walk_great_circle(lon0, lat0, lon, lat, |plon, plat| {
            let next = vp.project(plon, plat, altitude);
            if let (Some(a), Some(b)) = (prev, next) {
                if vp.line_might_be_visible(a, b) {
                    draw_line(canvas, a.0, a.1, b.0, b.1);
                }
            }
            prev = next;
        });
        lon0 = lon;
        lat0 = lat;
    }
}

impl GlobeRenderer for TerminalGlobe {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_imagery(&mut self, imagery: &ImageryConfig) {
        self.palette.ground = parse_color(&imagery.ground_color);
        self.palette.background = parse_color(&imagery.background_color);
        self.palette.atmosphere = parse_color(&imagery.atmosphere_color);
        self.imagery = imagery.clone();
        self.ground = simple_world();
    }

    fn set_ground_texture(&mut self, data: &[u8]) -> bool {
        let mut bytes = data.to_vec();
        match coastlines_from_bytes(&mut bytes) {
            Ok(lines) if !lines.is_empty() => {
                debug!(lines = lines.len(), "ground linework replaced");
                self.ground = lines;
                true
            }
            Ok(_) => false,
            Err(e) => {
                debug!("ground data rejected: {}", e);
                false
            }
        }
    }

    fn configure_controls(&mut self, controls: &ControlConfig) {
        self.rig.configure(controls);
    }

    fn set_auto_rotate(&mut self, enabled: bool, speed: f64) {
        self.rig.set_auto_rotate(enabled, speed);
    }

    fn camera_distance(&self) -> Option<f64> {
        Some(self.rig.pose().distance() * self.radius)
    }

    fn camera_world_position(&self) -> Option<DVec3> {
        Some(self.camera_position())
    }

    fn set_points(&mut self, points: &[DerivedPoint], style: &VisualTable) {
        self.points = points
            .iter()
            .map(|point| {
                let attrs = style.attributes(point).clone();
                StyledPoint {
                    color: parse_color(&attrs.color),
                    attrs,
                    point: point.clone(),
                }
            })
            .collect();
        // selected and current draw last so they stay on top
        self.points.sort_by_key(|p| u8::from(p.point.is_current) + 2 * u8::from(p.point.is_selected));
    }

    fn set_rings(&mut self, rings: &[DerivedPoint], style: &RingStyle) {
        self.ring_timing = RingTiming {
            max_radius: style.max_radius,
            propagation_speed: style.propagation_speed,
            repeat_period: (style.repeat_period_ms as f64 / 1000.0).max(1e-3),
        };
        self.rings = rings
            .iter()
            .map(|point| StyledRing {
                lat: point.lat,
                lng: point.lng,
                color: parse_color(style.color(point)),
            })
            .collect();
    }

    fn set_overlays(&mut self, overlays: &[BoundaryOverlay], style: &OverlayStyle) {
        self.overlays = overlays.to_vec();
        self.overlay_altitude = style.altitude;
        self.palette.overlay = parse_color(&style.stroke_color);
    }

    fn set_camera_target(&mut self, target: &CameraTarget, duration: Duration) {
        self.rig.fly_to(
            CameraPose {
                lat: target.lat,
                lng: target.lng,
                altitude: target.altitude,
            },
            duration,
        );
    }

    fn pick_point(&self, x: i32, y: i32) -> Option<String> {
        self.point_at(x, y).map(|styled| styled.point.id.clone())
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
        if self.resources.remove(&id).is_none() {
            warn!(?id, "disposing unknown resource");
        }
        self.material_maps.remove(&id);
        self.material_maps.retain(|_, texture| *texture != id);
    }

    fn add_node(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next());
        self.nodes.insert(id, Node { kind: node, visible: true });
        id
    }

    fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    fn set_node_position(&mut self, id: NodeId, position: DVec3) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_position(position);
        }
    }

    fn set_node_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    fn body_world_position(&self, id: NodeId) -> Option<DVec3> {
        self.nodes.get(&id).map(Node::position)
    }

    fn set_material_map(&mut self, material: ResourceId, texture: ResourceId) {
        self.material_maps.insert(material, texture);
    }

    fn clear_container(&mut self) {
        if !self.resources.is_empty() || !self.nodes.is_empty() {
            warn!(
                resources = self.resources.len(),
                nodes = self.nodes.len(),
                "clearing container with live scene objects"
            );
        }
        self.resources.clear();
        self.nodes.clear();
        self.material_maps.clear();
        self.points.clear();
        self.rings.clear();
        self.overlays.clear();
        self.ground.clear();
    }
}
