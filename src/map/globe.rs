use glam::DVec3;

/// Globe viewport looking at the origin from a point on the (lat, lng) axis.
/// The sphere is drawn orthographically; bodies far from the globe use a
/// perspective projection matched to the same scale at the globe's center.
/// Orientation stored as 3 orthonormal vectors for cheap point transforms.
#[derive(Clone, Debug)]
pub struct GlobeViewport {
    /// Unit vector from the origin towards the camera
    forward: DVec3,
    /// East on screen
    right: DVec3,
    /// North on screen
    up: DVec3,
    /// Globe radius in braille pixels
    pub radius: f64,
    /// Camera distance from the origin, in globe radii
    pub distance: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl GlobeViewport {
    /// Build a viewport centered on (lon, lat) seen from `distance` globe radii.
    pub fn new(center_lon: f64, center_lat: f64, distance: f64, radius: f64, width: usize, height: usize) -> Self {
        let forward = lonlat_to_vec3(center_lon, center_lat);

        // Derivative of forward w.r.t. latitude (points north on sphere)
        let (sin_lat, cos_lat) = center_lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = center_lon.to_radians().sin_cos();
        let raw_up = DVec3::new(-sin_lat * sin_lon, cos_lat, -sin_lat * cos_lon);

        let right = raw_up.cross(forward).normalize();
        let up = forward.cross(right).normalize();

        Self { forward, right, up, radius, distance, width, height }
    }

    /// Project a geographic point `altitude` globe radii above the surface.
    /// Returns `None` for points on the far hemisphere.
    pub fn project(&self, lon: f64, lat: f64, altitude: f64) -> Option<(i32, i32)> {
        let p = lonlat_to_vec3(lon, lat) * (1.0 + altitude);

        // Dot with forward: positive = front-facing
        if p.dot(self.forward) < 0.0 {
            return None;
        }
        Some(self.to_screen(p.dot(self.right), p.dot(self.up)))
    }

    /// Unproject screen pixels back to lon/lat.
    /// Returns `None` if the point is outside the sphere disk.
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let sx = (px as f64 - self.width as f64 / 2.0) / self.radius;
        let sy = -(py as f64 - self.height as f64 / 2.0) / self.radius;

        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }

        // Reconstruct 3D point on unit sphere
        let sz = (1.0 - r2).sqrt();
        let p = self.right * sx + self.up * sy + self.forward * sz;
        Some(vec3_to_lonlat(p))
    }

    /// Perspective projection of a world point, `globe_radius` world units
    /// per globe. Returns the pixel and the pixels per world unit at that
    /// depth, or `None` behind the camera.
    pub fn project_world(&self, point: DVec3, globe_radius: f64) -> Option<((i32, i32), f64)> {
        let camera = self.forward * self.distance * globe_radius;
        let v = point - camera;
        let depth = -v.dot(self.forward);
        if depth <= 1e-9 {
            return None;
        }
        // focal length chosen so the globe's center plane matches the orthographic scale
        let focal = self.radius * self.distance;
        let scale = focal / depth;
        let screen = self.offset_to_pixels(v.dot(self.right) * scale, v.dot(self.up) * scale);
        Some((screen, scale))
    }

    /// Unit-sphere screen coordinates to pixels
    fn to_screen(&self, sx: f64, sy: f64) -> (i32, i32) {
        self.offset_to_pixels(sx * self.radius, sy * self.radius)
    }

    fn offset_to_pixels(&self, dx: f64, dy: f64) -> (i32, i32) {
        let px = (self.width as f64 / 2.0 + dx).round() as i32;
        let py = (self.height as f64 / 2.0 - dy).round() as i32;
        (px, py)
    }

    /// Screen pixel of the globe's center
    pub fn center(&self) -> (i32, i32) {
        self.to_screen(0.0, 0.0)
    }

    /// Convert degrees to screen pixels along the surface.
    pub fn deg_to_pixels(&self, degrees: f64) -> f64 {
        degrees.to_radians() * self.radius
    }

    /// Check if a projected point is within the viewport.
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check).
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

/// Convert lon/lat (degrees) to a unit vector, y towards the north pole and
/// z through (0, 0).
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    DVec3::new(cos_lat * sin_lon, sin_lat, cos_lat * cos_lon)
}

#[inline(always)]
pub fn vec3_to_lonlat(p: DVec3) -> (f64, f64) {
    let lat = (p.y / p.length()).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.x.atan2(p.z).to_degrees();
    (lon, lat)
}

/// Interpolate along a great circle arc and call a visitor for each subdivision point.
/// Subdivides adaptively: ~2° segments for smooth curves at braille resolution.
/// Emits points to the visitor as it goes, without collecting them.
#[inline]
pub fn walk_great_circle(lon0: f64, lat0: f64, lon1: f64, lat1: f64, mut visitor: impl FnMut(f64, f64)) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos(); // angular distance in radians

    // ~2° segments
    let steps = ((angle.to_degrees() / 2.0).ceil() as usize).max(1);

    if steps == 1 {
        // Short segment, just emit endpoint
        visitor(lon1, lat1);
        return;
    }

    let sin_angle = angle.sin();
    if sin_angle.abs() < 1e-10 {
        // Points are nearly identical or antipodal
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let (lon, lat) = vec3_to_lonlat(a * sa + b * sb);
        visitor(lon, lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> GlobeViewport {
        GlobeViewport::new(0.0, 0.0, 2.5, 40.0, 200, 100)
    }

    #[test]
    fn test_world_frame_axes() {
        let east = lonlat_to_vec3(90.0, 0.0);
        assert!((east - DVec3::X).length() < 1e-12);
        let north = lonlat_to_vec3(0.0, 90.0);
        assert!((north - DVec3::Y).length() < 1e-12);
        assert!((lonlat_to_vec3(0.0, 0.0) - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_center_projects_to_middle() {
        assert_eq!(viewport().project(0.0, 0.0, 0.0), Some((100, 50)));
    }

    #[test]
    fn test_east_is_right_north_is_up() {
        let vp = viewport();
        let (ex, ey) = vp.project(30.0, 0.0, 0.0).unwrap();
        assert!(ex > 100);
        assert_eq!(ey, 50);
        let (nx, ny) = vp.project(0.0, 30.0, 0.0).unwrap();
        assert_eq!(nx, 100);
        assert!(ny < 50);
    }

    #[test]
    fn test_far_side_is_hidden() {
        assert!(viewport().project(180.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = GlobeViewport::new(37.0, 55.0, 1.6, 400.0, 1000, 1000);
        let (px, py) = vp.project(40.0, 50.0, 0.0).unwrap();
        let (lon, lat) = vp.unproject(px, py).unwrap();
        assert!((lon - 40.0).abs() < 0.5);
        assert!((lat - 50.0).abs() < 0.5);
        assert!(vp.unproject(0, 0).is_none());
    }

    #[test]
    fn test_perspective_matches_ortho_at_center_plane() {
        let vp = viewport();
        let (screen, scale) = vp.project_world(DVec3::new(100.0, 0.0, 0.0), 100.0).unwrap();
        // point at the center plane one globe radius east
        assert_eq!(screen, (140, 50));
        assert!((scale - 0.4).abs() < 1e-9);
        assert!(vp.project_world(DVec3::new(0.0, 0.0, 500.0), 100.0).is_none());
    }

    #[test]
    fn test_walk_great_circle_ends_at_target() {
        let mut last = None;
        let mut count = 0;
        walk_great_circle(0.0, 0.0, 20.0, 0.0, |lon, lat| {
            last = Some((lon, lat));
            count += 1;
        });
        let (lon, lat) = last.unwrap();
        assert!((lon - 20.0).abs() < 1e-9 && lat.abs() < 1e-9);
        assert_eq!(count, 10);
    }
}
