use std::time::Duration;

use crate::config::ControlConfig;
use crate::geo::{shortest_lon_delta, wrap_lon};

/// Degrees per second of auto-rotation at speed 1.0
const AUTO_ROTATE_DEG_PER_SEC: f64 = 6.0;
/// Keeps the orbit off the poles
const MAX_LAT: f64 = 85.0;

/// Camera position as seen from the globe: above (lat, lng), `altitude`
/// globe radii off the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

impl CameraPose {
    /// Distance from the globe center in globe radii
    pub fn distance(&self) -> f64 {
        1.0 + self.altitude
    }
}

#[derive(Debug, Clone)]
struct Tween {
    from: CameraPose,
    to: CameraPose,
    duration: f64,
    elapsed: f64,
}

impl Tween {
    fn pose(&self) -> CameraPose {
        let t = ease_in_out_cubic((self.elapsed / self.duration).clamp(0.0, 1.0));
        CameraPose {
            lat: self.from.lat + (self.to.lat - self.from.lat) * t,
            lng: wrap_lon(self.from.lng + shortest_lon_delta(self.from.lng, self.to.lng) * t),
            altitude: self.from.altitude + (self.to.altitude - self.from.altitude) * t,
        }
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Orbit camera: animated transitions, auto-rotation and user orbit/zoom
#[derive(Debug, Clone)]
pub struct CameraRig {
    pose: CameraPose,
    tween: Option<Tween>,
    auto_rotate: bool,
    auto_rotate_speed: f64,
    controls: ControlConfig,
}

impl CameraRig {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            pose,
            tween: None,
            auto_rotate: false,
            auto_rotate_speed: 0.0,
            controls: ControlConfig::default(),
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn configure(&mut self, controls: &ControlConfig) {
        self.controls = controls.clone();
    }

    pub fn set_auto_rotate(&mut self, enabled: bool, speed: f64) {
        self.auto_rotate = enabled;
        self.auto_rotate_speed = speed;
    }

    /// Animate to `to`. A zero duration jumps.
    pub fn fly_to(&mut self, to: CameraPose, duration: Duration) {
        let duration = duration.as_secs_f64();
        if duration <= 0.0 {
            self.tween = None;
            self.pose = to;
            return;
        }
        self.tween = Some(Tween {
            from: self.pose,
            to,
            duration,
            elapsed: 0.0,
        });
    }

    pub fn advance(&mut self, dt: f64) {
        if let Some(tween) = self.tween.as_mut() {
            tween.elapsed += dt;
            self.pose = tween.pose();
            if tween.finished() {
                self.tween = None;
            }
            return;
        }
        if self.auto_rotate {
            self.pose.lng = wrap_lon(self.pose.lng + AUTO_ROTATE_DEG_PER_SEC * self.auto_rotate_speed * dt);
        }
    }

    /// Orbit by a drag of (dx, dy) pixels on a globe `radius_px` pixels wide.
    /// Cancels any running transition.
    pub fn orbit(&mut self, dx: f64, dy: f64, radius_px: f64) {
        if radius_px <= 0.0 {
            return;
        }
        self.tween = None;
        // surface follows the cursor
        self.pose.lng = wrap_lon(self.pose.lng - (dx / radius_px).to_degrees());
        self.pose.lat = (self.pose.lat + (dy / radius_px).to_degrees()).clamp(-MAX_LAT, MAX_LAT);
    }

    /// Zoom by `steps` notches (positive = closer), within the configured
    /// distance bounds. `globe_radius` converts distances to altitude.
    pub fn zoom(&mut self, steps: i32, globe_radius: f64) {
        if !self.controls.enable_zoom || steps == 0 || globe_radius <= 0.0 {
            return;
        }
        self.tween = None;
        let distance = self.pose.distance() * globe_radius;
        let scaled = distance / self.controls.zoom_speed.powi(steps);
        let clamped = scaled.clamp(self.controls.min_distance, self.controls.max_distance);
        self.pose.altitude = clamped / globe_radius - 1.0;
    }
}
