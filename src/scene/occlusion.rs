//! Per-frame work: idle auto-rotation and hiding the body label when the
//! globe blocks the line of sight.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec3;

use crate::config::AutoRotateConfig;

/// Does the segment from `camera` to `body` cross a sphere of `radius` at the
/// origin?
///
/// Solves `a·t² + b·t + c = 0` for the ray `camera + t·(body - camera)`; the
/// body is occluded only if a root lies in `[0, 1]`, i.e. between camera and
/// body.
pub fn segment_hits_sphere(camera: DVec3, body: DVec3, radius: f64) -> bool {
    let d = body - camera;
    let a = d.dot(d);
    if a <= f64::EPSILON {
        return false;
    }
    let b = 2.0 * camera.dot(d);
    let c = camera.dot(camera) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return false;
    }
    let sqrt = disc.sqrt();
    let t1 = (-b - sqrt) / (2.0 * a);
    let t2 = (-b + sqrt) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Auto-rotate only when zoomed out past the threshold
#[inline]
pub fn should_auto_rotate(distance: Option<f64>, config: &AutoRotateConfig) -> bool {
    distance.is_some_and(|d| d > config.distance)
}

/// Cancellation flag shared between the frame loop and its owner
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Runs on every display refresh until its token is cancelled
#[derive(Debug, Default)]
pub struct FrameLoop {
    token: Option<CancelToken>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh loop, cancelling any previous one
    pub fn start(&mut self) -> CancelToken {
        self.cancel();
        let token = CancelToken::new();
        self.token = Some(token.clone());
        self.frames = 0;
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    /// Check at the top of a tick whether it may run. Counts the frame if so.
    pub fn begin_tick(&mut self) -> bool {
        match &self.token {
            Some(token) if !token.is_cancelled() => {
                self.frames += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 100.0;

    #[test]
    fn test_body_behind_globe_is_occluded() {
        let camera = DVec3::new(250.0, 0.0, 0.0);
        let body = DVec3::new(-6030.0, 0.0, 0.0);
        assert!(segment_hits_sphere(camera, body, R));
    }

    #[test]
    fn test_body_same_side_is_visible() {
        let camera = DVec3::new(250.0, 0.0, 0.0);
        let body = DVec3::new(6030.0, 0.0, 0.0);
        assert!(!segment_hits_sphere(camera, body, R));
    }

    #[test]
    fn test_miss_has_negative_discriminant() {
        let camera = DVec3::new(250.0, 0.0, 0.0);
        let body = DVec3::new(250.0, 500.0, 0.0);
        assert!(!segment_hits_sphere(camera, body, R));
    }

    #[test]
    fn test_sphere_beyond_body_not_occluding() {
        // globe lies further along the ray than the body
        let camera = DVec3::new(500.0, 0.0, 0.0);
        let body = DVec3::new(300.0, 0.0, 0.0);
        assert!(!segment_hits_sphere(camera, body, R));
    }

    #[test]
    fn test_sphere_behind_camera_not_occluding() {
        let camera = DVec3::new(-250.0, 0.0, 0.0);
        let body = DVec3::new(-6030.0, 0.0, 0.0);
        assert!(!segment_hits_sphere(camera, body, R));
    }

    #[test]
    fn test_grazing_off_axis() {
        let camera = DVec3::new(250.0, 0.0, 0.0);
        assert!(segment_hits_sphere(camera, DVec3::new(-6030.0, 50.0, 0.0), R));
        assert!(!segment_hits_sphere(camera, DVec3::new(-6030.0, 6030.0, 0.0), R));
    }

    #[test]
    fn test_auto_rotate_threshold() {
        let config = AutoRotateConfig::default();
        assert!(should_auto_rotate(Some(250.0), &config));
        assert!(!should_auto_rotate(Some(200.0), &config));
        assert!(!should_auto_rotate(Some(160.0), &config));
        assert!(!should_auto_rotate(None, &config));
    }

    #[test]
    fn test_frame_loop_stops_after_cancel() {
        let mut frame_loop = FrameLoop::new();
        assert!(!frame_loop.begin_tick());
        let token = frame_loop.start();
        assert!(frame_loop.begin_tick());
        assert!(frame_loop.begin_tick());
        token.cancel();
        assert!(!frame_loop.begin_tick());
        assert_eq!(frame_loop.frames(), 2);
    }

    #[test]
    fn test_restart_cancels_old_token() {
        let mut frame_loop = FrameLoop::new();
        let old = frame_loop.start();
        let new = frame_loop.start();
        assert!(old.is_cancelled());
        assert!(!new.is_cancelled());
        assert!(frame_loop.is_running());
        frame_loop.cancel();
        assert!(new.is_cancelled());
        assert!(!frame_loop.is_running());
    }
}
