use tracing::debug;

use crate::scene::renderer::GlobeRenderer;

/// Tracks the host container's pixel box and forwards it to the renderer.
///
/// `ready` turns on with the first positive size and stays on until
/// [`disconnect`](Self::disconnect). The last positive box survives a
/// disconnect so that reconnecting can replay it as the initial layout pass.
#[derive(Debug, Default)]
pub struct ViewportController {
    container: Option<(u32, u32)>,
    ready: bool,
    connected: bool,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing. Size reports are ignored while disconnected.
    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Record the container box without pushing it anywhere. Boxes that are
    /// empty or do not fit a pixel size are ignored.
    pub fn remember(&mut self, width: i64, height: i64) -> Option<(u32, u32)> {
        let size = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                debug!(width, height, "container not laid out yet, ignoring size");
                return None;
            }
        };
        self.container = Some(size);
        Some(size)
    }

    /// Handle a size report. Returns `true` if it was pushed to the renderer.
    pub fn observe<R: GlobeRenderer + ?Sized>(&mut self, width: i64, height: i64, renderer: &mut R) -> bool {
        let Some((width, height)) = self.remember(width, height) else {
            return false;
        };
        if !self.connected {
            return false;
        }
        self.push(width, height, renderer)
    }

    /// Initial layout pass: push the last known container box, if any.
    pub fn replay<R: GlobeRenderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        match self.container {
            Some((width, height)) if self.connected => self.push(width, height, renderer),
            _ => false,
        }
    }

    fn push<R: GlobeRenderer + ?Sized>(&mut self, width: u32, height: u32, renderer: &mut R) -> bool {
        renderer.set_size(width, height);
        if !self.ready {
            debug!(width, height, "viewport ready");
            self.ready = true;
        }
        true
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::testing::RecordingRenderer;

    #[test]
    fn test_zero_size_ignored() {
        let mut renderer = RecordingRenderer::new();
        let mut viewport = ViewportController::new();
        viewport.connect();
        assert!(!viewport.observe(0, 0, &mut renderer));
        assert!(!viewport.observe(640, 0, &mut renderer));
        assert!(!viewport.observe(0, 480, &mut renderer));
        assert!(!viewport.observe(-5, 480, &mut renderer));
        assert!(!viewport.is_ready());
        assert!(renderer.sizes.is_empty());
    }

    #[test]
    fn test_first_positive_size_sets_ready() {
        let mut renderer = RecordingRenderer::new();
        let mut viewport = ViewportController::new();
        viewport.connect();
        viewport.observe(0, 0, &mut renderer);
        assert!(viewport.observe(640, 480, &mut renderer));
        assert!(viewport.is_ready());
        assert!(viewport.observe(800, 600, &mut renderer));
        assert_eq!(renderer.sizes, vec![(640, 480), (800, 600)]);
        // a later zero report does not revert readiness
        viewport.observe(0, 0, &mut renderer);
        assert!(viewport.is_ready());
        assert_eq!(renderer.sizes.last(), Some(&(800, 600)));
    }

    #[test]
    fn test_oversized_box_ignored() {
        let mut renderer = RecordingRenderer::new();
        let mut viewport = ViewportController::new();
        viewport.connect();
        assert!(!viewport.observe(i64::from(u32::MAX) + 1, 480, &mut renderer));
        assert!(!viewport.observe(640, i64::MAX, &mut renderer));
        assert!(!viewport.is_ready());
        assert!(renderer.sizes.is_empty());
    }

    #[test]
    fn test_reconnect_replays_last_box() {
        let mut renderer = RecordingRenderer::new();
        let mut viewport = ViewportController::new();
        assert!(!viewport.replay(&mut renderer));
        viewport.connect();
        viewport.observe(800, 600, &mut renderer);
        viewport.disconnect();
        // resized while disconnected: remembered, not pushed
        assert!(!viewport.observe(1024, 768, &mut renderer));
        viewport.connect();
        assert!(!viewport.is_ready());
        assert!(viewport.replay(&mut renderer));
        assert!(viewport.is_ready());
        assert_eq!(renderer.sizes, vec![(800, 600), (1024, 768)]);
    }

    #[test]
    fn test_disconnect_resets_ready() {
        let mut renderer = RecordingRenderer::new();
        let mut viewport = ViewportController::new();
        viewport.connect();
        viewport.observe(100, 100, &mut renderer);
        viewport.disconnect();
        assert!(!viewport.is_ready());
        assert!(!viewport.observe(100, 100, &mut renderer));
        assert_eq!(renderer.sizes.len(), 1);
    }
}
