use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::ui::{layout, AppLayout};
use place_globe::config::SceneConfig;
use place_globe::map::TerminalGlobe;
use place_globe::places::{self, Place};
use place_globe::scene::assets::AssetSource;
use place_globe::scene::GlobeScene;

/// Application state
pub struct App {
    /// Places, newest first
    pub places: Vec<Place>,
    pub selected_id: Option<String>,
    pub scene: GlobeScene<TerminalGlobe>,
    /// Selection changes reported by the scene
    selections: Receiver<Option<String>>,
    /// Highlighted row in the places panel
    pub list_cursor: usize,
    /// First visible row in the places panel
    pub list_offset: usize,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current press turned into a drag
    dragged: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Tooltip for whatever is under the cursor
    pub hover: Option<String>,
    regions: AppLayout,
}

impl App {
    pub fn new(mut places: Vec<Place>, config: SceneConfig, assets: Arc<dyn AssetSource>) -> Self {
        places::sort_by_date_desc(&mut places);
        let label_color = config.body.label_color.clone();

        let (tx, selections) = mpsc::channel();
        let mut scene = GlobeScene::new(config, assets);
        scene.on_selection_change(move |id| {
            // receiver lives as long as the app; nothing to do once it is gone
            let _ = tx.send(id);
        });
        scene.mount(|| TerminalGlobe::new().with_label_color(&label_color));

        let mut app = Self {
            places,
            selected_id: None,
            scene,
            selections,
            list_cursor: 0,
            list_offset: 0,
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            hover: None,
            regions: AppLayout::default(),
        };
        app.sync_scene();
        app
    }

    /// Id of the most recent place
    pub fn current_id(&self) -> Option<&str> {
        places::current_place(&self.places).map(|p| p.id.as_str())
    }

    fn sync_scene(&mut self) {
        let current = places::current_place(&self.places).map(|p| p.id.clone());
        self.scene
            .update(&self.places, current.as_deref(), self.selected_id.as_deref());
    }

    /// Recompute the screen layout for a terminal of the given size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.regions = layout(Rect::new(0, 0, width, height));
        let inner = self.regions.globe_inner;
        // Braille gives 2x4 resolution per character
        self.scene
            .resize(i64::from(inner.width) * 2, i64::from(inner.height) * 4);
        self.keep_cursor_visible();
    }

    /// Advance one frame: apply selection changes, then animate
    pub fn tick(&mut self, dt: Duration) {
        while let Ok(id) = self.selections.try_recv() {
            self.set_selection(id);
        }
        self.scene.tick(dt);
        if let Some(globe) = self.scene.renderer_mut() {
            globe.advance(dt);
        }
        self.update_hover();
    }

    fn set_selection(&mut self, id: Option<String>) {
        if self.selected_id == id {
            return;
        }
        info!(selected = ?id, "selection changed");
        if let Some(index) = id.as_deref().and_then(|id| self.places.iter().position(|p| p.id == id)) {
            self.list_cursor = index;
            self.keep_cursor_visible();
        }
        self.selected_id = id;
        self.sync_scene();
    }

    /// Activate a panel entry. Activating the selected entry again clears it.
    pub fn activate_entry(&mut self, index: usize) {
        let Some(place) = self.places.get(index) else {
            return;
        };
        self.list_cursor = index;
        let id = place.id.clone();
        if self.selected_id.as_deref() == Some(id.as_str()) {
            self.set_selection(None);
        } else {
            self.set_selection(Some(id));
        }
    }

    pub fn activate_cursor(&mut self) {
        self.activate_entry(self.list_cursor);
    }

    /// Esc: drop the selection
    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.places.is_empty() {
            return;
        }
        let last = self.places.len() as isize - 1;
        self.list_cursor = (self.list_cursor as isize + delta).clamp(0, last) as usize;
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&mut self) {
        let height = self.regions.panel_inner.height as usize;
        if height == 0 {
            return;
        }
        if self.list_cursor < self.list_offset {
            self.list_offset = self.list_cursor;
        } else if self.list_cursor >= self.list_offset + height {
            self.list_offset = self.list_cursor + 1 - height;
        }
    }

    /// Orbit the camera by a key press
    pub fn orbit(&mut self, dx: i32, dy: i32) {
        if let Some(globe) = self.scene.renderer_mut() {
            globe.orbit(dx, dy);
        }
    }

    pub fn zoom(&mut self, steps: i32) {
        if let Some(globe) = self.scene.renderer_mut() {
            globe.zoom(steps);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag for orbiting
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (col as i32 - last_col as i32) * 2;
            let dy = (row as i32 - last_row as i32) * 4;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.orbit(dx, dy);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Mouse release: a press without drag is a click
    pub fn release(&mut self, col: u16, row: u16) {
        let clicked = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if !clicked {
            return;
        }
        if let Some((x, y)) = self.globe_pixel(col, row) {
            if self.scene.activate_at(x, y).is_none() {
                debug!(x, y, "click hit no point");
            }
        } else if let Some(index) = self.panel_entry(col, row) {
            self.activate_entry(index);
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.update_hover();
    }

    fn update_hover(&mut self) {
        let pixel = self.mouse_pos.and_then(|(col, row)| self.globe_pixel(col, row));
        self.hover = pixel.and_then(|(x, y)| self.scene.renderer()?.hover_label(x, y));
    }

    /// Braille pixel at the center of a terminal cell inside the globe
    fn globe_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let inner = self.regions.globe_inner;
        if !contains(inner, col, row) {
            return None;
        }
        let x = (col - inner.x) as i32 * 2 + 1;
        let y = (row - inner.y) as i32 * 4 + 2;
        Some((x, y))
    }

    /// Places panel entry under a terminal cell
    fn panel_entry(&self, col: u16, row: u16) -> Option<usize> {
        let inner = self.regions.panel_inner;
        if !contains(inner, col, row) {
            return None;
        }
        let index = self.list_offset + (row - inner.y) as usize;
        (index < self.places.len()).then_some(index)
    }

    /// Camera position for the status bar
    pub fn camera_summary(&self) -> String {
        match self.scene.renderer() {
            Some(globe) => {
                let pose = globe.pose();
                let ns = if pose.lat >= 0.0 { 'N' } else { 'S' };
                let ew = if pose.lng >= 0.0 { 'E' } else { 'W' };
                format!(
                    "{:.1}°{} {:.1}°{} alt {:.2}",
                    pose.lat.abs(),
                    ns,
                    pose.lng.abs(),
                    ew,
                    pose.altitude
                )
            }
            None => "no globe".to_string(),
        }
    }
}

fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use place_globe::scene::assets::FsAssetSource;

    fn app() -> App {
        let mut config = SceneConfig::default();
        config.imagery.ground_high = None;
        config.body.texture = None;
        config.overlay.path = None;
        let mut app = App::new(
            places::sample_places(),
            config,
            Arc::new(FsAssetSource::new("/nonexistent")),
        );
        app.resize(120, 40);
        app
    }

    #[test]
    fn test_current_is_most_recent() {
        let app = app();
        assert_eq!(app.current_id(), Some("kotelniki-2023-08-01"));
        assert_eq!(app.places[0].id, "kotelniki-2023-08-01");
        assert!(app.scene.is_ready());
    }

    #[test]
    fn test_activating_selected_entry_toggles_off() {
        let mut app = app();
        app.activate_entry(2);
        assert_eq!(app.selected_id.as_deref(), Some(app.places[2].id.as_str()));
        app.activate_entry(2);
        assert_eq!(app.selected_id, None);
    }

    #[test]
    fn test_escape_clears_through_scene_callback() {
        let mut app = app();
        app.activate_entry(1);
        app.clear_selection();
        assert!(app.selected_id.is_some());
        app.tick(Duration::from_millis(16));
        assert_eq!(app.selected_id, None);
    }

    #[test]
    fn test_click_on_panel_row_selects() {
        let mut app = app();
        let inner = app.regions.panel_inner;
        app.press(inner.x + 1, inner.y + 3);
        app.release(inner.x + 1, inner.y + 3);
        assert_eq!(app.selected_id.as_deref(), Some(app.places[3].id.as_str()));
    }

    #[test]
    fn test_drag_does_not_click() {
        let mut app = app();
        let inner = app.regions.panel_inner;
        app.press(inner.x + 1, inner.y);
        app.handle_drag(inner.x + 3, inner.y);
        app.release(inner.x + 3, inner.y);
        assert_eq!(app.selected_id, None);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut app = app();
        app.move_cursor(-3);
        assert_eq!(app.list_cursor, 0);
        app.move_cursor(100);
        assert_eq!(app.list_cursor, app.places.len() - 1);
    }
}
