use crate::app::App;
use place_globe::map::GlobeLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Widget},
    Frame,
};

/// Width of the places panel, in cells
const PANEL_WIDTH: u16 = 34;

/// Screen regions, shared by drawing and mouse hit-testing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppLayout {
    pub globe: Rect,
    pub globe_inner: Rect,
    pub panel: Rect,
    pub panel_inner: Rect,
    pub status: Rect,
}

pub fn layout(area: Rect) -> AppLayout {
    // Split into main area and status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe + panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)])
        .split(rows[0]);

    let globe = columns[0];
    let panel = columns[1];
    AppLayout {
        globe,
        globe_inner: Block::default().borders(Borders::ALL).inner(globe),
        panel,
        panel_inner: Block::default().borders(Borders::ALL).inner(panel),
        status: rows[1],
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let regions = layout(frame.area());
    render_globe(frame, app, regions.globe);
    render_places(frame, app, regions.panel);
    render_status_bar(frame, app, regions.status);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(globe) = app.scene.renderer() else {
        return;
    };

    // Get mouse cursor position for marker
    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        let inside = col >= inner.x && col < inner.x + inner.width && row >= inner.y && row < inner.y + inner.height;
        inside.then(|| (col - inner.x, row - inner.y))
    });

    frame.render_widget(GlobeWidget { layers: globe.render(), cursor_pos }, inner);
}

/// Custom widget that renders braille globe layers with text labels overlaid
struct GlobeWidget {
    layers: GlobeLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl GlobeWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &place_globe::braille::BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.layers.background));

        // Layers come back to front
        for layer in &self.layers.layers {
            Self::render_layer(&layer.canvas, layer.color, area, buf);
        }

        for label in &self.layers.labels {
            if label.row >= area.height || label.col >= area.width {
                continue;
            }
            let x = area.x + label.col;
            let y = area.y + label.row;
            let max_len = area.width.saturating_sub(label.col) as usize;
            for (i, ch) in label.text.chars().take(max_len).enumerate() {
                buf[(x + i as u16, y)].set_char(ch).set_fg(label.color);
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_places(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_id();
    let selected = app.selected_id.as_deref();

    let items: Vec<ListItem> = app
        .places
        .iter()
        .map(|place| {
            let is_selected = selected == Some(place.id.as_str());
            let is_current = current == Some(place.id.as_str());
            let marker = match (is_selected, is_current) {
                (true, _) => Span::styled("◆ ", Style::default().fg(Color::LightBlue)),
                (false, true) => Span::styled("● ", Style::default().fg(Color::Yellow)),
                (false, false) => Span::styled("○ ", Style::default().fg(Color::DarkGray)),
            };
            let title_style = if is_selected {
                Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                marker,
                Span::styled(place.title.clone(), title_style),
                Span::styled(format!("  {}", place.date), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " Places ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default()
        .with_offset(app.list_offset)
        .with_selected(Some(app.list_cursor).filter(|_| !app.places.is_empty()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    match &app.hover {
        Some(text) => spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Yellow))),
        None => spans.push(Span::styled(format!(" {} ", app.camera_summary()), Style::default().fg(Color::Cyan))),
    }
    if !app.scene.is_ready() {
        spans.push(Span::styled("| waiting for layout ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
        "| hjkl:orbit +/-:zoom tab:next enter:select esc:clear q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_reserves_panel_and_status() {
        let regions = layout(Rect::new(0, 0, 120, 40));
        assert_eq!(regions.status, Rect::new(0, 39, 120, 1));
        assert_eq!(regions.panel.width, PANEL_WIDTH);
        assert_eq!(regions.globe.width, 120 - PANEL_WIDTH);
        assert_eq!(regions.globe_inner, Rect::new(1, 1, 120 - PANEL_WIDTH - 2, 37));
    }
}
