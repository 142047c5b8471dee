//! Text labels rasterized onto a small canvas used as a sprite texture.

/// Pixel size of the label canvas
pub const LABEL_CANVAS_WIDTH: u32 = 256;
pub const LABEL_CANVAS_HEIGHT: u32 = 128;

/// Pixel size of one glyph cell on the canvas
const GLYPH_WIDTH: u32 = 16;
const GLYPH_HEIGHT: u32 = 32;

/// A character grid that text is rasterized onto.
///
/// Blank cells are spaces. A canvas with no area has no drawing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCanvas {
    width: u32,
    height: u32,
    cells: Vec<Vec<char>>,
}

impl TextCanvas {
    /// Canvas of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        let cols = (width / GLYPH_WIDTH) as usize;
        let rows = (height / GLYPH_HEIGHT) as usize;
        Self {
            width,
            height,
            cells: vec![vec![' '; cols]; rows],
        }
    }

    /// Drawing context, or `None` if the canvas cannot hold a single glyph
    pub fn context(&mut self) -> Option<TextContext<'_>> {
        if self.cells.is_empty() || self.cells[0].is_empty() {
            return None;
        }
        Some(TextContext { canvas: self })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|&c| c == ' ')
    }

    /// Non-blank rows, trimmed
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim().to_string())
            .filter(|line| !line.is_empty())
    }
}

/// Drawing operations on a [`TextCanvas`]
pub struct TextContext<'a> {
    canvas: &'a mut TextCanvas,
}

impl TextContext<'_> {
    pub fn clear(&mut self) {
        for row in &mut self.canvas.cells {
            row.fill(' ');
        }
    }

    /// Draw `text` centered on both axes, truncated to the canvas width
    pub fn fill_text_centered(&mut self, text: &str) {
        let rows = self.canvas.cells.len();
        let cols = self.canvas.cells[0].len();
        let glyphs: Vec<char> = text.chars().take(cols).collect();
        let row = (rows - 1) / 2;
        let start = (cols - glyphs.len()) / 2;
        for (i, ch) in glyphs.into_iter().enumerate() {
            self.canvas.cells[row][start + i] = ch;
        }
    }
}

/// Rasterize a label. Without a drawing context the canvas stays blank.
pub fn rasterize_label(text: &str, width: u32, height: u32) -> TextCanvas {
    let mut canvas = TextCanvas::new(width, height);
    match canvas.context() {
        Some(mut ctx) => {
            ctx.clear();
            ctx.fill_text_centered(text);
        }
        None => tracing::warn!(width, height, "no drawing context for label {:?}, leaving it blank", text),
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_centered() {
        let canvas = rasterize_label("Moon", LABEL_CANVAS_WIDTH, LABEL_CANVAS_HEIGHT);
        assert!(!canvas.is_blank());
        assert_eq!(canvas.lines().collect::<Vec<_>>(), vec!["Moon"]);
        // 16 columns, 4 rows: text sits on row 1 starting at column 6
        assert_eq!(canvas.cells[1][6], 'M');
    }

    #[test]
    fn test_long_label_truncated() {
        let canvas = rasterize_label("abcdefghijklmnopqrstuvwxyz", LABEL_CANVAS_WIDTH, LABEL_CANVAS_HEIGHT);
        assert_eq!(canvas.lines().next().unwrap(), "abcdefghijklmnop");
    }

    #[test]
    fn test_no_context_gives_blank_canvas() {
        let mut canvas = TextCanvas::new(8, 8);
        assert!(canvas.context().is_none());
        let canvas = rasterize_label("Moon", 0, LABEL_CANVAS_HEIGHT);
        assert!(canvas.is_blank());
        assert_eq!(canvas.size(), (0, LABEL_CANVAS_HEIGHT));
    }

    #[test]
    fn test_multibyte_text() {
        let canvas = rasterize_label("Луна", LABEL_CANVAS_WIDTH, LABEL_CANVAS_HEIGHT);
        assert_eq!(canvas.lines().collect::<Vec<_>>(), vec!["Луна"]);
    }
}
