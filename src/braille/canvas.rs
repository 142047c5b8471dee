/// One color layer of the globe, drawn with Braille patterns (U+2800..U+28FF).
/// Each terminal cell holds a 2x4 grid of dots.
#[derive(Clone)]
pub struct BrailleCanvas {
    /// Size in cells
    width: usize,
    height: usize,
    /// Dot bits per cell, row-major
    pixels: Vec<Vec<u8>>,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![vec![0u8; width]; height],
        }
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.pixels[cy][cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// True if no dot is set
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|&b| b == 0)
    }

    /// Number of set dots
    pub fn dot_count(&self) -> u32 {
        self.pixels.iter().flatten().map(|b| b.count_ones()).sum()
    }

    /// One row of cells as Braille characters; empty cells are U+2800
    pub fn row_to_string(&self, row: usize) -> String {
        let Some(cells) = self.pixels.get(row) else {
            return String::new();
        };
        cells
            .iter()
            .map(|&b| char::from_u32(0x2800 + u32::from(b)).unwrap_or(' '))
            .collect()
    }

    /// Rows top to bottom, as drawn into the terminal buffer
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_dot_maps_to_braille_cell() {
        // pixel (3, 6) is the right column, third row of cell (1, 1)
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(3, 6);
        let rows: Vec<_> = canvas.rows().collect();
        assert_eq!(rows, vec!["\u{2800}\u{2800}", "\u{2800}\u{2820}"]);
        assert_eq!(canvas.dot_count(), 1);
    }

    #[test]
    fn test_full_cell_counts_eight_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.row_to_string(0), "\u{28ff}");
        assert_eq!(canvas.dot_count(), 8);
    }

    #[test]
    fn test_offscreen_stars_are_dropped() {
        let mut canvas = BrailleCanvas::new(4, 2);
        canvas.set_pixel_signed(-1, 3);
        canvas.set_pixel_signed(2, -4);
        canvas.set_pixel(8, 0);
        canvas.set_pixel(0, 8);
        assert!(canvas.is_blank());
        assert_eq!(canvas.row_to_string(5), "");
    }
}
