//! Display layers: opaque rectangular text surfaces.

use slotmap::new_key_type;
use unicode_width::UnicodeWidthChar;

new_key_type! {
    /// Stable handle to a layer. Generational: destroying a layer
    /// invalidates its id without ever aliasing another layer.
    pub struct LayerId;
}

/// Marks the trailing cell of a double-width glyph. Skipped when a row is
/// flattened to text.
pub(crate) const CONTINUATION: char = '\0';

/// One rectangular surface owned by the compositor.
///
/// Cells are opaque: a layer always paints its full rectangle, blanks
/// included, the way a terminal window does. A layer with a parent is a
/// leaf; sub-layers cannot nest further.
#[derive(Clone, Debug)]
pub struct Layer {
    pub(crate) height: u16,
    pub(crate) width: u16,
    pub(crate) top: u16,
    pub(crate) left: u16,
    pub(crate) rank: usize,
    pub(crate) parent: Option<LayerId>,
    pub(crate) child: Option<LayerId>,
    cells: Vec<char>,
}

impl Layer {
    pub(crate) fn new(height: u16, width: u16, top: u16, left: u16) -> Self {
        Self {
            height,
            width,
            top,
            left,
            rank: 0,
            parent: None,
            child: None,
            cells: vec![' '; height as usize * width as usize],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.height, self.width)
    }

    pub fn origin(&self) -> (u16, u16) {
        (self.top, self.left)
    }

    /// 1-based paint rank; higher paints later and occludes lower.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Blank the whole surface.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = ' ';
        }
    }

    pub(crate) fn cell(&self, row: u16, col: u16) -> char {
        if row >= self.height || col >= self.width {
            return ' ';
        }
        self.cells[row as usize * self.width as usize + col as usize]
    }

    fn set_cell(&mut self, row: u16, col: u16, ch: char) {
        if row < self.height && col < self.width {
            self.cells[row as usize * self.width as usize + col as usize] = ch;
        }
    }

    /// Write `text` starting at `(row, col)`, clipped to the surface. A wide
    /// glyph that would straddle the right edge is dropped rather than
    /// split.
    pub fn put_str(&mut self, row: u16, col: u16, text: &str) {
        if row >= self.height {
            return;
        }
        let mut x = col;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if x >= self.width || x.saturating_add(w) > self.width {
                break;
            }
            self.set_cell(row, x, ch);
            for dx in 1..w {
                self.set_cell(row, x + dx, CONTINUATION);
            }
            x += w;
        }
    }

    /// Draw a plain box border on the outermost cells.
    pub fn draw_border(&mut self) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        let right = self.width - 1;
        let bottom = self.height - 1;

        self.set_cell(0, 0, '┌');
        self.set_cell(0, right, '┐');
        self.set_cell(bottom, 0, '└');
        self.set_cell(bottom, right, '┘');
        for x in 1..right {
            self.set_cell(0, x, '─');
            self.set_cell(bottom, x, '─');
        }
        for y in 1..bottom {
            self.set_cell(y, 0, '│');
            self.set_cell(y, right, '│');
        }
    }

    /// One row flattened to text, continuation cells skipped.
    pub fn row_text(&self, row: u16) -> String {
        let mut out = String::with_capacity(self.width as usize);
        for col in 0..self.width {
            let ch = self.cell(row, col);
            if ch != CONTINUATION {
                out.push(ch);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/layer.rs"]
mod tests;
