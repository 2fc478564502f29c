//! Layered text-window compositor.
//!
//! Owns every display layer, their paint order, and the refresh cycle.
//! Layers live in a slotmap arena addressed by generational ids, so
//! destroying one layer never invalidates a handle to another. The paint
//! order is a separate vector; a layer's stored rank always equals its
//! 1-based position there.

pub mod backend;
pub mod layer;

use std::fmt;
use std::io;

use slotmap::SlotMap;

use crate::session::guard::{ScreenGuard, ScreenRestorer};
use backend::DisplayBackend;
use layer::{Layer, LayerId};

#[derive(Debug)]
pub enum CompositorError {
    /// The id does not name a live layer.
    UnknownLayer,
    /// Sub-layers are leaf-only: the parent is itself a child or already
    /// has one.
    NestedSubLayer,
    /// A display must always keep at least one surface.
    LastLayer,
    Io(io::Error),
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositorError::UnknownLayer => write!(f, "no such layer"),
            CompositorError::NestedSubLayer => {
                write!(f, "sub-layers are leaf-only; parent cannot take a child")
            }
            CompositorError::LastLayer => write!(f, "cannot destroy the last layer"),
            CompositorError::Io(err) => write!(f, "display error: {err}"),
        }
    }
}

impl std::error::Error for CompositorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompositorError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CompositorError {
    fn from(err: io::Error) -> Self {
        CompositorError::Io(err)
    }
}

pub struct Compositor {
    screen: ScreenGuard,
    backend: Box<dyn DisplayBackend>,
    layers: SlotMap<LayerId, Layer>,
    order: Vec<LayerId>,
    rows: u16,
    cols: u16,
}

impl Compositor {
    /// Acquire the terminal display (raw mode, alternate screen, hidden
    /// cursor) and start with no layers.
    pub fn new() -> Result<Self, CompositorError> {
        Self::with_parts(ScreenGuard::new()?, Box::new(backend::TerminalBackend))
    }

    /// Assemble from explicit parts; tests pass mock screen ops and a
    /// [`backend::TestBackend`].
    pub fn with_parts(
        screen: ScreenGuard,
        backend: Box<dyn DisplayBackend>,
    ) -> Result<Self, CompositorError> {
        let (rows, cols) = backend.size()?;
        Ok(Self {
            screen,
            backend,
            layers: SlotMap::with_key(),
            order: Vec::new(),
            rows,
            cols,
        })
    }

    /// Display size as `(rows, cols)`.
    pub fn screen_size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Paint order, lowest rank first.
    pub fn paint_order(&self) -> &[LayerId] {
        &self.order
    }

    /// Allocate a new top-level layer, painted above everything current.
    pub fn create_layer(&mut self, height: u16, width: u16, top: u16, left: u16) -> LayerId {
        let id = self.layers.insert(Layer::new(height, width, top, left));
        self.order.push(id);
        self.renumber();
        id
    }

    /// Allocate a layer nested inside `parent`; `top`/`left` are relative to
    /// the parent's surface. Rejected without touching any state when
    /// `parent` is itself a child or already has one.
    pub fn create_sub_layer(
        &mut self,
        parent: LayerId,
        height: u16,
        width: u16,
        top: u16,
        left: u16,
    ) -> Result<LayerId, CompositorError> {
        {
            let parent_layer = self
                .layers
                .get(parent)
                .ok_or(CompositorError::UnknownLayer)?;
            if parent_layer.parent.is_some() || parent_layer.child.is_some() {
                return Err(CompositorError::NestedSubLayer);
            }
        }

        let mut sub = Layer::new(height, width, top, left);
        sub.parent = Some(parent);
        let id = self.layers.insert(sub);
        if let Some(parent_layer) = self.layers.get_mut(parent) {
            parent_layer.child = Some(id);
        }
        self.order.push(id);
        self.renumber();
        Ok(id)
    }

    /// Destroy a layer, its child first. Refused when it would leave the
    /// display without a surface.
    pub fn destroy_layer(&mut self, id: LayerId) -> Result<(), CompositorError> {
        let child = self
            .layers
            .get(id)
            .ok_or(CompositorError::UnknownLayer)?
            .child;

        let removing = 1 + usize::from(child.is_some());
        if self.layers.len() <= removing {
            return Err(CompositorError::LastLayer);
        }

        if let Some(child) = child {
            self.remove_single(child);
        }
        self.remove_single(id);
        self.renumber();
        Ok(())
    }

    fn remove_single(&mut self, id: LayerId) {
        if let Some(removed) = self.layers.remove(id) {
            if let Some(parent) = removed.parent {
                if let Some(parent_layer) = self.layers.get_mut(parent) {
                    parent_layer.child = None;
                }
            }
        }
        self.order.retain(|&other| other != id);
    }

    /// Move `id` to `new_rank` in the paint order. Ranks are 1-based and
    /// clamped into `[1, live_count]`; asking for the current rank is a
    /// no-op.
    pub fn reorder(&mut self, id: LayerId, new_rank: usize) -> Result<(), CompositorError> {
        let current = self
            .layers
            .get(id)
            .ok_or(CompositorError::UnknownLayer)?
            .rank;
        if self.order.len() < 2 {
            return Ok(());
        }
        let rank = new_rank.clamp(1, self.order.len());
        if rank == current {
            return Ok(());
        }
        self.order.retain(|&other| other != id);
        self.order.insert(rank - 1, id);
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        debug_assert_eq!(self.order.len(), self.layers.len());
        for (idx, id) in self.order.iter().enumerate() {
            if let Some(layer) = self.layers.get_mut(*id) {
                layer.rank = idx + 1;
            }
        }
    }

    fn absolute_origin(&self, layer: &Layer) -> (u16, u16) {
        match layer.parent.and_then(|parent| self.layers.get(parent)) {
            Some(parent) => (
                parent.top.saturating_add(layer.top),
                parent.left.saturating_add(layer.left),
            ),
            None => (layer.top, layer.left),
        }
    }

    /// Repaint every layer in ascending rank; higher ranks occlude lower.
    /// A no-op while the display is stopped.
    pub fn refresh(&mut self) -> Result<(), CompositorError> {
        if !self.screen.is_active() {
            return Ok(());
        }
        let mut frame = Frame::new(self.rows, self.cols);
        for &id in &self.order {
            let Some(layer) = self.layers.get(id) else {
                continue;
            };
            let (top, left) = self.absolute_origin(layer);
            frame.blit(layer, top, left);
        }
        self.backend.present(&frame.into_rows())?;
        Ok(())
    }

    /// Release the display so another program can own the terminal.
    /// Idempotent and callable mid-session; [`start`](Self::start)
    /// re-acquires it.
    pub fn stop(&mut self) -> io::Result<()> {
        self.screen.suspend()
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.screen.resume()
    }

    /// Release-only handle for signal handlers and panic paths.
    pub fn restorer(&self) -> ScreenRestorer {
        self.screen.restorer()
    }
}

/// Composition scratch: the full display as one opaque grid.
struct Frame {
    rows: u16,
    cols: u16,
    cells: Vec<char>,
}

impl Frame {
    fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![' '; rows as usize * cols as usize],
        }
    }

    fn blit(&mut self, layer: &Layer, top: u16, left: u16) {
        let (height, width) = layer.size();
        for r in 0..height {
            let y = top.saturating_add(r);
            if y >= self.rows {
                break;
            }
            for c in 0..width {
                let x = left.saturating_add(c);
                if x >= self.cols {
                    break;
                }
                self.cells[y as usize * self.cols as usize + x as usize] = layer.cell(r, c);
            }
        }
    }

    fn into_rows(self) -> Vec<String> {
        (0..self.rows)
            .map(|y| {
                let start = y as usize * self.cols as usize;
                let mut out = String::with_capacity(self.cols as usize);
                for &ch in &self.cells[start..start + self.cols as usize] {
                    if ch != layer::CONTINUATION {
                        out.push(ch);
                    }
                }
                out
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/mod.rs"]
mod tests;
