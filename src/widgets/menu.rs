//! Selectable list widget.

use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::compositor::layer::LayerId;
use crate::compositor::{Compositor, CompositorError};
use crate::input::event::Key;

#[derive(Debug)]
pub enum MenuError {
    /// `init` was given no non-empty lines to build items from.
    EmptyItems,
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::EmptyItems => write!(f, "menu has no items"),
        }
    }
}

impl std::error::Error for MenuError {}

#[derive(Clone, Debug)]
struct MenuItem {
    text: String,
    marked: bool,
}

/// A list bound to a frame layer (border and title) and a viewport layer
/// (the item window).
///
/// Two selection modes: single, where the highlight is the selection, and
/// toggle, where any number of rows may be marked. Navigation clamps at the
/// first and last item; it does not wrap.
pub struct Menu {
    frame: LayerId,
    viewport: LayerId,
    items: Vec<MenuItem>,
    current: usize,
    top: usize,
    page_rows: usize,
    togglable: bool,
    selected: bool,
    mark: String,
    title: String,
}

impl Menu {
    /// Bind to its two surfaces. Call [`init`](Self::init) before use.
    pub fn new(frame: LayerId, viewport: LayerId) -> Self {
        Self {
            frame,
            viewport,
            items: Vec::new(),
            current: 0,
            top: 0,
            page_rows: 1,
            togglable: false,
            selected: false,
            mark: " > ".to_string(),
            title: String::new(),
        }
    }

    /// Build one item per non-empty line of `items_text`, in order.
    /// Insertion order is display order and is never disturbed by
    /// selection.
    pub fn init(&mut self, items_text: &str) -> Result<(), MenuError> {
        let items: Vec<MenuItem> = items_text
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| MenuItem {
                text: line.to_string(),
                marked: false,
            })
            .collect();
        if items.is_empty() {
            return Err(MenuError::EmptyItems);
        }
        self.items = items;
        self.current = 0;
        self.top = 0;
        self.selected = false;
        Ok(())
    }

    /// Switch between single-selection and multi-toggle. Switching resets
    /// every mark; set this before the first event or paint if it should
    /// shape initial behavior.
    pub fn set_togglable(&mut self, togglable: bool) {
        self.togglable = togglable;
        for item in &mut self.items {
            item.marked = false;
        }
    }

    pub fn is_togglable(&self) -> bool {
        self.togglable
    }

    /// Change the visual prefix for highlighted/marked rows. Display only;
    /// selection semantics are unaffected.
    pub fn set_mark(&mut self, mark: &str) {
        self.mark = mark.to_string();
    }

    /// Set the instruction line overlaid on the frame's top row.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Index of the highlighted row.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Read and clear the confirm latch: true exactly once per confirm.
    pub fn take_selected(&mut self) -> bool {
        std::mem::take(&mut self.selected)
    }

    /// The current selection: the highlighted item's text in single mode;
    /// in toggle mode the marked items in insertion order, space-joined
    /// (empty when none are marked).
    pub fn selected_text(&self) -> String {
        if !self.togglable {
            return self
                .items
                .get(self.current)
                .map(|item| item.text.clone())
                .unwrap_or_default();
        }
        let marked: Vec<&str> = self
            .items
            .iter()
            .filter(|item| item.marked)
            .map(|item| item.text.as_str())
            .collect();
        marked.join(" ")
    }

    /// Apply one key. Ignored entirely while the confirm latch is set.
    pub fn on_event(&mut self, key: Key) {
        if self.selected {
            return;
        }
        match key {
            Key::Up => self.move_by(-1),
            Key::Down => self.move_by(1),
            Key::PageUp => self.move_by(-(self.page_rows.max(1) as isize)),
            Key::PageDown => self.move_by(self.page_rows.max(1) as isize),
            Key::Toggle if self.togglable => {
                if let Some(item) = self.items.get_mut(self.current) {
                    item.marked = !item.marked;
                }
            }
            Key::Confirm => self.selected = true,
            _ => {}
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = (self.items.len() - 1) as isize;
        let next = (self.current as isize).saturating_add(delta).clamp(0, last);
        self.current = next as usize;
    }

    fn ensure_visible(&mut self, rows: usize) {
        if self.current < self.top {
            self.top = self.current;
        } else if self.current >= self.top + rows {
            self.top = self.current + 1 - rows;
        }
    }

    /// Render the frame border, title, and the visible window of items.
    pub fn paint(&mut self, compositor: &mut Compositor) -> Result<(), CompositorError> {
        {
            let frame = compositor
                .layer_mut(self.frame)
                .ok_or(CompositorError::UnknownLayer)?;
            frame.draw_border();
            if !self.title.is_empty() {
                frame.put_str(0, 0, &self.title);
            }
        }

        let view = compositor
            .layer_mut(self.viewport)
            .ok_or(CompositorError::UnknownLayer)?;
        let (rows, cols) = view.size();
        let rows = rows.max(1) as usize;
        self.page_rows = rows;
        self.ensure_visible(rows);

        view.clear();
        let mark_width = self.mark.width();
        let blank = " ".repeat(mark_width);
        let end = self.items.len().min(self.top + rows);
        for (row, idx) in (self.top..end).enumerate() {
            let item = &self.items[idx];
            let marked = if self.togglable {
                item.marked
            } else {
                idx == self.current
            };
            let prefix = if marked { self.mark.as_str() } else { blank.as_str() };
            let mut line = format!("{prefix}{}", item.text);
            // In toggle mode the mark belongs to marked rows; keep the
            // highlight visible with a bare caret in the prefix column.
            if self.togglable && idx == self.current && !marked && mark_width > 0 {
                line.replace_range(0..1, ">");
            }
            let line = truncate_to_width(&line, cols as usize);
            view.put_str(row as u16, 0, &line);
        }
        Ok(())
    }
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/menu.rs"]
mod tests;
