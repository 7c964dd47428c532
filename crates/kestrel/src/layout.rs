use std::fmt;

use crate::geometry::Rectangle;
use crate::window::WindowId;

/// Pure layout function: tiled windows in insertion order, the usable area
/// and the gap size in, one rectangle per window out.
pub type LayoutFn = fn(&[WindowId], Rectangle, i32) -> Vec<(WindowId, Rectangle)>;

#[derive(Clone, Copy)]
pub struct Layout {
    pub name: &'static str,
    pub arrange: LayoutFn,
}

impl Layout {
    pub const RECURSIVE: Layout = Layout {
        name: "recursive",
        arrange: recursive,
    };

    pub const MONOCLE: Layout = Layout {
        name: "monocle",
        arrange: monocle,
    };

    pub const BUILTIN: [Layout; 2] = [Layout::RECURSIVE, Layout::MONOCLE];

    pub fn by_name(name: &str) -> Option<Layout> {
        let name = name.trim().to_lowercase();
        Layout::BUILTIN.into_iter().find(|layout| layout.name == name)
    }

    pub fn apply(&self, windows: &[WindowId], area: Rectangle, gap: i32) -> Vec<(WindowId, Rectangle)> {
        (self.arrange)(windows, area, gap)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::RECURSIVE
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Layout").field(&self.name).finish()
    }
}

/// Binary split along the longer axis. Each window but the last takes the
/// first half of what remains; the last takes everything left over.
pub fn recursive(windows: &[WindowId], area: Rectangle, gap: i32) -> Vec<(WindowId, Rectangle)> {
    let mut remaining = area;
    let mut boxes = Vec::with_capacity(windows.len());

    for (i, &id) in windows.iter().enumerate() {
        if i + 1 == windows.len() {
            boxes.push((id, remaining.inset(gap)));
            break;
        }

        let mut first = remaining;
        if remaining.width < remaining.height {
            first.height = remaining.height / 2;
            remaining.y += first.height;
            remaining.height -= first.height;
        } else {
            first.width = remaining.width / 2;
            remaining.x += first.width;
            remaining.width -= first.width;
        }
        boxes.push((id, first.inset(gap)));
    }

    boxes
}

/// Every window covers the whole usable area.
pub fn monocle(windows: &[WindowId], area: Rectangle, gap: i32) -> Vec<(WindowId, Rectangle)> {
    windows.iter().map(|&id| (id, area.inset(gap))).collect()
}
