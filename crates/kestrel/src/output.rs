use crate::geometry::Rectangle;
use crate::layer::{Layer, LayerMask, LayerSlot};
use crate::layout::Layout;
use crate::window::WindowId;

pub type OutputId = u64;

pub const VIEW_COUNT: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mode {
    pub width: i32,
    pub height: i32,
    /// Millihertz.
    pub refresh: i32,
    pub preferred: bool,
}

impl Mode {
    pub const fn new(width: i32, height: i32, refresh: i32) -> Self {
        Self {
            width,
            height,
            refresh,
            preferred: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    Flipped,
    FlippedRotate90,
    FlippedRotate180,
    FlippedRotate270,
}

impl Transform {
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Transform::Rotate90
                | Transform::Rotate270
                | Transform::FlippedRotate90
                | Transform::FlippedRotate270
        )
    }

    pub fn parse(s: &str) -> Option<Transform> {
        Some(match s.trim().to_lowercase().as_str() {
            "normal" | "0" => Transform::Normal,
            "90" => Transform::Rotate90,
            "180" => Transform::Rotate180,
            "270" => Transform::Rotate270,
            "flipped" => Transform::Flipped,
            "flipped-90" => Transform::FlippedRotate90,
            "flipped-180" => Transform::FlippedRotate180,
            "flipped-270" => Transform::FlippedRotate270,
            _ => return None,
        })
    }
}

/// The hardware-facing part of an output that the configuration
/// transaction stages, tests, commits and rolls back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputState {
    pub mode: Mode,
    pub scale: f64,
    pub transform: Transform,
    pub adaptive_sync: bool,
}

impl OutputState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            scale: 1.0,
            transform: Transform::Normal,
            adaptive_sync: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct View {
    pub(crate) layers: [Vec<WindowId>; 3],
    pub layout: Layout,
    pub show: LayerMask,
}

impl View {
    pub fn new(layout: Layout) -> Self {
        Self {
            layers: Default::default(),
            layout,
            show: LayerMask::ALL,
        }
    }

    pub fn has_fullscreen(&self) -> bool {
        !self.layers[2].is_empty()
    }

    /// Most recently inserted fullscreen window.
    pub fn top_fullscreen(&self) -> Option<WindowId> {
        self.layers[2].last().copied()
    }

    pub fn is_occupied(&self) -> bool {
        self.layers.iter().any(|list| !list.is_empty())
    }

    pub fn tiled(&self) -> &[WindowId] {
        &self.layers[0]
    }
}

#[derive(Clone, Debug)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    /// Position in the global layout.
    pub x: i32,
    pub y: i32,
    pub modes: Vec<Mode>,
    pub state: OutputState,
    pub bar_height: i32,
    pub views: [View; VIEW_COUNT],
    pub current_view: usize,
    pub(crate) shared: [Vec<WindowId>; 6],
}

impl Output {
    pub fn new(id: OutputId, name: String, modes: Vec<Mode>, state: OutputState, bar_height: i32, layout: Layout) -> Self {
        Self {
            id,
            name,
            x: 0,
            y: 0,
            modes,
            state,
            bar_height,
            views: std::array::from_fn(|_| View::new(layout)),
            current_view: 0,
            shared: Default::default(),
        }
    }

    /// Logical size after transform and scale.
    pub fn effective_size(&self) -> (i32, i32) {
        let mode = self.state.mode;
        let (w, h) = if self.state.transform.swaps_axes() {
            (mode.height, mode.width)
        } else {
            (mode.width, mode.height)
        };
        let scale = if self.state.scale > 0.0 { self.state.scale } else { 1.0 };
        ((w as f64 / scale).round() as i32, (h as f64 / scale).round() as i32)
    }

    /// Box in global layout coordinates.
    pub fn layout_box(&self) -> Rectangle {
        let (width, height) = self.effective_size();
        Rectangle::new(self.x, self.y, width, height)
    }

    /// Output-local area below the status bar.
    pub fn usable_area(&self) -> Rectangle {
        let (width, height) = self.effective_size();
        Rectangle::new(0, self.bar_height, width, height - self.bar_height)
    }

    pub fn current(&self) -> &View {
        &self.views[self.current_view]
    }

    pub fn current_mut(&mut self) -> &mut View {
        &mut self.views[self.current_view]
    }

    /// Window list for `layer`; `view` is ignored for output-scoped layers.
    pub fn list(&self, layer: Layer, view: usize) -> &[WindowId] {
        match layer.slot() {
            LayerSlot::View(i) => &self.views[view].layers[i],
            LayerSlot::Output(i) => &self.shared[i],
        }
    }

    pub(crate) fn list_mut(&mut self, layer: Layer, view: usize) -> &mut Vec<WindowId> {
        match layer.slot() {
            LayerSlot::View(i) => &mut self.views[view].layers[i],
            LayerSlot::Output(i) => &mut self.shared[i],
        }
    }

    pub(crate) fn insert(&mut self, layer: Layer, view: usize, id: WindowId) {
        let list = self.list_mut(layer, view);
        if !list.contains(&id) {
            list.push(id);
        }
    }

    pub(crate) fn remove(&mut self, layer: Layer, view: usize, id: WindowId) -> bool {
        let list = self.list_mut(layer, view);
        match list.iter().position(|&w| w == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Lists visible from the current view, ignoring the show mask.
    pub fn current_list(&self, layer: Layer) -> &[WindowId] {
        self.list(layer, self.current_view)
    }

    /// Picks the advertised mode matching `width`x`height` with the closest
    /// refresh, then the preferred mode, then the first one.
    pub fn pick_mode(modes: &[Mode], wanted: Option<(i32, i32, i32)>) -> Option<Mode> {
        let matching = wanted.and_then(|(width, height, refresh)| {
            modes
                .iter()
                .filter(|m| m.width == width && m.height == height)
                .min_by_key(|m| (m.refresh - refresh).abs())
                .copied()
        });
        matching
            .or_else(|| modes.iter().find(|m| m.preferred).copied())
            .or_else(|| modes.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(width: i32, height: i32) -> Output {
        let mode = Mode::new(width, height, 60_000);
        Output::new(1, "HEADLESS-1".into(), vec![mode], OutputState::new(mode), 20, Layout::RECURSIVE)
    }

    #[test]
    fn shared_layers_are_visible_from_every_view() {
        let mut out = output(1920, 1080);
        out.insert(Layer::Top, 0, 10);
        out.insert(Layer::Floating, 0, 11);
        assert_eq!(out.list(Layer::Top, 5), &[10]);
        assert!(out.list(Layer::Floating, 5).is_empty());
        assert_eq!(out.list(Layer::Floating, 0), &[11]);
        assert!(out.views[0].is_occupied());
        assert!(!out.views[5].is_occupied());
    }

    #[test]
    fn insert_is_unique_and_remove_reports() {
        let mut out = output(1920, 1080);
        out.insert(Layer::Tiled, 2, 1);
        out.insert(Layer::Tiled, 2, 1);
        assert_eq!(out.list(Layer::Tiled, 2).len(), 1);
        assert!(out.remove(Layer::Tiled, 2, 1));
        assert!(!out.remove(Layer::Tiled, 2, 1));
    }

    #[test]
    fn effective_size_honours_scale_and_rotation() {
        let mut out = output(2560, 1440);
        out.state.scale = 2.0;
        assert_eq!(out.effective_size(), (1280, 720));
        out.state.transform = Transform::Rotate90;
        assert_eq!(out.effective_size(), (720, 1280));
        assert_eq!(out.usable_area(), Rectangle::new(0, 20, 720, 1260));
    }

    #[test]
    fn pick_mode_prefers_closest_refresh() {
        let mut preferred = Mode::new(1920, 1080, 60_000);
        preferred.preferred = true;
        let modes = [
            preferred,
            Mode::new(2560, 1440, 59_951),
            Mode::new(2560, 1440, 143_912),
            Mode::new(2560, 1440, 120_000),
        ];
        assert_eq!(
            Output::pick_mode(&modes, Some((2560, 1440, 144_000))),
            Some(Mode::new(2560, 1440, 143_912))
        );
        assert_eq!(Output::pick_mode(&modes, Some((3840, 2160, 60_000))), Some(preferred));
        assert_eq!(Output::pick_mode(&modes, None), Some(preferred));
        assert_eq!(Output::pick_mode(&[], None), None);
    }
}
