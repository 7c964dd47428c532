use crate::backend::{Backend, ConstraintKind};
use crate::config::FocusMode;
use crate::layer::Layer;
use crate::output::OutputId;
use crate::state::{PointerConstraint, State};
use crate::window::WindowId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorMode {
    #[default]
    Normal,
    Move,
    Resize,
}

#[derive(Clone, Debug)]
pub struct Interaction {
    pub cursor_mode: CursorMode,
    pub focused: Option<WindowId>,
    /// Window currently receiving pointer events, which may differ from the
    /// focused one under click-to-focus.
    pub pointer_focus: Option<WindowId>,
    /// Set while an exclusive-input layer surface holds the keyboard.
    pub grabbed: bool,
    /// Pointer position relative to the window origin when a move started.
    pub grab_x: f64,
    pub grab_y: f64,
    pub focus_mode: FocusMode,
}

impl Interaction {
    pub fn new(focus_mode: FocusMode) -> Self {
        Self {
            cursor_mode: CursorMode::Normal,
            focused: None,
            pointer_focus: None,
            grabbed: false,
            grab_x: 0.0,
            grab_y: 0.0,
            focus_mode,
        }
    }
}

impl<B: Backend> State<B> {
    /// Moves keyboard and pointer focus. The previous window is fully
    /// released before the new one is entered.
    pub fn focus_window(&mut self, target: Option<WindowId>) {
        if self.interaction.grabbed || self.interaction.focused == target {
            return;
        }

        if let Some(old) = self.interaction.focused.take() {
            self.backend.pointer_clear_focus();
            self.interaction.pointer_focus = None;
            if self.windows.get(&old).is_some_and(|w| w.kind.supports_activation()) {
                self.backend.set_activated(old, false);
            }
            self.set_constraint_active(old, false);
        }

        let Some(id) = target else {
            log::debug!("[focus] Focus cleared");
            return;
        };
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if window.kind.supports_activation() {
            self.backend.set_activated(id, true);
        }
        self.interaction.focused = Some(id);

        if let Some(global) = self.global_geometry(id) {
            let local_x = self.cursor_x - global.x as f64;
            let local_y = self.cursor_y - global.y as f64;
            self.backend.pointer_enter(id, local_x, local_y);
            self.interaction.pointer_focus = Some(id);
        }
        self.backend.keyboard_enter(id, self.modifiers);
        self.set_constraint_active(id, true);
        log::debug!("[focus] Focused {}", id);
    }

    /// Focuses whatever is under the cursor; the output under the cursor
    /// becomes the focused output. Empty space keeps the current focus.
    pub fn update_focus(&mut self) {
        if self.interaction.grabbed {
            return;
        }
        if let Some(output) = self.output_at(self.cursor_x, self.cursor_y) {
            self.focused_output = Some(output);
        }
        if let Some(target) = self.window_at(self.cursor_x, self.cursor_y) {
            self.focus_window(Some(target));
        }
    }

    /// Top-most shown window containing the global point.
    pub fn window_at(&self, x: f64, y: f64) -> Option<WindowId> {
        let under = self.output_at(x, y);
        let ordered = self
            .outputs
            .iter()
            .filter(|o| Some(o.id) == under)
            .chain(self.outputs.iter().filter(|o| Some(o.id) != under));

        for output in ordered {
            let view = output.current();
            let fullscreen = view.has_fullscreen();
            for layer in Layer::HIT_TEST_ORDER {
                if fullscreen && layer < Layer::Fullscreen {
                    continue;
                }
                if !view.show.contains(layer) {
                    continue;
                }
                for &id in output.current_list(layer).iter().rev() {
                    let Some(window) = self.windows.get(&id) else {
                        continue;
                    };
                    if window.geometry.translate(output.x, output.y).contains(x, y) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Sends every mapped window an activation hint telling whether it can
    /// currently be seen.
    pub fn update_visibility(&mut self) {
        for &id in &self.update_list {
            let Some(window) = self.windows.get(&id) else {
                continue;
            };
            let (Some(layer), Some(output)) = (window.layer, window.output.and_then(|o| self.output(o))) else {
                continue;
            };
            let view = output.current();
            let visible = (!layer.is_view_scoped() || window.view == output.current_view)
                && view.show.contains(layer)
                && (!view.has_fullscreen() || layer >= Layer::Fullscreen);
            if window.kind.supports_activation() {
                self.backend.set_activated(id, visible);
            }
        }
    }

    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        if self.interaction.cursor_mode == mode {
            return;
        }
        if mode == CursorMode::Normal {
            self.interaction.cursor_mode = CursorMode::Normal;
            self.backend.set_cursor_image("left_ptr");
            return;
        }

        let Some(id) = self.interaction.focused else {
            return;
        };
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if !window.kind.is_interactive() || window.is_fullscreen() {
            return;
        }
        if window.layer == Some(Layer::Tiled) {
            self.move_to_layer(id, Layer::Floating);
        }
        let Some(global) = self.global_geometry(id) else {
            return;
        };

        self.interaction.cursor_mode = mode;
        match mode {
            CursorMode::Resize => {
                self.backend.set_cursor_image("bottom_right_corner");
                self.cursor_x = (global.x + global.width) as f64;
                self.cursor_y = (global.y + global.height) as f64;
                self.backend.warp_cursor(self.cursor_x, self.cursor_y);
            }
            CursorMode::Move => {
                self.backend.set_cursor_image("hand1");
                self.interaction.grab_x = self.cursor_x - global.x as f64;
                self.interaction.grab_y = self.cursor_y - global.y as f64;
            }
            CursorMode::Normal => {}
        }
        log::debug!("[focus] Cursor mode {:?} on {}", mode, id);
    }

    /// Interprets a cursor position change according to the cursor mode.
    pub fn process_cursor_motion(&mut self, time: u32) {
        match self.interaction.cursor_mode {
            CursorMode::Normal => {
                if self.interaction.focus_mode == FocusMode::Hover {
                    self.update_focus();
                }
                self.track_pointer_focus(time);
            }
            CursorMode::Move => {
                let Some(id) = self.interaction.focused.filter(|id| self.windows.contains_key(id)) else {
                    self.set_cursor_mode(CursorMode::Normal);
                    return;
                };
                let Some(target) = self.output_at(self.cursor_x, self.cursor_y) else {
                    return;
                };
                self.reparent(id, target);
                let Some(output) = self.output(target) else {
                    return;
                };
                let x = (self.cursor_x - self.interaction.grab_x) as i32 - output.x;
                let y = (self.cursor_y - self.interaction.grab_y) as i32 - output.y;
                self.configure_window(id, Some(x), Some(y), None, None);
            }
            CursorMode::Resize => {
                let Some(id) = self.interaction.focused.filter(|id| self.windows.contains_key(id)) else {
                    self.set_cursor_mode(CursorMode::Normal);
                    return;
                };
                let Some(global) = self.global_geometry(id) else {
                    return;
                };
                let width = (self.cursor_x - global.x as f64) as i32;
                let height = (self.cursor_y - global.y as f64) as i32;
                self.configure_window(id, None, None, Some(width), Some(height));
            }
        }
    }

    fn track_pointer_focus(&mut self, time: u32) {
        match self.window_at(self.cursor_x, self.cursor_y) {
            Some(id) => {
                let Some(global) = self.global_geometry(id) else {
                    return;
                };
                let local_x = self.cursor_x - global.x as f64;
                let local_y = self.cursor_y - global.y as f64;
                if self.interaction.pointer_focus == Some(id) {
                    self.backend.pointer_motion(time, local_x, local_y);
                } else {
                    self.backend.pointer_enter(id, local_x, local_y);
                    self.interaction.pointer_focus = Some(id);
                }
            }
            None => {
                if self.interaction.pointer_focus.take().is_some() {
                    self.backend.pointer_clear_focus();
                }
                self.backend.set_cursor_image("left_ptr");
            }
        }
    }

    /// Hands a window to another output, keeping its global position and
    /// layer. View-scoped windows land in the new output's current view.
    pub(crate) fn reparent(&mut self, id: WindowId, target: OutputId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let (Some(layer), Some(source)) = (window.layer, window.output) else {
            return;
        };
        if source == target {
            return;
        }
        let old_view = window.view;
        let Some(global) = self.global_geometry(id) else {
            return;
        };
        let Some((tx, ty, view)) = self.output(target).map(|o| (o.x, o.y, o.current_view)) else {
            return;
        };

        if let Some(output) = self.output_mut(source) {
            output.remove(layer, old_view, id);
        }
        if let Some(output) = self.output_mut(target) {
            output.insert(layer, view, id);
        }
        if let Some(window) = self.windows.get_mut(&id) {
            window.output = Some(target);
            window.view = view;
            window.geometry = global.translate(-tx, -ty);
        }
        self.focused_output = Some(target);
        log::debug!("[focus] {} moved from output {} to {}", id, source, target);
    }

    pub(crate) fn new_pointer_constraint(&mut self, window: WindowId, kind: ConstraintKind) {
        if !self.windows.contains_key(&window) {
            return;
        }
        self.constraints.insert(window, PointerConstraint { kind, active: false });
        if self.interaction.focused == Some(window) {
            self.set_constraint_active(window, true);
        }
    }

    pub(crate) fn set_constraint_active(&mut self, window: WindowId, active: bool) {
        let Some(constraint) = self.constraints.get_mut(&window) else {
            return;
        };
        if constraint.active == active {
            return;
        }
        constraint.active = active;
        self.backend.set_constraint_active(window, active);
    }

    /// True when the focused window holds an active locked constraint.
    pub fn pointer_locked(&self) -> bool {
        self.interaction
            .focused
            .and_then(|id| self.constraints.get(&id))
            .is_some_and(|c| c.active && c.kind == ConstraintKind::Locked)
    }
}
