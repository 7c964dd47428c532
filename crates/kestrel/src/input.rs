use crate::backend::{Axis, Backend, DeviceKind};
use crate::config::{normalize_keysym, Action, FocusMode, Modifiers, ViewTarget};
use crate::focus::CursorMode;
use crate::layer::Layer;
use crate::layout::Layout;
use crate::output::VIEW_COUNT;
use crate::state::State;
use crate::window::WindowId;

impl<B: Backend> State<B> {
    pub(crate) fn pointer_motion(&mut self, time: u32, dx: f64, dy: f64, unaccel_dx: f64, unaccel_dy: f64) {
        if self.config.input.cursor_movement_prevents_idle {
            self.backend.notify_activity();
        }
        self.backend.relative_motion(time, dx, dy, unaccel_dx, unaccel_dy);
        if self.pointer_locked() {
            return;
        }
        self.warp_within_layout(self.cursor_x + dx, self.cursor_y + dy);
        self.process_cursor_motion(time);
    }

    pub(crate) fn pointer_motion_absolute(&mut self, time: u32, x: f64, y: f64) {
        if self.config.input.cursor_movement_prevents_idle {
            self.backend.notify_activity();
        }
        let bounds = self.layout_bounds();
        self.warp_within_layout(
            bounds.x as f64 + x * bounds.width as f64,
            bounds.y as f64 + y * bounds.height as f64,
        );
        self.process_cursor_motion(time);
    }

    /// Places the cursor, clamped to the union of all outputs.
    fn warp_within_layout(&mut self, x: f64, y: f64) {
        let bounds = self.layout_bounds();
        if bounds.is_empty() {
            self.cursor_x = x;
            self.cursor_y = y;
            return;
        }
        let max_x = (bounds.x + bounds.width - 1) as f64;
        let max_y = (bounds.y + bounds.height - 1) as f64;
        self.cursor_x = x.clamp(bounds.x as f64, max_x);
        self.cursor_y = y.clamp(bounds.y as f64, max_y);
    }

    pub(crate) fn pointer_button(&mut self, time: u32, button: u32, pressed: bool) {
        self.backend.notify_activity();

        if pressed {
            if self.interaction.focus_mode == FocusMode::Click {
                self.update_focus();
            }
            let modifiers = self.modifiers;
            let action = self
                .button_bindings
                .iter()
                .find(|(bind, _)| bind.button == button && bind.modifiers == modifiers)
                .map(|(_, action)| action.clone());
            if let Some(action) = action {
                self.run_action(&action);
                return;
            }
        } else {
            self.set_cursor_mode(CursorMode::Normal);
        }
        self.backend.pointer_button(time, button, pressed);
    }

    pub(crate) fn pointer_axis(&mut self, time: u32, axis: Axis, delta: f64) {
        self.backend.notify_activity();
        self.backend.pointer_axis(time, axis, delta);
    }

    pub(crate) fn keyboard_key(&mut self, time: u32, keycode: u32, keysym: u32, pressed: bool) {
        self.backend.notify_activity();

        if pressed {
            let keysym = normalize_keysym(keysym);
            let modifiers = self.modifiers;
            let action = self
                .key_bindings
                .iter()
                .find(|(bind, _)| bind.keysym == keysym && bind.modifiers == modifiers)
                .map(|(_, action)| action.clone());
            if let Some(action) = action {
                self.run_action(&action);
                return;
            }
        }
        self.backend.keyboard_key(time, keycode, pressed);
    }

    pub(crate) fn keyboard_modifiers(&mut self, modifiers: Modifiers) {
        self.backend.notify_activity();
        self.modifiers = modifiers;
        self.backend.keyboard_modifiers(modifiers);
    }

    pub(crate) fn new_input_device(&mut self, name: &str, kind: DeviceKind) {
        match kind {
            DeviceKind::Pointer => {
                let settings = self.config.input.pointer_settings(name);
                log::info!(
                    "[input] Pointer {}: {:?} acceleration, speed {}",
                    name,
                    settings.accel_profile,
                    settings.accel_speed
                );
                self.backend
                    .configure_pointer(name, settings.accel_profile, settings.accel_speed);
                self.backend.set_cursor_image("left_ptr");
            }
            DeviceKind::Keyboard => {
                let (rate, delay) = (self.config.input.repeat_rate, self.config.input.repeat_delay);
                log::info!("[input] Keyboard {}: repeat {} Hz after {} ms", name, rate, delay);
                self.backend.configure_keyboard(name, rate, delay);
            }
        }
    }

    pub fn run_action(&mut self, action: &Action) {
        log::debug!("[input] Action {:?}", action);
        match action {
            Action::Exit => {
                log::info!("[input] Exit requested");
                self.running = false;
                self.backend.terminate();
            }
            Action::Close => {
                if let Some(id) = self.interaction.focused {
                    self.focus_window(None);
                    self.backend.close(id);
                }
            }
            Action::Spawn(command) => self.backend.spawn(command),
            Action::SetLayout(name) => {
                let Some(layout) = Layout::by_name(name) else {
                    log::warn!("[layout] Unknown layout {}", name);
                    return;
                };
                let Some(output_id) = self.focused_output else {
                    return;
                };
                if let Some(output) = self.output_mut(output_id) {
                    output.current_mut().layout = layout;
                }
                self.arrange(output_id);
            }
            Action::CycleLayer(layers) => {
                let Some(id) = self.interaction.focused else {
                    return;
                };
                let Some(window) = self.windows.get(&id) else {
                    return;
                };
                if !window.kind.is_interactive() || window.is_fullscreen() {
                    return;
                }
                let next = window
                    .layer
                    .and_then(|current| layers.iter().position(|&l| l == current))
                    .map_or(layers.first(), |i| layers.get((i + 1) % layers.len()));
                if let Some(&layer) = next {
                    self.send_to_layer(id, layer);
                }
            }
            Action::ToggleFullscreen => {
                let Some(id) = self.interaction.focused else {
                    return;
                };
                let Some(window) = self.windows.get(&id) else {
                    return;
                };
                if !window.kind.supports_fullscreen() {
                    return;
                }
                let fullscreen = !window.is_fullscreen();
                self.set_fullscreen(id, fullscreen);
                self.update_visibility();
            }
            Action::ToggleLayer(layer) => {
                let Some(output_id) = self.focused_output else {
                    return;
                };
                if let Some(output) = self.output_mut(output_id) {
                    for view in output.views.iter_mut() {
                        view.show.toggle(*layer);
                    }
                }
                self.update_visibility();
            }
            Action::SetLayer(layer) => {
                let Some(id) = self.window_at(self.cursor_x, self.cursor_y) else {
                    return;
                };
                let Some(window) = self.windows.get(&id) else {
                    return;
                };
                if !window.kind.is_interactive() || window.is_fullscreen() {
                    return;
                }
                self.send_to_layer(id, *layer);
            }
            Action::View(ViewTarget::Index(index)) => self.select_view((*index).min(VIEW_COUNT - 1)),
            Action::View(ViewTarget::Relative(delta)) => {
                let Some(current) = self
                    .focused_output
                    .and_then(|o| self.output(o))
                    .map(|o| o.current_view)
                else {
                    return;
                };
                let next = (current as i64 + *delta as i64).rem_euclid(VIEW_COUNT as i64) as usize;
                self.select_view(next);
            }
            Action::MoveToView(view) => self.move_to_view(*view),
            Action::Move => self.set_cursor_mode(CursorMode::Move),
            Action::Resize => self.set_cursor_mode(CursorMode::Resize),
        }
    }

    /// Layer change requested by a binding. The fullscreen layer is only
    /// entered through the fullscreen state so flags and geometry follow.
    fn send_to_layer(&mut self, id: WindowId, layer: Layer) {
        if layer == Layer::Fullscreen {
            if self.windows.get(&id).is_some_and(|w| w.kind.supports_fullscreen()) {
                self.set_fullscreen(id, true);
            }
        } else {
            self.move_to_layer(id, layer);
        }
        self.update_visibility();
    }

    /// Switches the focused output to another view.
    pub fn select_view(&mut self, index: usize) {
        if index >= VIEW_COUNT {
            return;
        }
        let Some(output_id) = self.focused_output else {
            return;
        };
        let Some(output) = self.output_mut(output_id) else {
            return;
        };
        output.current_view = index;
        log::info!("[output] Output {} now shows view {}", output_id, index + 1);

        let focused_in_view = self
            .interaction
            .focused
            .and_then(|id| self.windows.get(&id))
            .and_then(|w| w.layer)
            .is_some_and(Layer::is_view_scoped);
        if focused_in_view {
            self.focus_window(None);
        }
        self.arrange(output_id);
        self.update_focus();
        self.update_visibility();
    }

    /// Sends the focused view-scoped window to another view of its output.
    pub fn move_to_view(&mut self, target: usize) {
        if target >= VIEW_COUNT {
            return;
        }
        let Some(id) = self.interaction.focused else {
            return;
        };
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let (Some(layer), Some(output_id)) = (window.layer, window.output) else {
            return;
        };
        let source = window.view;
        if !layer.is_view_scoped() || source == target {
            return;
        }
        let Some(output) = self.output_mut(output_id) else {
            return;
        };
        output.remove(layer, source, id);
        output.insert(layer, target, id);
        let current = output.current_view;
        if let Some(window) = self.windows.get_mut(&id) {
            window.view = target;
        }
        log::debug!("[window] {} moved to view {}", id, target + 1);

        if layer == Layer::Tiled && (source == current || target == current) {
            self.arrange(output_id);
        }
        if target != current {
            self.focus_window(None);
            self.update_focus();
        }
        self.update_visibility();
    }
}
