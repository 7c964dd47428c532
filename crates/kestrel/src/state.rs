use std::collections::HashMap;

use crate::backend::{Backend, ConstraintKind, ModeRequest, OutputHead};
use crate::config::{Action, ButtonBind, Config, Keybind, Modifiers};
use crate::event::{Event, OutputInfo};
use crate::focus::{CursorMode, Interaction};
use crate::geometry::Rectangle;
use crate::layer::Layer;
use crate::layout::Layout;
use crate::output::{Mode, Output, OutputId, OutputState, VIEW_COUNT};
use crate::status::StatusBlocks;
use crate::window::{Window, WindowFlags, WindowId, WindowKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerConstraint {
    pub kind: ConstraintKind,
    pub active: bool,
}

/// The whole mutable object graph of the window manager, owned by the main
/// loop and driven one [`Event`] at a time through [`State::dispatch`].
pub struct State<B: Backend> {
    pub config: Config,
    pub backend: B,
    pub windows: HashMap<WindowId, Window>,
    /// Left-to-right in the global layout.
    pub outputs: Vec<Output>,
    pub focused_output: Option<OutputId>,
    pub interaction: Interaction,
    pub cursor_x: f64,
    pub cursor_y: f64,
    pub modifiers: Modifiers,
    pub status: StatusBlocks,
    /// Serial of the last published output configuration.
    pub config_serial: u32,
    pub running: bool,
    /// Mapped windows awaiting visibility propagation, in map order.
    pub(crate) update_list: Vec<WindowId>,
    /// Windows mapped while no output existed.
    pub(crate) orphans: Vec<WindowId>,
    pub(crate) constraints: HashMap<WindowId, PointerConstraint>,
    pub(crate) key_bindings: Vec<(Keybind, Action)>,
    pub(crate) button_bindings: Vec<(ButtonBind, Action)>,
}

impl<B: Backend> State<B> {
    pub fn new(config: Config, backend: B) -> Self {
        let key_bindings = config.keybinds.key_bindings();
        let button_bindings = config.keybinds.button_bindings();
        let interaction = Interaction::new(config.input.focus_mode);
        log::info!(
            "[input] {} key bindings, {} button bindings",
            key_bindings.len(),
            button_bindings.len()
        );

        Self {
            config,
            backend,
            windows: HashMap::new(),
            outputs: Vec::new(),
            focused_output: None,
            interaction,
            cursor_x: 0.0,
            cursor_y: 0.0,
            modifiers: Modifiers::default(),
            status: StatusBlocks::default(),
            config_serial: 0,
            running: true,
            update_list: Vec::new(),
            orphans: Vec::new(),
            constraints: HashMap::new(),
            key_bindings,
            button_bindings,
        }
    }

    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::NewSurface { id, kind, output } => self.new_surface(id, kind, output),
            Event::MapSurface { id } => self.map_surface(id),
            Event::UnmapSurface { id } => self.unmap_surface(id),
            Event::DestroySurface { id } => self.destroy_surface(id),
            Event::RequestFullscreen { id, fullscreen } => self.request_fullscreen(id, fullscreen),
            Event::RequestConfigure {
                id,
                x,
                y,
                width,
                height,
            } => self.request_configure(id, Rectangle::new(x, y, width, height)),
            Event::RequestMinimize { id, minimized } => self.request_minimize(id, minimized),
            Event::SetTitle { id, title } => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.title = Some(title);
                }
            }
            Event::SurfaceCommitted { id, width, height } => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.geometry.width = width;
                    window.geometry.height = height;
                }
            }

            Event::NewOutput(info) => self.new_output(info),
            Event::OutputRemoved { output } => self.remove_output(output),
            Event::OutputFrame { output } => self.render_output(output),

            Event::PointerMotion {
                time,
                dx,
                dy,
                unaccel_dx,
                unaccel_dy,
            } => self.pointer_motion(time, dx, dy, unaccel_dx, unaccel_dy),
            Event::PointerMotionAbsolute { time, x, y } => self.pointer_motion_absolute(time, x, y),
            Event::PointerButton { time, button, pressed } => self.pointer_button(time, button, pressed),
            Event::PointerAxis { time, axis, delta } => self.pointer_axis(time, axis, delta),
            Event::KeyboardKey {
                time,
                keycode,
                keysym,
                pressed,
            } => self.keyboard_key(time, keycode, keysym, pressed),
            Event::KeyboardModifiers(modifiers) => self.keyboard_modifiers(modifiers),
            Event::NewInputDevice { name, kind } => self.new_input_device(&name, kind),

            Event::TestOutputConfiguration(configuration) => {
                self.handle_output_configuration(configuration, false)
            }
            Event::ApplyOutputConfiguration(configuration) => {
                self.handle_output_configuration(configuration, true)
            }

            Event::NewPointerConstraint { window, kind } => self.new_pointer_constraint(window, kind),
            Event::PointerConstraintDestroyed { window } => {
                self.constraints.remove(&window);
            }
        }
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn output_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.iter_mut().find(|o| o.id == id)
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.interaction.focused
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.interaction.cursor_mode
    }

    /// Output whose layout box contains the point.
    pub fn output_at(&self, x: f64, y: f64) -> Option<OutputId> {
        self.outputs
            .iter()
            .find(|o| o.layout_box().contains(x, y))
            .map(|o| o.id)
    }

    /// Union of every output box in the global layout.
    pub fn layout_bounds(&self) -> Rectangle {
        self.outputs
            .iter()
            .fold(Rectangle::default(), |acc, o| acc.union(&o.layout_box()))
    }

    /// Window geometry in global layout coordinates.
    pub fn global_geometry(&self, id: WindowId) -> Option<Rectangle> {
        let window = self.windows.get(&id)?;
        let (ox, oy) = window
            .output
            .and_then(|o| self.output(o))
            .map_or((0, 0), |o| (o.x, o.y));
        Some(window.geometry.translate(ox, oy))
    }

    /// Every `(output, layer, view)` list holding `id`; `view` is `None` for
    /// output-scoped layers. A consistent graph yields at most one entry.
    pub fn memberships(&self, id: WindowId) -> Vec<(OutputId, Layer, Option<usize>)> {
        let mut found = Vec::new();
        for output in &self.outputs {
            for layer in Layer::ALL {
                if layer.is_view_scoped() {
                    for view in 0..VIEW_COUNT {
                        if output.list(layer, view).contains(&id) {
                            found.push((output.id, layer, Some(view)));
                        }
                    }
                } else if output.list(layer, 0).contains(&id) {
                    found.push((output.id, layer, None));
                }
            }
        }
        found
    }

    fn new_surface(&mut self, id: WindowId, kind: WindowKind, output: Option<OutputId>) {
        if self.windows.contains_key(&id) {
            log::warn!("[window] Surface {} announced twice, ignoring", id);
            return;
        }

        let mut window = Window::new(id, kind);
        window.output = output.filter(|&o| self.output(o).is_some());

        if let WindowKind::LayerSurface(info) = &window.kind {
            let target = window.output.or(self.focused_output);
            window.output = target;
            let (out_w, out_h) = target
                .and_then(|o| self.output(o))
                .map_or((0, 0), |o| o.effective_size());
            window.geometry.width = if info.anchor.horizontal() {
                out_w
            } else {
                info.desired_width
            };
            window.geometry.height = if info.anchor.vertical() {
                out_h
            } else {
                info.desired_height
            };
        }

        log::debug!("[window] New {} surface {}", window.kind.name(), id);
        let is_layer_surface = matches!(window.kind, WindowKind::LayerSurface(_));
        self.windows.insert(id, window);
        if is_layer_surface {
            self.configure_window(id, None, None, None, None);
        }
    }

    fn map_surface(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            log::debug!("[window] Map for unknown surface {}", id);
            return;
        };
        if window.mapped {
            return;
        }

        let target = window
            .output
            .filter(|&o| self.output(o).is_some())
            .or(self.focused_output);
        let Some(output_id) = target else {
            log::info!("[window] No output for surface {}, holding it until one appears", id);
            if !self.orphans.contains(&id) {
                self.orphans.push(id);
            }
            return;
        };
        let Some(output) = self.output(output_id) else {
            return;
        };
        let view = output.current_view;
        let (out_w, out_h) = output.effective_size();
        let usable = output.usable_area();
        let (out_x, out_y) = (output.x, output.y);
        let bar_height = output.bar_height;

        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        window.output = Some(output_id);
        window.view = view;
        window.mapped = true;

        let wants_fullscreen = window.requesting_fullscreen && window.kind.supports_fullscreen();
        window.requesting_fullscreen = false;

        let exclusive = window.kind.wants_exclusive_input();
        let mut take_focus = true;
        let mut grab = false;
        let mut layer = match &window.kind {
            WindowKind::Toplevel => Layer::Tiled,
            WindowKind::Legacy(info) => {
                if !info.wants_focus {
                    take_focus = false;
                    window.geometry = info.requested.translate(-out_x, -out_y);
                    Layer::Popups
                } else if info.size_hints.is_some_and(|hints| hints.is_fixed_size()) {
                    window.geometry = usable.centered(info.requested.width, info.requested.height);
                    Layer::Floating
                } else {
                    Layer::Tiled
                }
            }
            WindowKind::LayerSurface(info) => {
                let layer = info.layer.layer();
                window.geometry.x = 0;
                window.geometry.y = if layer == Layer::Top { bar_height } else { 0 };
                take_focus = exclusive;
                grab = exclusive;
                layer
            }
        };

        if wants_fullscreen {
            window.old_layer = match window.kind {
                WindowKind::Legacy(_) => Layer::Floating,
                _ => layer,
            };
            window.saved_geometry = Some(window.geometry);
            window.geometry = Rectangle::new(0, 0, out_w, out_h);
            window.flags.fullscreen = true;
            take_focus = true;
            layer = Layer::Fullscreen;
        }
        if layer.is_view_scoped() && layer != Layer::Fullscreen {
            window.old_layer = layer;
        }
        window.layer = Some(layer);
        if !window.in_update_set {
            window.in_update_set = true;
            self.update_list.push(id);
        }
        log::info!(
            "[window] Mapped {} {} on output {} view {} layer {}",
            window.kind.name(),
            id,
            output_id,
            view + 1,
            layer
        );

        if let Some(output) = self.output_mut(output_id) {
            output.insert(layer, view, id);
        }
        self.orphans.retain(|&w| w != id);

        match layer {
            Layer::Fullscreen | Layer::Floating | Layer::Popups => {
                self.configure_window(id, None, None, None, None)
            }
            Layer::Tiled => self.arrange(output_id),
            _ => {}
        }

        if grab {
            self.focus_window(Some(id));
            self.interaction.grabbed = true;
        } else if take_focus {
            self.focus_window(Some(id));
        }
        self.update_visibility();
    }

    fn unmap_surface(&mut self, id: WindowId) {
        let Some((mapped, layer, view, output_id)) = self
            .windows
            .get(&id)
            .map(|w| (w.mapped, w.layer, w.view, w.output))
        else {
            return;
        };
        if !mapped {
            self.orphans.retain(|&w| w != id);
            return;
        }

        if self.interaction.focused == Some(id) {
            self.interaction.grabbed = false;
            self.focus_window(None);
        }
        if self.interaction.pointer_focus == Some(id) {
            self.interaction.pointer_focus = None;
        }

        if let (Some(layer), Some(output_id)) = (layer, output_id) {
            if let Some(output) = self.output_mut(output_id) {
                output.remove(layer, view, id);
            }
        }
        self.update_list.retain(|&w| w != id);

        if let Some(window) = self.windows.get_mut(&id) {
            window.clear_mapping();
        }
        log::debug!("[window] Unmapped {}", id);

        if let (Some(Layer::Tiled), Some(output_id)) = (layer, output_id) {
            if self.output(output_id).is_some_and(|o| o.current_view == view) {
                self.arrange(output_id);
            }
        }
    }

    fn destroy_surface(&mut self, id: WindowId) {
        if !self.windows.contains_key(&id) {
            return;
        }
        self.unmap_surface(id);
        self.orphans.retain(|&w| w != id);
        self.constraints.remove(&id);
        self.windows.remove(&id);
        log::debug!("[window] Destroyed {}", id);
    }

    fn request_fullscreen(&mut self, id: WindowId, fullscreen: bool) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !window.kind.supports_fullscreen() {
            return;
        }
        if !window.mapped {
            window.requesting_fullscreen = fullscreen;
            return;
        }
        self.set_fullscreen(id, fullscreen);
        self.update_visibility();
    }

    fn request_configure(&mut self, id: WindowId, global: Rectangle) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if matches!(window.layer, Some(Layer::Tiled) | Some(Layer::Fullscreen)) {
            // The tiler owns the geometry; re-send it.
            self.configure_window(id, None, None, None, None);
            return;
        }
        let (ox, oy) = window
            .output
            .and_then(|o| self.output(o))
            .map_or((0, 0), |o| (o.x, o.y));
        self.configure_window(
            id,
            Some(global.x - ox),
            Some(global.y - oy),
            Some(global.width),
            Some(global.height),
        );
    }

    fn request_minimize(&mut self, id: WindowId, minimized: bool) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !window.kind.supports_minimize() {
            return;
        }
        window.flags.minimized = minimized;
        self.configure_window(id, None, None, None, None);
    }

    /// Updates whichever of the four coordinates are given (output-local),
    /// applies size hints and forwards the result in global coordinates.
    pub fn configure_window(
        &mut self,
        id: WindowId,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<i32>,
        height: Option<i32>,
    ) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let geometry = &mut window.geometry;
        if let Some(x) = x {
            geometry.x = x;
        }
        if let Some(y) = y {
            geometry.y = y;
        }
        if let Some(width) = width {
            geometry.width = width;
        }
        if let Some(height) = height {
            geometry.height = height;
        }
        if let Some(hints) = window.kind.size_hints().filter(|_| !window.flags.fullscreen) {
            let (w, h) = hints.clamp(geometry.width, geometry.height);
            geometry.width = w;
            geometry.height = h;
        }

        let flags: WindowFlags = window.flags;
        let Some(global) = self.global_geometry(id) else {
            return;
        };
        self.backend.configure(id, global, flags);
    }

    /// Moves a mapped window into another layer of its output. Entering a
    /// view-scoped layer from a shared one adopts the output's current view.
    pub fn move_to_layer(&mut self, id: WindowId, layer: Layer) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let (Some(old), Some(output_id)) = (window.layer, window.output) else {
            return;
        };
        if old == layer {
            return;
        }
        let old_view = window.view;
        let Some(output) = self.output_mut(output_id) else {
            return;
        };
        let current = output.current_view;
        let view = if layer.is_view_scoped() && !old.is_view_scoped() {
            current
        } else {
            old_view
        };
        output.remove(old, old_view, id);
        output.insert(layer, view, id);

        if let Some(window) = self.windows.get_mut(&id) {
            window.layer = Some(layer);
            window.view = view;
        }
        log::debug!("[window] {} moved from {} to {}", id, old, layer);

        if (old == Layer::Tiled && old_view == current) || (layer == Layer::Tiled && view == current) {
            self.arrange(output_id);
        }
    }

    pub fn set_fullscreen(&mut self, id: WindowId, fullscreen: bool) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if window.is_fullscreen() == fullscreen || !window.mapped {
            return;
        }
        let Some(output_id) = window.output else {
            return;
        };
        let current_layer = window.layer;
        let (width, height) = self.output(output_id).map_or((0, 0), |o| o.effective_size());

        if fullscreen {
            if let Some(window) = self.windows.get_mut(&id) {
                if let Some(layer) = current_layer {
                    window.old_layer = layer;
                }
                window.saved_geometry = Some(window.geometry);
                window.flags.fullscreen = true;
            }
            self.move_to_layer(id, Layer::Fullscreen);
            self.configure_window(id, Some(0), Some(0), Some(width), Some(height));
            log::info!("[window] {} entered fullscreen", id);
        } else {
            let (restore_layer, saved) = match self.windows.get_mut(&id) {
                Some(window) => {
                    window.flags.fullscreen = false;
                    (window.old_layer, window.saved_geometry.take())
                }
                None => return,
            };
            if let Some(saved) = saved {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.geometry = saved;
                }
            }
            self.move_to_layer(id, restore_layer);
            self.configure_window(id, None, None, None, None);
            log::info!("[window] {} left fullscreen", id);
        }
    }

    /// Recomputes tiled geometry for the output's current view.
    pub fn arrange(&mut self, output_id: OutputId) {
        let Some(output) = self.output(output_id) else {
            return;
        };
        let view = output.current();
        let tiled = view.tiled().to_vec();
        if tiled.is_empty() {
            return;
        }
        let boxes = view
            .layout
            .apply(&tiled, output.usable_area(), self.config.appearance.gap_size);
        log::debug!(
            "[layout] {} tiled windows on output {} with {:?}",
            tiled.len(),
            output_id,
            view.layout
        );
        for (id, rect) in boxes {
            self.configure_window(id, Some(rect.x), Some(rect.y), Some(rect.width), Some(rect.height));
        }
    }

    fn new_output(&mut self, info: OutputInfo) {
        if self.output(info.id).is_some() {
            log::warn!("[output] Output {} announced twice, ignoring", info.id);
            return;
        }

        let entry = self.config.output_entry(&info.name).cloned();
        let wanted = entry
            .as_ref()
            .map(|e| (e.width, e.height, e.refresh.saturating_mul(1000)));
        let mode = match Output::pick_mode(&info.modes, wanted) {
            Some(mode) => mode,
            None => match &entry {
                Some(e) => Mode::new(e.width, e.height, e.refresh.saturating_mul(1000)),
                None => {
                    log::warn!("[output] {} advertises no modes and has no configured one, ignoring", info.name);
                    return;
                }
            },
        };

        let mut state = OutputState::new(mode);
        if let Some(entry) = &entry {
            state.transform = entry.transform();
        }
        let request = if info.modes.contains(&mode) {
            ModeRequest::Mode(mode)
        } else {
            ModeRequest::Custom {
                width: mode.width,
                height: mode.height,
                refresh: mode.refresh,
            }
        };
        self.backend.set_output_mode(info.id, request);
        self.backend.set_output_transform(info.id, state.transform);
        if !self.backend.commit_output(info.id) {
            log::warn!("[output] Initial commit for {} failed", info.name);
            self.backend.rollback_output(info.id);
        }

        log::info!(
            "[output] New output {} ({}x{} @ {:.3} Hz)",
            info.name,
            mode.width,
            mode.height,
            mode.refresh as f64 / 1000.0
        );
        let output = Output::new(
            info.id,
            info.name,
            info.modes,
            state,
            self.config.appearance.bar_height,
            Layout::default(),
        );
        self.outputs.push(output);
        self.place_outputs();
        if self.focused_output.is_none() {
            self.focused_output = Some(info.id);
        }

        for id in std::mem::take(&mut self.orphans) {
            if let Some(window) = self.windows.get_mut(&id) {
                window.output = Some(info.id);
            }
            self.map_surface(id);
        }
        self.publish_output_configuration();
    }

    fn remove_output(&mut self, id: OutputId) {
        let Some(pos) = self.outputs.iter().position(|o| o.id == id) else {
            return;
        };
        let removed = self.outputs.remove(pos);
        log::info!("[output] Output {} removed", removed.name);

        if self.focused_output == Some(id) {
            self.focused_output = self.outputs.first().map(|o| o.id);
        }
        let target = self.focused_output;

        for layer in Layer::ALL {
            let views = if layer.is_view_scoped() { 0..VIEW_COUNT } else { 0..1 };
            for view in views {
                for &window_id in removed.list(layer, view) {
                    self.rehome(window_id, layer, target);
                }
            }
        }

        self.place_outputs();
        if let Some(target) = target {
            self.arrange(target);
        }
        self.update_visibility();
        self.publish_output_configuration();
    }

    fn rehome(&mut self, id: WindowId, layer: Layer, target: Option<OutputId>) {
        match target.and_then(|t| self.output(t).map(|o| (t, o.current_view))) {
            Some((target, view)) => {
                if let Some(output) = self.output_mut(target) {
                    output.insert(layer, view, id);
                }
                if let Some(window) = self.windows.get_mut(&id) {
                    window.output = Some(target);
                    window.view = view;
                }
            }
            None => {
                if self.interaction.focused == Some(id) {
                    self.interaction.focused = None;
                    self.interaction.grabbed = false;
                }
                self.update_list.retain(|&w| w != id);
                if let Some(window) = self.windows.get_mut(&id) {
                    window.clear_mapping();
                    window.output = None;
                }
                self.orphans.push(id);
            }
        }
    }

    /// Lays outputs out left to right in list order.
    pub(crate) fn place_outputs(&mut self) {
        let mut x = 0;
        for output in &mut self.outputs {
            output.x = x;
            output.y = 0;
            x += output.effective_size().0;
        }
    }

    pub(crate) fn publish_output_configuration(&mut self) {
        self.config_serial = self.config_serial.wrapping_add(1);
        let heads: Vec<OutputHead> = self
            .outputs
            .iter()
            .map(|o| OutputHead {
                output: o.id,
                name: o.name.clone(),
                enabled: true,
                mode: o.state.mode,
                x: o.x,
                y: o.y,
                scale: o.state.scale,
                transform: o.state.transform,
                adaptive_sync: o.state.adaptive_sync,
            })
            .collect();
        self.backend.publish_output_configuration(self.config_serial, &heads);
    }
}
