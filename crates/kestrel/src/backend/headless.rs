use std::collections::{HashMap, HashSet};

use super::{Axis, Backend, ConfigurationResult, ModeRequest, OutputHead};
use crate::config::{AccelProfile, Modifiers};
use crate::event::{Event, OutputInfo};
use crate::geometry::Rectangle;
use crate::output::{Mode, OutputId, OutputState, Transform};
use crate::window::{WindowFlags, WindowId};

/// Advance of one glyph of the built-in 5x7 cell font, spacing included.
pub const GLYPH_ADVANCE: i32 = 6;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Configure { window: WindowId, geometry: Rectangle, flags: WindowFlags },
    SetActivated { window: WindowId, activated: bool },
    Close(WindowId),
    DrawRect { output: OutputId, rect: Rectangle, color: u32 },
    DrawWindow { output: OutputId, window: WindowId, rect: Rectangle },
    DrawText { output: OutputId, text: String, x: i32, y: i32 },
    CommitFrame(OutputId),
    SetMode { output: OutputId, mode: ModeRequest },
    SetScale { output: OutputId, scale: f64 },
    SetTransform { output: OutputId, transform: Transform },
    SetAdaptiveSync { output: OutputId, enabled: bool },
    TestOutput(OutputId),
    CommitOutput(OutputId),
    RollbackOutput(OutputId),
    Publish { serial: u32, heads: Vec<OutputHead> },
    ConfigurationResult { serial: u32, result: ConfigurationResult },
    PointerEnter { window: WindowId, x: f64, y: f64 },
    PointerClearFocus,
    PointerMotion { x: f64, y: f64 },
    PointerButton { button: u32, pressed: bool },
    PointerAxis { axis: Axis, delta: f64 },
    RelativeMotion { dx: f64, dy: f64 },
    KeyboardEnter { window: WindowId },
    KeyboardKey { keycode: u32, pressed: bool },
    KeyboardModifiers(Modifiers),
    CursorImage(String),
    WarpCursor { x: f64, y: f64 },
    ConstraintActive { window: WindowId, active: bool },
    Activity,
    ConfigurePointer { device: String, profile: AccelProfile, speed: f64 },
    ConfigureKeyboard { device: String, repeat_rate: i32, repeat_delay: i32 },
    Spawn(String),
    Terminate,
}

#[derive(Clone, Debug)]
pub struct HeadlessOutput {
    pub name: String,
    pub modes: Vec<Mode>,
    pub committed: Option<OutputState>,
    pub staged: Option<OutputState>,
}

/// Display-less collaborator: records every primitive call, keeps a
/// staged/committed state per output and can be told which configurations
/// the "hardware" rejects.
#[derive(Default)]
pub struct HeadlessBackend {
    pub calls: Vec<Call>,
    pub outputs: HashMap<OutputId, HeadlessOutput>,
    rejected_outputs: HashSet<OutputId>,
    rejected_sizes: HashSet<(i32, i32)>,
    /// Queue a `SurfaceCommitted` for every configure, as a client would.
    pub echo_commits: bool,
    pending: Vec<Event>,
    next_output: OutputId,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            next_output: 1,
            ..Self::default()
        }
    }

    /// Registers a virtual output and returns the discovery event to dispatch.
    pub fn add_output(&mut self, name: &str, modes: Vec<Mode>) -> Event {
        let id = self.next_output.max(1);
        self.next_output = id + 1;
        self.outputs.insert(
            id,
            HeadlessOutput {
                name: name.to_string(),
                modes: modes.clone(),
                committed: None,
                staged: None,
            },
        );
        Event::NewOutput(OutputInfo {
            id,
            name: name.to_string(),
            modes,
        })
    }

    pub fn reject_output(&mut self, output: OutputId) {
        self.rejected_outputs.insert(output);
    }

    pub fn reject_size(&mut self, width: i32, height: i32) {
        self.rejected_sizes.insert((width, height));
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn committed(&self, output: OutputId) -> Option<OutputState> {
        self.outputs.get(&output).and_then(|o| o.committed)
    }

    pub fn last_configure(&self, window: WindowId) -> Option<(Rectangle, WindowFlags)> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Configure { window: w, geometry, flags } if *w == window => Some((*geometry, *flags)),
            _ => None,
        })
    }

    pub fn activation(&self, window: WindowId) -> Option<bool> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::SetActivated { window: w, activated } if *w == window => Some(*activated),
            _ => None,
        })
    }

    pub fn drawn_windows(&self, output: OutputId) -> Vec<WindowId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::DrawWindow { output: o, window, .. } if *o == output => Some(*window),
                _ => None,
            })
            .collect()
    }

    fn staged_mut(&mut self, output: OutputId) -> Option<&mut OutputState> {
        let entry = self.outputs.get_mut(&output)?;
        let base = entry
            .committed
            .or_else(|| entry.modes.first().map(|mode| OutputState::new(*mode)))
            .unwrap_or_else(|| OutputState::new(Mode::new(0, 0, 0)));
        Some(entry.staged.get_or_insert(base))
    }

    fn feasible(&self, output: OutputId) -> bool {
        if self.rejected_outputs.contains(&output) {
            return false;
        }
        let Some(state) = self.outputs.get(&output).and_then(|o| o.staged.or(o.committed)) else {
            return false;
        };
        state.scale > 0.0
            && state.mode.width > 0
            && state.mode.height > 0
            && !self.rejected_sizes.contains(&(state.mode.width, state.mode.height))
    }
}

impl Backend for HeadlessBackend {
    fn configure(&mut self, window: WindowId, geometry: Rectangle, flags: WindowFlags) {
        self.calls.push(Call::Configure { window, geometry, flags });
        if self.echo_commits {
            self.pending.push(Event::SurfaceCommitted {
                id: window,
                width: geometry.width,
                height: geometry.height,
            });
        }
    }

    fn set_activated(&mut self, window: WindowId, activated: bool) {
        self.calls.push(Call::SetActivated { window, activated });
    }

    fn close(&mut self, window: WindowId) {
        self.calls.push(Call::Close(window));
    }

    fn draw_rect(&mut self, output: OutputId, rect: Rectangle, color: u32) {
        self.calls.push(Call::DrawRect { output, rect, color });
    }

    fn draw_window(&mut self, output: OutputId, window: WindowId, rect: Rectangle) {
        self.calls.push(Call::DrawWindow { output, window, rect });
    }

    fn draw_text(&mut self, output: OutputId, text: &str, x: i32, y: i32, _color: u32) -> i32 {
        self.calls.push(Call::DrawText {
            output,
            text: text.to_string(),
            x,
            y,
        });
        self.text_width(text)
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * GLYPH_ADVANCE
    }

    fn commit_frame(&mut self, output: OutputId) {
        self.calls.push(Call::CommitFrame(output));
    }

    fn set_output_mode(&mut self, output: OutputId, mode: ModeRequest) {
        self.calls.push(Call::SetMode { output, mode });
        if let Some(staged) = self.staged_mut(output) {
            staged.mode = mode.resolve();
        }
    }

    fn set_output_scale(&mut self, output: OutputId, scale: f64) {
        self.calls.push(Call::SetScale { output, scale });
        if let Some(staged) = self.staged_mut(output) {
            staged.scale = scale;
        }
    }

    fn set_output_transform(&mut self, output: OutputId, transform: Transform) {
        self.calls.push(Call::SetTransform { output, transform });
        if let Some(staged) = self.staged_mut(output) {
            staged.transform = transform;
        }
    }

    fn set_output_adaptive_sync(&mut self, output: OutputId, enabled: bool) {
        self.calls.push(Call::SetAdaptiveSync { output, enabled });
        if let Some(staged) = self.staged_mut(output) {
            staged.adaptive_sync = enabled;
        }
    }

    fn test_output(&mut self, output: OutputId) -> bool {
        self.calls.push(Call::TestOutput(output));
        self.feasible(output)
    }

    fn commit_output(&mut self, output: OutputId) -> bool {
        self.calls.push(Call::CommitOutput(output));
        if !self.feasible(output) {
            return false;
        }
        if let Some(entry) = self.outputs.get_mut(&output) {
            if let Some(staged) = entry.staged.take() {
                entry.committed = Some(staged);
            }
        }
        true
    }

    fn rollback_output(&mut self, output: OutputId) {
        self.calls.push(Call::RollbackOutput(output));
        if let Some(entry) = self.outputs.get_mut(&output) {
            entry.staged = None;
        }
    }

    fn publish_output_configuration(&mut self, serial: u32, heads: &[OutputHead]) {
        self.calls.push(Call::Publish {
            serial,
            heads: heads.to_vec(),
        });
    }

    fn output_configuration_result(&mut self, serial: u32, result: ConfigurationResult) {
        self.calls.push(Call::ConfigurationResult { serial, result });
    }

    fn pointer_enter(&mut self, window: WindowId, x: f64, y: f64) {
        self.calls.push(Call::PointerEnter { window, x, y });
    }

    fn pointer_clear_focus(&mut self) {
        self.calls.push(Call::PointerClearFocus);
    }

    fn pointer_motion(&mut self, _time: u32, x: f64, y: f64) {
        self.calls.push(Call::PointerMotion { x, y });
    }

    fn pointer_button(&mut self, _time: u32, button: u32, pressed: bool) {
        self.calls.push(Call::PointerButton { button, pressed });
    }

    fn pointer_axis(&mut self, _time: u32, axis: Axis, delta: f64) {
        self.calls.push(Call::PointerAxis { axis, delta });
    }

    fn relative_motion(&mut self, _time: u32, dx: f64, dy: f64, _unaccel_dx: f64, _unaccel_dy: f64) {
        self.calls.push(Call::RelativeMotion { dx, dy });
    }

    fn keyboard_enter(&mut self, window: WindowId, _modifiers: Modifiers) {
        self.calls.push(Call::KeyboardEnter { window });
    }

    fn keyboard_key(&mut self, _time: u32, keycode: u32, pressed: bool) {
        self.calls.push(Call::KeyboardKey { keycode, pressed });
    }

    fn keyboard_modifiers(&mut self, modifiers: Modifiers) {
        self.calls.push(Call::KeyboardModifiers(modifiers));
    }

    fn set_cursor_image(&mut self, name: &str) {
        self.calls.push(Call::CursorImage(name.to_string()));
    }

    fn warp_cursor(&mut self, x: f64, y: f64) {
        self.calls.push(Call::WarpCursor { x, y });
    }

    fn set_constraint_active(&mut self, window: WindowId, active: bool) {
        self.calls.push(Call::ConstraintActive { window, active });
    }

    fn notify_activity(&mut self) {
        self.calls.push(Call::Activity);
    }

    fn configure_pointer(&mut self, device: &str, profile: AccelProfile, speed: f64) {
        self.calls.push(Call::ConfigurePointer {
            device: device.to_string(),
            profile,
            speed,
        });
    }

    fn configure_keyboard(&mut self, device: &str, repeat_rate: i32, repeat_delay: i32) {
        self.calls.push(Call::ConfigureKeyboard {
            device: device.to_string(),
            repeat_rate,
            repeat_delay,
        });
    }

    fn spawn(&mut self, command: &str) {
        log::info!("[headless] spawn requested: {}", command);
        self.calls.push(Call::Spawn(command.to_string()));
    }

    fn terminate(&mut self) {
        self.calls.push(Call::Terminate);
    }
}
