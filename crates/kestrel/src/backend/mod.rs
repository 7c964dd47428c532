//! Primitive operations the core asks of the windowing collaborator.
//!
//! The core never talks to a display protocol directly; everything it needs
//! from the outside world goes through [`Backend`]. Geometry handed to the
//! collaborator is in global layout coordinates unless a method takes an
//! output id, in which case it is local to that output.

pub mod headless;

use crate::config::{AccelProfile, Modifiers};
use crate::geometry::Rectangle;
use crate::output::{Mode, OutputId, Transform};
use crate::window::{WindowFlags, WindowId};

pub use headless::HeadlessBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Pointer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Locked,
    Confined,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModeRequest {
    Mode(Mode),
    Custom { width: i32, height: i32, refresh: i32 },
}

impl ModeRequest {
    pub fn resolve(self) -> Mode {
        match self {
            ModeRequest::Mode(mode) => mode,
            ModeRequest::Custom {
                width,
                height,
                refresh,
            } => Mode::new(width, height, refresh),
        }
    }
}

/// One output as published to configuration observers.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputHead {
    pub output: OutputId,
    pub name: String,
    pub enabled: bool,
    pub mode: Mode,
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub transform: Transform,
    pub adaptive_sync: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigurationResult {
    Succeeded,
    Failed,
    Cancelled,
}

pub trait Backend {
    fn configure(&mut self, window: WindowId, geometry: Rectangle, flags: WindowFlags);
    fn set_activated(&mut self, window: WindowId, activated: bool);
    fn close(&mut self, window: WindowId);

    fn draw_rect(&mut self, output: OutputId, rect: Rectangle, color: u32);
    fn draw_window(&mut self, output: OutputId, window: WindowId, rect: Rectangle);
    /// Draws with the baseline at `y` and returns the advance width.
    fn draw_text(&mut self, output: OutputId, text: &str, x: i32, y: i32, color: u32) -> i32;
    fn text_width(&self, text: &str) -> i32;
    fn commit_frame(&mut self, output: OutputId);

    fn set_output_mode(&mut self, output: OutputId, mode: ModeRequest);
    fn set_output_scale(&mut self, output: OutputId, scale: f64);
    fn set_output_transform(&mut self, output: OutputId, transform: Transform);
    fn set_output_adaptive_sync(&mut self, output: OutputId, enabled: bool);
    /// Checks the staged state against the hardware without applying it.
    fn test_output(&mut self, output: OutputId) -> bool;
    fn commit_output(&mut self, output: OutputId) -> bool;
    fn rollback_output(&mut self, output: OutputId);
    fn publish_output_configuration(&mut self, serial: u32, heads: &[OutputHead]);
    fn output_configuration_result(&mut self, serial: u32, result: ConfigurationResult);

    fn pointer_enter(&mut self, window: WindowId, x: f64, y: f64);
    fn pointer_clear_focus(&mut self);
    fn pointer_motion(&mut self, time: u32, x: f64, y: f64);
    fn pointer_button(&mut self, time: u32, button: u32, pressed: bool);
    fn pointer_axis(&mut self, time: u32, axis: Axis, delta: f64);
    fn relative_motion(&mut self, time: u32, dx: f64, dy: f64, unaccel_dx: f64, unaccel_dy: f64);
    fn keyboard_enter(&mut self, window: WindowId, modifiers: Modifiers);
    fn keyboard_key(&mut self, time: u32, keycode: u32, pressed: bool);
    fn keyboard_modifiers(&mut self, modifiers: Modifiers);
    fn set_cursor_image(&mut self, name: &str);
    fn warp_cursor(&mut self, x: f64, y: f64);
    fn set_constraint_active(&mut self, window: WindowId, active: bool);
    fn notify_activity(&mut self);

    fn configure_pointer(&mut self, device: &str, profile: AccelProfile, speed: f64);
    fn configure_keyboard(&mut self, device: &str, repeat_rate: i32, repeat_delay: i32);

    fn spawn(&mut self, command: &str);
    fn terminate(&mut self);
}
