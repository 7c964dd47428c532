//! Notifications delivered by the windowing collaborator.

use crate::backend::{Axis, ConstraintKind, DeviceKind};
use crate::config::Modifiers;
use crate::output::{Mode, OutputId};
use crate::output_management::OutputConfiguration;
use crate::window::{WindowId, WindowKind};

#[derive(Clone, Debug, PartialEq)]
pub struct OutputInfo {
    pub id: OutputId,
    pub name: String,
    pub modes: Vec<Mode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// `output` pre-assigns the surface to an output (layer surfaces may name one).
    NewSurface {
        id: WindowId,
        kind: WindowKind,
        output: Option<OutputId>,
    },
    MapSurface {
        id: WindowId,
    },
    UnmapSurface {
        id: WindowId,
    },
    DestroySurface {
        id: WindowId,
    },
    RequestFullscreen {
        id: WindowId,
        fullscreen: bool,
    },
    /// Legacy clients ask for geometry in global coordinates.
    RequestConfigure {
        id: WindowId,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    RequestMinimize {
        id: WindowId,
        minimized: bool,
    },
    SetTitle {
        id: WindowId,
        title: String,
    },
    SurfaceCommitted {
        id: WindowId,
        width: i32,
        height: i32,
    },

    NewOutput(OutputInfo),
    OutputRemoved {
        output: OutputId,
    },
    OutputFrame {
        output: OutputId,
    },

    PointerMotion {
        time: u32,
        dx: f64,
        dy: f64,
        unaccel_dx: f64,
        unaccel_dy: f64,
    },
    /// Coordinates normalized to 0..1 over the whole layout.
    PointerMotionAbsolute {
        time: u32,
        x: f64,
        y: f64,
    },
    PointerButton {
        time: u32,
        button: u32,
        pressed: bool,
    },
    PointerAxis {
        time: u32,
        axis: Axis,
        delta: f64,
    },
    KeyboardKey {
        time: u32,
        keycode: u32,
        keysym: u32,
        pressed: bool,
    },
    KeyboardModifiers(Modifiers),
    NewInputDevice {
        name: String,
        kind: DeviceKind,
    },

    TestOutputConfiguration(OutputConfiguration),
    ApplyOutputConfiguration(OutputConfiguration),

    NewPointerConstraint {
        window: WindowId,
        kind: ConstraintKind,
    },
    PointerConstraintDestroyed {
        window: WindowId,
    },
}
