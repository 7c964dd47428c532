#![allow(dead_code)]

use kestrel::backend::headless::Call;
use kestrel::config::Modifiers;
use kestrel::event::Event;
use kestrel::output::{Mode, OutputId};
use kestrel::window::{LegacyInfo, SizeHints, WindowId, WindowKind};
use kestrel::{Config, HeadlessBackend, Layer, Rectangle, State};

pub const WIDTH: i32 = 1920;
pub const HEIGHT: i32 = 1080;

pub fn mode() -> Mode {
    let mut mode = Mode::new(WIDTH, HEIGHT, 60_000);
    mode.preferred = true;
    mode
}

/// State with `outputs` 1920x1080 virtual outputs side by side.
pub fn setup(outputs: usize) -> State<HeadlessBackend> {
    let mut state = State::new(Config::default(), HeadlessBackend::new());
    for i in 0..outputs {
        let event = state.backend.add_output(&format!("HEADLESS-{}", i + 1), vec![mode()]);
        state.dispatch(event);
    }
    state.backend.clear_calls();
    state
}

pub fn output_ids(state: &State<HeadlessBackend>) -> Vec<OutputId> {
    state.outputs.iter().map(|o| o.id).collect()
}

pub fn map(state: &mut State<HeadlessBackend>, id: WindowId, kind: WindowKind) {
    state.dispatch(Event::NewSurface { id, kind, output: None });
    state.dispatch(Event::MapSurface { id });
}

pub fn map_toplevel(state: &mut State<HeadlessBackend>, id: WindowId) {
    map(state, id, WindowKind::Toplevel);
}

/// Fixed-size legacy client, which lands in the floating layer.
pub fn fixed_legacy(width: i32, height: i32) -> WindowKind {
    WindowKind::Legacy(LegacyInfo {
        wants_focus: true,
        size_hints: Some(SizeHints {
            min_width: width,
            min_height: height,
            max_width: width,
            max_height: height,
        }),
        requested: Rectangle::new(0, 0, width, height),
    })
}

pub fn move_pointer(state: &mut State<HeadlessBackend>, dx: f64, dy: f64) {
    state.dispatch(Event::PointerMotion {
        time: 0,
        dx,
        dy,
        unaccel_dx: dx,
        unaccel_dy: dy,
    });
}

pub fn hold_logo(state: &mut State<HeadlessBackend>, shift: bool) {
    state.dispatch(Event::KeyboardModifiers(Modifiers {
        logo: true,
        shift,
        ..Modifiers::default()
    }));
}

pub fn release_modifiers(state: &mut State<HeadlessBackend>) {
    state.dispatch(Event::KeyboardModifiers(Modifiers::default()));
}

pub fn layer_of(state: &State<HeadlessBackend>, id: WindowId) -> Option<Layer> {
    state.window(id).and_then(|w| w.layer)
}

/// Each mapped window sits in exactly the list its fields name; unmapped
/// ones sit in none.
pub fn assert_layer_invariant(state: &State<HeadlessBackend>) {
    for (&id, window) in &state.windows {
        let found = state.memberships(id);
        if !window.mapped {
            assert!(found.is_empty(), "unmapped window {} still listed: {:?}", id, found);
            continue;
        }
        assert_eq!(found.len(), 1, "window {} listed {} times: {:?}", id, found.len(), found);
        let (output, layer, view) = found[0];
        assert_eq!(Some(output), window.output);
        assert_eq!(Some(layer), window.layer);
        if layer.is_view_scoped() {
            assert_eq!(view, Some(window.view));
        }
    }
}

pub fn index_of(calls: &[Call], wanted: &Call) -> Option<usize> {
    calls.iter().position(|call| call == wanted)
}
