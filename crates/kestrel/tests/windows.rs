mod common;

use common::*;
use kestrel::backend::headless::Call;
use kestrel::config::Action;
use kestrel::event::Event;
use kestrel::window::{Anchor, LayerSurfaceInfo, LegacyInfo, ShellLayer, WindowKind};
use kestrel::{Layer, Rectangle};

#[test]
fn tiled_windows_follow_binary_split() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    assert_eq!(
        state.window(1).map(|w| w.geometry),
        Some(Rectangle::new(4, 24, 1912, 1052))
    );

    map_toplevel(&mut state, 2);
    assert_eq!(state.window(1).map(|w| w.geometry), Some(Rectangle::new(4, 24, 952, 1052)));
    assert_eq!(state.window(2).map(|w| w.geometry), Some(Rectangle::new(964, 24, 952, 1052)));

    state.backend.clear_calls();
    state.arrange(1);
    let first: Vec<_> = state.backend.calls.drain(..).collect();
    state.arrange(1);
    assert_eq!(first, state.backend.calls);
    assert_layer_invariant(&state);
}

#[test]
fn unmap_retiles_and_clears_focus() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    map_toplevel(&mut state, 2);
    assert_eq!(state.focused_window(), Some(2));

    state.dispatch(Event::UnmapSurface { id: 2 });
    assert_eq!(state.focused_window(), None);
    assert_eq!(state.window(1).map(|w| w.geometry), Some(Rectangle::new(4, 24, 1912, 1052)));
    assert_eq!(layer_of(&state, 2), None);
    assert_layer_invariant(&state);

    state.dispatch(Event::DestroySurface { id: 2 });
    assert!(state.window(2).is_none());
}

#[test]
fn destroy_before_map_is_harmless() {
    let mut state = setup(1);
    state.dispatch(Event::NewSurface {
        id: 7,
        kind: WindowKind::Toplevel,
        output: None,
    });
    state.dispatch(Event::DestroySurface { id: 7 });
    state.dispatch(Event::MapSurface { id: 7 });
    state.dispatch(Event::UnmapSurface { id: 7 });
    state.dispatch(Event::DestroySurface { id: 7 });
    assert!(state.windows.is_empty());
    assert!(state.memberships(7).is_empty());
}

#[test]
fn fullscreen_requested_before_map_applies_on_map() {
    let mut state = setup(1);
    state.dispatch(Event::NewSurface {
        id: 1,
        kind: WindowKind::Toplevel,
        output: None,
    });
    state.dispatch(Event::RequestFullscreen { id: 1, fullscreen: true });
    state.dispatch(Event::MapSurface { id: 1 });

    let window = state.window(1).unwrap();
    assert_eq!(window.layer, Some(Layer::Fullscreen));
    assert_eq!(window.old_layer, Layer::Tiled);
    let (geometry, flags) = state.backend.last_configure(1).unwrap();
    assert_eq!(geometry, Rectangle::new(0, 0, 1920, 1080));
    assert!(flags.fullscreen);

    state.dispatch(Event::RequestFullscreen { id: 1, fullscreen: false });
    assert_eq!(layer_of(&state, 1), Some(Layer::Tiled));
    let (geometry, flags) = state.backend.last_configure(1).unwrap();
    assert_eq!(geometry, Rectangle::new(4, 24, 1912, 1052));
    assert!(!flags.fullscreen);
    assert_layer_invariant(&state);
}

#[test]
fn fullscreen_restores_floating_geometry() {
    let mut state = setup(1);
    map(&mut state, 1, fixed_legacy(400, 300));
    assert_eq!(layer_of(&state, 1), Some(Layer::Floating));
    let floating = state.window(1).unwrap().geometry;
    assert_eq!(floating, Rectangle::new(760, 400, 400, 300));

    state.run_action(&Action::ToggleFullscreen);
    assert_eq!(layer_of(&state, 1), Some(Layer::Fullscreen));
    state.run_action(&Action::ToggleFullscreen);
    assert_eq!(layer_of(&state, 1), Some(Layer::Floating));
    assert_eq!(state.window(1).unwrap().geometry, floating);
}

#[test]
fn unmanaged_legacy_windows_are_popups_without_focus() {
    let mut state = setup(2);
    let kind = WindowKind::Legacy(LegacyInfo {
        wants_focus: false,
        size_hints: None,
        requested: Rectangle::new(100, 200, 50, 60),
    });
    map(&mut state, 1, kind);
    assert_eq!(layer_of(&state, 1), Some(Layer::Popups));
    assert_eq!(state.focused_window(), None);
    assert_eq!(state.window(1).unwrap().geometry, Rectangle::new(100, 200, 50, 60));
}

#[test]
fn legacy_configure_requests_are_clamped_and_localized() {
    let mut state = setup(2);
    map(&mut state, 1, fixed_legacy(400, 300));
    state.dispatch(Event::RequestConfigure {
        id: 1,
        x: 500,
        y: 100,
        width: 900,
        height: 900,
    });
    assert_eq!(state.window(1).unwrap().geometry, Rectangle::new(500, 100, 400, 300));

    // Tiled windows keep the tiler's geometry.
    map_toplevel(&mut state, 2);
    let tiled = state.window(2).unwrap().geometry;
    state.dispatch(Event::RequestConfigure {
        id: 2,
        x: 0,
        y: 0,
        width: 10,
        height: 10,
    });
    assert_eq!(state.window(2).unwrap().geometry, tiled);
}

#[test]
fn surface_commit_size_is_authoritative() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    state.dispatch(Event::SurfaceCommitted {
        id: 1,
        width: 800,
        height: 600,
    });
    let geometry = state.window(1).unwrap().geometry;
    assert_eq!((geometry.width, geometry.height), (800, 600));
}

#[test]
fn echoed_commits_round_trip_through_dispatch() {
    let mut state = setup(1);
    state.backend.echo_commits = true;
    map_toplevel(&mut state, 1);
    let echoed = state.backend.take_events();
    assert!(echoed
        .iter()
        .any(|e| matches!(e, Event::SurfaceCommitted { id: 1, width: 1912, height: 1052 })));
    for event in echoed {
        state.dispatch(event);
    }
    assert_eq!(state.window(1).unwrap().geometry, Rectangle::new(4, 24, 1912, 1052));
}

#[test]
fn layer_surfaces_size_from_anchors_and_grab_focus() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);

    let panel = WindowKind::LayerSurface(LayerSurfaceInfo {
        layer: ShellLayer::Top,
        anchor: Anchor {
            top: true,
            left: true,
            right: true,
            bottom: false,
        },
        desired_width: 0,
        desired_height: 30,
        keyboard_exclusive: true,
    });
    state.dispatch(Event::NewSurface {
        id: 2,
        kind: panel,
        output: None,
    });
    assert_eq!(state.backend.last_configure(2).map(|(g, _)| (g.width, g.height)), Some((1920, 30)));

    state.dispatch(Event::MapSurface { id: 2 });
    assert_eq!(layer_of(&state, 2), Some(Layer::Top));
    assert_eq!(state.window(2).unwrap().geometry, Rectangle::new(0, 20, 1920, 30));
    assert_eq!(state.focused_window(), Some(2));
    assert!(state.interaction.grabbed);

    // Focus follows nothing while the grab holds.
    move_pointer(&mut state, 500.0, 500.0);
    assert_eq!(state.focused_window(), Some(2));

    state.dispatch(Event::UnmapSurface { id: 2 });
    assert!(!state.interaction.grabbed);
    move_pointer(&mut state, 1.0, 1.0);
    assert_eq!(state.focused_window(), Some(1));
}

#[test]
fn background_surfaces_do_not_take_focus() {
    let mut state = setup(1);
    let wallpaper = WindowKind::LayerSurface(LayerSurfaceInfo {
        layer: ShellLayer::Background,
        anchor: Anchor::ALL,
        desired_width: 0,
        desired_height: 0,
        keyboard_exclusive: false,
    });
    map(&mut state, 1, wallpaper);
    assert_eq!(layer_of(&state, 1), Some(Layer::Background));
    assert_eq!(state.window(1).unwrap().geometry, Rectangle::new(0, 0, 1920, 1080));
    assert_eq!(state.focused_window(), None);
    assert!(!state.backend.calls.iter().any(|c| matches!(c, Call::SetActivated { window: 1, .. })));
}

#[test]
fn minimize_only_reaches_legacy_clients() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    map(&mut state, 2, fixed_legacy(100, 100));
    state.dispatch(Event::RequestMinimize { id: 1, minimized: true });
    state.dispatch(Event::RequestMinimize { id: 2, minimized: true });
    assert!(!state.window(1).unwrap().flags.minimized);
    assert!(state.backend.last_configure(2).unwrap().1.minimized);
}

#[test]
fn layer_invariant_survives_a_busy_session() {
    let mut state = setup(2);
    for id in 1..=4 {
        map_toplevel(&mut state, id);
    }
    map(&mut state, 5, fixed_legacy(300, 200));
    state.run_action(&Action::CycleLayer(vec![Layer::Floating, Layer::Tiled]));
    assert_layer_invariant(&state);

    state.run_action(&Action::MoveToView(3));
    assert_layer_invariant(&state);

    state.run_action(&Action::View(kestrel::config::ViewTarget::Index(3)));
    state.dispatch(Event::RequestFullscreen { id: 5, fullscreen: true });
    assert_layer_invariant(&state);

    state.dispatch(Event::OutputRemoved { output: 1 });
    assert_layer_invariant(&state);
    for id in 1..=5 {
        state.dispatch(Event::UnmapSurface { id });
    }
    assert_layer_invariant(&state);
}

#[test]
fn titles_default_to_placeholder() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    assert_eq!(state.window(1).unwrap().title(), "[no title]");
    state.dispatch(Event::SetTitle {
        id: 1,
        title: "editor".into(),
    });
    assert_eq!(state.window(1).unwrap().title(), "editor");
}

#[test]
fn remapped_window_rejoins_the_tiler() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    map_toplevel(&mut state, 2);

    state.dispatch(Event::UnmapSurface { id: 1 });
    assert_eq!(state.memberships(1), vec![]);
    state.dispatch(Event::MapSurface { id: 1 });

    assert_eq!(layer_of(&state, 1), Some(Layer::Tiled));
    assert_eq!(state.focused_window(), Some(1));
    assert_eq!(state.window(2).unwrap().geometry, Rectangle::new(4, 24, 952, 1052));
    assert_eq!(state.window(1).unwrap().geometry, Rectangle::new(964, 24, 952, 1052));
    assert_layer_invariant(&state);
}

#[test]
fn unmapping_a_fullscreen_window_drops_fullscreen() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    state.dispatch(Event::RequestFullscreen { id: 1, fullscreen: true });
    assert!(state.window(1).unwrap().is_fullscreen());

    state.dispatch(Event::UnmapSurface { id: 1 });
    state.dispatch(Event::MapSurface { id: 1 });

    let window = state.window(1).unwrap();
    assert_eq!(window.layer, Some(Layer::Tiled));
    assert!(!window.is_fullscreen());
    assert_eq!(window.saved_geometry, None);
    let (geometry, flags) = state.backend.last_configure(1).unwrap();
    assert_eq!(geometry, Rectangle::new(4, 24, 1912, 1052));
    assert!(!flags.fullscreen);

    state.run_action(&Action::ToggleFullscreen);
    assert_eq!(layer_of(&state, 1), Some(Layer::Fullscreen));
    assert_layer_invariant(&state);
}

#[test]
fn layer_bindings_enter_fullscreen_through_the_fullscreen_state() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    move_pointer(&mut state, 100.0, 100.0);

    state.run_action(&Action::SetLayer(Layer::Fullscreen));
    let window = state.window(1).unwrap();
    assert_eq!(window.layer, Some(Layer::Fullscreen));
    assert!(window.is_fullscreen());
    let (geometry, flags) = state.backend.last_configure(1).unwrap();
    assert_eq!(geometry, Rectangle::new(0, 0, 1920, 1080));
    assert!(flags.fullscreen);

    state.run_action(&Action::ToggleFullscreen);
    assert_eq!(layer_of(&state, 1), Some(Layer::Tiled));

    state.run_action(&Action::CycleLayer(vec![Layer::Tiled, Layer::Fullscreen]));
    assert!(state.window(1).unwrap().is_fullscreen());
    assert_layer_invariant(&state);
}
