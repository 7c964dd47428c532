mod common;

use common::*;
use kestrel::backend::headless::Call;
use kestrel::config::Action;
use kestrel::event::Event;
use kestrel::window::{Anchor, LayerSurfaceInfo, ShellLayer, WindowKind};
use kestrel::{HeadlessBackend, Rectangle, State};

fn frame(state: &mut State<HeadlessBackend>, output: u64) -> Vec<Call> {
    state.backend.clear_calls();
    state.dispatch(Event::OutputFrame { output });
    state.backend.calls.clone()
}

fn texts(calls: &[Call]) -> Vec<(String, i32)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::DrawText { text, x, .. } => Some((text.clone(), *x)),
            _ => None,
        })
        .collect()
}

#[test]
fn frame_draws_layers_in_order_and_commits() {
    let mut state = setup(1);
    let wallpaper = WindowKind::LayerSurface(LayerSurfaceInfo {
        layer: ShellLayer::Background,
        anchor: Anchor::ALL,
        desired_width: 0,
        desired_height: 0,
        keyboard_exclusive: false,
    });
    let overlay = WindowKind::LayerSurface(LayerSurfaceInfo {
        layer: ShellLayer::Overlay,
        anchor: Anchor::NONE,
        desired_width: 200,
        desired_height: 50,
        keyboard_exclusive: false,
    });
    map(&mut state, 1, overlay);
    map(&mut state, 2, fixed_legacy(400, 300));
    map_toplevel(&mut state, 3);
    map(&mut state, 4, wallpaper);

    let calls = frame(&mut state, 1);
    assert_eq!(state.backend.drawn_windows(1), vec![4, 3, 2, 1]);
    assert_eq!(calls.last(), Some(&Call::CommitFrame(1)));

    // Borders only around managed windows.
    let focused_border = Call::DrawRect {
        output: 1,
        rect: Rectangle::new(4, 24, 1912, 1052).outset(1),
        color: state.config.border_active(),
    };
    assert!(calls.contains(&focused_border));
    assert!(calls.contains(&Call::DrawRect {
        output: 1,
        rect: Rectangle::new(760, 400, 400, 300).outset(1),
        color: state.config.border_inactive(),
    }));
    let layer_surface_borders = [Rectangle::new(-1, -1, 202, 52), Rectangle::new(-1, -1, 1922, 1082)];
    assert!(!calls
        .iter()
        .any(|c| matches!(c, Call::DrawRect { rect, .. } if layer_surface_borders.contains(rect))));
}

#[test]
fn fullscreen_occludes_everything_but_chrome_above_it() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    map_toplevel(&mut state, 2);
    state.dispatch(Event::RequestFullscreen { id: 1, fullscreen: true });

    let calls = frame(&mut state, 1);
    assert_eq!(state.backend.drawn_windows(1), vec![1]);
    assert!(calls.contains(&Call::DrawWindow {
        output: 1,
        window: 1,
        rect: Rectangle::new(0, 0, 1920, 1080),
    }));
    assert!(texts(&calls).is_empty(), "bar must be skipped");
    assert!(!calls.iter().any(|c| matches!(c, Call::DrawRect { .. })));
}

#[test]
fn newest_fullscreen_window_wins() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    map_toplevel(&mut state, 2);
    state.dispatch(Event::RequestFullscreen { id: 1, fullscreen: true });
    state.dispatch(Event::RequestFullscreen { id: 2, fullscreen: true });
    frame(&mut state, 1);
    assert_eq!(state.backend.drawn_windows(1), vec![2]);
}

#[test]
fn floating_windows_bleed_into_neighbours() {
    let mut state = setup(2);
    map(&mut state, 1, fixed_legacy(400, 300));
    state.dispatch(Event::RequestConfigure {
        id: 1,
        x: 1800,
        y: 100,
        width: 400,
        height: 300,
    });
    map(&mut state, 2, fixed_legacy(100, 100));

    let calls = frame(&mut state, 2);
    assert_eq!(state.backend.drawn_windows(2), vec![1]);
    assert!(calls.contains(&Call::DrawWindow {
        output: 2,
        window: 1,
        rect: Rectangle::new(-120, 100, 400, 300),
    }));

    // A fullscreen window on the receiving output blocks the bleed.
    state.dispatch(Event::PointerMotionAbsolute {
        time: 0,
        x: 0.9,
        y: 0.5,
    });
    map_toplevel(&mut state, 3);
    assert_eq!(state.window(3).unwrap().output, Some(2));
    state.dispatch(Event::RequestFullscreen { id: 3, fullscreen: true });
    frame(&mut state, 2);
    assert_eq!(state.backend.drawn_windows(2), vec![3]);
}

#[test]
fn bar_shows_views_title_and_status() {
    let mut state = setup(1);
    map_toplevel(&mut state, 1);
    state.dispatch(Event::SetTitle {
        id: 1,
        title: "shell".into(),
    });
    state.status.replace(vec!["abc".into(), "de".into()]);

    let calls = frame(&mut state, 1);
    let drawn = texts(&calls);
    let labels: Vec<_> = drawn.iter().take(9).map(|(t, _)| t.as_str()).collect();
    assert_eq!(labels, ["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    assert_eq!(drawn[0].1, 10);
    assert_eq!(drawn[1].1, 26);

    // Nine labels of one glyph each, then the title.
    assert_eq!(drawn[9], ("shell [2]".to_string(), 10 + 9 * 16 + 30));
    assert_eq!(drawn[10], ("abc".to_string(), 1920 - 4 - 18));
    assert_eq!(drawn[11], ("de".to_string(), 1898 - 4 - 1 - 4 - 12));

    assert!(calls.contains(&Call::DrawRect {
        output: 1,
        rect: Rectangle::new(5, 0, 16, 20),
        color: state.config.bar_selection(),
    }));
    assert!(calls.contains(&Call::DrawRect {
        output: 1,
        rect: Rectangle::new(6, 1, 2, 2),
        color: state.config.view_marker(),
    }));
    assert!(calls.contains(&Call::DrawRect {
        output: 1,
        rect: Rectangle::new(1893, 0, 1, 20),
        color: state.config.status_separator(),
    }));
}

#[test]
fn sticky_windows_show_on_every_view() {
    let mut state = setup(1);
    map(&mut state, 1, fixed_legacy(300, 200));
    state.run_action(&Action::CycleLayer(vec![kestrel::Layer::Sticky]));
    state.run_action(&Action::View(kestrel::config::ViewTarget::Index(4)));
    frame(&mut state, 1);
    assert_eq!(state.backend.drawn_windows(1), vec![1]);
    assert_eq!(state.backend.activation(1), Some(true));
}
