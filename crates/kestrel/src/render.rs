use std::collections::HashMap;

use crate::backend::Backend;
use crate::config::Config;
use crate::geometry::Rectangle;
use crate::layer::Layer;
use crate::output::{Output, OutputId, VIEW_COUNT};
use crate::state::State;
use crate::window::{Window, WindowId, WindowKind};

const VIEW_LABEL_PADDING: i32 = 10;
const TITLE_OFFSET: i32 = 30;

const BASE_LAYERS: [Layer; 4] = [Layer::Background, Layer::Bottom, Layer::Tiled, Layer::Floating];
const BLEED_LAYERS: [Layer; 5] = [Layer::Floating, Layer::Sticky, Layer::Popups, Layer::Top, Layer::Overlay];

struct Frame<'a, B: Backend> {
    backend: &'a mut B,
    windows: &'a HashMap<WindowId, Window>,
    config: &'a Config,
    focused: Option<WindowId>,
    target: OutputId,
}

impl<B: Backend> Frame<'_, B> {
    /// Draws `source`'s list for `layer`, offset by `(dx, dy)`. With `clip`
    /// set, windows that miss `clip` are skipped.
    fn draw_layer(&mut self, source: &Output, layer: Layer, dx: i32, dy: i32, clip: Option<Rectangle>) {
        if !source.current().show.contains(layer) {
            return;
        }
        for &id in source.current_list(layer) {
            let Some(window) = self.windows.get(&id) else {
                continue;
            };
            let rect = window.geometry.translate(dx, dy);
            if clip.is_some_and(|clip| !clip.intersects(&rect)) {
                continue;
            }
            if has_border(window, layer) {
                let color = if self.focused == Some(id) {
                    self.config.border_active()
                } else {
                    self.config.border_inactive()
                };
                let border = rect.outset(self.config.appearance.border_width);
                self.backend.draw_rect(self.target, border, color);
            }
            self.backend.draw_window(self.target, id, rect);
        }
    }
}

fn has_border(window: &Window, layer: Layer) -> bool {
    !matches!(window.kind, WindowKind::LayerSurface(_))
        && layer != Layer::Popups
        && !window.is_fullscreen()
}

impl<B: Backend> State<B> {
    /// Composes one frame for an output.
    pub fn render_output(&mut self, output_id: OutputId) {
        let State {
            backend,
            windows,
            outputs,
            config,
            interaction,
            status,
            ..
        } = self;
        let Some(output) = outputs.iter().find(|o| o.id == output_id) else {
            return;
        };
        let mut frame = Frame {
            backend,
            windows,
            config,
            focused: interaction.focused,
            target: output_id,
        };

        let fullscreen = output.current().top_fullscreen();
        match fullscreen {
            None => {
                for layer in BASE_LAYERS {
                    frame.draw_layer(output, layer, 0, 0, None);
                }
            }
            Some(id) => {
                let (width, height) = output.effective_size();
                frame
                    .backend
                    .draw_window(output_id, id, Rectangle::new(0, 0, width, height));
            }
        }

        if fullscreen.is_none() && outputs.len() > 1 {
            let (width, height) = output.effective_size();
            let clip = Rectangle::new(0, 0, width, height);
            for other in outputs.iter().filter(|o| o.id != output_id) {
                let dx = other.x - output.x;
                let dy = other.y - output.y;
                for layer in BLEED_LAYERS {
                    frame.draw_layer(other, layer, dx, dy, Some(clip));
                }
            }
        }

        frame.draw_layer(output, Layer::Sticky, 0, 0, None);
        frame.draw_layer(output, Layer::Popups, 0, 0, None);

        if fullscreen.is_none() {
            let blocks = status.snapshot();
            let title = interaction
                .focused
                .and_then(|id| frame.windows.get(&id))
                .map(|w| match w.layer {
                    Some(layer) => format!("{} [{}]", w.title(), layer.index()),
                    None => w.title().to_string(),
                });
            frame.draw_bar(output, title.as_deref(), &blocks);
        }

        frame.draw_layer(output, Layer::Top, 0, 0, None);
        frame.draw_layer(output, Layer::Overlay, 0, 0, None);
        frame.backend.commit_frame(output_id);
    }
}

impl<B: Backend> Frame<'_, B> {
    fn draw_bar(&mut self, output: &Output, title: Option<&str>, blocks: &[String]) {
        let bar_height = output.bar_height;
        let text_y = bar_height - 4;
        if text_y < 0 {
            return;
        }
        let (width, _) = output.effective_size();
        let config = self.config;

        self.backend
            .draw_rect(self.target, Rectangle::new(0, 0, width, bar_height), config.bar_background());

        let mut x = VIEW_LABEL_PADDING;
        for view in 0..VIEW_COUNT {
            let label = (view + 1).to_string();
            let label_width = self.backend.text_width(&label);
            if view == output.current_view {
                self.backend.draw_rect(
                    self.target,
                    Rectangle::new(x - VIEW_LABEL_PADDING / 2, 0, label_width + VIEW_LABEL_PADDING, bar_height),
                    config.bar_selection(),
                );
            }
            if output.views[view].is_occupied() {
                self.backend.draw_rect(
                    self.target,
                    Rectangle::new(x - VIEW_LABEL_PADDING / 2 + 1, 1, 2, 2),
                    config.view_marker(),
                );
            }
            x += self.backend.draw_text(self.target, &label, x, text_y, config.bar_text());
            x += VIEW_LABEL_PADDING;
        }

        if let Some(title) = title {
            self.backend
                .draw_text(self.target, title, x + TITLE_OFFSET, text_y, config.bar_text());
        }

        let padding = config.status.padding;
        let thickness = config.status.separator_thickness;
        let mut right = width - padding;
        for (i, text) in blocks.iter().enumerate() {
            if i > 0 {
                right -= padding + thickness;
                self.backend.draw_rect(
                    self.target,
                    Rectangle::new(right, 0, thickness, bar_height),
                    config.status_separator(),
                );
                right -= padding;
            }
            right -= self.backend.text_width(text);
            self.backend.draw_text(self.target, text, right, text_y, config.bar_text());
        }
    }
}
