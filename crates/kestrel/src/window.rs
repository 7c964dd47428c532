use crate::geometry::Rectangle;
use crate::layer::Layer;
use crate::output::OutputId;

/// Stable handle handed out by the windowing collaborator.
pub type WindowId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Anchor {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Anchor {
    pub const NONE: Anchor = Anchor {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };

    pub const ALL: Anchor = Anchor {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };

    pub fn vertical(&self) -> bool {
        self.top && self.bottom
    }

    pub fn horizontal(&self) -> bool {
        self.left && self.right
    }
}

/// Priority declared by a layer-shell surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellLayer {
    Background,
    Bottom,
    Top,
    Overlay,
}

impl ShellLayer {
    pub fn layer(self) -> Layer {
        match self {
            ShellLayer::Background => Layer::Background,
            ShellLayer::Bottom => Layer::Bottom,
            ShellLayer::Top => Layer::Top,
            ShellLayer::Overlay => Layer::Overlay,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerSurfaceInfo {
    pub layer: ShellLayer,
    pub anchor: Anchor,
    pub desired_width: i32,
    pub desired_height: i32,
    pub keyboard_exclusive: bool,
}

/// X11 WM_NORMAL_HINTS. Zero means unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl SizeHints {
    pub fn clamp(&self, width: i32, height: i32) -> (i32, i32) {
        let mut width = width;
        let mut height = height;
        if self.min_width > 0 {
            width = width.max(self.min_width);
        }
        if self.min_height > 0 {
            height = height.max(self.min_height);
        }
        if self.max_width > 0 {
            width = width.min(self.max_width);
        }
        if self.max_height > 0 {
            height = height.min(self.max_height);
        }
        (width, height)
    }

    pub fn is_fixed_size(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegacyInfo {
    /// False for override-redirect windows and windows that refuse input focus.
    pub wants_focus: bool,
    pub size_hints: Option<SizeHints>,
    /// Geometry the X client asked for, in global layout coordinates.
    pub requested: Rectangle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WindowKind {
    Toplevel,
    LayerSurface(LayerSurfaceInfo),
    Legacy(LegacyInfo),
}

impl WindowKind {
    pub fn supports_activation(&self) -> bool {
        !matches!(self, WindowKind::LayerSurface(_))
    }

    pub fn supports_fullscreen(&self) -> bool {
        !matches!(self, WindowKind::LayerSurface(_))
    }

    pub fn supports_minimize(&self) -> bool {
        matches!(self, WindowKind::Legacy(_))
    }

    /// Layer surfaces asking for the keyboard take focus on map and hold it
    /// until they unmap.
    pub fn wants_exclusive_input(&self) -> bool {
        match self {
            WindowKind::LayerSurface(info) => info.keyboard_exclusive,
            _ => false,
        }
    }

    /// Whether the user may drag or resize the window.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, WindowKind::LayerSurface(_))
    }

    pub fn size_hints(&self) -> Option<SizeHints> {
        match self {
            WindowKind::Legacy(info) => info.size_hints,
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowKind::Toplevel => "toplevel",
            WindowKind::LayerSurface(_) => "layer-surface",
            WindowKind::Legacy(_) => "legacy",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowFlags {
    pub fullscreen: bool,
    pub minimized: bool,
}

#[derive(Clone, Debug)]
pub struct Window {
    pub id: WindowId,
    pub kind: WindowKind,
    /// `None` while unmapped.
    pub layer: Option<Layer>,
    /// Layer restored when fullscreen is left.
    pub old_layer: Layer,
    pub output: Option<OutputId>,
    pub view: usize,
    /// Output-local coordinates.
    pub geometry: Rectangle,
    pub flags: WindowFlags,
    /// Geometry to restore when fullscreen is left.
    pub saved_geometry: Option<Rectangle>,
    pub mapped: bool,
    pub requesting_fullscreen: bool,
    pub in_update_set: bool,
    pub title: Option<String>,
}

impl Window {
    pub fn new(id: WindowId, kind: WindowKind) -> Self {
        Self {
            id,
            kind,
            layer: None,
            old_layer: Layer::Tiled,
            output: None,
            view: 0,
            geometry: Rectangle::default(),
            flags: WindowFlags::default(),
            saved_geometry: None,
            mapped: false,
            requesting_fullscreen: false,
            in_update_set: false,
            title: None,
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("[no title]")
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.fullscreen
    }

    /// Drops everything tied to being mapped. A fullscreen window gets its
    /// pre-fullscreen geometry back and maps again as a normal window.
    pub fn clear_mapping(&mut self) {
        self.mapped = false;
        self.layer = None;
        self.in_update_set = false;
        self.flags.fullscreen = false;
        if let Some(saved) = self.saved_geometry.take() {
            self.geometry = saved;
        }
    }
}
