use std::fmt;

/// Draw and hit-test priority bands, lowest first.
///
/// `Tiled`, `Floating` and `Fullscreen` belong to a single view; every other
/// layer is shared by all nine views of an output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background = 0,
    Bottom = 1,
    Tiled = 2,
    Floating = 3,
    Fullscreen = 4,
    Sticky = 5,
    Popups = 6,
    Top = 7,
    Overlay = 8,
}

/// Where a layer's window list lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LayerSlot {
    View(usize),
    Output(usize),
}

impl Layer {
    pub const COUNT: usize = 9;

    pub const ALL: [Layer; Layer::COUNT] = [
        Layer::Background,
        Layer::Bottom,
        Layer::Tiled,
        Layer::Floating,
        Layer::Fullscreen,
        Layer::Sticky,
        Layer::Popups,
        Layer::Top,
        Layer::Overlay,
    ];

    /// Pointer hit-test order, top-most band first. Popups are never hit.
    pub const HIT_TEST_ORDER: [Layer; 7] = [
        Layer::Overlay,
        Layer::Top,
        Layer::Sticky,
        Layer::Fullscreen,
        Layer::Floating,
        Layer::Tiled,
        Layer::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Layer> {
        Layer::ALL.get(index).copied()
    }

    pub fn is_view_scoped(self) -> bool {
        matches!(self, Layer::Tiled | Layer::Floating | Layer::Fullscreen)
    }

    pub(crate) fn slot(self) -> LayerSlot {
        match self {
            Layer::Tiled => LayerSlot::View(0),
            Layer::Floating => LayerSlot::View(1),
            Layer::Fullscreen => LayerSlot::View(2),
            Layer::Background => LayerSlot::Output(0),
            Layer::Bottom => LayerSlot::Output(1),
            Layer::Sticky => LayerSlot::Output(2),
            Layer::Popups => LayerSlot::Output(3),
            Layer::Top => LayerSlot::Output(4),
            Layer::Overlay => LayerSlot::Output(5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Bottom => "bottom",
            Layer::Tiled => "tiled",
            Layer::Floating => "floating",
            Layer::Fullscreen => "fullscreen",
            Layer::Sticky => "sticky",
            Layer::Popups => "popups",
            Layer::Top => "top",
            Layer::Overlay => "overlay",
        }
    }

    /// Accepts a layer name or its numeric index.
    pub fn parse(s: &str) -> Option<Layer> {
        let s = s.trim().to_lowercase();
        if let Ok(index) = s.parse::<usize>() {
            return Layer::from_index(index);
        }
        match s.as_str() {
            "tiles" | "tile" => return Some(Layer::Tiled),
            "float" => return Some(Layer::Floating),
            "popup" => return Some(Layer::Popups),
            _ => {}
        }
        Layer::ALL.into_iter().find(|layer| layer.name() == s)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of layers eligible for rendering on a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask((1 << Layer::COUNT) - 1);
    pub const NONE: LayerMask = LayerMask(0);

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & (1 << layer.index()) != 0
    }

    pub fn toggle(&mut self, layer: Layer) {
        self.0 ^= 1 << layer.index();
    }

    pub fn insert(&mut self, layer: Layer) {
        self.0 |= 1 << layer.index();
    }

    pub fn remove(&mut self, layer: Layer) {
        self.0 &= !(1 << layer.index());
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_draw_order() {
        for pair in Layer::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Layer::from_index(4), Some(Layer::Fullscreen));
        assert_eq!(Layer::from_index(9), None);
    }

    #[test]
    fn only_three_layers_are_view_scoped() {
        let scoped: Vec<Layer> = Layer::ALL.into_iter().filter(|l| l.is_view_scoped()).collect();
        assert_eq!(scoped, vec![Layer::Tiled, Layer::Floating, Layer::Fullscreen]);
    }

    #[test]
    fn parse_names_and_indices() {
        assert_eq!(Layer::parse("Floating"), Some(Layer::Floating));
        assert_eq!(Layer::parse("tiles"), Some(Layer::Tiled));
        assert_eq!(Layer::parse("7"), Some(Layer::Top));
        assert_eq!(Layer::parse("12"), None);
        assert_eq!(Layer::parse("sideways"), None);
    }

    #[test]
    fn mask_toggles_single_bits() {
        let mut mask = LayerMask::ALL;
        mask.toggle(Layer::Sticky);
        assert!(!mask.contains(Layer::Sticky));
        assert!(mask.contains(Layer::Popups));
        mask.toggle(Layer::Sticky);
        assert_eq!(mask, LayerMask::ALL);

        let mut empty = LayerMask::NONE;
        empty.insert(Layer::Top);
        assert_eq!(empty.bits(), 1 << 7);
        empty.remove(Layer::Top);
        assert_eq!(empty, LayerMask::NONE);
    }
}
