//! Policy core of the kestrel tiling window manager: window registry, nine
//! views per output, layered draw order, focus and the output configuration
//! transaction. The display protocol itself lives behind [`Backend`].

pub mod backend;
pub mod config;
pub mod event;
pub mod focus;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod layout;
pub mod output;
pub mod output_management;
pub mod render;
pub mod state;
pub mod status;
pub mod window;

pub use backend::{Backend, HeadlessBackend};
pub use config::Config;
pub use event::Event;
pub use focus::CursorMode;
pub use geometry::Rectangle;
pub use layer::{Layer, LayerMask};
pub use state::State;
