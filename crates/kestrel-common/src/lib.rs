pub mod color;
pub mod logging;
pub mod paths;

pub use color::{color_from_rgb, parse_color};
pub use logging::{FileLogger, StderrLogger};
pub use paths::{config_dir, data_dir, kestrel_config_dir, kestrel_data_dir, kestrel_log_dir};
