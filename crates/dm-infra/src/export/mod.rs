mod command_rasterizer;

pub use command_rasterizer::{CommandRasterizer, DEFAULT_COMMAND};
