pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use run::{effective_config, ExportTarget, Overrides};
pub use wiring::wire_dependencies;
