pub mod config;
pub mod sources;

pub use config::AppConfig;
pub use sources::source_labels;
