pub mod defaults;
pub mod settings;

pub use settings::{ConfigFile, Settings};
