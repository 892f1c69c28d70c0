pub mod commands;
pub mod config;
pub mod events;
pub mod viewer;

pub use commands::*;
pub use config::*;
pub use events::*;
pub use viewer::*;
