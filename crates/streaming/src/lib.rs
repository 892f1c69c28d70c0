pub mod cache;
pub mod config;
pub mod key;
pub mod lod;
pub mod pipeline;
pub mod queue;
pub mod request;
pub mod scheduler;
pub mod viewport;

pub use cache::*;
pub use config::*;
pub use key::*;
pub use lod::*;
pub use pipeline::*;
pub use queue::*;
pub use request::*;
pub use scheduler::*;
pub use viewport::*;
