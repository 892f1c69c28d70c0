pub mod compositor;
pub mod renderer;
pub mod texture;

pub use compositor::*;
pub use renderer::*;
pub use texture::*;
