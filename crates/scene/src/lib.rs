pub mod camera;
pub mod picking;
pub mod transition;

pub use camera::*;
pub use picking::*;
pub use transition::*;
