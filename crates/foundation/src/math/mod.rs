pub mod angle;
pub mod easing;
pub mod precision;
pub mod vec;

pub use angle::*;
pub use easing::*;
pub use precision::*;
pub use vec::*;
