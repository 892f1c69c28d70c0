pub mod hotspot;
pub mod manifest;
pub mod scene_record;
pub mod tile_url;

pub use hotspot::*;
pub use manifest::*;
pub use scene_record::*;
pub use tile_url::*;
