use serde::{Deserialize, Serialize};

/// Configuration for tile streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Maximum tile loads in flight at once.
    pub max_concurrent_tile_loads: usize,

    /// Maximum decoded tiles kept in the cache.
    pub tile_cache_limit: usize,

    /// How long a tile may stay out of view before it is evicted (ms).
    pub tile_unload_cooldown_ms: u64,

    /// Minimum interval between visible-tile recomputations (ms).
    pub tile_update_interval_ms: u64,

    /// Equirect grids up to this many tiles are always requested whole.
    pub full_grid_max_tiles: u32,

    /// Extra fov (deg) required before dropping to a coarser level.
    pub lod_hysteresis_deg: f64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tile_loads: 6,
            tile_cache_limit: 256,
            tile_unload_cooldown_ms: 300,
            tile_update_interval_ms: 100,
            full_grid_max_tiles: 8,
            lod_hysteresis_deg: 5.0,
        }
    }
}
