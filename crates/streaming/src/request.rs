use crate::key::TileKey;

/// Generation counter of a scene activation.
///
/// Bumped every time a scene becomes active or starts preloading, so loads
/// issued for an earlier visit of the same scene can be told apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// What a dispatched tile load carries back on completion.
///
/// Small and cloneable so the host can move it through its fetch task and
/// hand it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    pub key: TileKey,
    pub generation: Generation,
}

impl LoadTicket {
    pub fn new(key: TileKey, generation: Generation) -> Self {
        Self { key, generation }
    }
}

/// Queue value: a tile and how urgently it is needed.
///
/// Lower priority values are more urgent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub key: TileKey,
    pub priority: u32,
}
