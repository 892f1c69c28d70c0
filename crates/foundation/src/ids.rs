use std::fmt;
use std::sync::Arc;

/// Identifier of a tour scene.
///
/// Cheap to clone: tile keys carry one per tile, and there are hundreds of
/// those alive at a time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(Arc<str>);

impl SceneId {
    pub fn new(id: impl AsRef<str>) -> Self {
        SceneId(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        SceneId::new(s)
    }
}

impl From<String> for SceneId {
    fn from(s: String) -> Self {
        SceneId(Arc::from(s))
    }
}
