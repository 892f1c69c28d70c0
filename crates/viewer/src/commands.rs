use foundation::ids::SceneId;
use formats::manifest::ManifestError;
use formats::hotspot::RecordError;
use streaming::request::LoadTicket;

/// Work the viewer asks its host to perform.
///
/// The host drains these once per frame, performs the fetches however it
/// likes, and reports back through `Viewer::on_scene_fetched` and
/// `Viewer::on_tile_loaded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderCommand {
    /// Fetch a scene's tile manifest and scene record.
    FetchScene {
        scene_id: SceneId,
        manifest_url: String,
        record_url: String,
    },
    /// Fetch and decode one tile. The ticket must be handed back unchanged.
    FetchTile { ticket: LoadTicket, url: String },
}

/// Why a scene's manifest or record could not be used.
#[derive(Debug)]
pub enum SceneLoadError {
    Fetch { url: String, message: String },
    Manifest(ManifestError),
    Record(RecordError),
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Fetch { url, message } => write!(f, "fetch failed: {url}: {message}"),
            SceneLoadError::Manifest(e) => write!(f, "bad manifest: {e}"),
            SceneLoadError::Record(e) => write!(f, "bad scene record: {e}"),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Fetch { .. } => None,
            SceneLoadError::Manifest(e) => Some(e),
            SceneLoadError::Record(e) => Some(e),
        }
    }
}

impl From<ManifestError> for SceneLoadError {
    fn from(e: ManifestError) -> Self {
        SceneLoadError::Manifest(e)
    }
}

impl From<RecordError> for SceneLoadError {
    fn from(e: RecordError) -> Self {
        SceneLoadError::Record(e)
    }
}
