mod download;
mod ids;
mod playlist;
mod search;
mod song;

pub use download::{
    DownloadDecoder, DownloadProgressTracker, DownloadRequest, DownloadUpdate, StepProgress,
};
pub use ids::{PlaylistId, SongId};
pub use playlist::{Playlist, PlaylistMetadata};
pub use search::{CatalogSong, ExternalSearchResults, SearchHit, VideoResult};
pub use song::Song;

use serde::{Deserialize, Deserializer};

/// Deserialize a list the backend may send as `null`
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
