/// External (provider) search result types
///
/// `/download/search` answers with two provider-shaped lists: catalog songs
/// (metadata source) and videos (audio source). They are validated here and
/// exposed as an explicit `SearchHit` variant instead of duck-typed objects.
use super::null_as_empty;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Song metadata found in the external catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSong {
    pub title: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artwork: String,
    #[serde(default)]
    pub artist: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: u64,
}

/// Video found on the audio provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    /// Provider video id, used as the download source
    pub id: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    pub title: String,
    /// The provider sends this as a decimal string
    #[serde(rename = "viewCount", deserialize_with = "view_count")]
    pub view_count: u64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: u64,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
}

fn view_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid view count: {s:?}"))),
    }
}

/// Response of the external search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSearchResults {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub videos: Vec<VideoResult>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub songs: Vec<CatalogSong>,
}

impl ExternalSearchResults {
    /// All results as tagged hits, catalog songs first
    pub fn hits(&self) -> impl Iterator<Item = SearchHit> + '_ {
        self.songs
            .iter()
            .cloned()
            .map(SearchHit::Song)
            .chain(self.videos.iter().cloned().map(SearchHit::Video))
    }

    /// Whether neither list has results
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.videos.is_empty()
    }
}

/// One external search result with an explicit discriminant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchHit {
    /// Catalog metadata for a song
    Song(CatalogSong),
    /// Provider video carrying the audio
    Video(VideoResult),
}

impl SearchHit {
    /// Display title
    pub fn title(&self) -> &str {
        match self {
            SearchHit::Song(song) => &song.title,
            SearchHit::Video(video) => &video.title,
        }
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> u64 {
        match self {
            SearchHit::Song(song) => song.duration,
            SearchHit::Video(video) => video.duration,
        }
    }

    /// Image URL (artwork or thumbnail)
    pub fn image(&self) -> &str {
        match self {
            SearchHit::Song(song) => &song.artwork,
            SearchHit::Video(video) => &video.thumbnail,
        }
    }
}
