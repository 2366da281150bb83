/// Melo - terminal client for the Melo music backend
use anyhow::Context;
use clap::{Parser, Subcommand};
use melo_cli::{
    config::{CliConfig, Overrides},
    render,
    session::{self, LoggingQueueView, PrintNowPlaying, SessionOptions, SimulatedMedia},
};
use melo_client::MeloClient;
use melo_core::{DownloadRequest, PlaylistId, PlaylistMetadata, SongId};
use melo_playback::{PlaybackController, Queue};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "melo")]
#[command(about = "Melo music player client", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./melo.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, env = "MELO_SERVER_URL", global = true)]
    url: Option<String>,

    /// Id token sent with every request
    #[arg(long, env = "MELO_AUTH_ID_TOKEN", hide_env_values = true, global = true)]
    id_token: Option<String>,

    /// Refresh token used to renew the id token
    #[arg(long, env = "MELO_AUTH_REFRESH_TOKEN", hide_env_values = true, global = true)]
    refresh_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sample songs
    Sample,
    /// Search the song catalog
    Search {
        /// Search string
        query: String,
    },
    /// List playlists (sample playlists unless --personal)
    Playlists {
        /// Only playlists owned by the user
        #[arg(long)]
        personal: bool,
    },
    /// Show a playlist and its songs
    Playlist {
        /// Playlist id
        id: String,
    },
    /// Create a playlist
    CreatePlaylist {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "")]
        artwork: String,
    },
    /// Update playlist title, description and artwork
    UpdatePlaylist {
        /// Playlist id
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "")]
        artwork: String,
    },
    /// Add a song to a playlist
    AddToPlaylist {
        /// Playlist id
        playlist: String,
        /// Song id
        song: String,
    },
    /// Remove a song from a playlist
    RemoveFromPlaylist {
        /// Playlist id
        playlist: String,
        /// Song id
        song: String,
    },
    /// Search the external catalog and the audio provider
    Find {
        /// Search string
        query: String,
    },
    /// Ask the server to download a song and follow its progress
    Download {
        #[arg(short, long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long, default_value = "")]
        album: String,
        #[arg(long, default_value = "")]
        artwork: String,
        /// Provider video id used as the audio source
        #[arg(short, long)]
        source: String,
    },
    /// Queue search results or a playlist and play them through
    Play {
        /// Search string
        #[arg(required_unless_present = "playlist", conflicts_with = "playlist")]
        query: Option<String>,
        /// Play this playlist instead of search results
        #[arg(long)]
        playlist: Option<String>,
        /// Shuffle the playlist before queueing it
        #[arg(long, requires = "playlist")]
        shuffle: bool,
        /// Milliseconds between time updates
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        /// Skip to the next song after this many seconds
        #[arg(long)]
        preview_secs: Option<u64>,
        /// Volume slider position (0-100), overrides the configuration
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melo_cli=info,melo_client=info,melo_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let overrides = Overrides {
        url: cli.url,
        id_token: cli.id_token,
        refresh_token: cli.refresh_token,
    };
    let config = CliConfig::load(cli.config.as_deref(), &overrides)?;
    config.validate()?;
    tracing::debug!(url = %config.server.url, "Configuration loaded");

    let client = MeloClient::new(config.client_config()).context("invalid server URL")?;

    match cli.command {
        Commands::Sample => {
            for song in client.sample_songs().await? {
                println!("[{}] {}", song.id, render::song_line(&song));
            }
        }
        Commands::Search { query } => {
            let songs = client.search_songs(&query).await?;
            if songs.is_empty() {
                println!("No songs match {query:?}");
            }
            for song in songs {
                println!("[{}] {}", song.id, render::song_line(&song));
            }
        }
        Commands::Playlists { personal } => {
            let playlists = if personal {
                client.personal_playlists().await?
            } else {
                client.sample_playlists().await?
            };
            for meta in playlists {
                println!("{}", render::playlist_line(&meta));
            }
        }
        Commands::Playlist { id } => {
            let playlist = client.get_playlist(&PlaylistId::new(id)).await?;
            println!("{}", render::playlist_line(&playlist.metadata()));
            for (n, song) in playlist.songs.iter().enumerate() {
                println!("{:>3}. {}", n + 1, render::song_line(song));
            }
        }
        Commands::CreatePlaylist {
            title,
            description,
            artwork,
        } => {
            let meta = PlaylistMetadata::new(title, description, artwork);
            let id = client.create_playlist(&meta).await?;
            println!("Created playlist {id}");
        }
        Commands::UpdatePlaylist {
            id,
            title,
            description,
            artwork,
        } => {
            let mut meta = PlaylistMetadata::new(title, description, artwork);
            meta.id = PlaylistId::new(id);
            client.update_playlist_metadata(&meta).await?;
            println!("Updated playlist {}", meta.id);
        }
        Commands::AddToPlaylist { playlist, song } => {
            client
                .add_song_to_playlist(&PlaylistId::new(playlist), &SongId::new(song))
                .await?;
        }
        Commands::RemoveFromPlaylist { playlist, song } => {
            client
                .remove_song_from_playlist(&PlaylistId::new(playlist), &SongId::new(song))
                .await?;
        }
        Commands::Find { query } => {
            let results = client.external_search(&query).await?;
            if results.is_empty() {
                println!("Nothing found for {query:?}");
            }
            let now = chrono::Utc::now();
            for hit in results.hits() {
                println!("{}", render::hit_line(&hit, now));
            }
        }
        Commands::Download {
            title,
            artist,
            album,
            artwork,
            source,
        } => {
            let request = DownloadRequest {
                title,
                artist,
                album,
                artwork,
                source,
            };
            let tracker = client
                .download_song(&request, |_, tracker| {
                    println!("{}", render::progress_line(tracker));
                })
                .await?;
            if tracker.is_complete() {
                println!("Downloaded {}", request.title);
            } else {
                anyhow::bail!("download of {:?} ended before every step finished", request.title);
            }
        }
        Commands::Play {
            query,
            playlist,
            shuffle,
            tick_ms,
            preview_secs,
            volume,
        } => {
            let songs = match (playlist, query) {
                (Some(id), _) => {
                    let playlist = client.get_playlist(&PlaylistId::new(id)).await?;
                    tracing::info!(playlist = %playlist.title, shuffle, "Starting playlist session");
                    session::playlist_order(playlist, shuffle)
                }
                (None, Some(query)) => {
                    let songs = client.search_songs(&query).await?;
                    tracing::info!(query = %query, songs = songs.len(), "Starting session");
                    songs
                }
                (None, None) => anyhow::bail!("give a search query or --playlist"),
            };

            let mut playback = config.playback.clone();
            if let Some(volume) = volume {
                playback.volume = volume;
            }

            let controller = PlaybackController::new(
                Queue::new(Box::new(LoggingQueueView)),
                Box::new(SimulatedMedia::new()),
                Box::new(PrintNowPlaying),
                Arc::new(client.clone()),
                playback,
            );
            let options = SessionOptions {
                tick: Duration::from_millis(tick_ms.max(1)),
                preview: preview_secs.map(Duration::from_secs),
            };

            let played = session::play_through(&controller, songs, options).await?;
            println!("Played {played} song(s)");
        }
    }

    Ok(())
}
