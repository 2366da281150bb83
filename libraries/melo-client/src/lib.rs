//! Melo Client
//!
//! HTTP client library for the Melo backend API.
//!
//! # Features
//!
//! - **Authentication**: JWT id tokens with refresh-token renewal
//! - **Catalog**: sample and search songs, fetch audio
//! - **Playlists**: read, create, edit, add and remove songs
//! - **Downloads**: external search and streamed download progress
//! - **Playback**: implements `ResourceResolver` for the playback controller
//!
//! # Example
//!
//! ```ignore
//! use melo_client::{ClientConfig, MeloClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::with_tokens(
//!         "https://melo.example.com",
//!         None,
//!         Some("eyJhbGciOi...".to_string()),
//!     );
//!     let client = MeloClient::new(config)?;
//!
//!     for playlist in client.personal_playlists().await? {
//!         println!("{}", playlist.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod download;
mod error;
mod playlists;
mod songs;
mod types;

pub use auth::{decode_claims, is_expired, TokenStore};
pub use client::MeloClient;
pub use error::{ClientError, Result};
pub use types::ClientConfig;
