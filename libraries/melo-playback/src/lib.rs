//! Melo Playback
//!
//! Playback queue and transport controller for the Melo music player.
//!
//! # Features
//!
//! - **Queue**: ordered, reorderable list with a current cursor, backed by an
//!   entry arena with generation-checked handles
//! - **Drag reorder**: geometry-based placement for drag-and-drop sessions
//! - **Controller**: one active media element, last-requested-wins loading,
//!   retried resource resolution
//! - **Volume**: quartic slider curve with icon tiers
//! - **Transport**: clock labels and a seek control that ignores its own ticks
//! - **Shuffle**: shuffled play order for playlists
//! - **Events**: drained by front ends to re-render
//!
//! # Example
//!
//! ```rust
//! use melo_core::Song;
//! use melo_playback::Queue;
//!
//! let mut queue = Queue::headless();
//! let first = queue.push(Song::new("1", "So What", "Miles Davis"));
//! queue.push(Song::new("2", "Freddie Freeloader", "Miles Davis"));
//!
//! assert!(first.became_current);
//! assert!(queue.next());
//! assert_eq!(queue.current_song().unwrap().title, "Freddie Freeloader");
//! assert!(queue.peek_next().is_none());
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod drag;
pub mod error;
pub mod events;
pub mod media;
pub mod queue;
pub mod shuffle;
pub mod transport;
pub mod types;
pub mod view;
pub mod volume;

pub use controller::{LoadOutcome, PlaybackController};
pub use drag::{DragGeometry, DropPlacement};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use media::MediaElement;
pub use queue::{EntryId, PushOutcome, Queue, QueueEntry};
pub use shuffle::{shuffled, shuffled_with};
pub use transport::{SeekControl, SeekInput, TransportTimes};
pub use types::{MediaKey, PlaybackConfig, PlaybackState, ReadyState, RetryPolicy, SeekOrigin};
pub use view::{NowPlayingView, NullNowPlaying, NullQueueView, QueueView};
pub use volume::{Volume, VolumeIcon};
