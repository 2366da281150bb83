//! Rendering adapters
//!
//! The queue and the controller never hold UI objects. They describe what
//! changed through these traits; each implementation keeps its own mapping
//! from `EntryId` to whatever handle its UI toolkit uses.

use crate::queue::EntryId;
use melo_core::Song;

/// Visual list mirroring the queue order
///
/// Every call keeps the rendered order equal to the logical order.
pub trait QueueView: Send {
    /// Render a new entry before `before`, or at the end when `None`
    fn insert(&mut self, id: EntryId, song: &Song, before: Option<EntryId>);

    /// Relocate an existing entry before `before`, or to the end when `None`
    fn move_before(&mut self, id: EntryId, before: Option<EntryId>);

    /// Destroy the entry's visual representation
    fn remove(&mut self, id: EntryId);

    /// Toggle the "is-current" marker
    fn set_current(&mut self, id: EntryId, current: bool);
}

/// Queue view that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullQueueView;

impl QueueView for NullQueueView {
    fn insert(&mut self, _id: EntryId, _song: &Song, _before: Option<EntryId>) {}
    fn move_before(&mut self, _id: EntryId, _before: Option<EntryId>) {}
    fn remove(&mut self, _id: EntryId) {}
    fn set_current(&mut self, _id: EntryId, _current: bool) {}
}

/// Now-playing panel (title, artist, album, artwork)
pub trait NowPlayingView: Send {
    /// Show the metadata of the loaded song
    fn show(&mut self, song: &Song);

    /// Clear the panel
    fn clear(&mut self);
}

/// Now-playing view that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNowPlaying;

impl NowPlayingView for NullNowPlaying {
    fn show(&mut self, _song: &Song) {}
    fn clear(&mut self) {}
}
