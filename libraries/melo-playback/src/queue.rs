//! Playback queue
//!
//! An ordered, reorderable list of songs with a "current" cursor. Entries
//! live in an arena and link to each other by `EntryId`; the queue owns every
//! entry, and a `QueueView` mirrors each structural change so the rendered
//! list always shows the logical order.
//!
//! ```text
//!   head                current                 tail
//!    │                     │                      │
//!  [A] ⇄ [B] ⇄ [C] ⇄ [D] ⇄ [E]
//! ```
//!
//! Every operation on an empty queue, and every operation naming an entry
//! that is no longer in the queue, is a no-op.

use crate::drag::{DragGeometry, DropPlacement};
use crate::view::{NullQueueView, QueueView};
use melo_core::Song;
use std::fmt;

/// Handle to a queue entry
///
/// Stays valid while the entry is in the queue (including across moves).
/// Slots are reused after removal, so the generation distinguishes a stale
/// handle from the slot's new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: u32,
    generation: u32,
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// One song in the queue with its links
#[derive(Debug, Clone)]
pub struct QueueEntry {
    id: EntryId,
    song: Song,
    previous: Option<EntryId>,
    next: Option<EntryId>,
}

impl QueueEntry {
    /// Handle of this entry
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The queued song
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Entry before this one
    pub fn previous(&self) -> Option<EntryId> {
        self.previous
    }

    /// Entry after this one
    pub fn next(&self) -> Option<EntryId> {
        self.next
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<QueueEntry>,
}

/// Result of `Queue::push`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Handle of the new entry
    pub id: EntryId,
    /// The queue was empty, so the new entry became current and should be
    /// loaded (not played)
    pub became_current: bool,
}

/// Doubly linked playback queue over an entry arena
pub struct Queue {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    current: Option<EntryId>,
    len: usize,

    /// Entry being dragged, between `begin_drag` and `end_drag`
    dragging: Option<EntryId>,

    view: Box<dyn QueueView>,
}

impl Queue {
    /// Create an empty queue rendered through `view`
    pub fn new(view: Box<dyn QueueView>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            current: None,
            len: 0,
            dragging: None,
            view,
        }
    }

    /// Create an empty queue with no rendering
    pub fn headless() -> Self {
        Self::new(Box::new(NullQueueView))
    }

    /// Place the song at the end of the queue
    ///
    /// When the queue was empty the new entry also becomes current.
    pub fn push(&mut self, song: Song) -> PushOutcome {
        let was_empty = self.is_empty();
        let id = self.allocate(song);

        if let Some(entry) = self.slots[id.index as usize].entry.as_ref() {
            self.view.insert(id, &entry.song, None);
        }
        self.link_after_tail(id);

        if was_empty {
            self.current = Some(id);
            self.view.set_current(id, true);
        }

        PushOutcome {
            id,
            became_current: was_empty,
        }
    }

    /// Entry after the cursor, `None` at the tail or when empty
    pub fn peek_next(&self) -> Option<&QueueEntry> {
        self.current_entry()
            .and_then(|entry| entry.next)
            .and_then(|id| self.get(id))
    }

    /// Entry before the cursor, `None` at the head or when empty
    pub fn peek_previous(&self) -> Option<&QueueEntry> {
        self.current_entry()
            .and_then(|entry| entry.previous)
            .and_then(|id| self.get(id))
    }

    /// Advance the cursor
    ///
    /// Returns `false` (and changes nothing) at the tail or when empty.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        match self.peek_next().map(QueueEntry::id) {
            Some(target) => {
                self.move_cursor(target);
                true
            }
            None => false,
        }
    }

    /// Move the cursor back
    ///
    /// Returns `false` (and changes nothing) at the head or when empty.
    pub fn previous(&mut self) -> bool {
        match self.peek_previous().map(QueueEntry::id) {
            Some(target) => {
                self.move_cursor(target);
                true
            }
            None => false,
        }
    }

    /// Put the cursor on `id`
    ///
    /// Returns `false` (and changes nothing) when `id` is not a live entry.
    pub fn select(&mut self, id: EntryId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.current != Some(id) {
            self.move_cursor(id);
        }
        true
    }

    /// Song under the cursor
    pub fn current_song(&self) -> Option<&Song> {
        self.current_entry().map(QueueEntry::song)
    }

    /// Entry under the cursor
    pub fn current_entry(&self) -> Option<&QueueEntry> {
        self.current.and_then(|id| self.get(id))
    }

    /// Handle of the entry under the cursor
    pub fn current_id(&self) -> Option<EntryId> {
        self.current
    }

    /// Detach `dragged` and reinsert it next to `target`
    ///
    /// The cursor follows the entry, not the position. Returns `false` when
    /// either id is unknown or both name the same entry.
    pub fn move_entry(&mut self, dragged: EntryId, target: EntryId, placement: DropPlacement) -> bool {
        if dragged == target || !self.contains(dragged) || !self.contains(target) {
            return false;
        }

        self.unlink(dragged);
        match placement {
            DropPlacement::Before => self.link_before(dragged, target),
            DropPlacement::After => self.link_after(dragged, target),
        }

        let before = self.get(dragged).and_then(|entry| entry.next);
        self.view.move_before(dragged, before);
        true
    }

    /// Remove an entry and its visual representation
    ///
    /// If it was current, the cursor moves to the following entry, or the
    /// preceding one at the tail, or nowhere when it was the last entry.
    pub fn remove(&mut self, id: EntryId) -> Option<Song> {
        let (previous, next) = {
            let entry = self.get(id)?;
            (entry.previous, entry.next)
        };
        let was_current = self.current == Some(id);

        self.unlink(id);
        self.view.remove(id);

        if self.dragging == Some(id) {
            self.dragging = None;
        }

        if was_current {
            self.current = next.or(previous);
            if let Some(current) = self.current {
                self.view.set_current(current, true);
            }
        }

        let slot = &mut self.slots[id.index as usize];
        let entry = slot.entry.take()?;
        self.free.push(id.index);
        Some(entry.song)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        let ids: Vec<EntryId> = self.iter().map(QueueEntry::id).collect();
        for id in ids {
            self.view.remove(id);
        }
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.head = None;
        self.tail = None;
        self.current = None;
        self.dragging = None;
        self.len = 0;
    }

    // ===== Drag session =====

    /// Start dragging an entry (ignored for unknown ids)
    pub fn begin_drag(&mut self, id: EntryId) {
        if self.contains(id) {
            self.dragging = Some(id);
        }
    }

    /// Finish the drag session
    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Entry currently being dragged
    pub fn dragging(&self) -> Option<EntryId> {
        self.dragging
    }

    /// The dragged entry hovers `target`
    ///
    /// Moves the dragged entry next to the target when the geometry calls
    /// for it. Returns whether anything moved.
    pub fn drag_over(&mut self, target: EntryId, geometry: DragGeometry) -> bool {
        let Some(dragged) = self.dragging else {
            return false;
        };
        if dragged == target {
            return false;
        }
        match DropPlacement::from_geometry(geometry) {
            Some(placement) => self.move_entry(dragged, target, placement),
            None => false,
        }
    }

    // ===== Inspection =====

    /// Entry for a handle, `None` if it is no longer queued
    pub fn get(&self, id: EntryId) -> Option<&QueueEntry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Whether the handle names a queued entry
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First entry
    pub fn head(&self) -> Option<EntryId> {
        self.head
    }

    /// Last entry
    pub fn tail(&self) -> Option<EntryId> {
        self.tail
    }

    /// Entries from head to tail
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            queue: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Entries from tail to head
    pub fn iter_rev(&self) -> Iter<'_> {
        Iter {
            queue: self,
            cursor: self.tail,
            forward: false,
        }
    }

    /// Songs in queue order
    pub fn songs(&self) -> Vec<&Song> {
        self.iter().map(QueueEntry::song).collect()
    }

    /// Zero-based position of an entry
    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.iter().position(|entry| entry.id == id)
    }

    // ===== Internals =====

    fn allocate(&mut self, song: Song) -> EntryId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            let id = EntryId {
                index,
                generation: slot.generation,
            };
            slot.entry = Some(QueueEntry::detached(id, song));
            id
        } else {
            let id = EntryId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push(Slot {
                generation: 0,
                entry: Some(QueueEntry::detached(id, song)),
            });
            id
        }
    }

    fn entry_mut(&mut self, id: EntryId) -> Option<&mut QueueEntry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn set_links(&mut self, id: EntryId, previous: Option<EntryId>, next: Option<EntryId>) {
        if let Some(entry) = self.entry_mut(id) {
            entry.previous = previous;
            entry.next = next;
        }
    }

    fn set_previous(&mut self, id: EntryId, previous: Option<EntryId>) {
        if let Some(entry) = self.entry_mut(id) {
            entry.previous = previous;
        }
    }

    fn set_next(&mut self, id: EntryId, next: Option<EntryId>) {
        if let Some(entry) = self.entry_mut(id) {
            entry.next = next;
        }
    }

    fn move_cursor(&mut self, target: EntryId) {
        if let Some(old) = self.current {
            self.view.set_current(old, false);
        }
        self.current = Some(target);
        self.view.set_current(target, true);
    }

    fn link_after_tail(&mut self, id: EntryId) {
        match self.tail {
            Some(tail) => {
                self.set_next(tail, Some(id));
                self.set_links(id, Some(tail), None);
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Insert a detached entry immediately before `target`
    fn link_before(&mut self, id: EntryId, target: EntryId) {
        let previous = self.get(target).and_then(|entry| entry.previous);
        self.set_links(id, previous, Some(target));
        self.set_previous(target, Some(id));
        match previous {
            Some(previous) => self.set_next(previous, Some(id)),
            None => self.head = Some(id),
        }
        self.len += 1;
    }

    /// Insert a detached entry immediately after `target`
    fn link_after(&mut self, id: EntryId, target: EntryId) {
        let next = self.get(target).and_then(|entry| entry.next);
        self.set_links(id, Some(target), next);
        self.set_next(target, Some(id));
        match next {
            Some(next) => self.set_previous(next, Some(id)),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    /// Detach an entry, repairing head/tail; keeps it in the arena
    fn unlink(&mut self, id: EntryId) {
        let Some((previous, next)) = self.get(id).map(|entry| (entry.previous, entry.next)) else {
            return;
        };

        match previous {
            Some(previous) => self.set_next(previous, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_previous(next, previous),
            None => self.tail = previous,
        }

        self.set_links(id, None, None);
        self.len -= 1;
    }
}

impl QueueEntry {
    fn detached(id: EntryId, song: Song) -> Self {
        Self {
            id,
            song,
            previous: None,
            next: None,
        }
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::headless()
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Iterator over queue entries in either direction
pub struct Iter<'a> {
    queue: &'a Queue,
    cursor: Option<EntryId>,
    forward: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a QueueEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.queue.get(self.cursor?)?;
        self.cursor = if self.forward {
            entry.next
        } else {
            entry.previous
        };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn song(id: &str) -> Song {
        Song::new(id, format!("Song {id}"), "Test Artist")
    }

    fn ids_of(queue: &Queue) -> Vec<String> {
        queue.songs().iter().map(|s| s.id.to_string()).collect()
    }

    /// View that records the rendered order like a DOM container would
    #[derive(Clone, Default)]
    struct ListView {
        rows: Arc<Mutex<Vec<(EntryId, bool)>>>,
    }

    impl ListView {
        fn order(&self) -> Vec<EntryId> {
            self.rows.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }

        fn current(&self) -> Vec<EntryId> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, current)| *current)
                .map(|(id, _)| *id)
                .collect()
        }
    }

    impl QueueView for ListView {
        fn insert(&mut self, id: EntryId, _song: &Song, before: Option<EntryId>) {
            let mut rows = self.rows.lock().unwrap();
            let at = before
                .and_then(|b| rows.iter().position(|(r, _)| *r == b))
                .unwrap_or(rows.len());
            rows.insert(at, (id, false));
        }

        fn move_before(&mut self, id: EntryId, before: Option<EntryId>) {
            let mut rows = self.rows.lock().unwrap();
            let from = rows.iter().position(|(r, _)| *r == id).unwrap();
            let row = rows.remove(from);
            let at = before
                .and_then(|b| rows.iter().position(|(r, _)| *r == b))
                .unwrap_or(rows.len());
            rows.insert(at, row);
        }

        fn remove(&mut self, id: EntryId) {
            self.rows.lock().unwrap().retain(|(r, _)| *r != id);
        }

        fn set_current(&mut self, id: EntryId, current: bool) {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|(r, _)| *r == id) {
                row.1 = current;
            }
        }
    }

    fn assert_consistent(queue: &Queue) {
        let forward: Vec<EntryId> = queue.iter().map(QueueEntry::id).collect();
        let mut backward: Vec<EntryId> = queue.iter_rev().map(QueueEntry::id).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), queue.len());
        assert_eq!(queue.head(), forward.first().copied());
        assert_eq!(queue.tail(), forward.last().copied());
        if let Some(head) = queue.head() {
            assert!(queue.get(head).unwrap().previous().is_none());
        }
        if let Some(tail) = queue.tail() {
            assert!(queue.get(tail).unwrap().next().is_none());
        }
        match queue.current_id() {
            Some(current) => assert!(queue.contains(current)),
            None => assert!(queue.is_empty()),
        }
    }

    #[test]
    fn create_empty_queue() {
        let queue = Queue::new(Box::new(NullQueueView));
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert!(queue.current_song().is_none());
    }

    #[test]
    fn first_push_becomes_current() {
        let mut queue = Queue::headless();

        let first = queue.push(song("a"));
        let second = queue.push(song("b"));

        assert!(first.became_current);
        assert!(!second.became_current);
        assert_eq!(queue.current_song().unwrap().id.as_str(), "a");
        assert_consistent(&queue);
    }

    #[test]
    fn empty_queue_navigation_is_noop() {
        let mut queue = Queue::headless();
        assert!(!queue.next());
        assert!(!queue.previous());
        assert!(queue.peek_next().is_none());
        assert!(queue.peek_previous().is_none());
        assert!(queue.current_song().is_none());
    }

    #[test]
    fn next_and_previous_move_marker() {
        let view = ListView::default();
        let mut queue = Queue::new(Box::new(view.clone()));
        let a = queue.push(song("a")).id;
        let b = queue.push(song("b")).id;

        assert_eq!(view.current(), vec![a]);
        assert!(queue.next());
        assert_eq!(view.current(), vec![b]);
        assert!(!queue.next());
        assert!(queue.previous());
        assert_eq!(view.current(), vec![a]);
        assert!(!queue.previous());
    }

    #[test]
    fn move_before_and_after() {
        let view = ListView::default();
        let mut queue = Queue::new(Box::new(view.clone()));
        let a = queue.push(song("a")).id;
        let b = queue.push(song("b")).id;
        let c = queue.push(song("c")).id;

        assert!(queue.move_entry(c, a, DropPlacement::Before));
        assert_eq!(ids_of(&queue), vec!["c", "a", "b"]);
        assert_eq!(view.order(), vec![c, a, b]);
        assert_consistent(&queue);

        assert!(queue.move_entry(c, b, DropPlacement::After));
        assert_eq!(ids_of(&queue), vec!["a", "b", "c"]);
        assert_eq!(view.order(), vec![a, b, c]);
        assert_consistent(&queue);

        // cursor follows the entry
        assert_eq!(queue.current_id(), Some(a));
    }

    #[test]
    fn move_onto_self_is_noop() {
        let mut queue = Queue::headless();
        let a = queue.push(song("a")).id;
        queue.push(song("b"));
        assert!(!queue.move_entry(a, a, DropPlacement::After));
        assert_eq!(ids_of(&queue), vec!["a", "b"]);
    }

    #[test]
    fn remove_only_entry_clears_everything() {
        let view = ListView::default();
        let mut queue = Queue::new(Box::new(view.clone()));
        let a = queue.push(song("a")).id;

        let removed = queue.remove(a).unwrap();
        assert_eq!(removed.id.as_str(), "a");
        assert!(queue.is_empty());
        assert!(queue.head().is_none());
        assert!(queue.tail().is_none());
        assert!(queue.current_id().is_none());
        assert!(view.order().is_empty());
    }

    #[test]
    fn removing_current_moves_cursor_forward_then_back() {
        let mut queue = Queue::headless();
        let a = queue.push(song("a")).id;
        let b = queue.push(song("b")).id;
        let c = queue.push(song("c")).id;

        queue.remove(a);
        assert_eq!(queue.current_id(), Some(b));

        queue.next();
        queue.remove(c);
        assert_eq!(queue.current_id(), Some(b));
        assert_consistent(&queue);
    }

    #[test]
    fn stale_ids_are_ignored_after_slot_reuse() {
        let mut queue = Queue::headless();
        let a = queue.push(song("a")).id;
        queue.remove(a);

        let b = queue.push(song("b")).id;
        assert_ne!(a, b);
        assert!(queue.get(a).is_none());
        assert!(queue.remove(a).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drag_session_moves_dragged_entry() {
        let mut queue = Queue::headless();
        let a = queue.push(song("a")).id;
        queue.push(song("b"));
        let c = queue.push(song("c")).id;

        // no session, nothing moves
        let upward = DragGeometry {
            pointer_y: 5.0,
            dragged_top: 80.0,
            target_top: 0.0,
        };
        assert!(!queue.drag_over(a, upward));

        queue.begin_drag(c);
        assert!(queue.drag_over(a, upward));
        queue.end_drag();

        assert_eq!(ids_of(&queue), vec!["c", "a", "b"]);
        assert!(queue.dragging().is_none());
    }

    #[test]
    fn clear_removes_all_rows() {
        let view = ListView::default();
        let mut queue = Queue::new(Box::new(view.clone()));
        queue.push(song("a"));
        queue.push(song("b"));

        queue.clear();
        assert!(queue.is_empty());
        assert!(view.order().is_empty());
        assert_consistent(&queue);

        let outcome = queue.push(song("c"));
        assert!(outcome.became_current);
    }
}
