//! Drag-and-drop reordering geometry
//!
//! A best-effort heuristic, not a strict drag-and-drop protocol: while the
//! pointer hovers a target entry, the dragged entry is moved next to it. The
//! side is picked from where the dragged entry currently sits relative to
//! the target.

use serde::{Deserialize, Serialize};

/// Where the dragged entry lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPlacement {
    /// Immediately before the target
    Before,
    /// Immediately after the target
    After,
}

/// Vertical positions sampled during a drag-over event (screen coordinates,
/// y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragGeometry {
    /// Pointer y
    pub pointer_y: f64,
    /// Top edge of the dragged entry's current box
    pub dragged_top: f64,
    /// Top edge of the hovered target's box
    pub target_top: f64,
}

impl DropPlacement {
    /// Decide the placement for a drag-over sample
    ///
    /// Nothing moves until the pointer is below the target's top edge. A
    /// dragged entry currently below the target (dragging upward) goes
    /// before it; otherwise after it.
    pub fn from_geometry(geometry: DragGeometry) -> Option<Self> {
        if geometry.pointer_y <= geometry.target_top {
            return None;
        }
        if geometry.dragged_top > geometry.target_top {
            Some(DropPlacement::Before)
        } else {
            Some(DropPlacement::After)
        }
    }
}
