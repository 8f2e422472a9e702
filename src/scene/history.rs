//! Undo history for ad hoc vertex edits.
//!
//! Each entry holds the inverse of one edit: the indices it touched and the
//! positions they had before. The stack is a bounded [`VecDeque`]; when it
//! exceeds `max_undo`, the oldest entry is dropped from the front.

use std::collections::VecDeque;

use crate::errors::Result;
use crate::resources::geometry::{GeometryBuffer, VertexEdit};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

#[derive(Debug, Clone)]
pub struct VertexEditHistory {
    undo_stack: VecDeque<Vec<VertexEdit>>,
    max_undo: usize,
}

impl VertexEditHistory {
    #[must_use]
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            max_undo,
        }
    }

    /// Records the inverse of an edit that has already been applied.
    pub fn push(&mut self, inverse: Vec<VertexEdit>) {
        if inverse.is_empty() || self.max_undo == 0 {
            return;
        }
        self.undo_stack.push_back(inverse);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
    }

    /// Reverts the most recent edit. Returns `false` if there was nothing to undo.
    ///
    /// If the revert fails the entry is kept.
    pub fn undo(&mut self, geometry: &mut GeometryBuffer) -> Result<bool> {
        let Some(inverse) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = geometry.revert_edits(&inverse) {
            self.undo_stack.push_back(inverse);
            return Err(err);
        }
        Ok(true)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Drops every entry, e.g. after the whole mesh was replaced.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}

impl Default for VertexEditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::resources::mesh::Mesh;

    fn geometry() -> GeometryBuffer {
        GeometryBuffer::new(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]]).unwrap())
    }

    #[test]
    fn undo_restores_in_reverse_order() {
        let mut geo = geometry();
        let mut history = VertexEditHistory::new(10);

        history.push(geo.edit_vertices(&[(0, Vec3::splat(1.0))]).unwrap());
        history.push(geo.edit_vertices(&[(0, Vec3::splat(2.0))]).unwrap());

        assert!(history.undo(&mut geo).unwrap());
        assert_eq!(geo.positions()[0], Vec3::splat(1.0));
        assert!(history.undo(&mut geo).unwrap());
        assert_eq!(geo.positions()[0], Vec3::ZERO);
        assert!(!history.undo(&mut geo).unwrap());
    }

    #[test]
    fn oldest_entry_is_dropped_past_capacity() {
        let mut geo = geometry();
        let mut history = VertexEditHistory::new(2);
        for i in 1..=3 {
            history.push(geo.edit_vertices(&[(1, Vec3::splat(i as f32))]).unwrap());
        }
        assert_eq!(history.len(), 2);

        history.undo(&mut geo).unwrap();
        history.undo(&mut geo).unwrap();
        // The first edit can no longer be undone.
        assert_eq!(geo.positions()[1], Vec3::splat(1.0));
    }
}
