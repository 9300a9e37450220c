//! Boundary searches over a layer's sorted object table.
//!
//! Each layer's objects are sorted by begin frame and never overlap, so a
//! binary search finds the candidate and only a run of skipped neighbours
//! (inactive objects) needs a linear scan.

use crate::host::{ObjectId, ObjectStore, TimelineObject};

/// Right-hand boundary found by a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Frame(i32),
    /// Nothing to the right; the boundary is the end of the scene.
    SceneEnd,
    /// The layer has no objects at all.
    Empty,
}

impl Boundary {
    /// Concrete frame, with both sentinels mapped to the last frame of the scene.
    pub fn resolve(self, scene_len: i32) -> i32 {
        match self {
            Boundary::Frame(f) => f,
            Boundary::SceneEnd | Boundary::Empty => (scene_len - 1).max(0),
        }
    }

    pub fn frame(self) -> Option<i32> {
        match self {
            Boundary::Frame(f) => Some(f),
            _ => None,
        }
    }
}

/// First segment of the chain `id` belongs to.
pub fn leader_of<S: ObjectStore + ?Sized>(store: &S, id: ObjectId) -> ObjectId {
    store.object(id).and_then(|o| o.leader).unwrap_or(id)
}

/// Active state of a chain, read from its leader.
pub fn is_active<S: ObjectStore + ?Sized>(store: &S, id: ObjectId) -> bool {
    store
        .object(leader_of(store, id))
        .is_some_and(|o| o.active)
}

pub struct ObjectSearch<'s, S: ObjectStore + ?Sized> {
    store: &'s S,
    objects: &'s [ObjectId],
    skip_midpoints: bool,
    skip_inactives: bool,
}

impl<'s, S: ObjectStore + ?Sized> ObjectSearch<'s, S> {
    pub fn new(store: &'s S, layer: i32) -> Self {
        Self {
            store,
            objects: store.layer_objects(layer),
            skip_midpoints: false,
            skip_inactives: false,
        }
    }

    /// Treat a mid-point chain as a single object.
    pub fn skip_midpoints(mut self, skip: bool) -> Self {
        self.skip_midpoints = skip;
        self
    }

    /// Ignore objects whose chain is inactive.
    pub fn skip_inactives(mut self, skip: bool) -> Self {
        self.skip_inactives = skip;
        self
    }

    pub fn objects(&self) -> &'s [ObjectId] {
        self.objects
    }

    fn get(&self, idx: usize) -> Option<&'s TimelineObject> {
        self.objects.get(idx).and_then(|&id| self.store.object(id))
    }

    fn begin(&self, idx: usize) -> i32 {
        self.get(idx).map_or(i32::MAX, |o| o.begin)
    }

    fn end(&self, idx: usize) -> i32 {
        self.get(idx).map_or(i32::MIN, |o| o.end)
    }

    fn is_active_at(&self, idx: usize) -> bool {
        self.objects
            .get(idx)
            .is_some_and(|&id| is_active(self.store, id))
    }

    fn is_skipped(&self, idx: usize) -> bool {
        self.skip_inactives && !self.is_active_at(idx)
    }

    fn chain_begin(&self, idx: usize) -> i32 {
        let Some(&id) = self.objects.get(idx) else {
            return self.begin(idx);
        };
        if !self.skip_midpoints {
            return self.begin(idx);
        }
        self.store
            .object(leader_of(self.store, id))
            .map_or(self.begin(idx), |o| o.begin)
    }

    fn chain_end(&self, idx: usize) -> i32 {
        let Some(&id) = self.objects.get(idx) else {
            return self.end(idx);
        };
        if !self.skip_midpoints {
            return self.end(idx);
        }
        let mut current = self.store.object(id);
        let mut end = self.end(idx);
        // A broken link table must not loop forever.
        for _ in 0..self.objects.len() {
            let Some(next) = current.and_then(|o| o.next) else {
                break;
            };
            current = self.store.object(next);
            if let Some(o) = current {
                end = o.end;
            }
        }
        end
    }

    /// Index of the rightmost object starting at or before `pos`.
    pub fn nearest_index(&self, pos: i32) -> Option<usize> {
        let n = self.objects.partition_point(|&id| {
            self.store.object(id).is_some_and(|o| o.begin <= pos)
        });
        n.checked_sub(1)
    }

    fn left_core(&self, idx: usize, pos: i32) -> i32 {
        if !self.is_skipped(idx) {
            return if pos < self.end(idx) + 1 {
                self.chain_begin(idx)
            } else {
                self.chain_end(idx) + 1
            };
        }
        (0..idx)
            .rev()
            .find(|&i| self.is_active_at(i))
            .map_or(0, |i| self.end(i) + 1)
    }

    fn right_core(&self, idx: usize, pos: i32) -> Boundary {
        if !self.is_skipped(idx) {
            let begin = self.begin(idx);
            return Boundary::Frame(if pos <= begin {
                begin
            } else {
                self.chain_end(idx) + 1
            });
        }
        (idx + 1..self.objects.len())
            .find(|&i| self.is_active_at(i))
            .map_or(Boundary::SceneEnd, |i| Boundary::Frame(self.begin(i)))
    }

    /// Nearest object boundary strictly left of `pos`; 0 if there is none.
    pub fn find_adjacent_left(&self, pos: i32) -> i32 {
        let p = pos - 1;
        self.nearest_index(p).map_or(0, |idx| self.left_core(idx, p))
    }

    /// Nearest object boundary strictly right of `pos`.
    pub fn find_adjacent_right(&self, pos: i32) -> Boundary {
        let idx = match self.nearest_index(pos) {
            None => 0,
            Some(i) if self.end(i) + 1 <= pos => i + 1,
            Some(i) => i,
        };
        if idx >= self.objects.len() {
            return if self.objects.is_empty() {
                Boundary::Empty
            } else {
                Boundary::SceneEnd
            };
        }
        self.right_core(idx, pos + 1)
    }

    /// Boundaries enclosing `pos`: left at or before it, right after it.
    pub fn find_interval(&self, pos: i32) -> (i32, Boundary) {
        let left = self
            .nearest_index(pos)
            .map_or(0, |idx| self.left_core(idx, pos));
        (left, self.find_adjacent_right(pos))
    }

    pub fn object_at_frame(&self, pos: i32) -> Option<ObjectId> {
        let idx = self.nearest_index(pos)?;
        (self.end(idx) >= pos).then(|| self.objects[idx])
    }

    /// Objects in `[left, right]`. `inclusive` takes objects that merely
    /// overlap the ends; otherwise they must lie within.
    pub fn objects_in_interval(&self, left: i32, right: i32, inclusive: bool) -> &'s [ObjectId] {
        let first = match self.nearest_index(left) {
            None => 0,
            Some(i) => {
                let edge = if inclusive { self.end(i) } else { self.begin(i) };
                if edge < left { i + 1 } else { i }
            }
        };
        let last = match self.nearest_index(right) {
            None => return &[],
            Some(j) if !inclusive && self.end(j) >= right => match j.checked_sub(1) {
                Some(j) => j,
                None => return &[],
            },
            Some(j) => j,
        };
        if first > last {
            return &[];
        }
        &self.objects[first..=last]
    }
}
