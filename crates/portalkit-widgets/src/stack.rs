#![forbid(unsafe_code)]

//! Stack of open overlays with ids, levels and z-index bands.
//!
//! [`StackManager`] tracks open overlays in insertion order. Index 0 is the
//! oldest and bottom-most; the last entry is topmost and is the only one
//! allowed to react to backdrop clicks and Escape.
//!
//! # Invariants
//!
//! - An entry appears at most once (by id).
//! - A level is the stack length at insertion time and never changes.
//! - Z-index is strictly increasing with level: backdrop `1000 + 10 * level`,
//!   surface one above it. The remaining 8 values of each band are free for
//!   intermediate layers.
//! - Ids from [`generate_id`] come from a process-wide counter starting at 1
//!   and are never reused.
//!
//! # Failure Modes
//!
//! - `remove_from_stack` for an unknown id is a no-op.
//! - `is_topmost` on an empty stack is `false`.
//! - `close_all` on an empty stack does nothing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use portalkit_runtime::{Observable, ReadOnlyObservable};

use crate::overlay::OverlayHandle;

/// Z-index of the level-0 backdrop.
const BASE_Z: u32 = 1000;

/// Z-index distance between levels.
const Z_INCREMENT: u32 = 10;

static OVERLAY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh overlay id: `"<prefix>-<n>"`.
pub fn generate_id(prefix: &str) -> String {
    let n = OVERLAY_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{n}")
}

/// Something the stack can track and close.
pub trait OverlayEntry {
    fn id(&self) -> &str;

    /// Start closing. Called by [`StackManager::close_all`].
    fn close(&self);
}

impl<E: OverlayEntry + ?Sized> OverlayEntry for Rc<E> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn close(&self) {
        (**self).close();
    }
}

/// Ordered stack of open overlays of one kind.
pub struct StackManager<T> {
    entries: RefCell<Vec<T>>,
    open_count: Observable<usize>,
}

impl<T> fmt::Debug for StackManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackManager")
            .field("size", &self.entries.borrow().len())
            .finish()
    }
}

impl<T: OverlayEntry + Clone> Default for StackManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: OverlayEntry + Clone> StackManager<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            open_count: Observable::new(0),
        }
    }

    /// Z-index pair `(backdrop, surface)` for `level`. Saturates at `u32::MAX`.
    pub fn z_indices(level: usize) -> (u32, u32) {
        let backdrop = u32::try_from(level)
            .unwrap_or(u32::MAX)
            .saturating_mul(Z_INCREMENT)
            .saturating_add(BASE_Z);
        (backdrop, backdrop.saturating_add(1))
    }

    /// Push `entry` on top. Returns its level.
    ///
    /// An entry whose id is already present keeps its original position.
    pub fn add_to_stack(&self, entry: T) -> usize {
        let level = {
            let mut entries = self.entries.borrow_mut();
            if let Some(pos) = entries.iter().position(|e| e.id() == entry.id()) {
                return pos;
            }
            entries.push(entry);
            entries.len() - 1
        };
        self.sync_count();
        level
    }

    /// Remove the entry with `id`, if present.
    pub fn remove_from_stack(&self, id: &str) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|e| e.id() != id);
            entries.len() != before
        };
        if removed {
            self.sync_count();
        }
    }

    /// Apply the z-index band for `level` to `overlay`.
    pub fn set_z_index(&self, overlay: &dyn OverlayHandle, level: usize) {
        let (backdrop_z, surface_z) = Self::z_indices(level);
        if let Some(backdrop) = overlay.backdrop() {
            backdrop.set_style("z-index", &backdrop_z.to_string());
        }
        overlay
            .surface()
            .set_style("z-index", &surface_z.to_string());
    }

    pub fn is_topmost(&self, id: &str) -> bool {
        self.entries.borrow().last().is_some_and(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.borrow().iter().any(|e| e.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.entries.borrow().iter().find(|e| e.id() == id).cloned()
    }

    /// Snapshot of the stack, bottom-most first.
    pub fn get_all(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }

    /// Close every entry, topmost first.
    ///
    /// Works on a snapshot, so entries that remove themselves synchronously
    /// while closing do not disturb the iteration.
    pub fn close_all(&self) {
        let snapshot = self.get_all();
        for entry in snapshot.iter().rev() {
            entry.close();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn size(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Live count of open entries.
    pub fn open_count(&self) -> ReadOnlyObservable<usize> {
        self.open_count.read_only()
    }

    fn sync_count(&self) {
        let len = self.entries.borrow().len();
        self.open_count.set(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone)]
    struct Entry {
        id: String,
        closed: Rc<RefCell<Vec<String>>>,
    }

    impl OverlayEntry for Entry {
        fn id(&self) -> &str {
            &self.id
        }

        fn close(&self) {
            self.closed.borrow_mut().push(self.id.clone());
        }
    }

    fn entries(n: usize) -> (Vec<Entry>, Rc<RefCell<Vec<String>>>) {
        let closed = Rc::new(RefCell::new(Vec::new()));
        let list = (0..n)
            .map(|i| Entry {
                id: format!("e-{i}"),
                closed: closed.clone(),
            })
            .collect();
        (list, closed)
    }

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let a = generate_id("bottom-sheet");
        let b = generate_id("bottom-sheet");
        assert!(a.starts_with("bottom-sheet-"));
        assert_ne!(a, b);
        let n = |s: &str| s.rsplit('-').next().and_then(|n| n.parse::<u64>().ok());
        assert!(n(&b) > n(&a));
        assert!(n(&a) >= Some(1));
    }

    #[test]
    fn levels_follow_insertion_order() {
        let stack = StackManager::new();
        let (list, _) = entries(3);
        let levels: Vec<_> = list.iter().map(|e| stack.add_to_stack(e.clone())).collect();
        assert_eq!(levels, vec![0, 1, 2]);
        assert!(stack.is_topmost("e-2"));
        assert!(!stack.is_topmost("e-1"));
        assert_eq!(stack.size(), 3);
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let stack = StackManager::new();
        let (list, _) = entries(2);
        stack.add_to_stack(list[0].clone());
        stack.add_to_stack(list[1].clone());
        assert_eq!(stack.add_to_stack(list[0].clone()), 0);
        assert_eq!(stack.size(), 2);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let stack: StackManager<Entry> = StackManager::new();
        stack.remove_from_stack("missing");
        assert!(stack.is_empty());
        assert!(!stack.is_topmost("missing"));
    }

    #[test]
    fn removing_top_changes_topmost() {
        let stack = StackManager::new();
        let (list, _) = entries(2);
        for e in &list {
            stack.add_to_stack(e.clone());
        }
        stack.remove_from_stack("e-1");
        assert!(stack.is_topmost("e-0"));
        assert!(stack.contains("e-0"));
        assert!(!stack.contains("e-1"));
    }

    #[test]
    fn get_all_is_a_snapshot() {
        let stack = StackManager::new();
        let (list, _) = entries(2);
        for e in &list {
            stack.add_to_stack(e.clone());
        }
        let mut snap = stack.get_all();
        snap.clear();
        assert_eq!(stack.size(), 2);
    }

    #[test]
    fn close_all_is_topmost_first() {
        let stack = StackManager::new();
        let (list, closed) = entries(3);
        for e in &list {
            stack.add_to_stack(e.clone());
        }
        stack.close_all();
        assert_eq!(*closed.borrow(), vec!["e-2", "e-1", "e-0"]);
    }

    #[test]
    fn z_index_bands_increase_with_level() {
        type Stack = StackManager<Entry>;
        assert_eq!(Stack::z_indices(0), (1000, 1001));
        assert_eq!(Stack::z_indices(1), (1010, 1011));
        assert_eq!(Stack::z_indices(3), (1030, 1031));
    }

    #[test]
    fn z_index_saturates_for_huge_levels() {
        type Stack = StackManager<Entry>;
        assert_eq!(Stack::z_indices(usize::MAX), (u32::MAX, u32::MAX));
        let near = (u32::MAX - BASE_Z) / Z_INCREMENT;
        assert_eq!(Stack::z_indices(near as usize), (4_294_967_290, 4_294_967_291));
        let (b1, _) = Stack::z_indices(near as usize + 1);
        assert_eq!(b1, u32::MAX);
    }

    #[test]
    fn open_count_tracks_changes() {
        let stack = StackManager::new();
        let (list, _) = entries(2);
        let count = stack.open_count();
        let seen = Rc::new(Cell::new(0usize));
        let sink = seen.clone();
        let _sub = count.subscribe(move |n| sink.set(*n));
        stack.add_to_stack(list[0].clone());
        stack.add_to_stack(list[1].clone());
        assert_eq!(seen.get(), 2);
        stack.remove_from_stack("e-0");
        assert_eq!(seen.get(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn reentrant_close_can_remove_itself() {
        struct SelfRemoving {
            id: String,
            stack: Rc<StackManager<Rc<SelfRemoving>>>,
        }
        impl OverlayEntry for SelfRemoving {
            fn id(&self) -> &str {
                &self.id
            }
            fn close(&self) {
                self.stack.remove_from_stack(&self.id);
            }
        }

        let stack = Rc::new(StackManager::new());
        for i in 0..3 {
            stack.add_to_stack(Rc::new(SelfRemoving {
                id: format!("s-{i}"),
                stack: stack.clone(),
            }));
        }
        stack.close_all();
        assert!(stack.is_empty());
    }
}
