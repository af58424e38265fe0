use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Index of an integer cell inside a [`ValueTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellHandle(usize);

impl CellHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Shared table of integer cells backing console variables.
///
/// The table is owned by whichever subsystem registered the variables;
/// clones share the same cells, so a write made through the console is
/// visible to every holder immediately.
#[derive(Debug, Default)]
pub struct ValueTable {
    cells: Arc<RwLock<Vec<i32>>>,
}

impl Clone for ValueTable {
    fn clone(&self) -> Self {
        Self {
            cells: Arc::clone(&self.cells),
        }
    }
}

impl ValueTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new cell holding `initial` and returns its handle.
    pub fn allocate(&self, initial: i32) -> CellHandle {
        let mut guard = self.cells.write();
        guard.push(initial);
        CellHandle(guard.len() - 1)
    }

    /// Returns the current value of a cell.
    pub fn get(&self, handle: CellHandle) -> Option<i32> {
        self.cells.read().get(handle.0).copied()
    }

    /// Overwrites a cell, returning `false` when the handle is not part of this table.
    pub fn set(&self, handle: CellHandle, value: i32) -> bool {
        self.update(handle, |cell| *cell = value).is_some()
    }

    /// Applies a mutation to a cell.
    pub fn update<F, R>(&self, handle: CellHandle, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut i32) -> R,
    {
        let mut guard = self.cells.write();
        let cell = guard.get_mut(handle.0)?;
        Some(updater(cell))
    }

    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }
}
