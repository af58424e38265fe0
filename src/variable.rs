use std::fmt;
use std::sync::Arc;

use crate::command::parse_leading_int;
use crate::storage::{CellHandle, ValueTable};

/// Hook fired after a variable has been written.
pub type ChangeHook = Arc<dyn Fn() + Send + Sync>;

/// Outcome of a console assignment to a [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Nothing was written; the current value is reported instead.
    Query(i32),
    /// The cell now holds `value`; `clamped` is set when the input was out of range.
    Set { value: i32, clamped: bool },
    /// The variable is read-only and keeps its current value.
    ReadOnly(i32),
}

impl Assignment {
    /// Value held by the variable after the assignment.
    pub fn value(self) -> i32 {
        match self {
            Assignment::Query(value) | Assignment::ReadOnly(value) => value,
            Assignment::Set { value, .. } => value,
        }
    }
}

/// A named, range-clamped integer cell.
///
/// The variable does not own its storage: it holds a [`CellHandle`] into a
/// [`ValueTable`] owned by the subsystem that registered it. A variable whose
/// `min` is greater than its `max` is read-only from the console.
#[derive(Clone)]
pub struct Variable {
    name: String,
    persist: bool,
    min: i32,
    max: i32,
    storage: CellHandle,
    on_change: Option<ChangeHook>,
}

impl Variable {
    pub fn new(name: impl Into<String>, min: i32, max: i32, storage: CellHandle) -> Self {
        Self {
            name: name.into(),
            persist: false,
            min,
            max,
            storage,
            on_change: None,
        }
    }

    /// Marks the variable for inclusion in written configs.
    pub fn persistent(mut self) -> Self {
        self.persist = true;
        self
    }

    /// Registers a hook fired after every successful write.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persist(&self) -> bool {
        self.persist
    }

    pub fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn storage(&self) -> CellHandle {
        self.storage
    }

    pub fn is_read_only(&self) -> bool {
        self.min > self.max
    }

    /// Reads the live value; a handle missing from `values` reads as zero.
    pub fn value(&self, values: &ValueTable) -> i32 {
        values.get(self.storage).unwrap_or_default()
    }

    /// Clamps `value` into the variable's bounds.
    pub fn clamp(&self, value: i32) -> i32 {
        if self.is_read_only() {
            value
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Applies console input to the variable.
    ///
    /// Numbers outside the `i32` range saturate before clamping. Empty or
    /// non-numeric text degrades to a query. `_is_down` is accepted so
    /// variables and commands share one calling convention.
    pub fn assign(&self, values: &ValueTable, text: Option<&str>, _is_down: bool) -> Assignment {
        let current = self.value(values);
        let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
            return Assignment::Query(current);
        };
        if self.is_read_only() {
            return Assignment::ReadOnly(current);
        }
        let Some(requested) = parse_leading_int(text) else {
            log::debug!("ignoring non-numeric value {text:?} for {}", self.name);
            return Assignment::Query(current);
        };
        let value = self.clamp(requested);
        if !values.set(self.storage, value) {
            log::warn!("variable {} points at a missing storage cell", self.name);
            return Assignment::Query(current);
        }
        if let Some(hook) = &self.on_change {
            hook();
        }
        Assignment::Set {
            value,
            clamped: value != requested,
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("persist", &self.persist)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("storage", &self.storage)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
