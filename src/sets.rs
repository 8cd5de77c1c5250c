//! Named sets of values and controls
//!
//! Sets enable bulk rebinding: a `ControlSet` drives at most one `ValueSet`
//! at a time, pairing controls to values by position. Switching which value
//! set a control set drives is the page-switch operation.

use crate::control::ControlId;
use crate::value::ValueId;

/// Arena handle for a value set owned by a `ControlSurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueSetId(pub(crate) usize);

/// Arena handle for a control set owned by a `ControlSurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlSetId(pub(crate) usize);

/// Ordered, named collection of values laid out as `rows x per_row`.
pub struct ValueSet {
    pub(crate) name: String,
    pub(crate) rows: usize,
    pub(crate) per_row: usize,
    pub(crate) values: Vec<ValueId>,
}

impl ValueSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn per_row(&self) -> usize {
        self.per_row
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in slot order (row-major).
    pub fn values(&self) -> &[ValueId] {
        &self.values
    }

    /// Value at a grid position.
    pub fn value_at(&self, row: usize, column: usize) -> Option<ValueId> {
        if row >= self.rows || column >= self.per_row {
            return None;
        }
        self.values.get(row * self.per_row + column).copied()
    }
}

/// Ordered, named collection of controls plus the value set it currently
/// drives.
pub struct ControlSet {
    pub(crate) name: String,
    pub(crate) controls: Vec<ControlId>,
    pub(crate) bound: Option<ValueSetId>,
}

impl ControlSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> &[ControlId] {
        &self.controls
    }

    /// The value set currently bound to this control set, if any.
    pub fn bound_value_set(&self) -> Option<ValueSetId> {
        self.bound
    }
}
