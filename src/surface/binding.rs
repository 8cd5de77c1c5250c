//! Attach/detach lifecycle and page switching
//!
//! The identity invariants live here: a control serves at most one value, a
//! value is driven by at most one control, and the two edges always agree.
//! Every mutation goes through `attach`/`detach`, which self-correct stale
//! edges instead of erroring.

use super::{ControlSurface, HostEvent};
use crate::control::ControlId;
use crate::sets::{ControlSetId, ValueSetId};
use crate::value::ValueId;
use std::rc::Rc;
use tracing::{debug, info};

impl ControlSurface {
    /// Bind a control to a value. If either side is already bound
    /// elsewhere, the stale edge is detached first (forced, not an error).
    /// Triggers an immediate outward sync so the physical display reflects
    /// the value's current state, and enables the value's indication.
    pub fn attach(&mut self, control: ControlId, value: ValueId) {
        // Validate both handles up front; invalid ids are programmer errors.
        let _ = self.control(control);
        let _ = self.value(value);

        if self.controls[control.0].attached == Some(value) {
            // Same pair: just refresh the display.
            self.sync_control(control);
            return;
        }

        self.detach(control);
        if let Some(previous) = self.values[value.0].controller {
            self.detach(previous);
        }

        self.controls[control.0].attached = Some(value);
        self.values[value.0].controller = Some(control);

        // Subscribe to host-driven changes for the lifetime of this edge.
        let queue = Rc::clone(&self.host_events);
        let observer = self.values[value.0].host.add_change_observer(Box::new(move |new_value| {
            queue.borrow_mut().push_back(HostEvent { value, new_value });
        }));
        self.values[value.0].observer = Some(observer);

        self.values[value.0].indication = true;
        self.values[value.0].host.set_indication(true);

        debug!(
            "attached '{}' -> '{}'",
            self.controls[control.0].name, self.values[value.0].name
        );

        self.sync_control(control);
    }

    /// Remove the control's binding. Idempotent: detaching a detached
    /// control is a no-op.
    pub fn detach(&mut self, control: ControlId) {
        let _ = self.control(control);

        let Some(value) = self.controls[control.0].attached.take() else {
            return;
        };

        self.values[value.0].controller = None;

        if let Some(observer) = self.values[value.0].observer.take() {
            self.values[value.0].host.remove_change_observer(observer);
        }

        self.values[value.0].indication = false;
        self.values[value.0].host.set_indication(false);

        // A stale deferred sync must not fire against the next binding.
        self.controls[control.0].dirty = false;

        debug!(
            "detached '{}' from '{}'",
            self.controls[control.0].name, self.values[value.0].name
        );
    }

    /// Bind a control set to a value set: controls pair with values by
    /// position, attached in index order. Excess controls are left
    /// detached; excess values are simply not driven by this set. Any
    /// previous binding is fully unbound first (page-switch semantics).
    pub fn bind(&mut self, control_set: ControlSetId, value_set: ValueSetId) {
        let _ = self.value_set(value_set);
        self.unbind(control_set);

        let pairs: Vec<(ControlId, Option<ValueId>)> = {
            let controls = &self.control_sets[control_set.0].controls;
            let values = &self.value_sets[value_set.0].values;
            controls
                .iter()
                .enumerate()
                .map(|(i, c)| (*c, values.get(i).copied()))
                .collect()
        };

        for (control, value) in pairs {
            match value {
                Some(value) => self.attach(control, value),
                None => self.detach(control),
            }
        }

        self.control_sets[control_set.0].bound = Some(value_set);
        info!(
            "control set '{}' -> value set '{}'",
            self.control_sets[control_set.0].name, self.value_sets[value_set.0].name
        );
    }

    /// Detach every control in the set, in index order, and clear the
    /// bound value set.
    pub fn unbind(&mut self, control_set: ControlSetId) {
        let _ = self.control_set(control_set);

        let controls = self.control_sets[control_set.0].controls.clone();
        for control in controls {
            self.detach(control);
        }
        self.control_sets[control_set.0].bound = None;
    }
}
