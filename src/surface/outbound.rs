//! Outbound display sync and the flush tick
//!
//! State flows back to the hardware here: host-driven changes drained from
//! the observer queue, immediate sends for `SyncMode::Immediate` controls,
//! and coalesced deferred sends on `flush`. Touch suppression gates all of
//! it.

use super::ControlSurface;
use crate::control::{ControlId, SyncMode};
use crate::value::ValueId;
use tracing::trace;

impl ControlSurface {
    /// Push a value's current state to its attached control's display.
    /// No-op when nothing is attached or the control is unidirectional.
    pub fn sync_value(&mut self, value: ValueId) {
        let _ = self.value(value);
        if let Some(control) = self.values[value.0].controller {
            self.sync_control(control);
        }
    }

    /// Reset a value to its configured default and refresh the display.
    pub fn reset_value(&mut self, value: ValueId) {
        let _ = self.value(value);
        if self.values[value.0].reset_to_default() {
            self.sync_value(value);
        }
    }

    /// Outward sync for one control: immediate send or deferred dirty
    /// marking depending on the control's sync mode. Suppressed entirely
    /// while the control is touched.
    pub(crate) fn sync_control(&mut self, control: ControlId) {
        let ctl = &self.controls[control.0];

        if !ctl.bidirectional {
            trace!("control '{}' is unidirectional, skipping sync", ctl.name);
            return;
        }
        if ctl.touch.is_touched() {
            trace!("control '{}' touched, suppressing sync", ctl.name);
            return;
        }
        if ctl.attached.is_none() {
            return;
        }

        match ctl.sync_mode {
            SyncMode::Immediate => self.send_feedback(control),
            SyncMode::Deferred => self.controls[control.0].dirty = true,
        }
    }

    /// Drain queued host-parameter changes: apply each to its value and
    /// sync the driving control's display.
    pub fn pump_host_events(&mut self) {
        loop {
            let event = self.host_events.borrow_mut().pop_front();
            let Some(event) = event else { break };

            let value = &mut self.values[event.value.0];
            value.value = event.new_value & 0x7F;
            trace!("host -> value '{}' = {}", value.name, value.value);

            if let Some(control) = value.controller {
                self.sync_control(control);
            }
        }
    }

    /// Periodic tick: drain host events, then send one message per dirty
    /// deferred control. Bounds outbound traffic to one message per control
    /// per flush interval no matter how fast the host changes state.
    pub fn flush(&mut self) {
        self.pump_host_events();

        for index in 0..self.controls.len() {
            if self.controls[index].dirty && !self.controls[index].touch.is_touched() {
                self.send_feedback(ControlId(index));
            }
        }
    }

    /// Emit the display message for a control's attached value and clear
    /// its dirty flag.
    fn send_feedback(&mut self, control: ControlId) {
        let message = {
            let ctl = &self.controls[control.0];
            let Some(value) = ctl.attached else { return };
            ctl.behavior
                .feedback(&ctl.address, self.values[value.0].value)
        };

        if let Some(message) = message {
            let [status, data1, data2] = message.to_bytes();
            self.transport.send(status, data1, data2);
            trace!("sync '{}' -> {}", self.controls[control.0].name, message);
        }
        self.controls[control.0].dirty = false;
    }
}
