//! Inbound protocol handling
//!
//! Raw bytes arrive from the transport, the dispatcher resolves them to
//! control routes, and the control's behavior decodes the payload into
//! actions executed against the attached value.

use super::{ControlSurface, Route};
use crate::control::{ControlAction, ControlId};
use tracing::{debug, trace};

impl ControlSurface {
    /// Process one inbound protocol message, stamped with the surface's
    /// monotonic clock.
    pub fn dispatch(&mut self, raw: &[u8]) {
        let now_ms = self.now_ms();
        self.dispatch_at(raw, now_ms);
    }

    /// Process one inbound protocol message with a caller-supplied
    /// timestamp. Hosts replaying recorded traffic (and tests) use this to
    /// keep double-press timing deterministic.
    pub fn dispatch_at(&mut self, raw: &[u8], now_ms: u64) {
        let matches = self.dispatcher.dispatch(raw);
        for (route, payload) in matches {
            match route {
                Route::Input(control) => {
                    let actions = self.controls[control.0].behavior.decode(payload);
                    self.run_actions(control, &actions, now_ms);
                }
                Route::Modifier(control) => {
                    let actions = self.controls[control.0].behavior.on_modifier(payload);
                    self.run_actions(control, &actions, now_ms);
                }
            }
        }
    }

    fn run_actions(&mut self, control: ControlId, actions: &[ControlAction], now_ms: u64) {
        for action in actions {
            match *action {
                ControlAction::Absolute(value) => self.forward_absolute(control, value),
                ControlAction::Relative { delta } => self.forward_relative(control, delta),
                ControlAction::Press => self.on_press(control, now_ms),
                ControlAction::Release => self.on_release(control),
                ControlAction::SetFine(enabled) => {
                    self.controls[control.0].fine_mode = enabled;
                    trace!(
                        "control '{}' fine mode {}",
                        self.controls[control.0].name,
                        if enabled { "on" } else { "off" }
                    );
                }
                ControlAction::Touch(touched) => self.on_touch(control, touched),
            }
        }
    }

    fn forward_absolute(&mut self, control: ControlId, value: u8) {
        let Some(target) = self.controls[control.0].attached else {
            trace!(
                "control '{}' not attached, dropping value {}",
                self.controls[control.0].name,
                value
            );
            return;
        };
        self.values[target.0].apply_absolute(value);
    }

    fn forward_relative(&mut self, control: ControlId, delta: i8) {
        let Some(target) = self.controls[control.0].attached else {
            trace!(
                "control '{}' not attached, dropping delta {}",
                self.controls[control.0].name,
                delta
            );
            return;
        };

        let mut range = self.controls[control.0].behavior.range();
        if self.controls[control.0].fine_mode {
            // A zero divisor from an unvalidated config behaves as 1.
            range = (range / self.config.fine_mode_divisor.max(1)).max(1);
        }
        self.values[target.0].apply_relative(delta, range);
    }

    /// Discrete press. A second press of the same control within the
    /// configured window raises a double-press first; pressing a different
    /// control in between resets the timer.
    fn on_press(&mut self, control: ControlId, now_ms: u64) {
        let window = self.config.double_press_window_ms;
        let is_double = matches!(
            self.last_press,
            Some((previous, ts)) if previous == control && now_ms.saturating_sub(ts) <= window
        );

        if is_double && self.controls[control.0].double_press_enabled {
            self.on_double_press(control);
            // A third quick press starts a fresh cycle.
            self.last_press = None;
        } else {
            self.last_press = Some((control, now_ms));
        }
    }

    /// Double-press resets the attached value to its default.
    fn on_double_press(&mut self, control: ControlId) {
        let Some(target) = self.controls[control.0].attached else {
            return;
        };
        if self.values[target.0].reset_to_default() {
            debug!(
                "double-press: '{}' reset to default",
                self.values[target.0].name
            );
            self.sync_control(control);
        }
    }

    fn on_release(&mut self, control: ControlId) {
        if self.controls[control.0].behavior.resync_on_release() {
            self.sync_control(control);
        }
    }

    fn on_touch(&mut self, control: ControlId, touched: bool) {
        if touched {
            if self.controls[control.0].touch.press() {
                trace!("control '{}' touched", self.controls[control.0].name);
            }
        } else if self.controls[control.0].touch.release() {
            trace!("control '{}' released", self.controls[control.0].name);
            // Display may be stale after suppression; catch it up.
            self.sync_control(control);
        }
    }
}
