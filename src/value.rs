//! Logical parameter values
//!
//! A `Value` fronts one host parameter: it holds the canonical 0-127 state,
//! applies absolute and relative updates, and remembers which control (if
//! any) currently drives its display feedback.

use crate::control::ControlId;
use crate::host::{HostParameter, ObserverId};
use tracing::trace;

/// Arena handle for a value owned by a `ControlSurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub(crate) usize);

/// One logical application parameter.
pub struct Value {
    pub(crate) name: String,
    pub(crate) value: u8,
    pub(crate) default: Option<u8>,
    pub(crate) controller: Option<ControlId>,
    pub(crate) indication: bool,
    pub(crate) host: Box<dyn HostParameter>,
    pub(crate) observer: Option<ObserverId>,
}

impl Value {
    /// Wrap a host parameter. Initial state is read from the host.
    pub fn new(name: impl Into<String>, host: Box<dyn HostParameter>) -> Self {
        let value = host.get() & 0x7F;
        Self {
            name: name.into(),
            value,
            default: None,
            controller: None,
            indication: false,
            host,
            observer: None,
        }
    }

    /// Provide a default for `reset_to_default` (double-press target).
    pub fn with_default(mut self, default: u8) -> Self {
        self.default = Some(default & 0x7F);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state (0-127).
    pub fn get(&self) -> u8 {
        self.value
    }

    /// Control currently driving display feedback for this value.
    pub fn controller(&self) -> Option<ControlId> {
        self.controller
    }

    pub fn indication_enabled(&self) -> bool {
        self.indication
    }

    /// Store an absolute update and forward it to the host.
    pub(crate) fn apply_absolute(&mut self, value: u8) {
        self.value = value & 0x7F;
        self.host.set(self.value);
        trace!("value '{}' <- {}", self.name, self.value);
    }

    /// Apply a signed delta scaled by `range` (the step count the value
    /// considers full scale): step = round(delta * range / 128), saturating
    /// into 0-127.
    pub(crate) fn apply_relative(&mut self, delta: i8, range: u16) {
        let step = ((delta as f64) * (range as f64) / 128.0).round() as i32;
        let next = (self.value as i32 + step).clamp(0, 127) as u8;
        self.apply_absolute(next);
    }

    /// Reset to the configured default. No-op (returns false) when no
    /// default was supplied.
    pub(crate) fn reset_to_default(&mut self) -> bool {
        match self.default {
            Some(default) => {
                self.apply_absolute(default);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryParameter;

    fn make_value(initial: u8) -> (Value, MemoryParameter) {
        let param = MemoryParameter::new(initial);
        let value = Value::new("volume", Box::new(param.clone()));
        (value, param)
    }

    #[test]
    fn test_absolute_forwards_to_host() {
        let (mut value, param) = make_value(0);
        value.apply_absolute(100);
        assert_eq!(value.get(), 100);
        assert_eq!(param.value(), 100);
    }

    #[test]
    fn test_relative_scaling() {
        let (mut value, _) = make_value(50);
        value.apply_relative(2, 128);
        assert_eq!(value.get(), 52);

        value.apply_relative(-1, 128);
        assert_eq!(value.get(), 51);

        // Fine range: 4x more ticks per full scale
        value.apply_relative(2, 32);
        // round(2 * 32 / 128) = round(0.5) = 1
        assert_eq!(value.get(), 52);
    }

    #[test]
    fn test_relative_saturates() {
        let (mut value, param) = make_value(126);
        value.apply_relative(10, 128);
        assert_eq!(value.get(), 127);

        value.apply_relative(-64, 512);
        assert_eq!(value.get(), 0);
        assert_eq!(param.value(), 0);
    }

    #[test]
    fn test_reset_to_default() {
        let (mut value, _) = make_value(90);
        assert!(!value.reset_to_default());
        assert_eq!(value.get(), 90);

        let param = MemoryParameter::new(90);
        let mut value = Value::new("pan", Box::new(param.clone())).with_default(64);
        assert!(value.reset_to_default());
        assert_eq!(value.get(), 64);
        assert_eq!(param.value(), 64);
    }
}
