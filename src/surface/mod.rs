//! Control surface - core orchestration of binding and dispatch
//!
//! The `ControlSurface` is the single process-wide context object. It owns
//! the arenas of controls, values, and sets, the dispatcher registry, and
//! the outbound transport, and it is the only entry point for the three
//! kinds of callbacks a host drives:
//! - inbound protocol messages (`dispatch` / `dispatch_at`)
//! - host-parameter change notifications (queued by observers, drained by
//!   `pump_host_events`)
//! - the periodic flush tick (`flush`)
//!
//! Everything is single-threaded and non-blocking; registries are mutated
//! only during initialization.

mod binding;
mod inbound;
mod outbound;


use crate::config::SurfaceConfig;
use crate::control::{Control, ControlId};
use crate::dispatcher::{Dispatcher, Pattern};
use crate::error::SetupError;
use crate::midi::AddressKind;
use crate::sets::{ControlSet, ControlSetId, ValueSet, ValueSetId};
use crate::transport::MidiTransport;
use crate::value::{Value, ValueId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info};

/// Routing token: which control an inbound message belongs to, and through
/// which of its addresses it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Primary address: the control's main input (rotation, position, press).
    Input(ControlId),
    /// Modifier address: encoder click or fader touch contact.
    Modifier(ControlId),
}

/// A host-driven parameter change waiting to be applied.
pub(crate) struct HostEvent {
    pub value: ValueId,
    pub new_value: u8,
}

/// Queue shared with host-parameter change observers.
pub(crate) type HostEventQueue = Rc<RefCell<VecDeque<HostEvent>>>;

/// The process-wide binding context.
pub struct ControlSurface {
    pub(crate) config: SurfaceConfig,
    pub(crate) controls: Vec<Control>,
    pub(crate) values: Vec<Value>,
    pub(crate) value_sets: Vec<ValueSet>,
    pub(crate) control_sets: Vec<ControlSet>,
    pub(crate) dispatcher: Dispatcher<Route>,
    pub(crate) transport: Box<dyn MidiTransport>,
    pub(crate) host_events: HostEventQueue,
    /// Most recent press for double-press detection; pressing a different
    /// control resets the timer.
    pub(crate) last_press: Option<(ControlId, u64)>,
    epoch: Instant,
}

impl ControlSurface {
    pub fn new(config: SurfaceConfig, transport: Box<dyn MidiTransport>) -> Self {
        Self {
            config,
            controls: Vec::new(),
            values: Vec::new(),
            value_sets: Vec::new(),
            control_sets: Vec::new(),
            dispatcher: Dispatcher::new(),
            transport,
            host_events: Rc::new(RefCell::new(VecDeque::new())),
            last_press: None,
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since surface creation (monotonic).
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Register a control and its dispatcher routes. Returns its handle.
    pub fn add_control(&mut self, control: Control) -> ControlId {
        let id = ControlId(self.controls.len());

        let address = control.address;
        self.dispatcher.register(
            Pattern {
                kind: address.kind,
                // Pressure messages carry no identifier byte
                identifier: match address.kind {
                    AddressKind::ChannelPressure => None,
                    _ => Some(address.identifier),
                },
                channel: Some(address.channel),
            },
            Route::Input(id),
        );

        if let Some(modifier) = control.modifier_address {
            self.dispatcher.register(
                Pattern {
                    kind: modifier.kind,
                    identifier: match modifier.kind {
                        AddressKind::ChannelPressure => None,
                        _ => Some(modifier.identifier),
                    },
                    channel: Some(modifier.channel),
                },
                Route::Modifier(id),
            );
        }

        debug!("registered control '{}'", control.name);
        self.controls.push(control);
        id
    }

    /// Register a standalone value. Returns its handle.
    pub fn add_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(value);
        id
    }

    /// Create a value set of `rows * per_row` values, eagerly built by the
    /// factory (called with `(row, column)` per slot).
    ///
    /// Fails on duplicate set name, over-large dimensions, or duplicate
    /// value names within the set.
    pub fn create_value_set(
        &mut self,
        name: impl Into<String>,
        rows: usize,
        per_row: usize,
        mut factory: impl FnMut(usize, usize) -> Value,
    ) -> Result<ValueSetId, SetupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SetupError::EmptyName);
        }
        if self.value_sets.iter().any(|s| s.name == name) {
            return Err(SetupError::DuplicateValueSet(name));
        }
        let slots = rows * per_row;
        if slots > self.config.max_value_set_slots {
            return Err(SetupError::ValueSetTooLarge {
                name,
                slots,
                max: self.config.max_value_set_slots,
            });
        }

        // Build and validate every slot before touching the arena, so a
        // failed creation leaves no orphan values behind.
        let mut built = Vec::with_capacity(slots);
        for row in 0..rows {
            for column in 0..per_row {
                let value = factory(row, column);
                if built.iter().any(|v: &Value| v.name == value.name) {
                    return Err(SetupError::DuplicateValueName {
                        set: name,
                        name: value.name,
                    });
                }
                built.push(value);
            }
        }
        let values = built.into_iter().map(|v| self.add_value(v)).collect();

        let id = ValueSetId(self.value_sets.len());
        info!("value set '{}' created ({}x{})", name, rows, per_row);
        self.value_sets.push(ValueSet {
            name,
            rows,
            per_row,
            values,
        });
        Ok(id)
    }

    /// Create a control set over previously registered controls.
    pub fn create_control_set(
        &mut self,
        name: impl Into<String>,
        controls: Vec<ControlId>,
    ) -> Result<ControlSetId, SetupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SetupError::EmptyName);
        }
        if self.control_sets.iter().any(|s| s.name == name) {
            return Err(SetupError::DuplicateControlSet(name));
        }

        let id = ControlSetId(self.control_sets.len());
        info!("control set '{}' created ({} controls)", name, controls.len());
        self.control_sets.push(ControlSet {
            name,
            controls,
            bound: None,
        });
        Ok(id)
    }

    pub fn control(&self, id: ControlId) -> &Control {
        self.controls
            .get(id.0)
            .unwrap_or_else(|| panic!("invalid control id {:?}", id))
    }

    pub fn value(&self, id: ValueId) -> &Value {
        self.values
            .get(id.0)
            .unwrap_or_else(|| panic!("invalid value id {:?}", id))
    }

    pub fn value_set(&self, id: ValueSetId) -> &ValueSet {
        self.value_sets
            .get(id.0)
            .unwrap_or_else(|| panic!("invalid value set id {:?}", id))
    }

    pub fn control_set(&self, id: ControlSetId) -> &ControlSet {
        self.control_sets
            .get(id.0)
            .unwrap_or_else(|| panic!("invalid control set id {:?}", id))
    }

    /// Whether some control set currently drives this value set.
    pub fn is_controlled(&self, id: ValueSetId) -> bool {
        self.control_sets.iter().any(|s| s.bound == Some(id))
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }
}
