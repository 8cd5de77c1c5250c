//! Host-parameter collaborator interface
//!
//! The `Value` layer drives the host application's parameter objects
//! (volume, pan, macro endpoints) through this trait; it does not know how
//! they are implemented. `MemoryParameter` is a built-in in-memory
//! implementation for tests, demos, and development without a host.

use std::cell::RefCell;
use std::rc::Rc;

/// Handle for a registered change observer.
pub type ObserverId = u64;

/// Callback invoked with the new 7-bit value when the host changes a
/// parameter on its own (automation, UI, remote control).
pub type ChangeObserver = Box<dyn Fn(u8)>;

/// One logical parameter endpoint in the host application.
pub trait HostParameter {
    /// Current parameter state (0-127).
    fn get(&self) -> u8;

    /// Push a new state into the host. Implementations must not re-notify
    /// change observers for values set through here; the binding engine is
    /// the caller and echoing the change back would loop.
    fn set(&mut self, value: u8);

    /// Mirror the indication flag (hardware binding active) to the host,
    /// e.g. for LED or on-screen highlighting.
    fn set_indication(&mut self, enabled: bool);

    /// Subscribe to host-driven changes. The returned id is used to
    /// unsubscribe when the parameter's value is detached.
    fn add_change_observer(&mut self, observer: ChangeObserver) -> ObserverId;

    /// Remove a previously registered observer. Unknown ids are ignored.
    fn remove_change_observer(&mut self, id: ObserverId);
}

#[derive(Default)]
struct MemoryParameterState {
    value: u8,
    indication: bool,
    next_observer: ObserverId,
    observers: Vec<(ObserverId, ChangeObserver)>,
}

/// In-memory parameter endpoint.
///
/// Clones share state, so a test can keep a handle while the `Value` owns
/// the boxed trait object, and `notify` simulates a host-side change.
#[derive(Clone, Default)]
pub struct MemoryParameter {
    state: Rc<RefCell<MemoryParameterState>>,
}

impl MemoryParameter {
    pub fn new(initial: u8) -> Self {
        let param = Self::default();
        param.state.borrow_mut().value = initial & 0x7F;
        param
    }

    /// Current stored value.
    pub fn value(&self) -> u8 {
        self.state.borrow().value
    }

    /// Current indication flag.
    pub fn indication(&self) -> bool {
        self.state.borrow().indication
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Simulate a host-side change: store the value and fire every
    /// registered observer.
    pub fn notify(&self, value: u8) {
        let value = value & 0x7F;
        self.state.borrow_mut().value = value;
        // Observers queue the change and return; they must not mutate this
        // parameter re-entrantly.
        let state = self.state.borrow();
        for (_, observer) in &state.observers {
            observer(value);
        }
    }
}

impl HostParameter for MemoryParameter {
    fn get(&self) -> u8 {
        self.state.borrow().value
    }

    fn set(&mut self, value: u8) {
        self.state.borrow_mut().value = value & 0x7F;
    }

    fn set_indication(&mut self, enabled: bool) {
        self.state.borrow_mut().indication = enabled;
    }

    fn add_change_observer(&mut self, observer: ChangeObserver) -> ObserverId {
        let mut state = self.state.borrow_mut();
        let id = state.next_observer;
        state.next_observer += 1;
        state.observers.push((id, observer));
        id
    }

    fn remove_change_observer(&mut self, id: ObserverId) {
        self.state
            .borrow_mut()
            .observers
            .retain(|(oid, _)| *oid != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_does_not_echo_to_observers() {
        let mut param = MemoryParameter::new(0);
        let fired = Rc::new(Cell::new(0u32));

        let fired_in = Rc::clone(&fired);
        param.add_change_observer(Box::new(move |_| fired_in.set(fired_in.get() + 1)));

        param.set(42);
        assert_eq!(param.value(), 42);
        assert_eq!(fired.get(), 0);

        param.notify(43);
        assert_eq!(param.value(), 43);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_observer_removal() {
        let mut param = MemoryParameter::new(0);
        let fired = Rc::new(Cell::new(0u32));

        let fired_in = Rc::clone(&fired);
        let id = param.add_change_observer(Box::new(move |_| fired_in.set(fired_in.get() + 1)));
        assert_eq!(param.observer_count(), 1);

        param.remove_change_observer(id);
        assert_eq!(param.observer_count(), 0);

        param.notify(1);
        assert_eq!(fired.get(), 0);

        // Unknown ids are ignored
        param.remove_change_observer(999);
    }

    #[test]
    fn test_clones_share_state() {
        let param = MemoryParameter::new(10);
        let mut handle = param.clone();
        handle.set(20);
        assert_eq!(param.value(), 20);
    }
}
