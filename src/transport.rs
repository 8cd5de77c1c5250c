//! Outbound transport collaborator interface
//!
//! Controls emit display feedback through this trait; the engine does not
//! care whether bytes land on a hardware port, a virtual cable, or a test
//! buffer. `RecordingTransport` is the built-in test double.

use std::cell::RefCell;
use std::rc::Rc;

/// Sink for outbound protocol bytes.
pub trait MidiTransport {
    /// Send one message. `data2` is 0 for two-byte messages (channel
    /// pressure); implementations writing to a real wire should consult the
    /// status nibble for the wire length.
    fn send(&mut self, status: u8, data1: u8, data2: u8);
}

/// Transport that records every message it is asked to send.
///
/// Clones share the buffer, so a test can keep a handle while the surface
/// owns the boxed trait object.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<[u8; 3]>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<[u8; 3]> {
        self.sent.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<[u8; 3]> {
        self.sent.borrow().last().copied()
    }
}

impl MidiTransport for RecordingTransport {
    fn send(&mut self, status: u8, data1: u8, data2: u8) {
        self.sent.borrow_mut().push([status, data1, data2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_shares_buffer_across_clones() {
        let transport = RecordingTransport::new();
        let mut writer = transport.clone();

        writer.send(0xB0, 7, 100);
        writer.send(0x90, 60, 127);

        assert_eq!(transport.len(), 2);
        assert_eq!(transport.sent()[0], [0xB0, 7, 100]);
        assert_eq!(transport.last(), Some([0x90, 60, 127]));

        transport.clear();
        assert!(transport.is_empty());
    }
}
