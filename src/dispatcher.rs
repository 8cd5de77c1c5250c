//! Message classification and routing
//!
//! The dispatcher owns a pattern registry built during initialization and
//! never mutated on the hot path. `dispatch` classifies a raw message by its
//! status nibble and returns every matching route in registration order.
//! Malformed or unrecognized input is logged and dropped, never an error:
//! the caller is a real-time input loop that must keep running.

use crate::midi::{format_hex, AddressKind, Channel, MidiMessage};
use smallvec::SmallVec;
use tracing::{trace, warn};

/// A match pattern for inbound messages. `None` for identifier or channel
/// acts as a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub kind: AddressKind,
    pub identifier: Option<u8>,
    pub channel: Option<Channel>,
}

impl Pattern {
    fn matches(&self, kind: AddressKind, channel: u8, identifier: Option<u8>) -> bool {
        if self.kind != kind {
            return false;
        }
        if let Some(ch) = self.channel {
            if ch.get() != channel {
                return false;
            }
        }
        match (self.identifier, identifier) {
            (None, _) => true,
            (Some(want), Some(got)) => want == got,
            // Concrete identifier cannot match a message that carries none.
            (Some(_), None) => false,
        }
    }
}

struct Registration<R> {
    pattern: Pattern,
    route: R,
}

/// Pattern registry + classifier. `R` is an opaque route token handed back
/// to the caller for every match.
pub struct Dispatcher<R> {
    registrations: Vec<Registration<R>>,
}

impl<R: Copy> Dispatcher<R> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register a route for a pattern. Registration order is the invocation
    /// order on dispatch.
    pub fn register(&mut self, pattern: Pattern, route: R) {
        self.registrations.push(Registration { pattern, route });
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Classify a raw message and collect `(route, payload)` for every
    /// matching registration, in registration order.
    ///
    /// The payload is the decoded 7-bit value: velocity for notes (0 for a
    /// release), the value byte for control change, the pressure byte for
    /// channel pressure.
    pub fn dispatch(&self, raw: &[u8]) -> SmallVec<[(R, u8); 4]> {
        let mut matches = SmallVec::new();

        let Some(msg) = MidiMessage::parse(raw) else {
            match raw.first() {
                None => warn!("dropping empty MIDI message"),
                Some(status) if *status < 0x80 => {
                    warn!("dropping malformed MIDI message (no status byte): {}", format_hex(raw));
                }
                Some(status) if matches!(status & 0xF0, 0x80 | 0x90 | 0xB0 | 0xD0) => {
                    warn!("dropping truncated MIDI message: {}", format_hex(raw));
                }
                Some(_) => trace!("dropping unrecognized MIDI message: {}", format_hex(raw)),
            }
            return matches;
        };

        let (kind, channel, identifier, payload) = classify(&msg);

        for reg in &self.registrations {
            if reg.pattern.matches(kind, channel, identifier) {
                matches.push((reg.route, payload));
            }
        }

        if matches.is_empty() {
            trace!("no route for {}", msg);
        }

        matches
    }
}

impl<R: Copy> Default for Dispatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Break a parsed message into its routing coordinates. Channel pressure
/// carries no identifier byte; its payload lives in data1.
fn classify(msg: &MidiMessage) -> (AddressKind, u8, Option<u8>, u8) {
    match *msg {
        MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        } => (AddressKind::Note, channel, Some(note), velocity),
        MidiMessage::NoteOff { channel, note, .. } => (AddressKind::Note, channel, Some(note), 0),
        MidiMessage::ControlChange { channel, cc, value } => {
            (AddressKind::ControlChange, channel, Some(cc), value)
        }
        MidiMessage::ChannelPressure { channel, pressure } => {
            (AddressKind::ChannelPressure, channel, None, pressure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    fn pattern(kind: AddressKind, identifier: Option<u8>, channel: Option<Channel>) -> Pattern {
        Pattern {
            kind,
            identifier,
            channel,
        }
    }

    #[test]
    fn test_exact_match_routes_payload() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        d.register(pattern(AddressKind::ControlChange, Some(7), Some(ch(0))), 1);

        let matches = d.dispatch(&[0xB0, 7, 100]);
        assert_eq!(matches.as_slice(), &[(1, 100)]);

        // Different cc, different channel: no match
        assert!(d.dispatch(&[0xB0, 8, 100]).is_empty());
        assert!(d.dispatch(&[0xB1, 7, 100]).is_empty());
    }

    #[test]
    fn test_wildcard_identifier_and_channel() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        d.register(pattern(AddressKind::Note, None, Some(ch(2))), 1);
        d.register(pattern(AddressKind::Note, Some(60), None), 2);

        let matches = d.dispatch(&[0x92, 60, 10]);
        assert_eq!(matches.as_slice(), &[(1, 10), (2, 10)]);

        // Wrong channel matches only the channel wildcard
        let matches = d.dispatch(&[0x95, 60, 10]);
        assert_eq!(matches.as_slice(), &[(2, 10)]);
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        assert!(d.is_empty());
        for route in 0..5 {
            d.register(pattern(AddressKind::ControlChange, Some(1), None), route);
        }
        assert_eq!(d.len(), 5);

        let matches = d.dispatch(&[0xB0, 1, 64]);
        let routes: Vec<u32> = matches.iter().map(|(r, _)| *r).collect();
        assert_eq!(routes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_note_off_delivers_zero_payload() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        d.register(pattern(AddressKind::Note, Some(60), Some(ch(0))), 1);

        // Real Note Off with a nonzero release velocity still routes 0
        let matches = d.dispatch(&[0x80, 60, 64]);
        assert_eq!(matches.as_slice(), &[(1, 0)]);

        // Note On with velocity 0 is a release too
        let matches = d.dispatch(&[0x90, 60, 0]);
        assert_eq!(matches.as_slice(), &[(1, 0)]);
    }

    #[test]
    fn test_channel_pressure_payload_from_data1() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        // Pressure has no identifier byte, so the pattern wildcards it
        d.register(pattern(AddressKind::ChannelPressure, None, Some(ch(3))), 1);
        // A concrete identifier can never match channel pressure
        d.register(pattern(AddressKind::ChannelPressure, Some(9), Some(ch(3))), 2);

        let matches = d.dispatch(&[0xD3, 99]);
        assert_eq!(matches.as_slice(), &[(1, 99)]);
    }

    #[test]
    fn test_malformed_input_is_dropped_not_fatal() {
        let mut d: Dispatcher<u32> = Dispatcher::new();
        d.register(pattern(AddressKind::ControlChange, None, None), 1);

        assert!(d.dispatch(&[]).is_empty());
        assert!(d.dispatch(&[0x12, 0x34]).is_empty()); // no status byte
        assert!(d.dispatch(&[0xB0, 7]).is_empty()); // truncated
        assert!(d.dispatch(&[0xE0, 0, 64]).is_empty()); // pitch bend: unrecognized
        assert!(d.dispatch(&[0xFE]).is_empty()); // active sensing

        // Registry untouched, good input still routes
        assert_eq!(d.dispatch(&[0xB0, 7, 1]).len(), 1);
    }
}
