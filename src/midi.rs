//! MIDI wire format support
//!
//! Parsing and encoding for the channel messages the binding engine speaks
//! (note on/off, control change, channel pressure), plus the 7-bit signed
//! delta convention used by relative encoders.

use crate::error::SetupError;
use std::fmt;

/// Validated MIDI channel (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Create a channel, rejecting values above 15.
    pub fn new(channel: u8) -> Result<Self, SetupError> {
        if channel > 0x0F {
            return Err(SetupError::ChannelOutOfRange(channel));
        }
        Ok(Self(channel))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based for humans, 0-based on the wire
        write!(f, "ch{}", self.0 + 1)
    }
}

/// Address classification of a control: which family of channel messages
/// drives it. Note on and note off share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Note,
    ControlChange,
    ChannelPressure,
}

/// Parsed MIDI channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Channel Pressure: channel (0-15), pressure (0-127)
    ChannelPressure { channel: u8, pressure: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes.
    ///
    /// Returns `None` for anything outside the supported set: missing or
    /// invalid status byte, truncated data, or a message kind this engine
    /// does not route (pitch bend, program change, system messages).
    /// Note On with velocity 0 parses as Note Off.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;

        // Channel messages only; running status is not supported.
        if !(0x80..0xF0).contains(&status) {
            return None;
        }

        let kind = status & 0xF0;
        let channel = status & 0x0F;

        match kind {
            0x80 => {
                if data.len() < 3 {
                    return None;
                }
                Some(MidiMessage::NoteOff {
                    channel,
                    note: data[1] & 0x7F,
                    velocity: data[2] & 0x7F,
                })
            }
            0x90 => {
                if data.len() < 3 {
                    return None;
                }
                let note = data[1] & 0x7F;
                let velocity = data[2] & 0x7F;

                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            0xB0 => {
                if data.len() < 3 {
                    return None;
                }
                Some(MidiMessage::ControlChange {
                    channel,
                    cc: data[1] & 0x7F,
                    value: data[2] & 0x7F,
                })
            }
            0xD0 => {
                if data.len() < 2 {
                    return None;
                }
                Some(MidiMessage::ChannelPressure {
                    channel,
                    pressure: data[1] & 0x7F,
                })
            }
            _ => None,
        }
    }

    /// Encode to the fixed three-byte transport layout. Channel pressure
    /// pads data2 with 0; [`wire_len`](Self::wire_len) gives the number of
    /// bytes that actually go on the wire.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => [0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::ControlChange { channel, cc, value } => {
                [0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                [0xD0 | (channel & 0x0F), pressure & 0x7F, 0]
            }
        }
    }

    /// Number of bytes of [`to_bytes`](Self::to_bytes) that belong on the wire.
    pub fn wire_len(&self) -> usize {
        match self {
            MidiMessage::ChannelPressure { .. } => 2,
            _ => 3,
        }
    }

    /// Channel of the message (0-15).
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ChannelPressure { channel, .. } => channel,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity),
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity),
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                write!(f, "ChannelPressure ch:{} p:{}", channel + 1, pressure)
            }
        }
    }
}

/// Decode a 7-bit two's-complement relative payload.
///
/// Bytes 0-63 map to +0..+63, bytes 64-127 map to -64..-1.
pub fn decode_delta(payload: u8) -> i8 {
    let payload = payload & 0x7F;
    if payload < 0x40 {
        payload as i8
    } else {
        (payload as i16 - 0x80) as i8
    }
}

/// Encode a signed delta back into the 7-bit convention. The delta is
/// clamped to the representable -64..=63 range.
pub fn encode_delta(delta: i8) -> u8 {
    (delta.clamp(-64, 63) as u8) & 0x7F
}

/// Format MIDI bytes as hex string for logging.
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_note_on_parsing() {
        let data = [0x90, 60, 100];
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100,
            }
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_note_off() {
        let data = [0x92, 60, 0];
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 2,
                note: 60,
                velocity: 0,
            }
        );
    }

    #[test]
    fn test_control_change() {
        let data = [0xB2, 7, 100];
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(
            msg,
            MidiMessage::ControlChange {
                channel: 2,
                cc: 7,
                value: 100,
            }
        );
    }

    #[test]
    fn test_channel_pressure_is_two_bytes() {
        let msg = MidiMessage::parse(&[0xD5, 99]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::ChannelPressure {
                channel: 5,
                pressure: 99,
            }
        );
        assert_eq!(msg.wire_len(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 1, 2]), None); // data byte first
        assert_eq!(MidiMessage::parse(&[0xF8]), None); // system message
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None); // truncated
        assert_eq!(MidiMessage::parse(&[0xE0, 0, 64]), None); // pitch bend unsupported
    }

    #[test]
    fn test_encode_note_on() {
        let msg = MidiMessage::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100,
        };
        assert_eq!(msg.to_bytes(), [0x90, 60, 100]);
    }

    #[test]
    fn test_channel_validation() {
        assert!(Channel::new(0).is_ok());
        assert!(Channel::new(15).is_ok());
        assert!(Channel::new(16).is_err());
    }

    #[test]
    fn test_decode_delta_convention() {
        assert_eq!(decode_delta(0), 0);
        assert_eq!(decode_delta(1), 1);
        assert_eq!(decode_delta(63), 63);
        assert_eq!(decode_delta(64), -64);
        assert_eq!(decode_delta(127), -1);
    }

    proptest! {
        #[test]
        fn prop_decode_delta_in_range(payload in 0u8..128) {
            let delta = decode_delta(payload);
            prop_assert!((-64..=63).contains(&(delta as i16)));
            // sign convention: low half positive, high half negative
            if payload < 64 {
                prop_assert!(delta >= 0);
            } else {
                prop_assert!(delta < 0);
            }
        }

        #[test]
        fn prop_delta_roundtrip(delta in -64i8..=63) {
            prop_assert_eq!(decode_delta(encode_delta(delta)), delta);
        }
    }
}
