//! Physical controls and their decode behavior
//!
//! A `Control` represents one physical input element. Its wire identity is a
//! `ControlAddress`; its semantics live in a `ControlBehavior` variant:
//! `Button`, `Encoder`, `ClickEncoder`, `Fader`. Behaviors decode inbound
//! payloads into `ControlAction`s and build outbound display messages; the
//! surface executes the actions against the attached value.

use crate::error::SetupError;
use crate::midi::{AddressKind, Channel, MidiMessage};
use crate::touch::TouchLatch;
use crate::value::ValueId;
use smallvec::{smallvec, SmallVec};

/// Arena handle for a control owned by a `ControlSurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub(crate) usize);

/// Wire identity of a control: message kind + channel + identifier (note or
/// controller number; unused for channel pressure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlAddress {
    pub kind: AddressKind,
    pub channel: Channel,
    pub identifier: u8,
}

impl ControlAddress {
    /// Note address (buttons, encoder pushes, fader touch contacts).
    pub fn note(channel: u8, note: u8) -> Result<Self, SetupError> {
        if note > 0x7F {
            return Err(SetupError::DataByteOutOfRange(note));
        }
        Ok(Self {
            kind: AddressKind::Note,
            channel: Channel::new(channel)?,
            identifier: note,
        })
    }

    /// Control-change address (encoders, faders, pots).
    pub fn cc(channel: u8, cc: u8) -> Result<Self, SetupError> {
        if cc > 0x7F {
            return Err(SetupError::DataByteOutOfRange(cc));
        }
        Ok(Self {
            kind: AddressKind::ControlChange,
            channel: Channel::new(channel)?,
            identifier: cc,
        })
    }

    /// Channel-pressure address. Pressure messages carry no identifier
    /// byte, so routing wildcards it.
    pub fn pressure(channel: u8) -> Result<Self, SetupError> {
        Ok(Self {
            kind: AddressKind::ChannelPressure,
            channel: Channel::new(channel)?,
            identifier: 0,
        })
    }
}

/// Outbound delivery mode for display sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Send as soon as the triggering state change occurs.
    #[default]
    Immediate,
    /// Mark dirty; send on the next flush tick. Coalesces bursts (e.g.
    /// automation playback) into one message per flush interval.
    Deferred,
}

/// Decoded intent of one inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Payload directly encodes the target value.
    Absolute(u8),
    /// Signed step from current value.
    Relative { delta: i8 },
    /// Discrete press (double-press detection happens upstream).
    Press,
    /// Discrete release.
    Release,
    /// Engage or disengage fine (reduced-sensitivity) mode.
    SetFine(bool),
    /// Touch contact state changed.
    Touch(bool),
}

/// Variant-specific decode and feedback logic.
pub trait ControlBehavior {
    /// Decode an inbound payload on the control's primary address.
    fn decode(&self, payload: u8) -> SmallVec<[ControlAction; 2]>;

    /// Decode a payload on the control's modifier address (encoder click,
    /// fader touch contact). Default: no modifier.
    fn on_modifier(&self, _payload: u8) -> SmallVec<[ControlAction; 2]> {
        SmallVec::new()
    }

    /// Build the outbound display message for the given value.
    fn feedback(&self, address: &ControlAddress, value: u8) -> Option<MidiMessage> {
        Some(feedback_message(address, value))
    }

    /// Number of discrete steps this control considers full scale, used to
    /// scale relative deltas.
    fn range(&self) -> u16 {
        128
    }

    /// Whether releasing a press forces an outward resync.
    fn resync_on_release(&self) -> bool {
        false
    }
}

/// Default display encoding per address kind: the value rides in the
/// payload byte of the control's own message family.
pub(crate) fn feedback_message(address: &ControlAddress, value: u8) -> MidiMessage {
    let channel = address.channel.get();
    match address.kind {
        AddressKind::Note => MidiMessage::NoteOn {
            channel,
            note: address.identifier,
            velocity: value,
        },
        AddressKind::ControlChange => MidiMessage::ControlChange {
            channel,
            cc: address.identifier,
            value,
        },
        AddressKind::ChannelPressure => MidiMessage::ChannelPressure {
            channel,
            pressure: value,
        },
    }
}

/// Momentary button: press forwards full scale, release forwards zero.
pub struct Button {
    pub resync_on_release: bool,
}

impl Button {
    pub fn new() -> Self {
        Self {
            resync_on_release: false,
        }
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBehavior for Button {
    fn decode(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        // Value forwarding first, gesture second, so a double-press reset
        // is not overwritten by the button's own full-scale write.
        if payload > 0 {
            smallvec![ControlAction::Absolute(127), ControlAction::Press]
        } else {
            smallvec![ControlAction::Absolute(0), ControlAction::Release]
        }
    }

    fn resync_on_release(&self) -> bool {
        self.resync_on_release
    }
}

/// Rotary encoder. In diff mode the payload is a 7-bit signed delta;
/// otherwise it is the absolute target value.
pub struct Encoder {
    pub sends_diff_values: bool,
    pub range: u16,
}

impl Encoder {
    pub fn relative() -> Self {
        Self {
            sends_diff_values: true,
            range: 128,
        }
    }

    pub fn absolute() -> Self {
        Self {
            sends_diff_values: false,
            range: 128,
        }
    }

    pub fn with_range(mut self, range: u16) -> Self {
        self.range = range;
        self
    }
}

impl ControlBehavior for Encoder {
    fn decode(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        if self.sends_diff_values {
            smallvec![ControlAction::Relative {
                delta: crate::midi::decode_delta(payload),
            }]
        } else {
            smallvec![ControlAction::Absolute(payload)]
        }
    }

    fn range(&self) -> u16 {
        self.range
    }
}

/// Encoder with a push contact on a secondary (modifier) address. Holding
/// the click engages fine mode; releasing it disengages and, if configured,
/// forces a resync to clean up any transient local changes.
pub struct ClickEncoder {
    pub encoder: Encoder,
    pub resync_on_release: bool,
}

impl ClickEncoder {
    pub fn relative() -> Self {
        Self {
            encoder: Encoder::relative(),
            resync_on_release: true,
        }
    }

    pub fn with_range(mut self, range: u16) -> Self {
        self.encoder.range = range;
        self
    }
}

impl ControlBehavior for ClickEncoder {
    fn decode(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        self.encoder.decode(payload)
    }

    fn on_modifier(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        if payload > 0 {
            smallvec![ControlAction::Press, ControlAction::SetFine(true)]
        } else {
            smallvec![ControlAction::Release, ControlAction::SetFine(false)]
        }
    }

    fn range(&self) -> u16 {
        self.encoder.range
    }

    fn resync_on_release(&self) -> bool {
        self.resync_on_release
    }
}

/// Fader: absolute position, with an optional touch contact on a modifier
/// address that suppresses outbound sync while held.
pub struct Fader;

impl ControlBehavior for Fader {
    fn decode(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        smallvec![ControlAction::Absolute(payload)]
    }

    fn on_modifier(&self, payload: u8) -> SmallVec<[ControlAction; 2]> {
        smallvec![ControlAction::Touch(payload > 0)]
    }
}

/// One physical input element and its runtime binding state.
pub struct Control {
    pub(crate) name: String,
    pub(crate) address: ControlAddress,
    pub(crate) modifier_address: Option<ControlAddress>,
    pub(crate) behavior: Box<dyn ControlBehavior>,
    pub(crate) bidirectional: bool,
    pub(crate) sync_mode: SyncMode,
    pub(crate) double_press_enabled: bool,
    pub(crate) attached: Option<ValueId>,
    pub(crate) fine_mode: bool,
    pub(crate) touch: TouchLatch,
    pub(crate) dirty: bool,
}

impl Control {
    pub fn new(
        name: impl Into<String>,
        address: ControlAddress,
        behavior: Box<dyn ControlBehavior>,
    ) -> Self {
        Self {
            name: name.into(),
            address,
            modifier_address: None,
            behavior,
            bidirectional: true,
            sync_mode: SyncMode::Immediate,
            double_press_enabled: true,
            attached: None,
            fine_mode: false,
            touch: TouchLatch::new(),
            dirty: false,
        }
    }

    pub fn button(name: impl Into<String>, address: ControlAddress) -> Self {
        Self::new(name, address, Box::new(Button::new()))
    }

    pub fn encoder(name: impl Into<String>, address: ControlAddress) -> Self {
        Self::new(name, address, Box::new(Encoder::relative()))
    }

    pub fn click_encoder(
        name: impl Into<String>,
        address: ControlAddress,
        click: ControlAddress,
    ) -> Self {
        Self::new(name, address, Box::new(ClickEncoder::relative())).with_modifier(click)
    }

    pub fn fader(name: impl Into<String>, address: ControlAddress) -> Self {
        Self::new(name, address, Box::new(Fader))
    }

    /// Attach a secondary address (encoder click, fader touch contact).
    pub fn with_modifier(mut self, address: ControlAddress) -> Self {
        self.modifier_address = Some(address);
        self
    }

    pub fn with_sync_mode(mut self, mode: SyncMode) -> Self {
        self.sync_mode = mode;
        self
    }

    /// Unidirectional hardware cannot display incoming state.
    pub fn unidirectional(mut self) -> Self {
        self.bidirectional = false;
        self
    }

    pub fn with_double_press(mut self, enabled: bool) -> Self {
        self.double_press_enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> ControlAddress {
        self.address
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn attached_value(&self) -> Option<ValueId> {
        self.attached
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn is_fine_mode(&self) -> bool {
        self.fine_mode
    }

    pub fn is_touched(&self) -> bool {
        self.touch.is_touched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(channel: u8, cc: u8) -> ControlAddress {
        ControlAddress::cc(channel, cc).unwrap()
    }

    #[test]
    fn test_button_decode() {
        let button = Button::new();
        assert_eq!(
            button.decode(127).as_slice(),
            &[ControlAction::Absolute(127), ControlAction::Press]
        );
        assert_eq!(
            button.decode(0).as_slice(),
            &[ControlAction::Absolute(0), ControlAction::Release]
        );
    }

    #[test]
    fn test_encoder_decode_relative() {
        let encoder = Encoder::relative();
        assert_eq!(
            encoder.decode(2).as_slice(),
            &[ControlAction::Relative { delta: 2 }]
        );
        assert_eq!(
            encoder.decode(127).as_slice(),
            &[ControlAction::Relative { delta: -1 }]
        );
    }

    #[test]
    fn test_encoder_decode_absolute() {
        let encoder = Encoder::absolute();
        assert_eq!(encoder.decode(100).as_slice(), &[ControlAction::Absolute(100)]);
    }

    #[test]
    fn test_click_encoder_modifier_toggles_fine() {
        let enc = ClickEncoder::relative();
        assert_eq!(
            enc.on_modifier(127).as_slice(),
            &[ControlAction::Press, ControlAction::SetFine(true)]
        );
        assert_eq!(
            enc.on_modifier(0).as_slice(),
            &[ControlAction::Release, ControlAction::SetFine(false)]
        );
        assert!(enc.resync_on_release());
    }

    #[test]
    fn test_fader_touch_modifier() {
        let fader = Fader;
        assert_eq!(fader.decode(90).as_slice(), &[ControlAction::Absolute(90)]);
        assert_eq!(
            fader.on_modifier(127).as_slice(),
            &[ControlAction::Touch(true)]
        );
        assert_eq!(fader.on_modifier(0).as_slice(), &[ControlAction::Touch(false)]);
    }

    #[test]
    fn test_feedback_message_per_kind() {
        let note = ControlAddress::note(0, 60).unwrap();
        assert_eq!(
            feedback_message(&note, 127),
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 127
            }
        );

        assert_eq!(
            feedback_message(&cc(1, 7), 64),
            MidiMessage::ControlChange {
                channel: 1,
                cc: 7,
                value: 64
            }
        );

        let pressure = ControlAddress::pressure(2).unwrap();
        assert_eq!(
            feedback_message(&pressure, 33),
            MidiMessage::ChannelPressure {
                channel: 2,
                pressure: 33
            }
        );
    }

    #[test]
    fn test_address_validation() {
        assert!(ControlAddress::cc(16, 7).is_err());
        assert!(ControlAddress::note(0, 128).is_err());
        assert!(ControlAddress::pressure(15).is_ok());
    }
}
