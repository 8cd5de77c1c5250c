//! midibind - bind MIDI control surfaces to application parameters
//!
//! The engine sits between a hardware surface and a host application:
//! inbound MIDI is decoded per control and forwarded to the bound
//! parameter, and host-side parameter changes flow back out as display
//! feedback. Page-style workflows are built from [`ControlSet`]s bound to
//! [`ValueSet`]s; per-control features include relative encoders with fine
//! mode, fader touch suppression, double-press reset to default, and
//! deferred (coalesced) display sync.
//!
//! Everything runs single-threaded: the host drives [`ControlSurface`]
//! from its input callback (`dispatch`), its parameter observers
//! (`pump_host_events`), and a periodic timer (`flush`).
//!
//! ```no_run
//! use midibind::{
//!     Control, ControlAddress, ControlSurface, MemoryParameter, RecordingTransport,
//!     SurfaceConfig, Value,
//! };
//!
//! let mut surface = ControlSurface::new(
//!     SurfaceConfig::default(),
//!     Box::new(RecordingTransport::new()),
//! );
//!
//! let fader = surface.add_control(Control::fader(
//!     "volume fader",
//!     ControlAddress::cc(0, 7)?,
//! ));
//! let volume = surface.add_value(Value::new(
//!     "volume",
//!     Box::new(MemoryParameter::new(100)),
//! ));
//! surface.attach(fader, volume);
//!
//! surface.dispatch(&[0xB0, 7, 64]); // hardware move -> host parameter
//! surface.flush(); // host changes -> hardware display
//! # Ok::<(), midibind::SetupError>(())
//! ```

pub mod config;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod midi;
pub mod sets;
pub mod surface;
pub mod touch;
pub mod transport;
pub mod value;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use config::SurfaceConfig;
pub use control::{
    Button, ClickEncoder, Control, ControlAction, ControlAddress, ControlBehavior, ControlId,
    Encoder, Fader, SyncMode,
};
pub use dispatcher::{Dispatcher, Pattern};
pub use error::{Result, SetupError};
pub use host::{ChangeObserver, HostParameter, MemoryParameter, ObserverId};
pub use midi::{decode_delta, encode_delta, AddressKind, Channel, MidiMessage};
pub use sets::{ControlSet, ControlSetId, ValueSet, ValueSetId};
pub use surface::ControlSurface;
pub use transport::{MidiTransport, RecordingTransport};
pub use value::{Value, ValueId};

#[cfg(feature = "hardware")]
pub use error::TransportError;
#[cfg(feature = "hardware")]
pub use hardware::MidirTransport;
