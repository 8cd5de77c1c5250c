//! Typed errors for surface setup
//!
//! Configuration-time errors are fatal precondition violations: a host that
//! hits one of these has a wiring bug and should abort initialization.
//! Runtime anomalies (malformed inbound bytes) are never surfaced as errors;
//! they are logged and dropped so the dispatch loop keeps running.

use thiserror::Error;

/// Result alias for setup-time operations.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Fatal configuration-time errors.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("MIDI channel {0} out of range (0-15)")]
    ChannelOutOfRange(u8),

    #[error("data byte {0} out of range (0-127)")]
    DataByteOutOfRange(u8),

    #[error("value set '{0}' already registered")]
    DuplicateValueSet(String),

    #[error("control set '{0}' already registered")]
    DuplicateControlSet(String),

    #[error("value '{name}' appears twice in value set '{set}'")]
    DuplicateValueName { set: String, name: String },

    #[error("value set '{name}' has {slots} slots, maximum is {max}")]
    ValueSetTooLarge {
        name: String,
        slots: usize,
        max: usize,
    },

    #[error("empty name")]
    EmptyName,
}

/// Errors from the optional hardware transport.
#[cfg(feature = "hardware")]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MIDI backend initialization failed: {0}")]
    Init(#[from] midir::InitError),

    #[error("MIDI output port matching '{0}' not found")]
    PortNotFound(String),

    #[error("failed to connect MIDI output: {0}")]
    Connect(String),
}
