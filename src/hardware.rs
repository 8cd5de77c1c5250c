//! Hardware MIDI output via midir
//!
//! Optional, behind the `hardware` feature. Everything else in the crate
//! works against the [`MidiTransport`] trait and never links the OS MIDI
//! backend.

use crate::error::TransportError;
use crate::transport::MidiTransport;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

/// Transport writing to a real MIDI output port.
pub struct MidirTransport {
    conn: MidiOutputConnection,
    port_name: String,
}

impl MidirTransport {
    /// Connect to the first output port whose name contains `port_name`.
    pub fn connect(port_name: &str) -> Result<Self, TransportError> {
        let output = MidiOutput::new("midibind")?;

        let port = output
            .ports()
            .into_iter()
            .find(|p| {
                output
                    .port_name(p)
                    .map(|n| n.contains(port_name))
                    .unwrap_or(false)
            })
            .ok_or_else(|| TransportError::PortNotFound(port_name.to_string()))?;

        let resolved = output
            .port_name(&port)
            .unwrap_or_else(|_| port_name.to_string());
        let conn = output
            .connect(&port, "midibind-out")
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        info!("connected MIDI output '{}'", resolved);
        Ok(Self {
            conn,
            port_name: resolved,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiTransport for MidirTransport {
    fn send(&mut self, status: u8, data1: u8, data2: u8) {
        // Channel pressure is a two-byte message on the wire
        let bytes: &[u8] = if status & 0xF0 == 0xD0 {
            &[status, data1]
        } else {
            &[status, data1, data2]
        };

        if let Err(e) = self.conn.send(bytes) {
            warn!("MIDI send failed on '{}': {}", self.port_name, e);
        }
    }
}
