use anyhow::{anyhow, Result};
use log::{info, warn};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};

use super::translate;
use crate::messaging::EngineHandle;

const CLIENT_NAME: &str = "HearWaveform MIDI Input";

/// Handles MIDI input from a connected device, forwarding notes to the engine
pub struct MidiInputHandler {
    connection: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
    handle: EngineHandle,
}

impl MidiInputHandler {
    pub fn new(handle: EngineHandle) -> Self {
        Self {
            connection: None,
            port_name: None,
            handle,
        }
    }

    /// Names of all available MIDI input ports
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to create MIDI input: {e}"))?;
        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }

    /// Connect to the first port whose name contains `name_fragment`, or to the
    /// first port at all when no fragment is given. Returns the port name.
    pub fn connect(&mut self, name_fragment: Option<&str>) -> Result<String> {
        self.disconnect();

        let midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to create MIDI input: {e}"))?;
        let (port, port_name) = find_port(&midi_in, name_fragment)?;

        let handle = self.handle.clone();
        let connection = midi_in
            .connect(
                &port,
                "hear-waveform-notes",
                move |_stamp, message, _| Self::handle_midi_message(message, &handle),
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI port '{port_name}': {e}"))?;

        info!("Connected to MIDI port '{port_name}'");
        self.connection = Some(connection);
        self.port_name = Some(port_name.clone());
        Ok(port_name)
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            if let Some(name) = self.port_name.take() {
                info!("Disconnected from MIDI port '{name}'");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    fn handle_midi_message(message: &[u8], handle: &EngineHandle) {
        if let Some(command) = translate(message) {
            if let Err(err) = handle.send(command) {
                warn!("Dropped MIDI message {message:02X?}: {err}");
            }
        }
    }
}

impl Drop for MidiInputHandler {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn find_port(midi_in: &MidiInput, name_fragment: Option<&str>) -> Result<(MidiInputPort, String)> {
    midi_in
        .ports()
        .into_iter()
        .filter_map(|port| {
            let name = midi_in.port_name(&port).ok()?;
            Some((port, name))
        })
        .find(|(_, name)| name_fragment.map_or(true, |fragment| name.contains(fragment)))
        .ok_or_else(|| match name_fragment {
            Some(fragment) => anyhow!("No MIDI input port matching '{fragment}'"),
            None => anyhow!("No MIDI input ports available"),
        })
}
