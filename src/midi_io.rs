use std::sync::mpsc::Sender;
use std::time::Duration;

use midir::{MidiIO, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection};

use crate::ok_or_continue;
use crate::{Event, HardwareError};

fn guess_port<T: MidiIO>(midi_io: &T, keyword: &str) -> Option<T::Port> {
	for port in midi_io.ports() {
		let name = ok_or_continue!(midi_io.port_name(&port));

		if name.contains(keyword) {
			return Some(port);
		}
	}

	return None;
}

/// Returns true if a MIDI input port whose name contains `keyword` is currently present.
pub fn port_present(keyword: &str) -> Result<bool, HardwareError> {
	let midi_input = MidiInput::new(crate::APPLICATION_NAME)?;
	return Ok(guess_port(&midi_input, keyword).is_some());
}

pub trait OutputDevice where Self: Sized {
	const MIDI_CONNECTION_NAME: &'static str;

	/// Initiate from an existing midir connection.
	fn from_connection(connection: MidiOutputConnection) -> Result<Self, HardwareError>;

	fn send(&mut self, bytes: &[u8]) -> Result<(), HardwareError>;

	/// Connect to the first output port whose name contains `keyword`.
	fn guess_named(keyword: &str) -> Result<Self, HardwareError> {
		let midi_output = MidiOutput::new(crate::APPLICATION_NAME)?;

		let port = guess_port(&midi_output, keyword)
				.ok_or_else(|| HardwareError::NoPortFound { keyword: keyword.to_owned() })?;
		let port_name = midi_output.port_name(&port)?;

		let connection = midi_output
				.connect(&port, Self::MIDI_CONNECTION_NAME)
				.map_err(|e| HardwareError::Connect { port: port_name, kind: e.kind() })?;

		return Self::from_connection(connection);
	}
}

pub struct InputDeviceHandler {
	#[allow(dead_code)]
	connection: MidiInputConnection<()>
}

pub trait InputDevice: 'static {
	const MIDI_CONNECTION_NAME: &'static str;
	type Message;

	fn decode_message(timestamp: u64, data: &[u8]) -> Self::Message;

	#[must_use = "If not saved, the connection will be immediately dropped"]
	fn from_port<F>(midi_input: MidiInput, port: &MidiInputPort, mut user_callback: F)
			-> Result<InputDeviceHandler, HardwareError>
			where F: FnMut(Self::Message) + Send + 'static {

		let port_name = midi_input.port_name(port)?;

		let midir_callback = move |timestamp: u64, data: &[u8], _: &mut _| {
			let msg = Self::decode_message(timestamp, data);
			(user_callback)(msg);
		};

		let connection = midi_input.connect(port, Self::MIDI_CONNECTION_NAME, midir_callback, ())
				.map_err(|e| HardwareError::Connect { port: port_name, kind: e.kind() })?;

		return Ok(InputDeviceHandler { connection });
	}

	/// Connect to the first input port whose name contains `keyword`. Every decoded message is
	/// handed to `user_callback` on midir's thread.
	#[must_use = "If not saved, the connection will be immediately dropped"]
	fn guess_named<F>(keyword: &str, user_callback: F) -> Result<InputDeviceHandler, HardwareError>
			where F: FnMut(Self::Message) + Send + 'static {

		let midi_input = MidiInput::new(crate::APPLICATION_NAME)?;

		let port = guess_port(&midi_input, keyword)
				.ok_or_else(|| HardwareError::NoPortFound { keyword: keyword.to_owned() })?;

		return Self::from_port(midi_input, &port, user_callback);
	}
}

/// Polls the MIDI port list and sends [`Event::Disconnected`] once no port matches `keyword`
/// anymore. The thread ends after reporting the disconnect.
pub fn spawn_device_watch(keyword: String, interval: Duration, events: Sender<Event>)
		-> std::thread::JoinHandle<()> {

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		match port_present(&keyword) {
			Ok(true) => {}
			Ok(false) => {
				log::error!("{:?} disappeared from the MIDI port list", keyword);
				let _ = events.send(Event::Disconnected);
				return;
			}
			Err(e) => log::debug!("Device watch couldn't list MIDI ports: {}", e),
		}
	})
}
