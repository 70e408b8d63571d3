//! An in-memory [`MidiHost`], for tests and for running without hardware.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::midi_io::{InputCallback, MidiHost, OutputDevice};
use crate::protocol::LedCommand;
use crate::MidiError;

#[derive(Default)]
struct State {
    inputs: Vec<String>,
    outputs: Vec<String>,
    sent: Vec<Vec<u8>>,
    // remaining number of sends that succeed, if limited
    send_budget: Option<usize>,
    refused: usize,
}

#[derive(Default)]
struct OpenInputs {
    next_id: u64,
    callbacks: Vec<(u64, InputCallback)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A fake MIDI host. Clones share the same state, so a test can keep one clone to inject input and
/// inspect output while the adapter owns another.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<State>>,
    inputs: Arc<Mutex<OpenInputs>>,
}

impl MockHost {
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        let host = Self::default();
        {
            let mut state = lock(&host.state);
            state.inputs = inputs;
            state.outputs = outputs;
        }
        host
    }

    /// A host with exactly one device whose input and output are both called `name`
    pub fn with_device(name: &str) -> Self {
        Self::new(vec![name.to_owned()], vec![name.to_owned()])
    }

    /// Replace the set of endpoint names, e.g. to simulate unplugging the device
    pub fn set_ports(&self, inputs: Vec<String>, outputs: Vec<String>) {
        let mut state = lock(&self.state);
        state.inputs = inputs;
        state.outputs = outputs;
    }

    /// Deliver raw bytes to every open input connection, on the calling thread
    pub fn inject(&self, data: &[u8]) {
        let mut inputs = lock(&self.inputs);
        for (_, callback) in &mut inputs.callbacks {
            (callback)(data);
        }
    }

    pub fn open_input_count(&self) -> usize {
        lock(&self.inputs).callbacks.len()
    }

    /// Everything sent to any output so far, as raw messages
    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sent.clone()
    }

    /// Take everything sent so far, decoded as LED commands. Messages that aren't 3-byte note-ons
    /// are skipped.
    pub fn take_commands(&self) -> Vec<LedCommand> {
        let sent = std::mem::take(&mut lock(&self.state).sent);
        sent.iter()
            .filter_map(|bytes| match **bytes {
                [status, note, velocity] if status & 0xF0 == 0x90 => Some(LedCommand {
                    note,
                    velocity,
                    channel: status & 0x0F,
                }),
                _ => None,
            })
            .collect()
    }

    /// Let the next `count` sends succeed and fail every send after that
    pub fn fail_sends_after(&self, count: usize) {
        lock(&self.state).send_budget = Some(count);
    }

    /// How many sends were refused because of [`MockHost::fail_sends_after`]
    pub fn refused_count(&self) -> usize {
        lock(&self.state).refused
    }

    /// Undo [`MockHost::fail_sends_after`]
    pub fn heal(&self) {
        lock(&self.state).send_budget = None;
    }
}

fn check_port(names: &[String], wanted: &str) -> Result<(), MidiError> {
    if names.iter().any(|name| name == wanted) {
        Ok(())
    } else {
        Err(MidiError::PortVanished {
            name: wanted.to_owned(),
        })
    }
}

impl MidiHost for MockHost {
    type Output = MockOutput;
    type InputConnection = MockInputConnection;

    fn input_names(&self) -> Result<Vec<String>, MidiError> {
        Ok(lock(&self.state).inputs.clone())
    }

    fn output_names(&self) -> Result<Vec<String>, MidiError> {
        Ok(lock(&self.state).outputs.clone())
    }

    fn open_input(
        &self,
        port_name: &str,
        _connection_name: &str,
        callback: InputCallback,
    ) -> Result<Self::InputConnection, MidiError> {
        check_port(&lock(&self.state).inputs, port_name)?;

        let mut inputs = lock(&self.inputs);
        let id = inputs.next_id;
        inputs.next_id += 1;
        inputs.callbacks.push((id, callback));

        Ok(MockInputConnection {
            id,
            inputs: Arc::clone(&self.inputs),
        })
    }

    fn open_output(
        &self,
        port_name: &str,
        _connection_name: &str,
    ) -> Result<Self::Output, MidiError> {
        check_port(&lock(&self.state).outputs, port_name)?;

        Ok(MockOutput {
            state: Arc::clone(&self.state),
        })
    }
}

/// Closes the mock input connection when dropped
pub struct MockInputConnection {
    id: u64,
    inputs: Arc<Mutex<OpenInputs>>,
}

impl Drop for MockInputConnection {
    fn drop(&mut self) {
        let id = self.id;
        lock(&self.inputs).callbacks.retain(|(other, _)| *other != id);
    }
}

/// Records everything sent to it in the owning [`MockHost`]
pub struct MockOutput {
    state: Arc<Mutex<State>>,
}

impl OutputDevice for MockOutput {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        let mut state = lock(&self.state);
        match &mut state.send_budget {
            Some(0) => {
                state.refused += 1;
                return Err(midir::SendError::Other("mock output refused the message").into());
            }
            Some(budget) => *budget -= 1,
            None => {}
        }
        state.sent.push(bytes.to_vec());
        Ok(())
    }
}
