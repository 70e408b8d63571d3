use crate::ok_or_continue;
use crate::MidiError;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

/// Receives the raw bytes of every inbound MIDI message
pub type InputCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Something that raw MIDI bytes can be written to.
pub trait OutputDevice {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError>;
}

/// The set of MIDI endpoints a host exposes, and the means to connect to them.
///
/// [`MidirHost`] talks to the operating system's MIDI stack. [`MockHost`](crate::MockHost) keeps
/// everything in memory.
pub trait MidiHost {
    type Output: OutputDevice;
    /// Keeps the input connection open for as long as it lives
    type InputConnection;

    fn input_names(&self) -> Result<Vec<String>, MidiError>;
    fn output_names(&self) -> Result<Vec<String>, MidiError>;

    /// Connect to the input endpoint called `port_name`. `callback` is invoked on the host's
    /// notification thread for every message.
    #[must_use = "If not saved, the connection will be immediately dropped"]
    fn open_input(
        &self,
        port_name: &str,
        connection_name: &str,
        callback: InputCallback,
    ) -> Result<Self::InputConnection, MidiError>;

    fn open_output(&self, port_name: &str, connection_name: &str)
        -> Result<Self::Output, MidiError>;
}

/// The endpoint names of a located device
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Located {
    pub input: String,
    pub output: String,
}

/// Return the first of `names` that contains `keyword`
pub fn find_name<'a>(names: &'a [String], keyword: &str) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| name.contains(keyword))
}

/// Search the endpoints of `host` for the device whose endpoint names contain `keyword`. Input and
/// output are looked up independently; both must be present.
pub fn locate<H: MidiHost + ?Sized>(host: &H, keyword: &str) -> Result<Located, MidiError> {
    let not_found = || MidiError::NotFound {
        keyword: keyword.to_owned(),
    };

    let inputs = host.input_names()?;
    let input = find_name(&inputs, keyword).ok_or_else(not_found)?;
    let outputs = host.output_names()?;
    let output = find_name(&outputs, keyword).ok_or_else(not_found)?;

    Ok(Located {
        input: input.to_owned(),
        output: output.to_owned(),
    })
}

/// Like [`locate`], but only reports whether the device is there. Failing to enumerate the
/// endpoints counts as absent.
pub fn is_present<H: MidiHost + ?Sized>(host: &H, keyword: &str) -> bool {
    locate(host, keyword).is_ok()
}

fn port_names<T: midir::MidiIO>(midi_io: &T) -> Vec<String> {
    let mut names = Vec::new();
    for port in midi_io.ports() {
        names.push(ok_or_continue!(midi_io.port_name(&port)));
    }
    names
}

fn find_port<T: midir::MidiIO>(midi_io: &T, wanted: &str) -> Option<T::Port> {
    for port in midi_io.ports() {
        let name = ok_or_continue!(midi_io.port_name(&port));

        if name == wanted {
            return Some(port);
        }
    }

    None
}

/// The host's real MIDI stack, via midir
#[derive(Debug, Clone)]
pub struct MidirHost {
    client_name: String,
}

impl MidirHost {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }
}

impl Default for MidirHost {
    fn default() -> Self {
        Self::new(crate::APPLICATION_NAME)
    }
}

impl MidiHost for MidirHost {
    type Output = Output;
    type InputConnection = MidiInputConnection<()>;

    fn input_names(&self) -> Result<Vec<String>, MidiError> {
        Ok(port_names(&MidiInput::new(&self.client_name)?))
    }

    fn output_names(&self) -> Result<Vec<String>, MidiError> {
        Ok(port_names(&MidiOutput::new(&self.client_name)?))
    }

    fn open_input(
        &self,
        port_name: &str,
        connection_name: &str,
        mut callback: InputCallback,
    ) -> Result<Self::InputConnection, MidiError> {
        let midi_input = MidiInput::new(&self.client_name)?;
        let port = find_port(&midi_input, port_name).ok_or_else(|| MidiError::PortVanished {
            name: port_name.to_owned(),
        })?;

        let midir_callback = move |_timestamp: u64, data: &[u8], _: &mut ()| (callback)(data);
        let connection = midi_input.connect(&port, connection_name, midir_callback, ())?;

        Ok(connection)
    }

    fn open_output(
        &self,
        port_name: &str,
        connection_name: &str,
    ) -> Result<Self::Output, MidiError> {
        let midi_output = MidiOutput::new(&self.client_name)?;
        let port = find_port(&midi_output, port_name).ok_or_else(|| MidiError::PortVanished {
            name: port_name.to_owned(),
        })?;

        let connection = midi_output.connect(&port, connection_name)?;

        Ok(Output { connection })
    }
}

/// An open connection to a midir output port
pub struct Output {
    connection: MidiOutputConnection,
}

impl OutputDevice for Output {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.connection.send(bytes)?;
        Ok(())
    }
}
