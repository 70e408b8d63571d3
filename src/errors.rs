use crate::protocol::CellKind;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("connecting to MIDI input port failed")]
    InputConnect(#[from] midir::ConnectError<midir::MidiInput>),
    #[error("connecting to MIDI output port failed")]
    OutputConnect(#[from] midir::ConnectError<midir::MidiOutput>),
    #[error("MIDI context initialization failed")]
    Init(#[from] midir::InitError),
    #[error("MIDI port retrieval failed")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("sending MIDI message failed")]
    Send(#[from] midir::SendError),
    #[error("couldn't find both an input and an output port for {keyword:?}")]
    NotFound {
        // The keyword that was searched for
        keyword: String,
    },
    #[error("MIDI port {name:?} disappeared before it could be opened")]
    PortVanished { name: String },
    #[error("{kind:?} index {index} is out of bounds (the device has {} of them)", .kind.count())]
    IndexOutOfBounds { kind: CellKind, index: usize },
}

impl MidiError {
    /// Whether this error means the device isn't (or is no longer) reachable, as opposed to a
    /// programming error on the caller's side.
    pub fn is_connectivity_error(&self) -> bool {
        !matches!(self, Self::IndexOutOfBounds { .. })
    }
}
