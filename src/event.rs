//! Classification of raw device input into semantic events.

use crate::protocol::{RawMessage, COLUMN_BUTTON_NOTE, FADER_CONTROLLER, ROW_BUTTON_NOTE};

/// A semantic input event produced by the device.
///
/// Row button indices and fader indices are signed: they are computed from the raw note or
/// controller number by subtracting a fixed offset, and input that real hardware never emits (but
/// that an emulated or replayed stream may contain) can land outside the physical range or below
/// zero. The classifier never clamps or drops such values; filter them on the receiving side.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    PadPressed(u8),
    PadReleased(u8),
    RowButtonPressed(i32),
    RowButtonReleased(i32),
    ColumnButtonPressed(u8),
    ColumnButtonReleased(u8),
    ShiftPressed,
    ShiftReleased,
    FaderChanged { fader: i32, value: u8 },
}

/// The name of an [`Event`], without its payload. Used to subscribe to one kind of event.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    PadPressed,
    PadReleased,
    RowButtonPressed,
    RowButtonReleased,
    ColumnButtonPressed,
    ColumnButtonReleased,
    ShiftPressed,
    ShiftReleased,
    FaderChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PadPressed(_) => EventKind::PadPressed,
            Self::PadReleased(_) => EventKind::PadReleased,
            Self::RowButtonPressed(_) => EventKind::RowButtonPressed,
            Self::RowButtonReleased(_) => EventKind::RowButtonReleased,
            Self::ColumnButtonPressed(_) => EventKind::ColumnButtonPressed,
            Self::ColumnButtonReleased(_) => EventKind::ColumnButtonReleased,
            Self::ShiftPressed => EventKind::ShiftPressed,
            Self::ShiftReleased => EventKind::ShiftReleased,
            Self::FaderChanged { .. } => EventKind::FaderChanged,
        }
    }

    /// Whether this event is a press of any pad or button (including shift)
    pub fn is_press(&self) -> bool {
        matches!(
            self,
            Self::PadPressed(_)
                | Self::RowButtonPressed(_)
                | Self::ColumnButtonPressed(_)
                | Self::ShiftPressed
        )
    }

    /// Whether this event is a release of any pad or button (including shift)
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Self::PadReleased(_)
                | Self::RowButtonReleased(_)
                | Self::ColumnButtonReleased(_)
                | Self::ShiftReleased
        )
    }
}

/// The class a note number falls into, determined purely by numeric range.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum NoteClass {
    Pad,
    RowButton,
    ColumnButton,
    Shift,
}

impl NoteClass {
    /// Partition of the note number space. The ranges are disjoint and cover every `u8`.
    pub fn of(note: u8) -> Self {
        match note {
            0..=63 => Self::Pad,
            // Row buttons physically start at note 100. Nothing on the device sends 64..=99, but
            // replayed input may, and it is dispatched as a row button with a negative index.
            64..=99 => Self::RowButton,
            100..=111 => Self::RowButton,
            112..=121 => Self::ColumnButton,
            122..=u8::MAX => Self::Shift,
        }
    }

    /// The value subtracted from a note number of this class to get the cell index
    fn offset(self) -> i32 {
        match self {
            Self::Pad | Self::Shift => 0,
            Self::RowButton => ROW_BUTTON_NOTE as i32,
            Self::ColumnButton => COLUMN_BUTTON_NOTE as i32,
        }
    }
}

/// Whether `note` lies in the row button range, but below the notes the real hardware emits for
/// its row buttons.
pub fn is_unreachable_row_note(note: u8) -> bool {
    NoteClass::of(note) == NoteClass::RowButton && note < ROW_BUTTON_NOTE
}

/// Classify a note transition. Always yields exactly one event.
pub fn classify_note(note: u8, pressed: bool) -> Event {
    let class = NoteClass::of(note);
    let index = note as i32 - class.offset();

    // The casts below can't truncate: each class's range minus its offset fits into a u8
    match (class, pressed) {
        (NoteClass::Pad, true) => Event::PadPressed(index as u8),
        (NoteClass::Pad, false) => Event::PadReleased(index as u8),
        (NoteClass::RowButton, true) => Event::RowButtonPressed(index),
        (NoteClass::RowButton, false) => Event::RowButtonReleased(index),
        (NoteClass::ColumnButton, true) => Event::ColumnButtonPressed(index as u8),
        (NoteClass::ColumnButton, false) => Event::ColumnButtonReleased(index as u8),
        (NoteClass::Shift, true) => Event::ShiftPressed,
        (NoteClass::Shift, false) => Event::ShiftReleased,
    }
}

/// Classify a control change. Every controller number is taken to be a fader.
pub fn classify_controller(controller: u8, value: u8) -> Event {
    Event::FaderChanged {
        fader: controller as i32 - FADER_CONTROLLER as i32,
        value,
    }
}

/// Classify an already decoded raw message.
pub fn classify(msg: RawMessage) -> Event {
    match msg {
        RawMessage::NoteOn { note } => classify_note(note, true),
        RawMessage::NoteOff { note } => classify_note(note, false),
        RawMessage::ControlChange { controller, value } => classify_controller(controller, value),
    }
}

/// Decode and classify the raw bytes of a MIDI message, as delivered by the driver.
pub fn decode_event(data: &[u8]) -> Option<Event> {
    RawMessage::decode(data).map(classify)
}
