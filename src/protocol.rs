//! The APC mini mk2 wire protocol: fixed lookup tables, cell addressing and the MIDI byte layout of
//! inbound and outbound messages.
//!
//! The palette, lighting mode and button state values are hardware constants. Values outside of the
//! named constants are still accepted everywhere and handed to the device untouched; what the
//! device does with them is up to its firmware.

/// Number of pads in the 8x8 grid
pub const PAD_COUNT: usize = 64;
/// Number of buttons in the row below the grid
pub const ROW_BUTTON_COUNT: usize = 8;
/// Number of buttons in the column right of the grid
pub const COLUMN_BUTTON_COUNT: usize = 8;
/// Total number of individually addressable LEDs
pub const CELL_COUNT: usize = PAD_COUNT + ROW_BUTTON_COUNT + COLUMN_BUTTON_COUNT;

/// Note number of the first row button. Row button `i` is addressed as `ROW_BUTTON_NOTE + i`.
pub const ROW_BUTTON_NOTE: u8 = 100;
/// Note number of the first column button. Column button `i` is addressed as
/// `COLUMN_BUTTON_NOTE + i`.
pub const COLUMN_BUTTON_NOTE: u8 = 112;
/// Note number at and above which every note is the shift key
pub const SHIFT_NOTE: u8 = 122;
/// Controller number of the first fader
pub const FADER_CONTROLLER: u8 = 48;

/// A color from the APC mini mk2 velocity palette.
///
/// Everywhere where a Color is expected as a function argument, you can also directly pass in the
/// raw palette index and call `.into()` on it:
/// ```
/// # use apc_mini::Color;
/// assert_eq!(Color::RED, 5u8.into());
/// ```
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub(crate) id: u8,
}

impl Color {
    pub const BLACK: Color = Self { id: 0 };
    pub const WHITE: Color = Self { id: 3 };
    pub const WARM_WHITE: Color = Self { id: 8 };
    pub const RED: Color = Self { id: 5 };
    pub const ORANGE: Color = Self { id: 9 };
    pub const YELLOW: Color = Self { id: 13 };
    pub const MINT_GREEN: Color = Self { id: 16 };
    pub const APPLE_GREEN: Color = Self { id: 17 };
    pub const GREEN: Color = Self { id: 21 };
    pub const SEA_GREEN: Color = Self { id: 29 };
    pub const CYAN: Color = Self { id: 37 };
    pub const LAVENDER: Color = Self { id: 41 };
    pub const BLUE: Color = Self { id: 45 };
    pub const PURPLE: Color = Self { id: 49 };
    pub const MAGENTA: Color = Self { id: 53 };
    pub const PINK: Color = Self { id: 57 };
    pub const LIGHT_RED: Color = Self { id: 4 };
    pub const LIGHT_YELLOW: Color = Self { id: 12 };
    pub const LIGHT_GREEN: Color = Self { id: 20 };
    pub const LIGHT_BLUE: Color = Self { id: 36 };
    pub const LIGHT_MAGENTA: Color = Self { id: 52 };
    pub const RED_ORANGE: Color = Self { id: 60 };

    /// Every named palette entry, in no particular order
    pub const NAMED: [Color; 22] = [
        Self::BLACK,
        Self::WHITE,
        Self::WARM_WHITE,
        Self::RED,
        Self::ORANGE,
        Self::YELLOW,
        Self::MINT_GREEN,
        Self::APPLE_GREEN,
        Self::GREEN,
        Self::SEA_GREEN,
        Self::CYAN,
        Self::LAVENDER,
        Self::BLUE,
        Self::PURPLE,
        Self::MAGENTA,
        Self::PINK,
        Self::LIGHT_RED,
        Self::LIGHT_YELLOW,
        Self::LIGHT_GREEN,
        Self::LIGHT_BLUE,
        Self::LIGHT_MAGENTA,
        Self::RED_ORANGE,
    ];

    pub const fn new(id: u8) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Whether this is one of the named palette entries
    pub fn is_named(&self) -> bool {
        Self::NAMED.contains(self)
    }
}

impl From<u8> for Color {
    fn from(id: u8) -> Self {
        Self::new(id)
    }
}

/// The brightness or animation of a pad. On the wire, this is the MIDI channel of the note-on
/// message that lights the pad.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightingMode {
    pub(crate) id: u8,
}

impl LightingMode {
    pub const BRIGHTNESS_10: LightingMode = Self { id: 0 };
    pub const BRIGHTNESS_25: LightingMode = Self { id: 1 };
    pub const BRIGHTNESS_50: LightingMode = Self { id: 2 };
    pub const BRIGHTNESS_65: LightingMode = Self { id: 3 };
    pub const BRIGHTNESS_75: LightingMode = Self { id: 4 };
    pub const BRIGHTNESS_90: LightingMode = Self { id: 5 };
    pub const BRIGHTNESS_100: LightingMode = Self { id: 6 };
    pub const BREATHING_16: LightingMode = Self { id: 7 };
    pub const BREATHING_8: LightingMode = Self { id: 8 };
    pub const BREATHING_4: LightingMode = Self { id: 9 };
    pub const BREATHING_2: LightingMode = Self { id: 10 };
    pub const FLASHING_24: LightingMode = Self { id: 11 };
    pub const FLASHING_16: LightingMode = Self { id: 12 };
    pub const FLASHING_8: LightingMode = Self { id: 13 };
    pub const FLASHING_4: LightingMode = Self { id: 14 };
    pub const FLASHING_2: LightingMode = Self { id: 15 };

    pub const fn new(id: u8) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Whether this mode is a static brightness level, as opposed to a breathing or flashing
    /// animation
    pub fn is_static(&self) -> bool {
        self.id <= Self::BRIGHTNESS_100.id
    }
}

impl Default for LightingMode {
    fn default() -> Self {
        Self::BRIGHTNESS_100
    }
}

impl From<u8> for LightingMode {
    fn from(id: u8) -> Self {
        Self::new(id)
    }
}

/// The LED state of a row or column button. These buttons have a single fixed color.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonState {
    Off = 0,
    On = 1,
    Flashing = 2,
}

impl ButtonState {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// `On` if `lit` is true, `Off` otherwise
    pub fn lit(lit: bool) -> Self {
        if lit {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::Off
    }
}

/// The three kinds of addressable cells on the device
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Pad,
    RowButton,
    ColumnButton,
}

impl CellKind {
    pub(crate) const ALL: &'static [CellKind] =
        &[CellKind::Pad, CellKind::RowButton, CellKind::ColumnButton];

    /// How many cells of this kind exist on the device
    pub fn count(self) -> usize {
        match self {
            Self::Pad => PAD_COUNT,
            Self::RowButton => ROW_BUTTON_COUNT,
            Self::ColumnButton => COLUMN_BUTTON_COUNT,
        }
    }

    /// Note number of the cell with index 0
    fn base_note(self) -> u8 {
        match self {
            Self::Pad => 0,
            Self::RowButton => ROW_BUTTON_NOTE,
            Self::ColumnButton => COLUMN_BUTTON_NOTE,
        }
    }
}

/// A single addressable LED, identified by its kind and its index within that kind.
///
/// The only ways to get a `Cell` are the checked constructors and [`Cell::all`], so its index is
/// always in range for its kind.
///
/// ```compile_fail
/// use apc_mini::{Cell, CellKind};
///
/// let out_of_range = Cell { kind: CellKind::RowButton, index: 8 };
/// ```
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    kind: CellKind,
    index: usize,
}

impl Cell {
    pub fn new(kind: CellKind, index: usize) -> Result<Self, crate::MidiError> {
        if index >= kind.count() {
            return Err(crate::MidiError::IndexOutOfBounds { kind, index });
        }
        Ok(Self { kind, index })
    }

    pub fn pad(index: usize) -> Result<Self, crate::MidiError> {
        Self::new(CellKind::Pad, index)
    }

    pub fn row_button(index: usize) -> Result<Self, crate::MidiError> {
        Self::new(CellKind::RowButton, index)
    }

    pub fn column_button(index: usize) -> Result<Self, crate::MidiError> {
        Self::new(CellKind::ColumnButton, index)
    }

    pub fn kind(self) -> CellKind {
        self.kind
    }

    pub fn index(self) -> usize {
        self.index
    }

    /// The note number this cell is lit with (and, for real hardware, reports presses with)
    pub fn note(self) -> u8 {
        self.kind.base_note() + self.index as u8
    }

    /// Iterates over every cell in synchronization order: all pads, then all row buttons, then
    /// all column buttons, each in ascending index order.
    pub fn all() -> impl Iterator<Item = Cell> {
        CellKind::ALL
            .iter()
            .flat_map(|&kind| (0..kind.count()).map(move |index| Cell { kind, index }))
    }
}

/// The single outbound command shape this device understands: a note-on whose note selects the
/// LED, whose velocity selects the color (or button state) and whose channel selects the lighting
/// mode (always 0 for buttons).
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct LedCommand {
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl LedCommand {
    pub fn pad(cell: Cell, color: Color, mode: LightingMode) -> Self {
        Self {
            note: cell.note(),
            velocity: color.id,
            channel: mode.id,
        }
    }

    pub fn button(cell: Cell, state: ButtonState) -> Self {
        Self {
            note: cell.note(),
            velocity: state.id(),
            channel: 0,
        }
    }

    /// The raw MIDI bytes of this command
    pub fn to_bytes(self) -> [u8; 3] {
        [
            0x90 | (self.channel & 0x0F),
            self.note & 0x7F,
            self.velocity & 0x7F,
        ]
    }
}

/// A decoded inbound MIDI message, before classification
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum RawMessage {
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
}

impl RawMessage {
    /// Decode the bytes delivered by the MIDI driver. Messages that this device protocol doesn't
    /// care about (sysex, clock, truncated messages, ...) yield `None`.
    ///
    /// A note-on with velocity 0 is a note-off, as usual in MIDI.
    pub fn decode(data: &[u8]) -> Option<Self> {
        match *data {
            [status, note, _] if status & 0xF0 == 0x80 => Some(Self::NoteOff { note }),
            [status, note, 0] if status & 0xF0 == 0x90 => Some(Self::NoteOff { note }),
            [status, note, _] if status & 0xF0 == 0x90 => Some(Self::NoteOn { note }),
            [status, controller, value] if status & 0xF0 == 0xB0 => {
                Some(Self::ControlChange { controller, value })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_ordered_pads_then_rows_then_columns() {
        let cells: Vec<Cell> = Cell::all().collect();
        assert_eq!(cells.len(), CELL_COUNT);
        assert_eq!(cells[0], Cell { kind: CellKind::Pad, index: 0 });
        assert_eq!(cells[63], Cell { kind: CellKind::Pad, index: 63 });
        assert_eq!(cells[64], Cell { kind: CellKind::RowButton, index: 0 });
        assert_eq!(cells[72], Cell { kind: CellKind::ColumnButton, index: 0 });
        assert_eq!(cells[79], Cell { kind: CellKind::ColumnButton, index: 7 });
    }

    #[test]
    fn cell_notes() {
        assert_eq!(Cell::pad(63).unwrap().note(), 63);
        assert_eq!(Cell::row_button(0).unwrap().note(), 100);
        assert_eq!(Cell::row_button(7).unwrap().note(), 107);
        assert_eq!(Cell::column_button(3).unwrap().note(), 115);
    }

    #[test]
    fn cell_index_is_checked() {
        assert!(Cell::pad(64).is_err());
        assert!(Cell::row_button(8).is_err());
        assert!(matches!(
            Cell::column_button(12),
            Err(crate::MidiError::IndexOutOfBounds { kind: CellKind::ColumnButton, index: 12 })
        ));
    }

    #[test]
    fn cells_expose_kind_and_index() {
        let cell = Cell::row_button(7).unwrap();
        assert_eq!(cell.kind(), CellKind::RowButton);
        assert_eq!(cell.index(), 7);
        // every cell reachable from the public API has an in-range note
        assert!(Cell::all().all(|cell| cell.note() < 122));
        assert!(Cell::column_button(200).is_err());
    }

    #[test]
    fn pad_command_puts_mode_into_channel() {
        let cmd = LedCommand::pad(Cell::pad(5).unwrap(), Color::RED, LightingMode::BREATHING_2);
        assert_eq!(cmd, LedCommand { note: 5, velocity: 5, channel: 10 });
        assert_eq!(cmd.to_bytes(), [0x9A, 5, 5]);
    }

    #[test]
    fn button_command_uses_channel_zero() {
        let cell = Cell::column_button(2).unwrap();
        let cmd = LedCommand::button(cell, ButtonState::Flashing);
        assert_eq!(cmd.to_bytes(), [0x90, 114, 2]);
    }

    #[test]
    fn unknown_palette_values_pass_through() {
        let color = Color::new(99);
        assert!(!color.is_named());
        let cmd = LedCommand::pad(Cell::pad(0).unwrap(), color, LightingMode::new(6));
        assert_eq!(cmd.to_bytes(), [0x96, 0, 99]);
    }

    #[test]
    fn palette_is_exact() {
        assert_eq!(Color::NAMED.len(), 22);
        assert_eq!(Color::WARM_WHITE.id(), 8);
        assert_eq!(Color::SEA_GREEN.id(), 29);
        assert_eq!(Color::LAVENDER.id(), 41);
        assert_eq!(Color::RED_ORANGE.id(), 60);
        assert_eq!(LightingMode::BRIGHTNESS_100.id(), 6);
        assert_eq!(LightingMode::FLASHING_2.id(), 15);
        assert!(LightingMode::BRIGHTNESS_65.is_static());
        assert!(!LightingMode::BREATHING_16.is_static());
    }

    #[test]
    fn decode_raw_messages() {
        assert_eq!(RawMessage::decode(&[0x90, 12, 127]), Some(RawMessage::NoteOn { note: 12 }));
        assert_eq!(RawMessage::decode(&[0x90, 12, 0]), Some(RawMessage::NoteOff { note: 12 }));
        assert_eq!(RawMessage::decode(&[0x80, 112, 64]), Some(RawMessage::NoteOff { note: 112 }));
        assert_eq!(
            RawMessage::decode(&[0xB0, 56, 99]),
            Some(RawMessage::ControlChange { controller: 56, value: 99 })
        );
        assert_eq!(RawMessage::decode(&[0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]), None);
        assert_eq!(RawMessage::decode(&[0x90, 12]), None);
        assert_eq!(RawMessage::decode(&[0xE0, 0, 64]), None);
    }
}
