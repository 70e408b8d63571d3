//! The display state of the device, as a plain value type.
//!
//! A [`DisplayBuffer`] holds the visual state of every LED on the device. The adapter keeps two of
//! them: the desired state, which the application edits, and the state that was last transmitted to
//! the hardware. Both are independent values; copying one into the other is a plain `Clone`.

use crate::protocol::{
    ButtonState, Cell, CellKind, Color, LedCommand, LightingMode, COLUMN_BUTTON_COUNT, PAD_COUNT,
    ROW_BUTTON_COUNT,
};
use crate::MidiError;

/// Color and lighting mode of a single pad
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PadState {
    pub color: Color,
    pub mode: LightingMode,
}

impl PadState {
    /// Black at full brightness, i.e. dark
    pub const OFF: PadState = PadState {
        color: Color::BLACK,
        mode: LightingMode::BRIGHTNESS_100,
    };

    pub const fn new(color: Color, mode: LightingMode) -> Self {
        Self { color, mode }
    }

    /// A pad in the given color at full brightness
    pub const fn solid(color: Color) -> Self {
        Self::new(color, LightingMode::BRIGHTNESS_100)
    }
}

/// The visual state of any cell
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum CellState {
    Pad(PadState),
    Button(ButtonState),
}

impl CellState {
    /// The command that makes the hardware show this state at `cell`
    pub fn command(self, cell: Cell) -> LedCommand {
        match self {
            Self::Pad(pad) => LedCommand::pad(cell, pad.color, pad.mode),
            Self::Button(state) => LedCommand::button(cell, state),
        }
    }
}

/// The full visual state of the device: 64 pads, 8 row buttons and 8 column buttons.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct DisplayBuffer {
    pads: [PadState; PAD_COUNT],
    row_buttons: [ButtonState; ROW_BUTTON_COUNT],
    column_buttons: [ButtonState; COLUMN_BUTTON_COUNT],
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self {
            pads: [PadState::OFF; PAD_COUNT],
            row_buttons: [ButtonState::Off; ROW_BUTTON_COUNT],
            column_buttons: [ButtonState::Off; COLUMN_BUTTON_COUNT],
        }
    }
}

fn check(kind: CellKind, index: usize) -> Result<usize, MidiError> {
    if index < kind.count() {
        Ok(index)
    } else {
        Err(MidiError::IndexOutOfBounds { kind, index })
    }
}

impl DisplayBuffer {
    /// All pads black at full brightness, all buttons off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pad(&self, index: usize) -> Result<PadState, MidiError> {
        Ok(self.pads[check(CellKind::Pad, index)?])
    }

    pub fn row_button(&self, index: usize) -> Result<ButtonState, MidiError> {
        Ok(self.row_buttons[check(CellKind::RowButton, index)?])
    }

    pub fn column_button(&self, index: usize) -> Result<ButtonState, MidiError> {
        Ok(self.column_buttons[check(CellKind::ColumnButton, index)?])
    }

    pub fn pads(&self) -> &[PadState; PAD_COUNT] {
        &self.pads
    }

    pub fn row_buttons(&self) -> &[ButtonState; ROW_BUTTON_COUNT] {
        &self.row_buttons
    }

    pub fn column_buttons(&self) -> &[ButtonState; COLUMN_BUTTON_COUNT] {
        &self.column_buttons
    }

    /// The state of any cell. Since a [`Cell`] can only be constructed with a valid index, this
    /// can't fail.
    pub fn get(&self, cell: Cell) -> CellState {
        let index = cell.index();
        match cell.kind() {
            CellKind::Pad => CellState::Pad(self.pads[index]),
            CellKind::RowButton => CellState::Button(self.row_buttons[index]),
            CellKind::ColumnButton => CellState::Button(self.column_buttons[index]),
        }
    }

    /// Copy the state of a single cell over from `other`
    pub(crate) fn copy_cell_from(&mut self, other: &DisplayBuffer, cell: Cell) {
        let index = cell.index();
        match cell.kind() {
            CellKind::Pad => self.pads[index] = other.pads[index],
            CellKind::RowButton => self.row_buttons[index] = other.row_buttons[index],
            CellKind::ColumnButton => self.column_buttons[index] = other.column_buttons[index],
        }
    }

    /// Set color and lighting mode of a pad
    pub fn set_pad(
        &mut self,
        index: usize,
        color: impl Into<Color>,
        mode: impl Into<LightingMode>,
    ) -> Result<(), MidiError> {
        let index = check(CellKind::Pad, index)?;
        self.pads[index] = PadState::new(color.into(), mode.into());
        Ok(())
    }

    /// Change only the color of a pad, keeping its lighting mode
    pub fn set_pad_color(&mut self, index: usize, color: impl Into<Color>) -> Result<(), MidiError> {
        let index = check(CellKind::Pad, index)?;
        self.pads[index].color = color.into();
        Ok(())
    }

    /// Change only the lighting mode of a pad, keeping its color
    pub fn set_pad_mode(
        &mut self,
        index: usize,
        mode: impl Into<LightingMode>,
    ) -> Result<(), MidiError> {
        let index = check(CellKind::Pad, index)?;
        self.pads[index].mode = mode.into();
        Ok(())
    }

    pub fn set_row_button(&mut self, index: usize, state: ButtonState) -> Result<(), MidiError> {
        let index = check(CellKind::RowButton, index)?;
        self.row_buttons[index] = state;
        Ok(())
    }

    pub fn set_column_button(&mut self, index: usize, state: ButtonState) -> Result<(), MidiError> {
        let index = check(CellKind::ColumnButton, index)?;
        self.column_buttons[index] = state;
        Ok(())
    }

    pub fn set_all_pads(&mut self, color: impl Into<Color>, mode: impl Into<LightingMode>) {
        self.pads = [PadState::new(color.into(), mode.into()); PAD_COUNT];
    }

    /// Change the color of every pad, keeping each pad's lighting mode
    pub fn set_all_pad_colors(&mut self, color: impl Into<Color>) {
        let color = color.into();
        for pad in &mut self.pads {
            pad.color = color;
        }
    }

    pub fn set_all_row_buttons(&mut self, state: ButtonState) {
        self.row_buttons = [state; ROW_BUTTON_COUNT];
    }

    pub fn set_all_column_buttons(&mut self, state: ButtonState) {
        self.column_buttons = [state; COLUMN_BUTTON_COUNT];
    }

    /// Turn everything dark: pads black at full brightness, buttons off
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Cells whose state differs between `self` and `other`, in synchronization order
    pub fn diff<'a>(&'a self, other: &'a DisplayBuffer) -> impl Iterator<Item = Cell> + 'a {
        Cell::all().filter(move |&cell| self.get(cell) != other.get(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_constructible_cell_can_be_read() {
        let mut buffer = DisplayBuffer::new();
        buffer.set_row_button(7, ButtonState::On).unwrap();
        let lit: Vec<Cell> = Cell::all()
            .filter(|&cell| buffer.get(cell) != CellState::Pad(PadState::OFF))
            .filter(|&cell| buffer.get(cell) != CellState::Button(ButtonState::Off))
            .collect();
        assert_eq!(lit, vec![Cell::row_button(7).unwrap()]);
        assert!(Cell::row_button(8).is_err());
    }

    #[test]
    fn default_is_dark() {
        let buffer = DisplayBuffer::new();
        assert!(buffer.pads().iter().all(|&p| p == PadState::OFF));
        assert!(buffer.row_buttons().iter().all(|&b| b == ButtonState::Off));
        assert!(buffer.column_buttons().iter().all(|&b| b == ButtonState::Off));
        assert_eq!(PadState::OFF, PadState::default());
    }

    #[test]
    fn setters_check_bounds() {
        let mut buffer = DisplayBuffer::new();
        assert!(buffer.set_pad(63, Color::RED, LightingMode::FLASHING_2).is_ok());
        assert!(matches!(
            buffer.set_pad(64, Color::RED, LightingMode::FLASHING_2),
            Err(MidiError::IndexOutOfBounds { kind: CellKind::Pad, index: 64 })
        ));
        assert!(matches!(
            buffer.set_row_button(8, ButtonState::On),
            Err(MidiError::IndexOutOfBounds { kind: CellKind::RowButton, index: 8 })
        ));
        assert!(matches!(
            buffer.set_column_button(100, ButtonState::On),
            Err(MidiError::IndexOutOfBounds { kind: CellKind::ColumnButton, index: 100 })
        ));
        assert!(buffer.pad(64).is_err());
        // a failed set leaves the buffer untouched
        let mut expected = DisplayBuffer::new();
        expected.set_pad(63, Color::RED, LightingMode::FLASHING_2).unwrap();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn partial_pad_setters() {
        let mut buffer = DisplayBuffer::new();
        buffer.set_pad(7, Color::BLUE, LightingMode::BREATHING_8).unwrap();
        buffer.set_pad_color(7, Color::PINK).unwrap();
        assert_eq!(buffer.pad(7).unwrap(), PadState::new(Color::PINK, LightingMode::BREATHING_8));
        buffer.set_pad_mode(7, 3u8).unwrap();
        assert_eq!(buffer.pad(7).unwrap().mode, LightingMode::BRIGHTNESS_65);
    }

    #[test]
    fn bulk_setters() {
        let mut buffer = DisplayBuffer::new();
        buffer.set_all_pads(Color::GREEN, LightingMode::FLASHING_4);
        buffer.set_all_row_buttons(ButtonState::Flashing);
        buffer.set_all_column_buttons(ButtonState::On);
        assert!(buffer
            .pads()
            .iter()
            .all(|&p| p == PadState::new(Color::GREEN, LightingMode::FLASHING_4)));
        assert_eq!(buffer.row_button(4).unwrap(), ButtonState::Flashing);
        assert_eq!(buffer.column_button(7).unwrap(), ButtonState::On);

        buffer.set_all_pad_colors(Color::WHITE);
        assert_eq!(buffer.pad(0).unwrap().mode, LightingMode::FLASHING_4);
        assert_eq!(buffer.pad(0).unwrap().color, Color::WHITE);

        buffer.clear();
        assert_eq!(buffer, DisplayBuffer::new());
    }

    #[test]
    fn diff_lists_changed_cells_in_order() {
        let old = DisplayBuffer::new();
        let mut new = old.clone();
        new.set_column_button(1, ButtonState::On).unwrap();
        new.set_pad(40, Color::CYAN, LightingMode::BRIGHTNESS_100).unwrap();
        new.set_row_button(0, ButtonState::Flashing).unwrap();
        // same value as before: not a change
        new.set_pad(2, Color::BLACK, LightingMode::BRIGHTNESS_100).unwrap();

        let changed: Vec<Cell> = new.diff(&old).collect();
        assert_eq!(
            changed,
            vec![
                Cell::pad(40).unwrap(),
                Cell::row_button(0).unwrap(),
                Cell::column_button(1).unwrap(),
            ]
        );
    }

    #[test]
    fn copy_cell_does_not_alias() {
        let mut source = DisplayBuffer::new();
        let mut target = DisplayBuffer::new();
        source.set_pad(1, Color::RED, LightingMode::BRIGHTNESS_50).unwrap();
        target.copy_cell_from(&source, Cell::pad(1).unwrap());
        source.set_pad(1, Color::BLUE, LightingMode::BRIGHTNESS_50).unwrap();
        assert_eq!(target.pad(1).unwrap().color, Color::RED);
    }

    #[test]
    fn cell_state_commands() {
        let mut buffer = DisplayBuffer::new();
        buffer.set_row_button(3, ButtonState::On).unwrap();
        let cell = Cell::row_button(3).unwrap();
        assert_eq!(
            buffer.get(cell).command(cell),
            LedCommand { note: 103, velocity: 1, channel: 0 }
        );
    }
}
