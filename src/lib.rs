/*!
An interfacing library for the Akai APC mini mk2, turning its MIDI traffic into semantic events
and keeping its LEDs in sync with an in-memory display state.

# Events

Every pad, button and fader message is classified into an [`Event`] and handed to the listeners
registered for its [`EventKind`]. Listeners run on the MIDI driver's thread, so keep them short:

```no_run
use apc_mini::{ApcMini, Config, Event, EventKind};

let apc = ApcMini::connect(Config::default())?;
let (sender, receiver) = std::sync::mpsc::channel();
apc.subscribe_all(move |event| { let _ = sender.send(*event); });

for event in receiver.iter() {
    match event {
        Event::PadPressed(index) => println!("pad {} pressed", index),
        Event::FaderChanged { fader, value } => println!("fader {} at {}", fader, value),
        _ => {}
    }
}
# Ok::<(), apc_mini::MidiError>(())
```

# Display

The adapter holds two [`DisplayBuffer`]s: the state you want the device to show, and the state it
was last sent. [`ApcMini::sync`] sends only the cells in which they differ, one note-on per cell,
so you can freely repaint the whole desired state every frame:

```no_run
use apc_mini::{ApcMini, ButtonState, Color, Config, LightingMode};

let mut apc = ApcMini::connect(Config::default())?;

apc.set_all_pads(Color::BLUE, LightingMode::BRIGHTNESS_25);
apc.set_pad(0, Color::RED, LightingMode::FLASHING_4)?;
apc.set_row_button(7, ButtonState::Flashing)?;
apc.sync(false)?;

// Put everything back to dark
apc.blackout()?;
# Ok::<(), apc_mini::MidiError>(())
```

# Without hardware

Everything that talks to the device goes through the [`MidiHost`] trait. [`MockHost`] implements
it in memory, which is handy for tests and for replaying recorded input.
*/

pub mod util;

mod errors;
pub use errors::*;

mod config;
pub use config::*;

pub mod protocol;
pub use protocol::{ButtonState, Cell, CellKind, Color, LedCommand, LightingMode};

mod event;
pub use event::*;

mod listeners;
pub use listeners::*;

mod display;
pub use display::*;

mod grid;
pub use grid::*;

mod midi_io;
pub use midi_io::*;

mod device;
pub use device::*;

mod monitor;
pub use monitor::*;

mod mock;
pub use mock::*;

pub mod prelude {
    pub use crate::device::ApcMini;
    pub use crate::event::{Event, EventKind};
    pub use crate::midi_io::{MidiHost, OutputDevice};
    pub use crate::protocol::{ButtonState, Color, LightingMode};
}

/// Identifier used for e.g. the midi port names etc.
const APPLICATION_NAME: &str = "apc-mini";
