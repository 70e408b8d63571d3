use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, trace, warn};

use crate::display::DisplayBuffer;
use crate::event::{decode_event, Event, EventKind};
use crate::listeners::{ListenerId, Listeners};
use crate::midi_io::{locate, MidiHost, MidirHost, OutputDevice};
use crate::protocol::{ButtonState, Cell, Color, LightingMode};
use crate::{Config, MidiError};

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // a panicking listener must not take the whole input path down with it
    listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn dispatch(listeners: &Mutex<Listeners>, data: &[u8]) -> Option<Event> {
    let event = match decode_event(data) {
        Some(event) => event,
        None => {
            trace!("ignoring MIDI message {:02X?}", data);
            return None;
        }
    };
    trace!("{:02X?} -> {:?}", data, event);
    lock(listeners).dispatch(&event);
    Some(event)
}

/// A connected APC mini mk2.
///
/// The adapter owns the device connection, turns incoming MIDI into [`Event`]s for its listeners
/// and keeps the LEDs in line with the desired [`DisplayBuffer`]. Edit the desired state through
/// the setters (or [`ApcMini::desired_mut`]), then call [`ApcMini::sync`] to send exactly the
/// cells that changed:
///
/// ```no_run
/// use apc_mini::{ApcMini, Color, Config, EventKind, LightingMode};
///
/// let mut apc = ApcMini::connect(Config::default())?;
/// apc.subscribe(EventKind::PadPressed, |event| println!("{:?}", event));
///
/// apc.set_pad(5, Color::RED, LightingMode::BREATHING_2)?;
/// apc.sync(false)?; // sends one message
/// apc.sync(false)?; // sends nothing
/// # Ok::<(), apc_mini::MidiError>(())
/// ```
///
/// `sync` takes `&mut self`, so the compiler already prevents two synchronizations from
/// interleaving. Wrap the adapter in a `Mutex` if several threads need to drive the display.
///
/// Dropping the adapter turns all LEDs off (unless disabled in the [`Config`]) and closes the
/// connection.
///
/// A process killed by a signal never runs `Drop`, so applications should catch interrupts
/// (Ctrl-C, SIGTERM) themselves and return normally, or call [`ApcMini::blackout`] from there.
pub struct ApcMini<H: MidiHost = MidirHost> {
    config: Config,
    _input: H::InputConnection,
    output: H::Output,
    listeners: Arc<Mutex<Listeners>>,
    desired: DisplayBuffer,
    last_sent: DisplayBuffer,
    // set when last_sent can't be trusted to reflect the hardware anymore
    stale: bool,
    // This is a debug variable to be able to see how many messages we're actually spewing out.
    num_sent_commands: usize,
}

impl ApcMini<MidirHost> {
    /// Connect to the device through the system MIDI stack
    pub fn connect(config: Config) -> Result<Self, MidiError> {
        let host = MidirHost::new(config.client_name.clone());
        Self::open(&host, config)
    }

    /// Whether a device matching the default keyword is currently plugged in
    pub fn is_connected() -> bool {
        crate::midi_io::is_present(&MidirHost::default(), crate::DEFAULT_DEVICE_KEYWORD)
    }
}

impl<H: MidiHost> ApcMini<H> {
    /// Locate the device on `host` and connect to it. On failure nothing stays connected.
    pub fn open(host: &H, config: Config) -> Result<Self, MidiError> {
        let located = locate(host, &config.device_keyword)?;
        debug!("located {:?}", located);

        let listeners = Arc::new(Mutex::new(Listeners::new()));
        let callback_listeners = Arc::clone(&listeners);
        let input = host.open_input(
            &located.input,
            &config.input_connection_name,
            Box::new(move |data| {
                dispatch(&callback_listeners, data);
            }),
        )?;
        let output = host.open_output(&located.output, &config.output_connection_name)?;
        info!("connected to {:?}", located.output);

        let mut apc = Self {
            config,
            _input: input,
            output,
            listeners,
            desired: DisplayBuffer::new(),
            last_sent: DisplayBuffer::new(),
            stale: false,
            num_sent_commands: 0,
        };

        if apc.config.paint_on_connect {
            if let Err(e) = apc.sync(true) {
                // never fully constructed, so there's nothing to clean up on the device
                apc.config.blackout_on_drop = false;
                return Err(e);
            }
        }

        Ok(apc)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `callback` for one kind of event. See [`Listeners`] for the rules callbacks have to
    /// play by. The registry is locked while callbacks run, so a callback can't (un)subscribe.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl FnMut(&Event) + Send + 'static,
    ) -> ListenerId {
        lock(&self.listeners).subscribe(kind, callback)
    }

    /// Register `callback` for every event
    pub fn subscribe_all(&self, callback: impl FnMut(&Event) + Send + 'static) -> ListenerId {
        lock(&self.listeners).subscribe_all(callback)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        lock(&self.listeners).unsubscribe(id)
    }

    /// Feed raw MIDI bytes through the event classifier to the listeners, exactly as if the device
    /// had sent them. Useful to replay recorded input or to emulate the device.
    pub fn dispatch_raw(&self, data: &[u8]) -> Option<Event> {
        dispatch(&self.listeners, data)
    }

    /// The desired display state
    pub fn desired(&self) -> &DisplayBuffer {
        &self.desired
    }

    /// Mutable access to the desired display state. Changes show up on the device on the next
    /// [`ApcMini::sync`].
    pub fn desired_mut(&mut self) -> &mut DisplayBuffer {
        &mut self.desired
    }

    pub fn set_pad(
        &mut self,
        index: usize,
        color: impl Into<Color>,
        mode: impl Into<LightingMode>,
    ) -> Result<(), MidiError> {
        self.desired.set_pad(index, color, mode)
    }

    pub fn set_row_button(&mut self, index: usize, state: ButtonState) -> Result<(), MidiError> {
        self.desired.set_row_button(index, state)
    }

    pub fn set_column_button(&mut self, index: usize, state: ButtonState) -> Result<(), MidiError> {
        self.desired.set_column_button(index, state)
    }

    pub fn set_all_pads(&mut self, color: impl Into<Color>, mode: impl Into<LightingMode>) {
        self.desired.set_all_pads(color, mode)
    }

    pub fn set_all_row_buttons(&mut self, state: ButtonState) {
        self.desired.set_all_row_buttons(state)
    }

    pub fn set_all_column_buttons(&mut self, state: ButtonState) {
        self.desired.set_all_column_buttons(state)
    }

    /// Whether the desired state has cells that haven't been sent yet
    pub fn has_pending_changes(&self) -> bool {
        self.stale || self.desired.diff(&self.last_sent).next().is_some()
    }

    /// Forget what the device is showing, e.g. after it was reconnected. The next
    /// [`ApcMini::sync`] then sends every cell.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Send every cell whose desired state differs from what was last sent - or every cell, if
    /// `force` is set. Cells go out pads first, then row buttons, then column buttons, each in
    /// ascending order. Returns how many commands were sent.
    ///
    /// If sending fails, the cells from the failed one onwards keep their old last-sent state and
    /// will be retried by the next sync.
    pub fn sync(&mut self, force: bool) -> Result<usize, MidiError> {
        let force = force || self.stale;
        let mut sent = 0;

        for cell in Cell::all() {
            let state = self.desired.get(cell);
            if !force && state == self.last_sent.get(cell) {
                continue;
            }

            let command = state.command(cell);
            trace!("{:?} -> {:?}", cell, command);
            self.output.send(&command.to_bytes())?;
            self.last_sent.copy_cell_from(&self.desired, cell);

            sent += 1;
            self.num_sent_commands += 1;
        }
        self.stale = false;

        if sent > 0 {
            debug!(
                "sync{} sent {} commands ({} in total)",
                if force { " (forced)" } else { "" },
                sent,
                self.num_sent_commands,
            );
        }

        Ok(sent)
    }

    /// Turn every LED off: pads black at full brightness, buttons off. This always sends all
    /// cells, whatever the device was believed to show.
    pub fn blackout(&mut self) -> Result<(), MidiError> {
        self.desired.clear();
        self.sync(true)?;
        info!("blacked out");
        Ok(())
    }

    /// Total number of commands sent since construction
    pub fn num_sent_commands(&self) -> usize {
        self.num_sent_commands
    }
}

impl<H: MidiHost> Drop for ApcMini<H> {
    fn drop(&mut self) {
        if self.config.blackout_on_drop {
            if let Err(e) = self.blackout() {
                warn!("couldn't black out the device on shutdown: {}", e);
            }
        }
    }
}

impl<H: MidiHost> std::fmt::Debug for ApcMini<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApcMini")
            .field("config", &self.config)
            .field("desired", &self.desired)
            .field("stale", &self.stale)
            .field("num_sent_commands", &self.num_sent_commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{LedCommand, CELL_COUNT};
    use crate::MockHost;

    const NAME: &str = "APC mini mk2 Control";

    fn open() -> (MockHost, ApcMini<MockHost>) {
        let host = MockHost::with_device(NAME);
        let apc = ApcMini::open(&host, Config::default().with_paint_on_connect(false)).unwrap();
        (host, apc)
    }

    #[test]
    fn paints_on_connect() {
        let host = MockHost::with_device(NAME);
        let apc = ApcMini::open(&host, Config::default()).unwrap();
        assert_eq!(host.take_commands().len(), CELL_COUNT);
        assert_eq!(apc.num_sent_commands(), CELL_COUNT);
    }

    #[test]
    fn failed_paint_on_connect_skips_blackout() {
        let host = MockHost::with_device(NAME);
        host.fail_sends_after(10);
        let result = ApcMini::open(&host, Config::default());
        assert!(matches!(result, Err(MidiError::Send(_))));
        // only the paint ran into the failing output
        assert_eq!(host.refused_count(), 1);
        assert_eq!(host.take_commands().len(), 10);
        assert_eq!(host.open_input_count(), 0);
    }

    #[test]
    fn single_change_sends_single_command() {
        let (host, mut apc) = open();
        apc.set_pad(5, Color::RED, LightingMode::BREATHING_2).unwrap();
        assert!(apc.has_pending_changes());
        assert_eq!(apc.sync(false).unwrap(), 1);
        assert_eq!(
            host.take_commands(),
            vec![LedCommand { note: 5, velocity: 5, channel: 10 }]
        );

        assert!(!apc.has_pending_changes());
        assert_eq!(apc.sync(false).unwrap(), 0);
        assert!(host.take_commands().is_empty());
    }

    #[test]
    fn resetting_to_the_sent_value_is_not_a_change() {
        let (host, mut apc) = open();
        apc.set_row_button(2, ButtonState::On).unwrap();
        apc.set_row_button(2, ButtonState::Off).unwrap();
        assert_eq!(apc.sync(false).unwrap(), 0);
        assert!(host.sent().is_empty());
    }

    #[test]
    fn invalidate_forces_the_next_sync() {
        let (host, mut apc) = open();
        apc.invalidate();
        assert!(apc.has_pending_changes());
        assert_eq!(apc.sync(false).unwrap(), CELL_COUNT);
        assert_eq!(apc.sync(false).unwrap(), 0);
        assert_eq!(host.take_commands().len(), CELL_COUNT);
    }

    #[test]
    fn failed_send_is_retried_on_next_sync() {
        let (host, mut apc) = open();
        apc.set_pad(1, Color::BLUE, LightingMode::BRIGHTNESS_100).unwrap();
        apc.set_pad(2, Color::BLUE, LightingMode::BRIGHTNESS_100).unwrap();
        apc.set_column_button(0, ButtonState::Flashing).unwrap();

        host.fail_sends_after(1);
        assert!(matches!(apc.sync(false), Err(MidiError::Send(_))));
        assert_eq!(host.take_commands(), vec![LedCommand { note: 1, velocity: 45, channel: 6 }]);

        host.heal();
        assert_eq!(apc.sync(false).unwrap(), 2);
        assert_eq!(
            host.take_commands(),
            vec![
                LedCommand { note: 2, velocity: 45, channel: 6 },
                LedCommand { note: 112, velocity: 2, channel: 0 },
            ]
        );
    }

    #[test]
    fn dispatch_raw_reaches_listeners() {
        let (_host, apc) = open();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        apc.subscribe(EventKind::ColumnButtonPressed, move |e| seen2.lock().unwrap().push(*e));

        assert_eq!(apc.dispatch_raw(&[0x90, 113, 127]), Some(Event::ColumnButtonPressed(1)));
        assert_eq!(apc.dispatch_raw(&[0x90, 1, 127]), Some(Event::PadPressed(1)));
        assert_eq!(apc.dispatch_raw(&[0xF8]), None);
        assert_eq!(*seen.lock().unwrap(), vec![Event::ColumnButtonPressed(1)]);
    }

    #[test]
    fn drop_blacks_out() {
        let (host, mut apc) = open();
        apc.set_all_pads(Color::WHITE, LightingMode::BRIGHTNESS_100);
        apc.sync(false).unwrap();
        host.take_commands();

        drop(apc);
        let commands = host.take_commands();
        assert_eq!(commands.len(), CELL_COUNT);
        assert!(commands[..64].iter().all(|c| c.velocity == 0 && c.channel == 6));
        assert_eq!(host.open_input_count(), 0);
    }

    #[test]
    fn drop_without_blackout() {
        let host = MockHost::with_device(NAME);
        let config = Config::default()
            .with_paint_on_connect(false)
            .with_blackout_on_drop(false);
        drop(ApcMini::open(&host, config).unwrap());
        assert!(host.sent().is_empty());
    }
}
