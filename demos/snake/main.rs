//! Snake on the APC mini's pad grid.
//!
//! Pick a speed with the rightmost fader, press one of the breathing pads in the middle to start,
//! steer with the arrow buttons (row buttons 5-8) and press shift (or Ctrl-C) to quit.
use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use apc_mini::{ApcMini, ButtonState, Color, Config, Event, GridPos, LightingMode};

const START_PADS: [usize; 4] = [0x1b, 0x1c, 0x23, 0x24];
const SPEED_FADER: i32 = 8;
const SNAKE_START: [GridPos; 3] = [
    GridPos { x: 3, y: 1 },
    GridPos { x: 2, y: 1 },
    GridPos { x: 1, y: 1 },
];
const GAME_OVER_LINGER: Duration = Duration::from_secs(5);

/// What the main loop waits for
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Input {
    Device(Event),
    Interrupt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn from_row_button(index: i32) -> Option<Self> {
        match index {
            4 => Some(Self::Up),
            5 => Some(Self::Down),
            6 => Some(Self::Left),
            7 => Some(Self::Right),
            _ => None,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn step(self, pos: GridPos) -> GridPos {
        match self {
            Self::Up => pos.up(1),
            Self::Down => pos.down(1),
            Self::Left => pos.left(1),
            Self::Right => pos.right(1),
        }
        .wrapped()
    }
}

/// Linearly map `x` from one range onto another
fn map(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

fn random_pos(rng: &mut impl nanorand::Rng<8>, min_y: usize) -> GridPos {
    let x = rng.generate_range(0..8usize);
    let y = rng.generate_range(min_y..8usize);
    GridPos::new(x as i32, y as i32)
}

struct Game {
    snake: VecDeque<GridPos>,
    apple: GridPos,
    direction: Direction,
    // the direction of the last step, which the snake can't turn back into
    moved: Direction,
    apples: usize,
    game_over: bool,
}

impl Game {
    fn new(rng: &mut impl nanorand::Rng<8>) -> Self {
        Self {
            snake: SNAKE_START.iter().copied().collect(),
            apple: random_pos(rng, 3),
            direction: Direction::Right,
            moved: Direction::Right,
            apples: 0,
            game_over: false,
        }
    }

    fn steer(&mut self, direction: Direction) {
        if direction != self.moved.opposite() {
            self.direction = direction;
        }
    }

    fn step(&mut self, rng: &mut impl nanorand::Rng<8>) {
        if self.game_over {
            return;
        }
        self.moved = self.direction;

        let head = match self.snake.front() {
            Some(&head) => self.direction.step(head),
            None => return,
        };
        // the tail moves away during this step, so it doesn't count
        let body_len = self.snake.len().saturating_sub(1);
        if self.snake.iter().take(body_len).skip(1).any(|&part| part == head) {
            self.game_over = true;
        }

        self.snake.push_front(head);
        if head == self.apple {
            self.apples += 1;
            self.apple = random_pos(rng, 0);
        } else if !self.game_over {
            self.snake.pop_back();
        }
    }

    fn paint(&self, apc: &mut ApcMini) -> Result<(), apc_mini::MidiError> {
        apc.set_all_pads(Color::BLACK, LightingMode::BRIGHTNESS_100);
        for (i, part) in self.snake.iter().enumerate() {
            let (color, mode) = if self.game_over {
                (Color::RED_ORANGE, LightingMode::FLASHING_4)
            } else if i == 0 {
                (Color::YELLOW, LightingMode::BRIGHTNESS_100)
            } else if i % 2 == 1 {
                (Color::APPLE_GREEN, LightingMode::BRIGHTNESS_100)
            } else {
                (Color::GREEN, LightingMode::BRIGHTNESS_100)
            };
            if let Some(index) = part.to_index() {
                apc.set_pad(index, color, mode)?;
            }
        }
        if let Some(index) = self.apple.to_index() {
            apc.desired_mut().set_pad_color(index, Color::RED)?;
        }
        Ok(())
    }
}

fn show_speed(apc: &mut ApcMini, value: u8) -> Result<(), apc_mini::MidiError> {
    for i in 0..8 {
        let lit = (i as f64) / 8.0 * 127.0 <= value as f64;
        apc.set_column_button(7 - i, ButtonState::lit(lit))?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut apc = ApcMini::connect(Config::default().with_client_name("apc-mini snake"))?;
    apc.blackout()?;

    // Listeners run on the MIDI thread; all the game logic happens here on the main thread
    let (sender, receiver) = mpsc::channel();
    let device_sender = sender.clone();
    apc.subscribe_all(move |event| {
        let _ = device_sender.send(Input::Device(*event));
    });
    // Returning from main drops the adapter, which turns the LEDs off again
    ctrlc::set_handler(move || {
        let _ = sender.send(Input::Interrupt);
    })?;

    let mut rng = nanorand::WyRand::new();
    let mut game = Game::new(&mut rng);
    let mut interval = Duration::from_millis(500);

    for &pad in &START_PADS {
        apc.set_pad(pad, Color::SEA_GREEN, LightingMode::BREATHING_2)?;
    }
    apc.sync(false)?;

    // Start menu
    loop {
        match receiver.recv()? {
            Input::Device(Event::FaderChanged { fader: SPEED_FADER, value }) => {
                interval = Duration::from_millis(map(value as f64, 0.0, 127.0, 1000.0, 100.0) as u64);
                show_speed(&mut apc, value)?;
                apc.sync(false)?;
            }
            Input::Device(Event::PadPressed(pad)) if START_PADS.contains(&(pad as usize)) => break,
            Input::Device(Event::ShiftPressed) | Input::Interrupt => return Ok(()),
            _ => {}
        }
    }

    for i in 4..8 {
        apc.set_row_button(i, ButtonState::On)?;
    }
    log::info!("Starting with {}ms update interval!", interval.as_millis());
    let started = Instant::now();

    let mut next_tick = Instant::now();
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
            Ok(Input::Device(Event::RowButtonPressed(index))) => {
                if let Some(direction) = Direction::from_row_button(index) {
                    game.steer(direction);
                }
            }
            Ok(Input::Device(Event::ShiftPressed)) | Ok(Input::Interrupt) => return Ok(()),
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => {
                game.step(&mut rng);
                game.paint(&mut apc)?;
                apc.sync(false)?;
                next_tick += interval;

                if game.game_over {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }

    let points = game.apples as f64 * map(interval.as_millis() as f64, 100.0, 1000.0, 5.0, 1.0);
    log::warn!(
        "Game over! You ate {} {} in {} seconds and earned {:.1} points!",
        game.apples,
        if game.apples == 1 { "apple" } else { "apples" },
        started.elapsed().as_secs(),
        points,
    );

    // Let the flashing snake sink in; shift or Ctrl-C skips ahead. The adapter blacks out when dropped.
    let deadline = Instant::now() + GAME_OVER_LINGER;
    while let Ok(input) = receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        if let Input::Device(Event::ShiftPressed) | Input::Interrupt = input {
            break;
        }
    }

    Ok(())
}
