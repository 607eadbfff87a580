use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// map of characters read from the keyboard to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
const CHIP8_LITERAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// which host keys stand in for the COSMAC hex keypad
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyLayout {
    /// 1234 / qwer / asdf / zxcv block
    Conventional,
    /// 0-9 and a-f
    Literal,
}

impl KeyLayout {
    pub fn keymap(self) -> HashMap<char, u8> {
        match self {
            KeyLayout::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            KeyLayout::Literal => HashMap::from(CHIP8_LITERAL_KEYMAP),
        }
    }
}

/// The machine's view of the 16-key pad: the latest snapshot from the host,
/// plus the one before it so that fresh presses can be told apart from held
/// keys.
#[derive(Clone, Debug, Default)]
pub struct Keypad {
    down: [bool; KEY_COUNT],
    previous: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// replace the key state with the codes the host reports as down
    pub fn set_snapshot(&mut self, keys: &[u8]) {
        self.previous = self.down;
        self.down = [false; KEY_COUNT];
        for &key in keys {
            match self.down.get_mut(key as usize) {
                Some(k) => *k = true,
                None => warn!("ignoring key code 0x{:02x} from host", key),
            }
        }
    }

    /// codes above 0xF are never down
    pub fn is_down(&self, key: u8) -> bool {
        self.down.get(key as usize).copied().unwrap_or(false)
    }

    /// lowest key that is down now but wasn't in the previous snapshot
    pub fn newly_pressed(&self) -> Option<u8> {
        (0..KEY_COUNT)
            .find(|&k| self.down[k] && !self.previous[k])
            .map(|k| k as u8)
    }
}

/// reads keypresses from the host
pub trait Input {
    /// get a list of all the mapped keys that are currently down, without
    /// flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// has the user asked to close the machine?
    fn quit_requested(&self) -> bool;
}

/// Terminal keyboard, read through crossterm in raw mode.
///
/// Terminals only report presses (and autorepeat), never releases, so a key
/// counts as down for `hold` after the last time it was seen.
pub struct StdinInput {
    buffer: Vec<u8>,
    held: HashMap<u8, Instant>,
    keymap: HashMap<char, u8>,
    hold: Duration,
    quit: bool,
}

impl StdinInput {
    pub fn new(layout: KeyLayout, hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            held: HashMap::new(),
            keymap: layout.keymap(),
            hold,
            quit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        let now = Instant::now();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Esc, ..
                }) => {
                    debug!("escape pressed, quitting");
                    self.quit = true;
                }
                Event::Key(KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                    ..
                }) if modifiers.contains(KeyModifiers::CONTROL) => {
                    debug!("ctrl-c pressed, quitting");
                    self.quit = true;
                }
                Event::Key(KeyEvent {
                    code: KeyCode::Char(key),
                    ..
                }) => match self.keymap.get(&key.to_ascii_lowercase()) {
                    Some(&mapped_key) => {
                        self.held.insert(mapped_key, now);
                    }
                    None => debug!("can't map {:?} to a COSMAC key", key),
                },
                Event::Key(evt) => debug!("unknown key event received: {:?}", evt),
                _ => {}
            }
        }

        let hold = self.hold;
        self.held
            .retain(|_, seen| now.saturating_duration_since(*seen) < hold);
        self.buffer.clear();
        self.buffer.extend(self.held.keys());
        self.buffer.sort_unstable();
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_stdin()?;
        Ok(self.buffer.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.read_stdin()?;
        self.held.clear();
        self.buffer.clear();
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: replays one snapshot per poll,
/// then holds the last one
pub struct DummyInput {
    frames: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    polls: usize,
    quit_after: Option<usize>,
}

impl DummyInput {
    /// the same keys are down on every poll
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            frames: VecDeque::new(),
            current: Vec::from(keys),
            polls: 0,
            quit_after: None,
        }
    }

    pub fn scripted(frames: Vec<Vec<u8>>) -> Self {
        DummyInput {
            frames: frames.into(),
            current: Vec::new(),
            polls: 0,
            quit_after: None,
        }
    }

    /// ask to quit once `polls` snapshots have been taken
    pub fn quit_after(mut self, polls: usize) -> Self {
        self.quit_after = Some(polls);
        self
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.polls += 1;
        if let Some(next) = self.frames.pop_front() {
            self.current = next;
        }
        Ok(self.current.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.current.clear();
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit_after.map_or(false, |n| self.polls >= n)
    }
}
