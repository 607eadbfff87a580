use crate::config::Config;
use crate::display::Display;
use crate::error::Result;
use crate::input::Input;
use crate::interpreter::{Chip8Interpreter, Step};
use crate::sound::Sound;
use crate::timer::TimerClock;
use crate::trace::Observer;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// how far pacing may fall behind before it gives up catching up
const MAX_LAG: Duration = Duration::from_millis(100);

/// why the main loop stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// the host asked to close
    Quit,
    /// `run_for` executed as many instructions as it was asked to
    InstructionLimit,
}

/// Drives the interpreter against the host. Each iteration:
///
///  1. polls input, refreshing the keypad snapshot (and checking for quit)
///  2. decays DT/ST by however many 60 Hz ticks of wall-clock time passed
///  3. steps the interpreter once (which may just be waiting on Fx0A)
///  4. repaints if the framebuffer changed and a refresh is due
///  5. sleeps to hold the configured instruction rate
pub struct Scheduler<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    observer: Option<Box<dyn Observer + 'a>>,
    config: Config,
    timers: TimerClock,
    next_cycle: Instant,
    next_refresh: Instant,
    executed: u64,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Self {
        let now = Instant::now();
        Scheduler {
            interpreter,
            display,
            input,
            sound,
            observer: None,
            config,
            timers: TimerClock::new(now),
            next_cycle: now,
            next_refresh: now,
            executed: 0,
        }
    }

    /// be told about every instruction that runs
    pub fn set_observer(&mut self, observer: Box<dyn Observer + 'a>) {
        self.observer = Some(observer);
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Chip8Interpreter {
        &mut self.interpreter
    }

    /// instructions completed so far
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// run until the host asks to quit
    pub fn run(&mut self) -> Result<Exit> {
        self.run_until(None)
    }

    /// run until `instructions` more have completed, or the host quits
    pub fn run_for(&mut self, instructions: u64) -> Result<Exit> {
        self.run_until(Some(self.executed + instructions))
    }

    fn run_until(&mut self, limit: Option<u64>) -> Result<Exit> {
        let now = Instant::now();
        self.next_cycle = now;
        self.timers = TimerClock::new(now);

        loop {
            if limit.map_or(false, |limit| self.executed >= limit) {
                self.render(true)?;
                return Ok(Exit::InstructionLimit);
            }

            let keys = self.input.peek_keys()?;
            self.interpreter.keypad_mut().set_snapshot(keys);
            if self.input.quit_requested() {
                debug!("quit requested after {} instructions", self.executed);
                return Ok(Exit::Quit);
            }

            self.service_timers(Instant::now());

            match self.interpreter.step()? {
                Step::Executed(event) => {
                    self.executed += 1;
                    if let Some(observer) = self.observer.as_mut() {
                        observer.notify(event, self.interpreter.registers());
                    }
                }
                Step::AwaitingKey => {}
            }

            self.render(false)?;
            self.pace();
        }
    }

    fn service_timers(&mut self, now: Instant) {
        let ticks = self.timers.ticks(now);
        if ticks > 0 {
            self.interpreter.registers_mut().tick_timers(ticks);
        }
        let st = self.interpreter.registers().st;
        // sound failures are not fatal
        if let Err(e) = self.sound.update(st) {
            warn!("sound: {}", e);
        }
    }

    /// paint the framebuffer if it changed; `force` ignores the refresh cap
    fn render(&mut self, force: bool) -> Result<()> {
        let now = Instant::now();
        if !self.interpreter.frame().is_dirty() || (!force && now < self.next_refresh) {
            return Ok(());
        }
        self.display.draw(self.interpreter.frame())?;
        self.interpreter.frame_mut().mark_clean();
        self.next_refresh = now + self.config.refresh_period();
        Ok(())
    }

    fn pace(&mut self) {
        let Some(period) = self.config.cycle_period() else {
            return;
        };
        self.next_cycle += period;
        let now = Instant::now();
        if self.next_cycle > now {
            spin_sleep::sleep(self.next_cycle - now);
        } else if now - self.next_cycle > MAX_LAG {
            debug!("fell {:?} behind, resynchronising", now - self.next_cycle);
            self.next_cycle = now;
        }
    }
}
