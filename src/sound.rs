use crate::word::Byte;
use beep::beep;
use std::error::Error;

/// The tone that plays while the sound timer is running.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// follow the sound timer: audible while ST > 0, silent at 0
    fn update(&mut self, sound_timer: Byte) -> Result<(), Box<dyn Error>> {
        let audible = sound_timer > Byte::ZERO;
        match (audible, self.is_beeping()) {
            (true, false) => self.beep(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker tone via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        // mark it first so a broken speaker isn't retried every cycle
        self.is_beeping = true;
        beep(SIMPLEBEEP_PITCH)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        beep(0)?;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

/// silence; still tracks whether it *would* be beeping
#[derive(Default)]
pub struct Mute {
    is_beeping: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_follows_timer() -> Result<(), Box<dyn Error>> {
        let mut s = Mute::new();
        s.update(Byte::from(0))?;
        assert!(!s.is_beeping());
        s.update(Byte::from(3))?;
        assert!(s.is_beeping());
        s.update(Byte::from(2))?;
        assert!(s.is_beeping());
        s.update(Byte::from(0))?;
        assert!(!s.is_beeping());
        Ok(())
    }
}
