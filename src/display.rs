use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fmt;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// The 64x32 monochrome framebuffer. Only ever changed by clearing it or by
/// XOR-ing sprites onto it.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT],
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
            dirty: true,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];
        self.dirty = true;
    }

    /// is the pixel at (x, y) set? coordinates wrap around the screen
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    /// XOR `sprite` onto the screen with its top-left corner at (x, y), one
    /// byte per row, most significant bit leftmost. Pixels that run off an
    /// edge wrap around to the opposite one.
    ///
    /// Returns true if any set pixel was turned off.
    pub fn draw_sprite(&mut self, sprite: &[u8], x: u8, y: u8) -> bool {
        let mut collision = false;
        for (sy, row) in sprite.iter().enumerate() {
            let py = (y as usize + sy) % SCREEN_HEIGHT;
            for sx in 0..8 {
                if row & (0x80 >> sx) == 0 {
                    continue;
                }
                let px = (x as usize + sx) % SCREEN_WIDTH;
                let pixel = &mut self.pixels[py][px];
                if *pixel {
                    collision = true;
                }
                *pixel ^= true;
            }
        }
        self.dirty = true;
        collision
    }

    /// coordinates of every pixel that is (or isn't) lit, row by row
    pub fn pixels_matching(&self, lit: bool) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |&(_, &p)| p == lit)
                .map(move |(x, _)| (x, y))
        })
    }

    /// has anything changed since the renderer last looked?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FrameBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.pixels == other.pixels
    }
}

impl Eq for FrameBuffer {}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|&p| if p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Display is used by the scheduler to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// paint the whole framebuffer
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal canvas
#[derive(Debug)]
struct Resolution(usize, usize);

impl Resolution {
    /// the terminal canvas is drawn 1:1 with the framebuffer
    fn checked(x: usize, y: usize) -> Result<Resolution, io::Error> {
        if (x, y) != (SCREEN_WIDTH, SCREEN_HEIGHT) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "display must be {}x{}, not {}x{}",
                    SCREEN_WIDTH, SCREEN_HEIGHT, x, y
                ),
            ));
        }
        Ok(Resolution(x, y))
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// expand one bitplane of the frame into x, y float coords, suitable for
    /// rendering with TUI; y grows downward on the CHIP-8, upward on the canvas
    fn bitplane_from_frame(&self, frame: &FrameBuffer, lit: bool) -> Vec<(f64, f64)> {
        frame
            .pixels_matching(lit)
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let resolution = Resolution::checked(x, y)?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution,
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let dark = self.resolution.bitplane_from_frame(frame, false);
        let lit = self.resolution.bitplane_from_frame(frame, true);
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );

        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &dark,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was last asked
/// to draw
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Option<FrameBuffer>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_resolution_must_fit_framebuffer() {
        assert!(Resolution::checked(64, 32).is_ok());
        let err = Resolution::checked(128, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_cover_screen() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0x80], 3, 2);
        let lit = r.bitplane_from_frame(&fb, true);
        let dark = r.bitplane_from_frame(&fb, false);
        assert_eq!(lit, vec![(3.0, -2.0)]);
        assert_eq!(dark.len(), 2047);
    }

    // FrameBuffer tests
    #[test]
    fn test_starts_blank() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.pixels_matching(true).count(), 0);
        assert!(fb.is_dirty());
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xff; 15], 0, 0);
        fb.mark_clean();
        fb.clear();
        assert!(fb.is_dirty());
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                assert!(!fb.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_sprite_bit_order() {
        let mut fb = FrameBuffer::new();
        let collided = fb.draw_sprite(&[0b1010_0000, 0b0000_0001], 10, 5);
        assert!(!collided);
        assert!(fb.pixel(10, 5));
        assert!(!fb.pixel(11, 5));
        assert!(fb.pixel(12, 5));
        assert!(fb.pixel(17, 6));
        assert_eq!(fb.pixels_matching(true).count(), 3);
    }

    #[test]
    fn test_xor_self_inverse() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0x3c], 0, 0);
        let before = fb.clone();

        let glyph = [0xF0, 0x90, 0xF0, 0x90, 0x90];
        assert!(!fb.draw_sprite(&glyph, 2, 0));
        assert_ne!(fb, before);
        // the second draw turns off everything the first one turned on
        assert!(fb.draw_sprite(&glyph, 2, 0));
        assert_eq!(fb, before);
    }

    #[test]
    fn test_collision_only_on_toggle_off() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xf0], 0, 0);
        // overlapping zero bits don't count
        assert!(!fb.draw_sprite(&[0x0f], 0, 0));
        assert!(fb.draw_sprite(&[0x01], 0, 0));
    }

    #[test]
    fn test_sprite_wraps_at_edges() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xc0, 0xc0], 63, 31);
        assert!(fb.pixel(63, 31));
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(63, 0));
        assert!(fb.pixel(0, 0));
        assert_eq!(fb.pixels_matching(true).count(), 4);

        // start coordinates wrap too
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0x80], 64 + 5, 32 + 1);
        assert!(fb.pixel(5, 1));
    }

    #[test]
    fn test_dummy_display_records() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xff], 0, 0);
        d.draw(&fb)?;
        assert_eq!(d.frames_drawn, 1);
        assert_eq!(d.last_frame, Some(fb));
        Ok(())
    }
}
