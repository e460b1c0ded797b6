//! A terminal-cell rasterizer for wave frames, used by the demo binary.
//! One terminal cell is one canvas unit; this is a demo sink, not a
//! general renderer.

use std::io::{self, Write};

use crossterm::style::Print;
use crossterm::{cursor, queue, terminal};
use tracing::warn;

use super::{Canvas, DrawError, Surface};
use crate::wave::{CanvasSize, WaveLine};

/// Draws onto the terminal via an in-memory cell grid. Acquiring measures
/// the terminal fresh, so resizes are picked up on the next frame.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Surface for TerminalSurface {
    fn acquire(&mut self) -> Result<Box<dyn Canvas + '_>, DrawError> {
        let (columns, rows) = terminal::size()?;
        let size = CanvasSize::new(columns as i32, rows as i32);
        Ok(Box::new(TerminalCanvas::new(size, io::stdout())))
    }
}

struct TerminalCanvas<W: Write> {
    size: CanvasSize,
    cells: Vec<char>,
    out: W,
}

impl<W: Write> TerminalCanvas<W> {
    fn new(size: CanvasSize, out: W) -> Self {
        let area = if size.is_degenerate() { 0 } else { (size.width * size.height) as usize };
        Self { size, cells: vec![' '; area], out }
    }

    fn plot(&mut self, x: i32, y: i32, glyph: char) {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return;
        }
        self.cells[(y * self.size.width + x) as usize] = glyph;
    }

    fn publish(&mut self) -> io::Result<()> {
        if self.size.is_degenerate() {
            return Ok(());
        }
        for row in 0..self.size.height {
            let from = (row * self.size.width) as usize;
            let to = from + self.size.width as usize;
            let line: String = self.cells[from..to].iter().collect();
            queue!(self.out, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn stroke(&mut self, line: &WaveLine) -> Result<(), DrawError> {
        let glyph = if line.stroke.width >= 2.0 { '•' } else { '·' };
        for segment in &line.segments {
            // Two samples per cell of horizontal span is enough to keep the
            // flattened curve gap-free at cell resolution.
            let span = (segment.end.x - segment.start.x).abs();
            let steps = (span.ceil() as i32 * 2).max(2);
            for i in 0..=steps {
                let point = segment.point_at(i as f32 / steps as f32);
                // Dash by destination cell so half-cell samples cannot
                // bleed the pattern into their neighbours.
                let cell_x = point.x.round();
                if dash_on(cell_x, line.stroke.dash_on, line.stroke.dash_off) {
                    self.plot(cell_x as i32, point.y.round() as i32, glyph);
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Drop for TerminalCanvas<W> {
    fn drop(&mut self) {
        // Release-and-publish happens here so it cannot be skipped by an
        // early return or a panic mid-draw.
        if let Err(err) = self.publish() {
            warn!("failed to publish frame: {err}");
        }
    }
}

/// Whether `x` falls in the "on" half of the dash pattern.
fn dash_on(x: f32, on: f32, off: f32) -> bool {
    let period = on + off;
    if period <= 0.0 {
        return true;
    }
    x.rem_euclid(period) < on
}
