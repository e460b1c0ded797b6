use super::preset::{ConfigError, LinePreset};
use super::{CanvasSize, Point, Segment};

/// Turns a preset, a phase offset and the current canvas size into the
/// quadratic Bezier segments for one line.
///
/// The canvas is tiled with `segment_count` cells of equal width. As the
/// phase scrolls, a partial leading segment grows from the left edge while
/// the full cells shift right, so the pattern slides continuously instead
/// of jumping a cell at a time. The last full cell runs past the right
/// edge; the overshoot is clipped by whoever rasterizes the frame.
///
/// Pure: identical inputs always produce identical segments.
#[derive(Debug, Clone)]
pub struct WaveGenerator {
    amplitude_divisor: i32,
}

impl Default for WaveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveGenerator {
    /// Amplitude rule `height / 10 × level`.
    pub fn new() -> Self {
        Self { amplitude_divisor: 10 }
    }

    /// Override the amplitude divisor: one level of amplitude becomes
    /// `height / divisor` canvas units.
    pub fn with_amplitude_divisor(divisor: u32) -> Result<Self, ConfigError> {
        if divisor == 0 {
            return Err(ConfigError::ZeroAmplitudeDivisor);
        }
        Ok(Self { amplitude_divisor: divisor as i32 })
    }

    /// Emit the leading partial segment followed by `segment_count` full
    /// segments. A canvas with no usable area (zero size, or narrower than
    /// the segment count) yields nothing.
    pub fn generate(&self, preset: &LinePreset, phase: i32, size: CanvasSize) -> Vec<Segment> {
        if size.is_degenerate() {
            return Vec::new();
        }
        let count = preset.segment_count() as i32;
        let segment_width = size.width / count;
        if segment_width == 0 {
            return Vec::new();
        }
        let segment_height = size.height / self.amplitude_divisor * preset.level() as i32;
        let center_y = (size.height / 2) as f32;

        // The scan position decides both which cell we are in (parity picks
        // the starting curvature) and how far into it we are.
        let pos = phase + preset.jitter();
        let mut dir = if (pos / segment_width) % 2 == 0 { 1 } else { -1 };
        dir *= preset.direction().sign();
        let offset = pos % segment_width;

        let mut segments = Vec::with_capacity(count as usize + 1);

        // Leading partial segment: its amplitude scales with how much of the
        // cell has scrolled into view.
        let blend = offset as f32 / segment_width as f32;
        segments.push(Segment {
            start: Point::new(0.0, center_y),
            control: Point::new(
                offset as f32 / 2.0,
                center_y + blend * segment_height as f32 * dir as f32,
            ),
            end: Point::new(offset as f32, center_y),
        });

        // Full cells tile the rest of the width, flipping curvature each
        // time; the flip happens before emission so the first full cell
        // bows opposite to the partial one.
        for index in 0..count {
            let start_x = (offset + segment_width * index) as f32;
            dir = -dir;
            segments.push(Segment {
                start: Point::new(start_x, center_y),
                control: Point::new(
                    start_x + segment_width as f32 / 2.0,
                    center_y + (segment_height * dir) as f32,
                ),
                end: Point::new(start_x + segment_width as f32, center_y),
            });
        }
        segments
    }
}
