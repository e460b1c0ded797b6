//! The deterministic wave math: phase bookkeeping, line presets and the
//! segment generator, plus the frame types handed to a renderer.

pub(crate) mod generator;
pub(crate) mod phase;
pub(crate) mod preset;

pub use generator::WaveGenerator;
pub use phase::PhaseClock;
pub use preset::{cluster, cluster_with_jitter, ConfigError, Direction, LinePreset};

/// A point on the drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One quadratic Bezier curve: start, control and end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl Segment {
    /// Evaluate the curve at `t` in `[0, 1]`.
    ///
    /// Flattening is the renderer's concern; the generator only ever emits
    /// the three control points.
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        Point::new(
            u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
            u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
        )
    }
}

/// Canvas dimensions, supplied fresh by the host every frame.
///
/// Zero or negative dimensions are legal (a view can be measured at zero
/// size transiently) and simply produce empty frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: i32,
    pub height: i32,
}

impl CanvasSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Dashed stroke styling for one line of the cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub dash_on: f32,
    pub dash_off: f32,
}

/// One preset's worth of segments for a single frame, tagged with its
/// stroke styling.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveLine {
    pub stroke: StrokeStyle,
    pub segments: Vec<Segment>,
}

/// Everything a rasterizer needs to paint one frame, in layering order.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveFrame {
    pub lines: Vec<WaveLine>,
}

/// Run the generator once per preset and collect the frame.
///
/// Later presets paint on top of earlier ones; that ordering is the only
/// dependency between cluster entries.
pub fn compose(
    generator: &WaveGenerator,
    presets: &[LinePreset],
    phase: i32,
    size: CanvasSize,
) -> WaveFrame {
    let lines = presets
        .iter()
        .map(|preset| WaveLine {
            stroke: preset.stroke_style(),
            segments: generator.generate(preset, phase, size),
        })
        .collect();
    WaveFrame { lines }
}
