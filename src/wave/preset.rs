use super::StrokeStyle;

/// Initial curvature of a line: whether its first hump bows up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub(crate) fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// Errors for invalid line parameters. These fail fast at setup; nothing
/// downstream re-validates.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("segment count must be at least 1")]
    ZeroSegmentCount,

    #[error("amplitude level must be at least 1")]
    ZeroLevel,

    #[error("stroke width must be positive, got {0}")]
    NonPositiveStrokeWidth(f32),

    #[error("amplitude divisor must be at least 1")]
    ZeroAmplitudeDivisor,
}

/// Upper bound (exclusive) for the per-line random scan offset.
const JITTER_RANGE: i32 = 50;

/// One line of the wave cluster. Immutable once built; the jitter is
/// sampled exactly once at construction and held for the line's lifetime,
/// so the cluster keeps a fixed shape while it scrolls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePreset {
    direction: Direction,
    level: u32,
    segment_count: u32,
    stroke_width: f32,
    jitter: i32,
}

impl LinePreset {
    /// Build a preset, sampling a random jitter in `[0, 50)`.
    pub fn new(
        direction: Direction,
        level: u32,
        segment_count: u32,
        stroke_width: f32,
    ) -> Result<Self, ConfigError> {
        Self::with_jitter(
            direction,
            level,
            segment_count,
            stroke_width,
            fastrand::i32(0..JITTER_RANGE),
        )
    }

    /// Deterministic variant: `jitter` shifts this line's scan position by
    /// a fixed amount forever.
    pub fn with_jitter(
        direction: Direction,
        level: u32,
        segment_count: u32,
        stroke_width: f32,
        jitter: i32,
    ) -> Result<Self, ConfigError> {
        if segment_count == 0 {
            return Err(ConfigError::ZeroSegmentCount);
        }
        if level == 0 {
            return Err(ConfigError::ZeroLevel);
        }
        if stroke_width <= 0.0 {
            return Err(ConfigError::NonPositiveStrokeWidth(stroke_width));
        }
        Ok(Self {
            direction,
            level,
            segment_count,
            stroke_width,
            jitter: jitter.max(0),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn jitter(&self) -> i32 {
        self.jitter
    }

    /// Dash styling for this line: the stroke width doubles as both the
    /// dash length and the gap.
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.stroke_width,
            dash_on: self.stroke_width,
            dash_off: self.stroke_width,
        }
    }
}

/// Direction, level, segments and stroke width for the five cluster lines,
/// in paint order (later entries land on top).
const CLUSTER_TABLE: [(Direction, u32, u32, f32); 5] = [
    (Direction::Down, 4, 4, 1.0),
    (Direction::Down, 2, 3, 2.0),
    (Direction::Down, 1, 2, 2.0),
    (Direction::Up, 3, 3, 1.0),
    (Direction::Up, 2, 2, 2.0),
];

/// The fixed five-line cluster drawn each frame, with randomized per-line
/// scan offsets.
pub fn cluster() -> Vec<LinePreset> {
    cluster_with_jitter(true)
}

/// Same cluster, with jitter optional so hosts and tests can get a
/// reproducible pattern.
pub fn cluster_with_jitter(jitter: bool) -> Vec<LinePreset> {
    CLUSTER_TABLE
        .iter()
        .map(|&(direction, level, segments, width)| {
            let offset = if jitter { fastrand::i32(0..JITTER_RANGE) } else { 0 };
            LinePreset::with_jitter(direction, level, segments, width, offset)
                .expect("cluster table entries are valid")
        })
        .collect()
}
