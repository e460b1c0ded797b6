//! Animated dashed quadratic-Bezier wave strokes, the kind that scroll
//! across a loading screen.
//!
//! The [`wave`] module holds the deterministic curve math: a wrapping
//! [`wave::PhaseClock`], the fixed five-line preset cluster and the
//! [`wave::WaveGenerator`] that turns a phase offset into Bezier segments.
//! The [`render`] module owns the surface boundary and the two
//! render-loop drivers (host-ticked and dedicated-thread). Hosts that
//! want a ready-made sink can use [`render::terminal`].

pub mod options;
pub mod render;
pub mod wave;

pub use options::{AnimatorOptions, RenderMode};
