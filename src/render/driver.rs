use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Animator, DrawError, Surface};
use crate::wave::{self, CanvasSize, LinePreset, PhaseClock, WaveFrame, WaveGenerator};

/// Everything that must survive a stop/start cycle: the clock, the preset
/// cluster and the generator.
#[derive(Debug)]
struct WaveState {
    clock: PhaseClock,
    presets: Vec<LinePreset>,
    generator: WaveGenerator,
}

impl WaveState {
    fn new(presets: Vec<LinePreset>, generator: WaveGenerator) -> Self {
        Self { clock: PhaseClock::new(), presets, generator }
    }

    /// Advance the clock by `step` against the current canvas size and
    /// compose the frame. The clock refits its wrap threshold first, so a
    /// resize is honored on the very frame it happens.
    fn next_frame(&mut self, size: CanvasSize, step: i32) -> WaveFrame {
        self.clock.fit_width(size.width);
        let phase = self.clock.advance(step);
        wave::compose(&self.generator, &self.presets, phase, size)
    }
}

/// Acquire-draw-release for a single frame.
///
/// The canvas guard drops on every path out of this function, so the
/// surface is released and published even when a stroke fails halfway.
/// The phase only advances once a canvas was actually acquired; a surface
/// that refuses a frame does not silently skip motion.
fn draw_frame<S: Surface>(
    surface: &mut S,
    state: &mut WaveState,
    step: i32,
) -> Result<(), DrawError> {
    let mut canvas = surface.acquire()?;
    let frame = state.next_frame(canvas.size(), step);
    canvas.clear();
    for line in &frame.lines {
        canvas.stroke(line)?;
    }
    Ok(())
}

/// Host-ticked driver: the host's animation scheduler calls [`tick`] once
/// per callback on its own cadence. Single-threaded by design; phase
/// advances and draw calls all happen on the scheduling context, so there
/// is nothing to lock.
///
/// Phase completes one full wrap per `loop_duration` of wall clock, a
/// linear sweep over `0..2 x width`.
///
/// [`tick`]: TickedAnimator::tick
pub struct TickedAnimator<S: Surface> {
    surface: S,
    state: WaveState,
    loop_duration: Duration,
    last_tick: Option<Instant>,
    running: bool,
}

impl<S: Surface> TickedAnimator<S> {
    pub fn new(
        surface: S,
        presets: Vec<LinePreset>,
        generator: WaveGenerator,
        loop_duration: Duration,
    ) -> Self {
        Self {
            surface,
            state: WaveState::new(presets, generator),
            loop_duration,
            last_tick: None,
            running: false,
        }
    }

    /// Advance according to wall-clock progress and draw one frame.
    /// A no-op while stopped.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let now = Instant::now();
        let elapsed = match self.last_tick.replace(now) {
            Some(previous) => now - previous,
            None => Duration::ZERO,
        };
        let step = units_for(elapsed, self.loop_duration, self.state.clock.wrap_threshold());
        self.draw(step);
    }

    /// Advance by an explicit unit count, for hosts that schedule in phase
    /// units rather than time. A no-op while stopped.
    pub fn advance_by(&mut self, units: i32) {
        if !self.running {
            return;
        }
        self.draw(units.max(0));
    }

    pub fn phase(&self) -> i32 {
        self.state.clock.phase()
    }

    fn draw(&mut self, step: i32) {
        if let Err(err) = draw_frame(&mut self.surface, &mut self.state, step) {
            warn!("skipping frame: {err}");
        }
    }
}

impl<S: Surface> Animator for TickedAnimator<S> {
    fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        // Forget the pre-pause instant so the gap does not jump the phase.
        self.last_tick = None;
        debug!("ticked animator running");
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        debug!(phase = self.state.clock.phase(), "ticked animator paused");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Convert elapsed wall time into phase units, scaled so one
/// `loop_duration` covers one full wrap.
fn units_for(elapsed: Duration, loop_duration: Duration, wrap: i32) -> i32 {
    if wrap <= 0 || loop_duration.is_zero() {
        return 0;
    }
    let progress = elapsed.as_secs_f64() / loop_duration.as_secs_f64();
    (progress * wrap as f64).round() as i32
}

/// Continuous driver: a dedicated render thread loops
/// acquire-draw-release, advancing the phase by a fixed `step` each
/// iteration until stopped.
///
/// `frame_delay` caps the iteration rate; `None` leaves the loop
/// unthrottled, which will saturate a core. The stop
/// flag is the only cross-thread state besides the frame locks; a stop
/// request takes effect after the in-flight frame finishes its
/// draw+release ([`stop`] joins the thread).
///
/// [`stop`]: Animator::stop
pub struct ThreadedAnimator<S: Surface + Send + 'static> {
    surface: Arc<Mutex<S>>,
    state: Arc<Mutex<WaveState>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    step: i32,
    frame_delay: Option<Duration>,
}

impl<S: Surface + Send + 'static> ThreadedAnimator<S> {
    pub fn new(
        surface: S,
        presets: Vec<LinePreset>,
        generator: WaveGenerator,
        step: i32,
        frame_delay: Option<Duration>,
    ) -> Self {
        Self {
            surface: Arc::new(Mutex::new(surface)),
            state: Arc::new(Mutex::new(WaveState::new(presets, generator))),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            step: step.max(0),
            frame_delay,
        }
    }

    pub fn phase(&self) -> i32 {
        self.state.lock().unwrap().clock.phase()
    }
}

impl<S: Surface + Send + 'static> Animator for ThreadedAnimator<S> {
    fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("starting render thread");
        let surface = Arc::clone(&self.surface);
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let step = self.step;
        let frame_delay = self.frame_delay;
        self.handle = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let result = {
                    let mut surface = surface.lock().unwrap();
                    let mut state = state.lock().unwrap();
                    draw_frame(&mut *surface, &mut *state, step)
                };
                // Failed frames are skipped, never retried or surfaced.
                if let Err(err) = result {
                    warn!("skipping frame: {err}");
                }
                if let Some(delay) = frame_delay {
                    thread::sleep(delay);
                }
            }
        }));
    }

    fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            // The in-flight frame completes its draw+release first.
            let _ = handle.join();
        }
        debug!(phase = self.phase(), "render thread stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl<S: Surface + Send + 'static> Drop for ThreadedAnimator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Canvas;
    use crate::wave::{cluster_with_jitter, WaveLine};

    /// What the fake surface observed, shared with the test.
    #[derive(Debug, Default)]
    struct Log {
        acquired: usize,
        refused: usize,
        released: usize,
        cleared: usize,
        strokes: usize,
        failed_strokes: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Failure {
        None,
        RefuseEveryOtherAcquire,
        FailStrokes,
    }

    struct FakeSurface {
        log: Arc<Mutex<Log>>,
        size: CanvasSize,
        failure: Failure,
    }

    impl FakeSurface {
        fn new(failure: Failure) -> (Self, Arc<Mutex<Log>>) {
            let log = Arc::new(Mutex::new(Log::default()));
            let surface =
                Self { log: Arc::clone(&log), size: CanvasSize::new(400, 200), failure };
            (surface, log)
        }
    }

    impl Surface for FakeSurface {
        fn acquire(&mut self) -> Result<Box<dyn Canvas + '_>, DrawError> {
            let mut log = self.log.lock().unwrap();
            if self.failure == Failure::RefuseEveryOtherAcquire
                && (log.acquired + log.refused) % 2 == 1
            {
                log.refused += 1;
                return Err(DrawError::SurfaceUnavailable);
            }
            log.acquired += 1;
            drop(log);
            Ok(Box::new(FakeCanvas {
                log: Arc::clone(&self.log),
                size: self.size,
                fail_strokes: self.failure == Failure::FailStrokes,
            }))
        }
    }

    struct FakeCanvas {
        log: Arc<Mutex<Log>>,
        size: CanvasSize,
        fail_strokes: bool,
    }

    impl Canvas for FakeCanvas {
        fn size(&self) -> CanvasSize {
            self.size
        }

        fn clear(&mut self) {
            self.log.lock().unwrap().cleared += 1;
        }

        fn stroke(&mut self, _line: &WaveLine) -> Result<(), DrawError> {
            let mut log = self.log.lock().unwrap();
            if self.fail_strokes {
                log.failed_strokes += 1;
                return Err(DrawError::Stroke("fake".into()));
            }
            log.strokes += 1;
            Ok(())
        }
    }

    impl Drop for FakeCanvas {
        fn drop(&mut self) {
            self.log.lock().unwrap().released += 1;
        }
    }

    fn ticked(failure: Failure) -> (TickedAnimator<FakeSurface>, Arc<Mutex<Log>>) {
        let (surface, log) = FakeSurface::new(failure);
        let animator = TickedAnimator::new(
            surface,
            cluster_with_jitter(false),
            WaveGenerator::new(),
            Duration::from_millis(100),
        );
        (animator, log)
    }

    fn threaded(
        failure: Failure,
        delay: Option<Duration>,
    ) -> (ThreadedAnimator<FakeSurface>, Arc<Mutex<Log>>) {
        let (mut surface, log) = FakeSurface::new(failure);
        // Wide canvas: the phase cannot wrap within a test run, keeping
        // the monotonicity assertions honest on slow machines.
        surface.size = CanvasSize::new(500_000, 200);
        let animator = ThreadedAnimator::new(
            surface,
            cluster_with_jitter(false),
            WaveGenerator::new(),
            1,
            delay,
        );
        (animator, log)
    }

    #[test]
    fn ticked_does_nothing_until_started() {
        let (mut animator, log) = ticked(Failure::None);
        animator.tick();
        animator.advance_by(50);
        assert_eq!(log.lock().unwrap().acquired, 0);
        assert_eq!(animator.phase(), 0);
    }

    #[test]
    fn ticked_advance_draws_the_cluster_and_moves_the_phase() {
        let (mut animator, log) = ticked(Failure::None);
        animator.start();
        animator.advance_by(50);

        assert_eq!(animator.phase(), 50);
        let log = log.lock().unwrap();
        assert_eq!(log.acquired, 1);
        assert_eq!(log.cleared, 1);
        assert_eq!(log.released, 1);
        // One stroke per cluster line.
        assert_eq!(log.strokes, 5);
    }

    #[test]
    fn ticked_tick_follows_wall_clock() {
        let (mut animator, _log) = ticked(Failure::None);
        animator.start();
        // First tick measures the canvas and establishes the baseline.
        animator.tick();
        assert_eq!(animator.phase(), 0);
        thread::sleep(Duration::from_millis(20));
        animator.tick();
        // ~20ms of a 100ms loop over an 800-unit wrap.
        assert!(animator.phase() > 0);
    }

    #[test]
    fn ticked_phase_persists_across_stop_and_start() {
        let (mut animator, log) = ticked(Failure::None);
        animator.start();
        animator.advance_by(50);
        animator.stop();

        animator.advance_by(500);
        assert_eq!(animator.phase(), 50, "stopped animator must not move");

        animator.start();
        animator.advance_by(10);
        assert_eq!(animator.phase(), 60, "motion resumes, not restarts");
        assert_eq!(log.lock().unwrap().acquired, 2);
    }

    #[test]
    fn toggle_alternates_idempotently() {
        let (mut animator, _log) = ticked(Failure::None);
        assert!(!animator.is_running());
        animator.toggle();
        assert!(animator.is_running());
        animator.toggle();
        assert!(!animator.is_running());
        // Explicit start/stop remain idempotent too.
        animator.stop();
        assert!(!animator.is_running());
        animator.start();
        animator.start();
        assert!(animator.is_running());
    }

    #[test]
    fn failed_stroke_still_releases_the_canvas() {
        let (mut animator, log) = ticked(Failure::FailStrokes);
        animator.start();
        animator.advance_by(10);

        let log = log.lock().unwrap();
        assert_eq!(log.failed_strokes, 1);
        assert_eq!(log.released, 1, "the canvas guard must drop on the error path");
    }

    #[test]
    fn refused_acquire_does_not_advance_the_phase() {
        let (mut animator, log) = ticked(Failure::RefuseEveryOtherAcquire);
        animator.start();
        animator.advance_by(10); // drawn
        animator.advance_by(10); // refused
        animator.advance_by(10); // drawn

        assert_eq!(animator.phase(), 20);
        let log = log.lock().unwrap();
        assert_eq!(log.acquired, 2);
        assert_eq!(log.refused, 1);
    }

    #[test]
    fn threaded_produces_frames_and_joins_on_stop() {
        let (mut animator, log) = threaded(Failure::None, Some(Duration::from_millis(1)));
        animator.start();
        thread::sleep(Duration::from_millis(30));
        animator.stop();

        let after_stop = {
            let log = log.lock().unwrap();
            assert!(log.acquired > 0, "the render thread should have drawn");
            assert_eq!(log.acquired, log.released, "every acquire must release");
            log.acquired
        };
        assert!(animator.phase() > 0);

        // Joined means no frames trickle in afterwards.
        thread::sleep(Duration::from_millis(10));
        assert_eq!(log.lock().unwrap().acquired, after_stop);
    }

    #[test]
    fn threaded_phase_persists_across_stop_and_start() {
        let (mut animator, _log) = threaded(Failure::None, Some(Duration::from_millis(1)));
        animator.start();
        thread::sleep(Duration::from_millis(15));
        animator.stop();
        let paused_at = animator.phase();
        assert!(paused_at > 0);

        animator.start();
        thread::sleep(Duration::from_millis(15));
        animator.stop();
        assert!(animator.phase() > paused_at, "resume continues the sweep");
    }

    #[test]
    fn threaded_skips_refused_frames_and_keeps_looping() {
        let (mut animator, log) = threaded(
            Failure::RefuseEveryOtherAcquire,
            Some(Duration::from_millis(1)),
        );
        animator.start();
        thread::sleep(Duration::from_millis(30));
        animator.stop();

        let log = log.lock().unwrap();
        assert!(log.refused > 0, "some frames should have been refused");
        assert!(log.acquired > 0, "the loop must keep going past refusals");
        assert_eq!(log.acquired, log.released);
    }

    #[test]
    fn threaded_stop_without_start_is_a_no_op() {
        let (mut animator, log) = threaded(Failure::None, Some(Duration::from_millis(1)));
        animator.stop();
        assert!(!animator.is_running());
        assert_eq!(log.lock().unwrap().acquired, 0);
    }

    #[test]
    fn threaded_start_twice_spawns_one_thread() {
        let (mut animator, _log) = threaded(Failure::None, Some(Duration::from_millis(1)));
        animator.start();
        animator.start();
        assert!(animator.is_running());
        animator.stop();
        assert!(!animator.is_running());
    }
}
