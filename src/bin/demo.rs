use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use dashwave::options::{AnimatorOptions, RenderMode};
use dashwave::render::terminal::TerminalSurface;
use dashwave::render::{Animator, ThreadedAnimator, TickedAnimator};
use dashwave::wave::cluster_with_jitter;

/// Scroll the dashed wave cluster across the terminal.
///
/// Space toggles the animation, q or Esc quits.
#[derive(Parser)]
#[command(name = "dashwave", version, about)]
struct Cli {
    /// Render-loop strategy.
    #[arg(long, value_enum)]
    mode: Option<RenderMode>,

    /// Seconds to run before exiting; 0 runs until a key quits.
    #[arg(long, default_value_t = 0)]
    duration: u64,

    /// Ticks per second in ticked mode.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// YAML options file; flags override its values.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Disable the per-line random scan offsets.
    #[arg(long)]
    no_jitter: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut options = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            AnimatorOptions::from_yaml(&raw)?
        }
        None => AnimatorOptions::default(),
    };
    if let Some(mode) = cli.mode {
        options.mode = mode;
    }
    if cli.no_jitter {
        options.jitter = false;
    }

    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
    let result = run(&cli, &options);
    execute!(out, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(cli: &Cli, options: &AnimatorOptions) -> anyhow::Result<()> {
    let presets = cluster_with_jitter(options.jitter);
    let generator = options.generator()?;
    let deadline =
        (cli.duration > 0).then(|| Instant::now() + Duration::from_secs(cli.duration));

    match options.mode {
        RenderMode::Ticked => {
            let mut animator = TickedAnimator::new(
                TerminalSurface::new(),
                presets,
                generator,
                options.loop_duration(),
            );
            animator.start();
            let tick_interval = Duration::from_secs(1) / cli.fps.max(1);
            loop {
                animator.tick();
                if handle_keys(&mut animator, tick_interval)? {
                    break;
                }
                if past(deadline) {
                    break;
                }
            }
        }
        RenderMode::Continuous => {
            let mut animator = ThreadedAnimator::new(
                TerminalSurface::new(),
                presets,
                generator,
                options.step,
                options.frame_delay(),
            );
            animator.start();
            loop {
                if handle_keys(&mut animator, Duration::from_millis(50))? {
                    break;
                }
                if past(deadline) {
                    break;
                }
            }
            animator.stop();
        }
    }
    Ok(())
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

/// Space toggles, q or Esc quits. Waits at most `wait` for a key, which
/// doubles as the frame pacing for the calling loop.
fn handle_keys(animator: &mut impl Animator, wait: Duration) -> anyhow::Result<bool> {
    if event::poll(wait)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char(' ') => animator.toggle(),
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    _ => {}
                }
            }
        }
    }
    Ok(false)
}
