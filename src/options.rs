use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::wave::{ConfigError, WaveGenerator};

/// Which render-loop strategy drives the animation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RenderMode {
    /// The host's animation callback drives frames.
    #[default]
    Ticked,

    /// A dedicated render thread redraws continuously.
    Continuous,
}

/// Animation options. A YAML mapping may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimatorOptions {
    pub mode: RenderMode,

    /// Wall-clock time for one full phase wrap in ticked mode.
    pub loop_duration_ms: u64,

    /// Phase units added per continuous-mode iteration.
    pub step: i32,

    /// Pause between continuous-mode iterations. Explicit `null` removes
    /// the pause entirely and lets the render thread spin a core.
    pub frame_delay_ms: Option<u64>,

    /// Divisor in the amplitude rule `height / divisor × level`.
    pub amplitude_divisor: u32,

    /// Randomize each line's scan offset once at startup.
    pub jitter: bool,
}

impl Default for AnimatorOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Ticked,
            loop_duration_ms: 6000,
            step: 1,
            frame_delay_ms: Some(16),
            amplitude_divisor: 10,
            jitter: true,
        }
    }
}

impl AnimatorOptions {
    pub fn from_yaml(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn loop_duration(&self) -> Duration {
        Duration::from_millis(self.loop_duration_ms)
    }

    pub fn frame_delay(&self) -> Option<Duration> {
        self.frame_delay_ms.map(Duration::from_millis)
    }

    pub fn generator(&self) -> Result<WaveGenerator, ConfigError> {
        WaveGenerator::with_amplitude_divisor(self.amplitude_divisor)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum OptionsError {
    #[error("invalid animator options: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_six_second_ticked_sweep() {
        let options = AnimatorOptions::default();
        assert_eq!(options.mode, RenderMode::Ticked);
        assert_eq!(options.loop_duration(), Duration::from_secs(6));
        assert_eq!(options.step, 1);
        assert_eq!(options.frame_delay(), Some(Duration::from_millis(16)));
        assert_eq!(options.amplitude_divisor, 10);
        assert!(options.jitter);
    }

    #[test]
    fn empty_mapping_deserializes_to_defaults() {
        let options = AnimatorOptions::from_yaml("{}").unwrap();
        assert_eq!(options, AnimatorOptions::default());
    }

    #[test]
    fn yaml_overrides_a_subset_of_fields() {
        let options = AnimatorOptions::from_yaml("mode: continuous\nstep: 3\n").unwrap();
        assert_eq!(options.mode, RenderMode::Continuous);
        assert_eq!(options.step, 3);
        assert_eq!(options.loop_duration_ms, 6000);
    }

    #[test]
    fn explicit_null_frame_delay_means_unthrottled() {
        let options = AnimatorOptions::from_yaml("frame_delay_ms: null\n").unwrap();
        assert_eq!(options.frame_delay(), None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            AnimatorOptions::from_yaml("speed: 11\n"),
            Err(OptionsError::Parse(_))
        ));
    }

    #[test]
    fn mode_round_trips_through_strings() {
        assert_eq!("continuous".parse::<RenderMode>().unwrap(), RenderMode::Continuous);
        assert_eq!(RenderMode::Ticked.to_string(), "ticked");
    }

    #[test]
    fn generator_rejects_a_zero_divisor() {
        let options = AnimatorOptions { amplitude_divisor: 0, ..Default::default() };
        assert!(options.generator().is_err());
    }
}
