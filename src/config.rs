//! Wheel configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid config and hosts only spell
//! out what they change.

use serde::{Deserialize, Serialize};

use crate::cipher::Shift;
use crate::error::WheelError;
use crate::sequencer::DEFAULT_STEP_DELAY_MS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WheelConfig {
    /// Milliseconds between revealed characters.
    pub step_delay_ms: u64,
    /// Shift the slider starts at.
    pub initial_shift: Shift,
    pub audio: AudioConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            initial_shift: Shift::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl WheelConfig {
    pub fn from_json(json: &str) -> Result<Self, WheelError> {
        let config: WheelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WheelError> {
        if self.step_delay_ms == 0 {
            return Err(WheelError::InvalidConfig("stepDelayMs must be positive".into()));
        }
        self.audio.validate()
    }
}

/// Parameters of the spin synth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConfig {
    /// When false the wheel runs silently.
    pub enabled: bool,
    pub sample_rate: f64,
    /// Base frequency of the first tone, Hz.
    pub tone_a_hz: f64,
    /// Hz added to the first tone per degree of rotation change.
    pub tone_a_spread: f64,
    pub tone_b_hz: f64,
    pub tone_b_spread: f64,
    /// Peak gain of the two tones.
    pub tone_peak: f64,
    /// Peak gain of the noise burst.
    pub noise_peak: f64,
    /// Attack window, seconds.
    pub attack: f64,
    /// Release window, seconds.
    pub release: f64,
    /// Seed for the looping noise buffer.
    pub noise_seed: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            enabled: true,
            sample_rate: 44100.0,
            tone_a_hz: 110.0,
            tone_a_spread: 2.0,
            tone_b_hz: 165.0,
            tone_b_spread: 3.0,
            tone_peak: 0.05,
            noise_peak: 0.03,
            attack: 0.02,
            release: 0.15,
            noise_seed: 0x2545_f491,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), WheelError> {
        let non_negative = [
            ("toneAHz", self.tone_a_hz),
            ("toneASpread", self.tone_a_spread),
            ("toneBHz", self.tone_b_hz),
            ("toneBSpread", self.tone_b_spread),
            ("tonePeak", self.tone_peak),
            ("noisePeak", self.noise_peak),
            ("attack", self.attack),
            ("release", self.release),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(WheelError::InvalidConfig(format!(
                    "audio.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Release window in whole milliseconds.
    pub fn release_ms(&self) -> u64 {
        (self.release * 1000.0).round() as u64
    }

    /// How long one spin's noise burst stays open: its full attack and
    /// release ramp.
    pub fn burst_ms(&self) -> u64 {
        ((self.attack + self.release) * 1000.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = WheelConfig::from_json("{}").unwrap();
        assert_eq!(config, WheelConfig::default());
        assert_eq!(config.step_delay_ms, 800);
        assert_eq!(config.initial_shift.value(), 4);
    }

    #[test]
    fn partial_override() {
        let config =
            WheelConfig::from_json(r#"{"stepDelayMs": 500, "audio": {"enabled": false}}"#).unwrap();
        assert_eq!(config.step_delay_ms, 500);
        assert!(!config.audio.enabled);
        assert_eq!(config.audio.release, 0.15, "untouched fields keep defaults");
    }

    #[test]
    fn rejects_out_of_range_shift() {
        let err = WheelConfig::from_json(r#"{"initialShift": 26}"#).unwrap_err();
        assert!(matches!(err, WheelError::Config(_)), "got {err}");
    }

    #[test]
    fn rejects_zero_delay() {
        let err = WheelConfig::from_json(r#"{"stepDelayMs": 0}"#).unwrap_err();
        assert!(matches!(err, WheelError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_negative_audio_times() {
        let err = WheelConfig::from_json(r#"{"audio": {"release": -1.0}}"#).unwrap_err();
        assert!(err.to_string().contains("audio.release"), "got {err}");
    }

    #[test]
    fn timer_windows_round_to_ms() {
        let audio = AudioConfig::default();
        assert_eq!(audio.release_ms(), 150);
        assert_eq!(audio.burst_ms(), 170);
    }
}
