//! Spin synth — the "mechanical wheel" sound.
//!
//! One session lives for as long as the wheel is mounted: two tones and a
//! looping noise source run continuously at zero gain. Each spin ramps the
//! gains up and back down and opens a noise burst; a timer closes the burst
//! once its attack and release ramp has played out.
//!
//! Pitch follows how far the ring moved since the previous spin, not where
//! it is: `base + spread * |rotation - last_rotation|`.

use log::debug;

use crate::config::AudioConfig;
use crate::error::WheelError;
use crate::timer::{TimerId, TimerQueue, WheelTask};

use super::envelope::RampEnvelope;
use super::noise::NoiseLoop;
use super::oscillator::{Oscillator, Waveform};

/// Lowest sample rate the synth accepts.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

/// The noise window opened by one spin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NoiseBurst {
    opened_at_ms: u64,
}

#[derive(Debug)]
pub struct SpinSynth {
    config: AudioConfig,
    tone_a: Oscillator,
    tone_b: Oscillator,
    noise: NoiseLoop,
    tone_gain: RampEnvelope,
    noise_gain: RampEnvelope,
    burst: Option<NoiseBurst>,
    pending_release: Option<TimerId>,
    last_rotation: f64,
    spins: u64,
    disposed: bool,
}

impl SpinSynth {
    /// Build the session graph. Fails when audio is disabled or the sample
    /// rate is unusable; callers treat that as "run silently".
    pub fn new(config: &AudioConfig) -> Result<Self, WheelError> {
        if !config.enabled {
            return Err(WheelError::AudioUnavailable("disabled by config".into()));
        }
        let sr = config.sample_rate;
        if !sr.is_finite() || sr < MIN_SAMPLE_RATE {
            return Err(WheelError::AudioUnavailable(format!(
                "unsupported sample rate {sr}"
            )));
        }
        config.validate()?;

        Ok(SpinSynth {
            config: config.clone(),
            tone_a: Oscillator::new(Waveform::Sawtooth, config.tone_a_hz, sr),
            tone_b: Oscillator::new(Waveform::Square, config.tone_b_hz, sr),
            noise: NoiseLoop::new(sr, config.noise_seed),
            tone_gain: RampEnvelope::new(config.attack, config.release, config.tone_peak, sr),
            noise_gain: RampEnvelope::new(config.attack, config.release, config.noise_peak, sr),
            burst: None,
            pending_release: None,
            last_rotation: 0.0,
            spins: 0,
            disposed: false,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    pub fn last_rotation(&self) -> f64 {
        self.last_rotation
    }

    pub fn tone_frequencies(&self) -> (f64, f64) {
        (self.tone_a.frequency(), self.tone_b.frequency())
    }

    /// Number of spins triggered since mount.
    pub fn spins(&self) -> u64 {
        self.spins
    }

    pub fn has_noise_burst(&self) -> bool {
        self.burst.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Play one spin for a ring now at `rotation` degrees.
    pub fn trigger_spin(&mut self, rotation: f64, timers: &mut TimerQueue<WheelTask>) {
        if self.disposed {
            return;
        }
        let delta = (rotation - self.last_rotation).abs();
        self.tone_a
            .set_frequency(self.config.tone_a_hz + self.config.tone_a_spread * delta);
        self.tone_b
            .set_frequency(self.config.tone_b_hz + self.config.tone_b_spread * delta);
        self.tone_gain.trigger();
        self.noise_gain.trigger();
        self.burst = Some(NoiseBurst {
            opened_at_ms: timers.now_ms(),
        });
        self.last_rotation = rotation;
        self.spins += 1;
        debug!(
            "Spin to {rotation:.1}° (moved {delta:.1}°): tones {:.1} Hz / {:.1} Hz",
            self.tone_a.frequency(),
            self.tone_b.frequency()
        );
        let burst_ms = self.config.burst_ms();
        self.schedule_release(burst_ms, timers);
    }

    /// Fade everything out and let the burst close after the release window.
    pub fn stop(&mut self, timers: &mut TimerQueue<WheelTask>) {
        if self.disposed {
            return;
        }
        self.tone_gain.fade_out();
        self.noise_gain.fade_out();
        if self.burst.is_some() {
            let release_ms = self.config.release_ms();
            self.schedule_release(release_ms, timers);
        }
    }

    /// Close the noise burst. Driven by the `ReleaseNoise` timer.
    pub fn release_noise(&mut self) {
        self.pending_release = None;
        if let Some(burst) = self.burst.take() {
            debug!("Noise burst opened at {} ms released", burst.opened_at_ms);
        }
        self.noise_gain.silence();
    }

    /// Tear the session down: stop every source and cancel the pending
    /// release. The synth stays silent afterwards.
    pub fn dispose(&mut self, timers: &mut TimerQueue<WheelTask>) {
        if let Some(id) = self.pending_release.take() {
            timers.cancel(id);
        }
        self.tone_a.stop();
        self.tone_b.stop();
        self.noise.stop();
        self.tone_gain.silence();
        self.noise_gain.silence();
        self.burst = None;
        self.disposed = true;
    }

    /// Fill `out` with mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample() as f32;
        }
    }

    fn next_sample(&mut self) -> f64 {
        let tones = 0.5 * (self.tone_a.next_sample() + self.tone_b.next_sample());
        let tone_level = self.tone_gain.next_sample();
        let noise = self.noise.next_sample();
        let noise_level = self.noise_gain.next_sample();
        let noise = if self.burst.is_some() {
            noise * noise_level
        } else {
            0.0
        };
        soft_clip(tones * tone_level + noise)
    }

    fn schedule_release(&mut self, delay_ms: u64, timers: &mut TimerQueue<WheelTask>) {
        if let Some(id) = self.pending_release.take() {
            timers.cancel(id);
        }
        self.pending_release = Some(timers.schedule(delay_ms, WheelTask::ReleaseNoise));
    }
}

fn soft_clip(x: f64) -> f64 {
    x.tanh()
}
