//! The cipher wheel component.
//!
//! `CipherWheel` owns everything one mounted wheel needs: the input text, the
//! shift, the timer queue, the sequencer and the audio session. Hosts feed it
//! events (`set_input`, `set_shift`, `encrypt`, `advance`) and read back a
//! `WheelView` to draw. Audio is optional; a wheel without it behaves the same
//! apart from being silent.

use log::{info, warn};
use serde::Serialize;

use crate::cipher::{Shift, normalize_input};
use crate::config::WheelConfig;
use crate::dsp::engine::SpinSynth;
use crate::error::WheelError;
use crate::rings::{RingView, ring_views};
use crate::sequencer::{AnimationSequencer, StepEvent};
use crate::timer::{TimerQueue, WheelTask};

pub const ENCRYPT_LABEL: &str = "Encrypt";
pub const BUSY_LABEL: &str = "Encrypting...";
pub const OUTPUT_LABEL: &str = "Encrypted Text";
pub const INPUT_LABEL: &str = "Text to Encrypt";
pub const INPUT_PLACEHOLDER: &str = "Enter text and press Enter or click Encrypt";
pub const SHIFT_CONTROL_LABEL: &str = "Shift Value (0-25)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelView {
    pub input: String,
    pub input_label: &'static str,
    pub input_placeholder: &'static str,
    pub shift: u8,
    pub shift_label: String,
    /// Accessible name of the slider.
    pub shift_control_label: &'static str,
    pub rotation: f64,
    pub output: String,
    pub output_label: &'static str,
    pub button: ButtonView,
    /// Fraction revealed; only present while animating.
    pub progress: Option<f64>,
    pub animating: bool,
    pub outer: RingView,
    pub inner: RingView,
}

#[derive(Debug)]
pub struct CipherWheel {
    input: String,
    shift: Shift,
    timers: TimerQueue<WheelTask>,
    sequencer: AnimationSequencer,
    audio: Option<SpinSynth>,
    mounted: bool,
}

impl CipherWheel {
    /// Mount a wheel. If the audio session cannot be built the wheel runs
    /// silently.
    pub fn mount(config: &WheelConfig) -> Self {
        let audio = match SpinSynth::new(&config.audio) {
            Ok(synth) => Some(synth),
            Err(e) => {
                warn!("Running without audio: {e}");
                None
            }
        };
        info!(
            "Cipher wheel mounted (shift {}, {} ms per step)",
            config.initial_shift, config.step_delay_ms
        );
        CipherWheel {
            input: String::new(),
            shift: config.initial_shift,
            timers: TimerQueue::new(),
            sequencer: AnimationSequencer::new(config.step_delay_ms),
            audio,
            mounted: true,
        }
    }

    /// Mount from a JSON config string.
    pub fn mount_json(json: &str) -> Result<Self, WheelError> {
        let config = WheelConfig::from_json(json)?;
        Ok(Self::mount(&config))
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Outer-ring rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.shift.rotation_degrees()
    }

    /// Ciphertext revealed so far.
    pub fn output(&self) -> &str {
        self.sequencer.revealed()
    }

    pub fn is_animating(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Timers still waiting to fire (animation steps and noise releases).
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Virtual time the next timer falls due, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    pub fn audio(&self) -> Option<&SpinSynth> {
        self.audio.as_ref()
    }

    /// Replace the input text, upper-cased.
    pub fn set_input(&mut self, text: &str) -> &str {
        self.input = normalize_input(text);
        &self.input
    }

    /// Slider input. Anything that is not an integer in `0..=25` is rejected
    /// and the current shift stays, as does every change after unmount.
    pub fn set_shift(&mut self, raw: &str) -> Result<Shift, WheelError> {
        let shift = Shift::parse(raw)?;
        self.set_shift_value(shift)?;
        Ok(shift)
    }

    pub fn set_shift_value(&mut self, shift: Shift) -> Result<(), WheelError> {
        if !self.mounted {
            return Err(WheelError::NotMounted);
        }
        if shift == self.shift {
            return Ok(());
        }
        self.shift = shift;
        let rotation = self.rotation();
        if let Some(audio) = self.audio.as_mut() {
            audio.trigger_spin(rotation, &mut self.timers);
        }
        Ok(())
    }

    /// Whether the encrypt action is currently enabled.
    pub fn can_encrypt(&self) -> bool {
        self.mounted && !self.input.is_empty() && !self.is_animating()
    }

    /// Start encrypting the current input. Does nothing (and returns false)
    /// when the input is empty or a run is already in progress.
    pub fn encrypt(&mut self) -> bool {
        if !self.can_encrypt() {
            return false;
        }
        let event = self.sequencer.start(&self.input, self.shift, &mut self.timers);
        self.after_step(event);
        true
    }

    /// Keyboard handler for the text field: Enter encrypts.
    pub fn key_press(&mut self, key: &str) -> bool {
        key == "Enter" && self.encrypt()
    }

    /// Let `elapsed_ms` pass, firing every timer that falls due.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let until = self.timers.now_ms().saturating_add(elapsed_ms);
        while let Some((_, task)) = self.timers.pop_due(until) {
            match task {
                WheelTask::AnimationStep => {
                    let event = self.sequencer.step(&mut self.timers);
                    self.after_step(event);
                }
                WheelTask::ReleaseNoise => {
                    if let Some(audio) = self.audio.as_mut() {
                        audio.release_noise();
                    }
                }
            }
        }
    }

    /// Pull the next block of mono audio. Silence without an audio session.
    pub fn render_audio(&mut self, out: &mut [f32]) {
        match self.audio.as_mut() {
            Some(audio) => audio.render(out),
            None => out.fill(0.0),
        }
    }

    pub fn view(&self) -> WheelView {
        let (outer, inner) = ring_views(self.shift, self.sequencer.highlight());
        let animating = self.is_animating();
        WheelView {
            input: self.input.clone(),
            input_label: INPUT_LABEL,
            input_placeholder: INPUT_PLACEHOLDER,
            shift: self.shift.value(),
            shift_label: format!("Shift: {}", self.shift),
            shift_control_label: SHIFT_CONTROL_LABEL,
            rotation: self.rotation(),
            output: self.output().to_string(),
            output_label: OUTPUT_LABEL,
            button: ButtonView {
                label: if animating { BUSY_LABEL } else { ENCRYPT_LABEL },
                enabled: self.can_encrypt(),
            },
            progress: self.sequencer.progress(),
            animating,
            outer,
            inner,
        }
    }

    /// Cancel the running animation and release the audio session. Safe to
    /// call more than once; dropping the wheel does the same.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.sequencer.cancel(&mut self.timers);
        if let Some(audio) = self.audio.as_mut() {
            audio.dispose(&mut self.timers);
        }
        self.mounted = false;
        info!("Cipher wheel unmounted");
    }

    fn after_step(&mut self, event: StepEvent) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        match event {
            StepEvent::Revealed {
                highlight: Some(_), ..
            } => audio.trigger_spin(self.shift.rotation_degrees(), &mut self.timers),
            StepEvent::Revealed { .. } => {}
            StepEvent::Finished => audio.stop(&mut self.timers),
        }
    }
}

impl Drop for CipherWheel {
    fn drop(&mut self) {
        self.unmount();
    }
}
