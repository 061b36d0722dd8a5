pub mod cipher;
pub mod config;
pub mod dsp;
pub mod error;
pub mod rings;
pub mod sequencer;
pub mod timer;
pub mod widget;

use crate::cipher::Shift;
use crate::config::WheelConfig;
use crate::timer::FrameClock;
use crate::widget::CipherWheel;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the caesar_wheel version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: encrypt a whole string at once (no animation).
#[wasm_bindgen]
pub fn encrypt_text(text: &str, shift: i32) -> Result<String, JsValue> {
    let shift = Shift::new(shift as i64).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(cipher::encrypt_text(&cipher::normalize_input(text), shift))
}

/// WASM-exposed: one mounted cipher wheel.
///
/// The loader constructs this once the browser is ready. JS then forwards UI
/// events, calls `advance` from its frame loop with the elapsed milliseconds,
/// pulls audio through `render_audio` for an AudioWorklet, and draws from
/// `view`.
#[wasm_bindgen]
pub struct WheelSession {
    wheel: CipherWheel,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WheelSession {
    /// Mount with an optional JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WheelSession, JsValue> {
        let config = match config_json {
            Some(json) => {
                WheelConfig::from_json(&json).map_err(|e| JsValue::from_str(&format!("{e}")))?
            }
            None => WheelConfig::default(),
        };
        Ok(WheelSession::mount(&config))
    }

    /// Text field change. Returns the normalized value to show.
    pub fn set_input(&mut self, text: &str) -> String {
        self.wheel.set_input(text).to_string()
    }

    /// Slider change. Returns false (and keeps the old shift) for bad input
    /// or after `dispose`.
    pub fn set_shift(&mut self, value: &str) -> bool {
        self.wheel.set_shift(value).is_ok()
    }

    pub fn encrypt(&mut self) -> bool {
        self.wheel.encrypt()
    }

    pub fn key_press(&mut self, key: &str) -> bool {
        self.wheel.key_press(key)
    }

    /// Frame tick. Fractions of a millisecond carry over to the next frame.
    pub fn advance(&mut self, elapsed_ms: f64) {
        let whole_ms = self.clock.tick(elapsed_ms);
        if whole_ms > 0 {
            self.wheel.advance(whole_ms);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.wheel.is_animating()
    }

    /// Next `frames` mono samples for the AudioWorklet.
    pub fn render_audio(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        self.wheel.render_audio(&mut out);
        out
    }

    /// Current view snapshot as a JS object.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.wheel.view())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Unmount: cancel timers and release audio. The session stays inert.
    pub fn dispose(&mut self) {
        self.wheel.unmount();
    }
}

impl WheelSession {
    fn mount(config: &WheelConfig) -> Self {
        WheelSession {
            wheel: CipherWheel::mount(config),
            clock: FrameClock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> WheelSession {
        let mut config = WheelConfig::default();
        config.audio.enabled = false;
        WheelSession::mount(&config)
    }

    #[test]
    fn frame_ticks_at_120hz_reach_each_step() {
        let mut s = session();
        s.set_input("abc");
        assert!(s.encrypt());
        for _ in 0..96 {
            s.advance(1000.0 / 120.0);
        }
        assert_eq!(s.wheel.now_ms(), 800);
        assert_eq!(s.wheel.output(), "EF");
    }

    #[test]
    fn sub_millisecond_frames_still_advance() {
        let mut s = session();
        s.set_input("abc");
        s.encrypt();
        for _ in 0..2000 {
            s.advance(0.4);
        }
        assert_eq!(s.wheel.output(), "EF");
    }

    #[test]
    fn shift_rejected_after_dispose() {
        let mut s = session();
        assert!(s.set_shift("9"));
        assert!(!s.set_shift("abc"));
        s.dispose();
        assert!(!s.set_shift("12"));
        assert_eq!(s.wheel.shift().value(), 9);
    }
}
