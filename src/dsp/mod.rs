//! Audio Feedback Engine — pure Rust synthesis of the wheel's spin sound.
//!
//! The same code feeds the browser (an AudioWorklet pulls frames through the
//! WASM session) and the CLI (offline WAV export of a whole run).

pub mod engine;
pub mod envelope;
pub mod noise;
pub mod oscillator;
pub mod renderer;
