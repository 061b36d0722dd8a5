//! Offline renderer — plays a whole encryption run on the virtual clock and
//! captures its audio and step transcript.

use crate::config::WheelConfig;
use crate::widget::CipherWheel;

/// Virtual time advanced between two audio blocks.
const BLOCK_MS: u64 = 10;

/// One revealed character.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Virtual time the character appeared, ms since the run started.
    pub at_ms: u64,
    pub index: usize,
    pub plain: char,
    pub cipher: char,
}

#[derive(Debug, Clone)]
pub struct RenderedRun {
    pub input: String,
    pub output: String,
    pub steps: Vec<StepRecord>,
    /// Mono audio of the run; empty when audio is disabled.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Mount a wheel, encrypt `text`, and run the clock until the animation and
/// every audio tail have finished.
pub fn render_run(config: &WheelConfig, text: &str) -> RenderedRun {
    let mut wheel = CipherWheel::mount(config);
    let input = wheel.set_input(text).to_string();
    let input_chars: Vec<char> = input.chars().collect();
    let sample_rate = wheel.audio().map(|a| a.sample_rate()).unwrap_or(0.0);
    let start_ms = wheel.now_ms();

    let mut steps = Vec::new();
    let mut samples = Vec::new();
    let mut frame_debt = 0.0_f64;
    let mut block = Vec::new();

    let record_new = |wheel: &CipherWheel, steps: &mut Vec<StepRecord>| {
        for (index, cipher) in wheel.output().chars().enumerate().skip(steps.len()) {
            steps.push(StepRecord {
                at_ms: wheel.now_ms() - start_ms,
                index,
                plain: input_chars.get(index).copied().unwrap_or(cipher),
                cipher,
            });
        }
    };

    wheel.encrypt();
    record_new(&wheel, &mut steps);

    // One extra block so the final release ramp is captured in full.
    let mut tail_blocks = 1;
    loop {
        if sample_rate > 0.0 {
            frame_debt += sample_rate * BLOCK_MS as f64 / 1000.0;
            let frames = frame_debt as usize;
            frame_debt -= frames as f64;
            block.resize(frames, 0.0);
            wheel.render_audio(&mut block);
            samples.extend_from_slice(&block);
        }

        // Stop at every timer inside the block so steps keep their exact times.
        let block_end = wheel.now_ms() + BLOCK_MS;
        while let Some(due) = wheel.next_due_ms().filter(|&due| due <= block_end) {
            wheel.advance(due - wheel.now_ms());
            record_new(&wheel, &mut steps);
        }
        wheel.advance(block_end - wheel.now_ms());

        if !wheel.is_animating() && wheel.pending_timers() == 0 {
            if tail_blocks == 0 {
                break;
            }
            tail_blocks -= 1;
        }
    }

    RenderedRun {
        input,
        output: wheel.output().to_string(),
        steps,
        samples,
        sample_rate: sample_rate as u32,
    }
}

/// Encode mono f32 samples as a 16-bit PCM WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let pcm = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        buf.extend_from_slice(&pcm.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WheelConfig {
        let mut config = WheelConfig::default();
        config.audio.sample_rate = 8000.0;
        config
    }

    #[test]
    fn transcript_follows_step_delay() {
        let run = render_run(&config(), "a1b");
        assert_eq!(run.input, "A1B");
        assert_eq!(run.output, "E1F");
        let times: Vec<u64> = run.steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(times, vec![0, 800, 1600]);
        assert_eq!(run.steps[1].plain, '1');
        assert_eq!(run.steps[2].cipher, 'F');
    }

    #[test]
    fn transcript_keeps_off_grid_step_times() {
        let mut config = config();
        config.step_delay_ms = 805;
        let run = render_run(&config, "ABC");
        let times: Vec<u64> = run.steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(times, vec![0, 805, 1610]);
        assert_eq!(run.output, "EFG");
    }

    #[test]
    fn run_audio_is_not_silent() {
        let run = render_run(&config(), "AB");
        assert_eq!(run.sample_rate, 8000);
        // two steps, then completion at 1600 ms
        assert!(run.samples.len() >= 8000 * 16 / 10, "got {} samples", run.samples.len());
        assert!(run.samples.iter().any(|s| s.abs() > 0.001));
        assert!(run.samples.iter().all(|s| s.abs() <= 1.0));
        let tail = &run.samples[run.samples.len() - 80..];
        assert!(tail.iter().all(|s| s.abs() < 1e-6), "last spin has faded by the end");
    }

    #[test]
    fn silent_config_renders_no_audio() {
        let mut config = config();
        config.audio.enabled = false;
        let run = render_run(&config, "XYZ");
        assert_eq!(run.output, "BCD");
        assert!(run.samples.is_empty());
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav(&[0.0, 0.5, -0.5, 1.0], 8000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1, "mono");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 8000);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), i16::MAX);
    }
}
