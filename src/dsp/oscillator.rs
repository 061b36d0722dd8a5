//! Tone generators for the spin synth, anti-aliased with PolyBLEP.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Square,
    Sawtooth,
}

/// A continuously running tone. Silent once stopped; stopping is final.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    frequency: f64,
    phase: f64,
    sample_rate: f64,
    stopped: bool,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            phase: 0.0,
            sample_rate,
            stopped: false,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Retune without resetting phase, so pitch moves without a click.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency.clamp(0.0, self.sample_rate / 2.0);
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn next_sample(&mut self) -> f64 {
        if self.stopped {
            return 0.0;
        }
        let inc = self.frequency / self.sample_rate;
        let sample = match self.waveform {
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => {
                let naive = if self.phase < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(self.phase, inc) - poly_blep((self.phase + 0.5) % 1.0, inc)
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// PolyBLEP correction around the waveform discontinuity at phase 0.
///
/// `t` is the phase in [0, 1), `dt` the phase increment per sample.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(osc: &mut Oscillator, n: usize) -> f64 {
        (0..n).map(|_| osc.next_sample().abs()).fold(0.0, f64::max)
    }

    #[test]
    fn waveforms_stay_bounded() {
        for wf in [Waveform::Square, Waveform::Sawtooth] {
            let mut osc = Oscillator::new(wf, 220.0, 44100.0);
            let p = peak(&mut osc, 44100);
            assert!(p <= 1.5, "{wf:?} out of range: {p}");
            assert!(p > 0.5, "{wf:?} should be audible, peak {p}");
        }
    }

    #[test]
    fn retune_keeps_phase() {
        let mut a = Oscillator::new(Waveform::Sawtooth, 220.0, 44100.0);
        let mut b = Oscillator::new(Waveform::Sawtooth, 220.0, 44100.0);
        for _ in 0..100 {
            a.next_sample();
            b.next_sample();
        }
        b.set_frequency(220.0);
        assert_eq!(a.next_sample(), b.next_sample());
    }

    #[test]
    fn stopped_is_silent() {
        let mut osc = Oscillator::new(Waveform::Sawtooth, 110.0, 44100.0);
        osc.next_sample();
        osc.stop();
        assert_eq!(peak(&mut osc, 1000), 0.0);
    }

    #[test]
    fn frequency_clamped_to_nyquist() {
        let mut osc = Oscillator::new(Waveform::Square, 100.0, 8000.0);
        osc.set_frequency(10_000.0);
        assert_eq!(osc.frequency(), 4000.0);
        osc.set_frequency(-5.0);
        assert_eq!(osc.frequency(), 0.0);
    }
}
