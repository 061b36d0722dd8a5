//! Looping white-noise source.
//!
//! One second of noise is generated up front from a seeded xorshift PRNG and
//! played on a loop, so renders are deterministic for a given seed.

#[inline]
fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[derive(Debug, Clone)]
pub struct NoiseLoop {
    buffer: Vec<f64>,
    position: usize,
    stopped: bool,
}

impl NoiseLoop {
    pub fn new(sample_rate: f64, seed: u32) -> Self {
        let len = (sample_rate as usize).max(1);
        // xorshift never leaves the all-zero state
        let mut state = if seed == 0 { 0x9e37_79b9 } else { seed };
        let buffer = (0..len)
            .map(|_| (xorshift32(&mut state) as f64 / u32::MAX as f64) * 2.0 - 1.0)
            .collect();
        NoiseLoop {
            buffer,
            position: 0,
            stopped: false,
        }
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn next_sample(&mut self) -> f64 {
        if self.stopped {
            return 0.0;
        }
        let s = self.buffer[self.position];
        self.position = (self.position + 1) % self.buffer.len();
        s
    }
}
