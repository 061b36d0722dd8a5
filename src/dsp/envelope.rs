//! One-shot gain envelope: linear attack to a peak, then linear release.
//!
//! Retriggering mid-flight restarts the attack from the current level, the
//! same way a gain parameter ramps from wherever it is.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Release,
}

#[derive(Debug, Clone)]
pub struct RampEnvelope {
    /// Attack time in seconds.
    pub attack: f64,
    /// Release time in seconds.
    pub release: f64,
    /// Level reached at the end of the attack.
    pub peak: f64,

    stage: Stage,
    level: f64,
    sample_rate: f64,
    stage_samples: usize,
    stage_counter: usize,
    start_level: f64,
}

impl RampEnvelope {
    pub fn new(attack: f64, release: f64, peak: f64, sample_rate: f64) -> Self {
        RampEnvelope {
            attack,
            release,
            peak,
            stage: Stage::Idle,
            level: 0.0,
            sample_rate,
            stage_samples: 0,
            stage_counter: 0,
            start_level: 0.0,
        }
    }

    /// Ramp up to `peak`, then straight back down to silence.
    pub fn trigger(&mut self) {
        self.stage = Stage::Attack;
        self.stage_samples = (self.attack * self.sample_rate) as usize;
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    /// Skip whatever is left of the attack and fade out from here.
    pub fn fade_out(&mut self) {
        if self.stage == Stage::Idle {
            return;
        }
        self.enter_release();
    }

    /// Drop to silence immediately.
    pub fn silence(&mut self) {
        self.stage = Stage::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    pub fn next_sample(&mut self) -> f64 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => {
                if self.stage_counter >= self.stage_samples {
                    self.level = self.peak;
                    self.enter_release();
                } else {
                    let t = self.stage_counter as f64 / self.stage_samples as f64;
                    self.level = self.start_level + (self.peak - self.start_level) * t;
                    self.stage_counter += 1;
                }
            }
            Stage::Release => {
                if self.stage_counter >= self.stage_samples {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                } else {
                    let t = self.stage_counter as f64 / self.stage_samples as f64;
                    self.level = self.start_level * (1.0 - t);
                    self.stage_counter += 1;
                }
            }
        }
        self.level
    }

    fn enter_release(&mut self) {
        self.stage = Stage::Release;
        self.stage_samples = (self.release * self.sample_rate) as usize;
        self.stage_counter = 0;
        self.start_level = self.level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_silent() {
        let mut env = RampEnvelope::new(0.01, 0.1, 0.05, 44100.0);
        assert!(env.is_idle());
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn reaches_peak_then_returns_to_silence() {
        let mut env = RampEnvelope::new(0.01, 0.1, 0.05, 44100.0);
        env.trigger();

        let mut max = 0.0_f64;
        for _ in 0..441 + 10 {
            max = max.max(env.next_sample());
        }
        assert!((max - 0.05).abs() < 1e-3, "attack should reach peak, got {max}");

        for _ in 0..4410 + 10 {
            env.next_sample();
        }
        assert!(env.is_idle(), "release should end idle");
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn never_exceeds_peak() {
        let mut env = RampEnvelope::new(0.005, 0.02, 0.3, 44100.0);
        env.trigger();
        for i in 0..5000 {
            if i == 300 {
                env.trigger();
            }
            let s = env.next_sample();
            assert!((0.0..=0.3 + 1e-12).contains(&s), "level out of range: {s}");
        }
    }

    #[test]
    fn retrigger_starts_from_current_level() {
        let mut env = RampEnvelope::new(0.01, 0.1, 0.05, 44100.0);
        env.trigger();
        for _ in 0..600 {
            env.next_sample();
        }
        let before = env.level();
        env.trigger();
        let after = env.next_sample();
        assert!((after - before).abs() < 1e-3, "no jump on retrigger: {before} -> {after}");
    }

    #[test]
    fn fade_out_from_attack() {
        let mut env = RampEnvelope::new(0.1, 0.01, 1.0, 1000.0);
        env.trigger();
        for _ in 0..50 {
            env.next_sample();
        }
        env.fade_out();
        for _ in 0..20 {
            env.next_sample();
        }
        assert!(env.is_idle());
    }
}
