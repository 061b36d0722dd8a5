//! Animation Sequencer — reveals the ciphertext one character per step.
//!
//! The sequencer owns at most one outstanding `TimerId`. Every transition
//! that replaces the current run (a restart, a cancel, or completion)
//! cancels it first, so a step from an older run can never land in a newer
//! one.

use log::{debug, info};
use serde::Serialize;

use crate::cipher::{Letter, Shift, encrypt_letter};
use crate::timer::{TimerId, TimerQueue, WheelTask};

/// Milliseconds between two revealed characters.
pub const DEFAULT_STEP_DELAY_MS: u64 = 800;

/// The plaintext/ciphertext letter pair currently emphasized on the rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub plain: Letter,
    pub cipher: Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running { step: usize },
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Character `index` was encrypted and appended to the output.
    Revealed {
        index: usize,
        plain: char,
        cipher: char,
        highlight: Option<Highlight>,
    },
    /// The last character was already revealed; the run is over.
    Finished,
}

#[derive(Debug)]
pub struct AnimationSequencer {
    step_delay_ms: u64,
    phase: Phase,
    input: Vec<char>,
    shift: Shift,
    revealed: String,
    highlight: Option<Highlight>,
    pending: Option<TimerId>,
}

impl AnimationSequencer {
    pub fn new(step_delay_ms: u64) -> Self {
        AnimationSequencer {
            step_delay_ms,
            phase: Phase::Idle,
            input: Vec::new(),
            shift: Shift::default(),
            revealed: String::new(),
            highlight: None,
            pending: None,
        }
    }

    pub fn step_delay_ms(&self) -> u64 {
        self.step_delay_ms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Output revealed so far.
    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }

    /// Fraction of the input revealed, `None` while idle.
    pub fn progress(&self) -> Option<f64> {
        match self.phase {
            Phase::Running { step } if !self.input.is_empty() => {
                Some(step as f64 / self.input.len() as f64)
            }
            Phase::Running { .. } => Some(0.0),
            Phase::Idle => None,
        }
    }

    /// Start a new run over `text`, cancelling any run in progress.
    ///
    /// The first character is revealed immediately; the rest follow one per
    /// step delay. The shift is fixed for the whole run.
    pub fn start(
        &mut self,
        text: &str,
        shift: Shift,
        timers: &mut TimerQueue<WheelTask>,
    ) -> StepEvent {
        self.cancel(timers);
        self.input = text.chars().collect();
        self.shift = shift;
        self.revealed.clear();
        self.highlight = None;
        self.phase = Phase::Running { step: 0 };
        info!(
            "Encrypting {} characters with shift {} ({} ms per step)",
            self.input.len(),
            shift,
            self.step_delay_ms
        );
        self.step(timers)
    }

    /// Run the step the pending timer was waiting for.
    pub fn step(&mut self, timers: &mut TimerQueue<WheelTask>) -> StepEvent {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }

        let index = match self.phase {
            Phase::Running { step } => step,
            Phase::Idle => return StepEvent::Finished,
        };

        let Some(&plain) = self.input.get(index) else {
            self.phase = Phase::Idle;
            self.highlight = None;
            info!("Encryption finished: {}", self.revealed);
            return StepEvent::Finished;
        };

        let cipher = encrypt_letter(plain, self.shift);
        self.highlight = match (Letter::from_char(plain), Letter::from_char(cipher)) {
            (Some(plain), Some(cipher)) => Some(Highlight { plain, cipher }),
            _ => None,
        };
        self.revealed.push(cipher);
        self.phase = Phase::Running { step: index + 1 };
        self.pending = Some(timers.schedule(self.step_delay_ms, WheelTask::AnimationStep));
        debug!("Step {}/{}: {plain:?} -> {cipher:?}", index + 1, self.input.len());

        StepEvent::Revealed {
            index,
            plain,
            cipher,
            highlight: self.highlight,
        }
    }

    /// Abandon the current run. The revealed output so far is kept.
    pub fn cancel(&mut self, timers: &mut TimerQueue<WheelTask>) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
            debug!("Cancelled pending animation step");
        }
        self.phase = Phase::Idle;
        self.highlight = None;
    }
}
