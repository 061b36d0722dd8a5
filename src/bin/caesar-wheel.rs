//! Terminal host for the cipher wheel: runs one encryption on a virtual
//! clock, prints each step, and can export the spin audio as a WAV file.

use std::path::PathBuf;
use std::process::ExitCode;

use caesar_wheel::cipher::Shift;
use caesar_wheel::config::WheelConfig;
use caesar_wheel::dsp::renderer::{encode_wav, render_run};
use caesar_wheel::error::WheelError;
use clap::Parser;
use log::{error, info};

#[derive(Parser)]
#[command(name = "caesar-wheel")]
#[command(about = "Animate a Caesar cipher on a virtual clock and render its wheel sound")]
#[command(version = caesar_wheel::VERSION)]
struct Cli {
    /// Text to encrypt (upper-cased before encryption)
    text: String,

    /// Shift 0-25 (overrides the config file)
    #[arg(long, short)]
    shift: Option<i64>,

    /// Milliseconds between revealed characters (overrides the config file)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the run's audio to this WAV file
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Sample rate for the WAV export (overrides the config file)
    #[arg(long)]
    sample_rate: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), WheelError> {
    let mut config = match &cli.config {
        Some(path) => WheelConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => WheelConfig::default(),
    };
    apply_overrides(&cli, &mut config)?;

    let run = render_run(&config, &cli.text);

    println!("Shift: {}", config.initial_shift);
    for step in &run.steps {
        println!(
            "{:>6} ms  [{}/{}]  {} -> {}",
            step.at_ms,
            step.index + 1,
            run.steps.len(),
            step.plain,
            step.cipher
        );
    }
    println!("{}", run.output);

    if let Some(path) = &cli.wav {
        if run.sample_rate == 0 {
            return Err(WheelError::AudioUnavailable(if config.audio.enabled {
                format!("cannot render at {} Hz", config.audio.sample_rate)
            } else {
                "disabled by config".to_string()
            }));
        }
        std::fs::write(path, encode_wav(&run.samples, run.sample_rate))?;
        info!("Wrote {} samples to {}", run.samples.len(), path.display());
    }
    Ok(())
}

/// Layer the command-line flags over the loaded config. Only flags that were
/// given replace a value.
fn apply_overrides(cli: &Cli, config: &mut WheelConfig) -> Result<(), WheelError> {
    if let Some(shift) = cli.shift {
        config.initial_shift = Shift::new(shift)?;
    }
    if let Some(delay) = cli.delay_ms {
        config.step_delay_ms = delay;
    }
    if let Some(rate) = cli.sample_rate {
        config.audio.sample_rate = rate as f64;
    }
    // Audio is only rendered for an export, and never when the config turns it off.
    config.audio.enabled &= cli.wav.is_some();
    config.validate()
}
