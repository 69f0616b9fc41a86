//! Renders one envelope per curve shape into a WAV file.
//!
//! Each shape gets a note held for 400 ms and then released, sampled at
//! 48 kHz, with 100 ms of silence in between. Open the file in an audio
//! editor to compare the shapes side by side.
//!
//! Usage: `cargo run --example render_envelope [output.wav]`
//!
//! Set `RUST_LOG=debug` to see curve bank construction.

use anyhow::{Context, Result};
use contour::{Adsr, CurveBank, CurveShape, ManualClock, Ticks};
use log::info;

const SAMPLE_RATE: u32 = 48_000;
const HOLD_MS: u32 = 400;
const TAIL_MS: u32 = 400;
const GAP_MS: u32 = 100;

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "envelopes.wav".to_string());

    let bank = CurveBank::new(i16::MAX as u32, 2048)?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(&path, spec).with_context(|| format!("creating {}", path))?;

    for shape in CurveShape::ALL {
        let mut env = Adsr::new(&bank, ManualClock::micros())
            .with_attack_curve(shape)
            .with_decay_curve(shape)
            .with_release_curve(shape);
        env.set_attack_ms(80);
        env.set_decay_ms(150);
        env.set_sustain(bank.vertical_resolution() / 2);
        env.set_release_ms(300);

        let hold = samples_for(HOLD_MS);
        let total = hold + samples_for(TAIL_MS);

        env.note_on_at(0);
        let mut peak = 0;
        for n in 0..total {
            let now = sample_time(n);
            if n == hold {
                env.note_off_at(now);
            }
            let level = env.wave_at(now);
            peak = peak.max(level);
            writer.write_sample(level as i16)?;
        }
        for _ in 0..samples_for(GAP_MS) {
            writer.write_sample(0i16)?;
        }

        info!("rendered {} (peak {})", shape.name(), peak);
    }

    writer.finalize()?;
    println!("Wrote {} envelopes to {}", CurveShape::COUNT, path);
    Ok(())
}

fn samples_for(ms: u32) -> u64 {
    SAMPLE_RATE as u64 * ms as u64 / 1_000
}

fn sample_time(n: u64) -> Ticks {
    (n * 1_000_000 / SAMPLE_RATE as u64) as Ticks
}
