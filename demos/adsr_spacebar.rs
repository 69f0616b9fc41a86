//! Interactive ADSR envelope demo.
//!
//! Hold SPACE to play a note; the envelope runs Attack, Decay and Sustain
//! while the key is down and Release once it is let go. Hold J as a second
//! finger to hear legato retriggering: release only starts when both keys
//! are up.
//!
//! Controls:
//! - SPACE / J: play
//! - 1-8: curve shape for every phase
//! - R: toggle restarting the attack from zero on retrigger
//! - Q/ESC: quit
//!
//! Set `RUST_LOG=debug` to see curve bank construction.

use anyhow::{Result, anyhow};
use contour::{Adsr, Clock, CurveBank, CurveShape, Resolution, Ticks};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use std::f64::consts::TAU;
use std::io::{Write, stdout};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

const NOTE_FREQ: f64 = 220.0;

static BANK: LazyLock<CurveBank> = LazyLock::new(CurveBank::default);

/// Time measured in output samples, so envelope timing is sample-accurate
/// regardless of how the audio callback batches its buffers.
struct SampleClock {
    samples: u64,
    sample_rate: u64,
}

impl SampleClock {
    fn tick(&mut self) {
        self.samples += 1;
    }
}

impl Clock for SampleClock {
    fn resolution(&self) -> Resolution {
        Resolution::Micros
    }

    fn now(&self) -> Ticks {
        (self.samples * 1_000_000 / self.sample_rate) as Ticks
    }
}

struct AudioState {
    phase: f64,
    phase_step: f64,
    envelope: Adsr<'static, SampleClock>,
    keys_down: [bool; 2],
    shape: CurveShape,
}

impl AudioState {
    fn new(sample_rate: u32) -> Self {
        let clock = SampleClock {
            samples: 0,
            sample_rate: sample_rate as u64,
        };
        let mut envelope = Adsr::new(&BANK, clock);
        envelope.set_attack_ms(50);
        envelope.set_decay_ms(150);
        envelope.set_sustain(BANK.vertical_resolution() * 7 / 10);
        envelope.set_release_ms(400);

        Self {
            phase: 0.0,
            phase_step: TAU * NOTE_FREQ / sample_rate as f64,
            envelope,
            keys_down: [false; 2],
            shape: CurveShape::default(),
        }
    }

    fn handle_key_event(&mut self, code: KeyCode, kind: KeyEventKind) {
        let finger = match code {
            KeyCode::Char(' ') => 0,
            KeyCode::Char('j') | KeyCode::Char('J') => 1,
            KeyCode::Char(c @ '1'..='8') if kind == KeyEventKind::Press => {
                let index = c as usize - '1' as usize;
                self.set_shape(CurveShape::from_index_clamped(index));
                return;
            }
            KeyCode::Char('r') | KeyCode::Char('R') if kind == KeyEventKind::Press => {
                let reset = !self.envelope.params().reset_attack_on_retrigger;
                self.envelope.set_reset_attack_on_retrigger(reset);
                return;
            }
            _ => return,
        };

        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat if !self.keys_down[finger] => {
                self.keys_down[finger] = true;
                self.envelope.note_on();
            }
            KeyEventKind::Release if self.keys_down[finger] => {
                self.keys_down[finger] = false;
                self.envelope.note_off();
            }
            _ => {}
        }
    }

    fn set_shape(&mut self, shape: CurveShape) {
        self.shape = shape;
        self.envelope.set_attack_curve(shape);
        self.envelope.set_decay_curve(shape);
        self.envelope.set_release_curve(shape);
    }

    fn next_sample(&mut self) -> f64 {
        let level = self.envelope.wave() as f64 / self.envelope.vertical_resolution() as f64;
        self.envelope.clock_mut().tick();

        let sample = self.phase.sin();
        self.phase = (self.phase + self.phase_step) % TAU;
        sample * level * 0.3
    }
}

type SharedState = Arc<Mutex<AudioState>>;

/// Fills every channel of each output frame with the next envelope sample.
fn open_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    state: SharedState,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f64>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut state) = state.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels) {
                frame.fill(T::from_sample(state.next_sample()));
            }
        },
        |err| error!("audio stream error: {}", err),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

/// Raw mode on the alternate screen, with key release reporting. Dropping
/// the guard restores the terminal, also while a panic unwinds.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> Result<Self> {
        // Enhancement flags go in before the alternate screen
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(crossterm::cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
        let _ = stdout().execute(crossterm::cursor::Show);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn draw_ui(state: &AudioState) -> Result<()> {
    let mut stdout = stdout();
    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "ADSR: {:<8} | curve: {:<10} | reset on retrigger: {:<3} | held: {}\r\n",
        format!("{:?}", state.envelope.phase()),
        state.shape.name(),
        if state.envelope.params().reset_attack_on_retrigger { "on" } else { "off" },
        state.envelope.press_count(),
    )?;
    write!(stdout, "SPACE/J=play  1-8=curve  R=retrigger mode  Q=quit")?;
    stdout.flush()?;
    Ok(())
}

fn lock(state: &SharedState) -> Result<std::sync::MutexGuard<'_, AudioState>> {
    state.lock().map_err(|_| anyhow!("audio state lock poisoned"))
}

fn main() -> Result<()> {
    env_logger::init();

    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| anyhow!("no output device available"))?;
    let supported = device.default_output_config()?;
    let sample_rate = supported.sample_rate().0;
    info!("output device at {} Hz, {:?}", sample_rate, supported.sample_format());

    let state = Arc::new(Mutex::new(AudioState::new(sample_rate)));
    let format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let _stream = match format {
        SampleFormat::F32 => open_stream::<f32>(&device, &config, state.clone())?,
        SampleFormat::I16 => open_stream::<i16>(&device, &config, state.clone())?,
        SampleFormat::U16 => open_stream::<u16>(&device, &config, state.clone())?,
        other => return Err(anyhow!("unsupported sample format: {}", other)),
    };

    let terminal = RawTerminal::enter()?;
    draw_ui(&*lock(&state)?)?;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Press
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        {
            break;
        }

        let mut guard = lock(&state)?;
        guard.handle_key_event(key.code, key.kind);
        draw_ui(&guard)?;
    }

    drop(terminal);
    println!("\nGoodbye!");
    Ok(())
}
