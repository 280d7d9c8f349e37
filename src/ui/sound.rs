/// Sound cues: short procedural effects played through rodio.
///
/// Every cue is synthesised once into an in-memory WAV buffer at start-up.
/// Playback is fire-and-forget. Build without the "sound" feature to get a
/// silent stub with the same API.

use crate::sim::event::GameEvent;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{gen_break, gen_clear, gen_crush, gen_item, gen_spawn, make_wav};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_item: Arc<Vec<u8>>,
        sfx_break: Arc<Vec<u8>>,
        sfx_spawn: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_crush: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_item: Arc::new(make_wav(&gen_item())),
                sfx_break: Arc::new(make_wav(&gen_break())),
                sfx_spawn: Arc::new(make_wav(&gen_spawn())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_crush: Arc::new(make_wav(&gen_crush())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("sound sink failed: {e}");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_item(&self) { self.play(&self.sfx_item); }
        pub fn play_break(&self) { self.play(&self.sfx_break); }
        pub fn play_spawn(&self) { self.play(&self.sfx_spawn); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_crush(&self) { self.play(&self.sfx_crush); }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_item(&self) {}
    pub fn play_break(&self) {}
    pub fn play_spawn(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_crush(&self) {}
}

impl SoundEngine {
    /// Play the cue for an engine event, if it has one.
    pub fn play_event(&self, event: &GameEvent) {
        match event {
            GameEvent::ItemCollected { .. } => self.play_item(),
            GameEvent::BoxesBroken { .. } => self.play_break(),
            GameEvent::TileSpawned { .. } => self.play_spawn(),
            GameEvent::LevelCleared { .. } => self.play_clear(),
            GameEvent::PlayerCrushed { .. } => self.play_crush(),
            _ => {}
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators (mono f32 samples)
// ════════════════════════════════════════════════════════════

const TAU: f32 = std::f32::consts::TAU;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn samples_for(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

/// Notes played back to back, each with a linear decay.
/// `harmonic` mixes in the 2nd partial for a brighter tone.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_notes(notes: &[f32], note_dur: f32, harmonic: f32, volume: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &freq in notes {
        let n = samples_for(note_dur);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            let wave = (t * freq * TAU).sin() * (1.0 - harmonic)
                + (t * freq * 2.0 * TAU).sin() * harmonic;
            samples.push(wave * env * volume);
        }
    }
    samples
}

/// Item pickup: bright two-note ding.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_item() -> Vec<f32> {
    gen_notes(&[1319.0, 1760.0], 0.05, 0.3, 0.25) // E6, A6
}

/// Fixed so the break cue sounds the same every run.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const BREAK_NOISE_SEED: u64 = 0x2545_f491;

/// Boxes breaking: noise burst over a falling thud.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_break() -> Vec<f32> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let n = samples_for(0.18);
    let mut rng = StdRng::seed_from_u64(BREAK_NOISE_SEED);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = 160.0 - t * 90.0;
            let tone = (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin();
            let noise: f32 = rng.random_range(-1.0..1.0);
            (tone * 0.5 + noise * 0.5) * (1.0 - t).powf(1.5) * 0.35
        })
        .collect()
}

/// Dropper spawning a tile: quick low click.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_spawn() -> Vec<f32> {
    gen_notes(&[220.0], 0.04, 0.5, 0.2)
}

/// Level cleared: rising arpeggio.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_clear() -> Vec<f32> {
    let mut samples = gen_notes(&[523.0, 659.0, 784.0], 0.09, 0.25, 0.3);
    samples.extend(gen_notes(&[1047.0], 0.3, 0.25, 0.3));
    samples
}

/// Crushed: slow falling tone with a tail fade.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_crush() -> Vec<f32> {
    let n = samples_for(0.6);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = 330.0 - t * 220.0;
            let wave = (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin();
            wave * (1.0 - t) * 0.35
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: 16-bit mono PCM
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let channels: u16 = 1;
    let bits: u16 = 16;
    let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
    let block_align = channels * bits / 8;
    let data_size = samples.len() as u32 * 2;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}
