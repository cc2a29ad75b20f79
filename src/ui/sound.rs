/// Sound effects: procedural chiptune blips played through rodio.
///
/// Every effect is synthesised into an in-memory WAV buffer once at start-up
/// and played fire-and-forget. `Sfx::for_event` decides which game events
/// make a sound.
///
/// Without the "sound" feature, or without an audio device, `SoundEngine`
/// is silent.

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Jump,
    BarrelJumped,
    Smash,
    Pickup,
    Shot,
    Banana,
    BossHit,
    LevelCleared,
    GameLost,
}

impl Sfx {
    pub const ALL: [Sfx; 9] = [
        Sfx::Jump,
        Sfx::BarrelJumped,
        Sfx::Smash,
        Sfx::Pickup,
        Sfx::Shot,
        Sfx::Banana,
        Sfx::BossHit,
        Sfx::LevelCleared,
        Sfx::GameLost,
    ];

    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::BarrelJumped => Some(Sfx::BarrelJumped),
            GameEvent::BarrelSmashed | GameEvent::MonkeySmashed | GameEvent::MonkeyShot => Some(Sfx::Smash),
            GameEvent::WeaponPicked(_) => Some(Sfx::Pickup),
            GameEvent::Shot { .. } => Some(Sfx::Shot),
            GameEvent::BananaThrown => Some(Sfx::Banana),
            GameEvent::BossHit { .. } => Some(Sfx::BossHit),
            GameEvent::LevelCleared { .. } | GameEvent::GameWon => Some(Sfx::LevelCleared),
            GameEvent::GameLost => Some(Sfx::GameLost),
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed by `Sfx as usize`.
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let buffers = Sfx::ALL.iter().map(|s| Arc::new(make_wav(&generate(*s)))).collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx as usize) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    fn generate(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Jump => sweep(300.0, 700.0, 0.12, 0.22),
            Sfx::BarrelJumped => notes(&[(880.0, 0.05), (1175.0, 0.08)], 0.22),
            Sfx::Smash => noise_burst(0.14, 0.3),
            Sfx::Pickup => notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.07)], 0.25),
            Sfx::Shot => sweep(1400.0, 500.0, 0.07, 0.2),
            Sfx::Banana => sweep(500.0, 350.0, 0.1, 0.15),
            Sfx::BossHit => sweep(180.0, 70.0, 0.16, 0.35),
            Sfx::LevelCleared => notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], 0.3),
            Sfx::GameLost => notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.3)], 0.3),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveforms (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sine with a 3rd harmonic, frequency gliding linearly from `from` to `to`.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                let wave = (phase * TAU).sin() * 0.75 + (phase * 3.0 * TAU).sin() * 0.25;
                wave * (1.0 - t).powf(0.7) * volume
            })
            .collect()
    }

    /// A run of plucked notes; each decays over its own length.
    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = sample_count(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// LCG noise over a falling low tone.
    fn noise_burst(duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * (220.0 - 120.0 * t) * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.4 + noise * 0.6) * (1.0 - t).powf(0.8) * volume
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  16-bit PCM WAV encoder
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let block_align = channels * bits / 8;
        let byte_rate = SAMPLE_RATE * u32::from(block_align);
        let data_size = samples.len() as u32 * u32::from(block_align);

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

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_effect_has_audible_samples() {
            for sfx in Sfx::ALL {
                let s = generate(sfx);
                assert!(!s.is_empty(), "{sfx:?}");
                assert!(s.iter().all(|v| v.abs() <= 1.0), "{sfx:?}");
            }
        }

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&[0.0, 0.5, -0.5]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public engine (silent stub without the "sound" feature)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

/// Play the effect for each event that has one.
pub fn play_events(engine: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(engine) = engine else { return };
    for sfx in events.iter().filter_map(Sfx::for_event) {
        engine.play(sfx);
    }
}
