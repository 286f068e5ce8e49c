//! Audio system using Web Audio API
//!
//! Procedurally generated 8-bit style sound effects - no external files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bullet fired
    Shoot,
    /// Reload started
    Reload,
    /// Enemy destroyed
    EnemyDeath,
    /// Player took contact damage
    PlayerDamage,
}

/// Looping background riff, one square-wave note per step
const MUSIC_NOTES: [f32; 8] = [440.0, 494.0, 523.0, 587.0, 659.0, 587.0, 523.0, 494.0];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Shared gain node the music notes route through
    music_gain: Option<GainNode>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    note_index: usize,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }

        let music_gain = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(0.3);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });

        Self {
            ctx,
            music_gain,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            note_index: 0,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect (fire-and-forget)
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            // Descending chirp, A5 -> A4
            SoundEffect::Shoot => self.play_sweep(ctx, 880.0, 440.0, 0.1, vol * 0.3),
            // Rising sweep, A4 -> A5
            SoundEffect::Reload => self.play_sweep(ctx, 440.0, 880.0, 0.2, vol * 0.2),
            // Low descend, A3 -> A2
            SoundEffect::EnemyDeath => self.play_sweep(ctx, 220.0, 110.0, 0.15, vol * 0.2),
            // Deep thud, A2 -> A1
            SoundEffect::PlayerDamage => self.play_sweep(ctx, 110.0, 55.0, 0.1, vol * 0.2),
        }
    }

    /// Advance the background music by one note
    ///
    /// The host calls this every 500 ms while the session is running.
    pub fn music_step(&mut self) {
        if self.muted || self.master_volume * self.music_volume <= 0.0 {
            return;
        }
        let (Some(ctx), Some(music_gain)) = (&self.ctx, &self.music_gain) else {
            return;
        };

        let freq = MUSIC_NOTES[self.note_index];
        self.note_index = (self.note_index + 1) % MUSIC_NOTES.len();

        let Some((osc, gain)) = create_osc(ctx, freq, OscillatorType::Square) else {
            return;
        };
        // Reroute through the shared music gain instead of the destination
        let _ = gain.disconnect();
        if gain.connect_with_audio_node(music_gain).is_err() {
            return;
        }

        let t = ctx.current_time();
        let vol = self.master_volume * self.music_volume;
        gain.gain().set_value_at_time(vol * 0.1, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Restart the riff from the top (on session start)
    pub fn reset_music(&mut self) {
        self.note_index = 0;
    }

    /// Square-wave frequency sweep with an exponential fade-out
    fn play_sweep(&self, ctx: &AudioContext, from: f32, to: f32, secs: f64, vol: f32) {
        let Some((osc, gain)) = create_osc(ctx, from, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + secs)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + secs)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + secs).ok();
    }
}

/// Create an oscillator with a gain envelope wired to the destination
fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}
