//! WebAudio synthesis graphs, one constructor per instrument.
//!
//! Every call builds an independent short-lived chain (source, optional
//! filter, decaying gain envelope) scheduled against absolute audio-clock
//! timestamps and self-disposing at its stop time. No voices are pooled or
//! reused.

use crate::constants::MASTER_GAIN;
use crate::core::StepTriggers;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

// Envelope floor for exponential ramps; WebAudio rejects a target of zero.
const ENV_FLOOR: f32 = 0.001;

const KICK_SEC: f64 = 0.5;
const SNARE_SEC: f64 = 0.2;
const HAT_SEC: f64 = 0.05;
const BASS_SEC: f64 = 0.4;

pub struct AudioBank {
    ctx: web::AudioContext,
    master: web::GainNode,
    noise: web::AudioBuffer,
}

impl AudioBank {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {e:?}"))?;
        let master = web::GainNode::new(&ctx).map_err(|e| anyhow::anyhow!("GainNode: {e:?}"))?;
        master.gain().set_value(MASTER_GAIN);
        _ = master.connect_with_audio_node(&ctx.destination());
        let noise = build_noise_buffer(&ctx)?;
        Ok(Self { ctx, master, noise })
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    /// Resume a context suspended by the autoplay policy. Recoverable: if the
    /// resume never lands, the visual half of the engine keeps running.
    pub fn ensure_running(&self) {
        if self.ctx.state() == web::AudioContextState::Suspended {
            if let Ok(p) = self.ctx.resume() {
                wasm_bindgen_futures::spawn_local(async move {
                    if JsFuture::from(p).await.is_ok() {
                        log::info!("[audio] context resumed");
                    }
                });
            }
        }
    }

    /// Silence in-flight synthesis and release the context. Called once, on
    /// engine teardown.
    pub fn silence(&self) {
        self.master.gain().set_value(0.0);
        _ = self.ctx.close();
    }

    /// Schedule every instrument a step triggers, at the step's exact time.
    pub fn dispatch(&self, t: f64, triggers: &StepTriggers) {
        if triggers.kick {
            self.kick(t);
        }
        if triggers.snare {
            self.snare(t);
        }
        if triggers.hat {
            self.hat(t);
        }
        if let Some(hz) = triggers.bass_hz {
            self.bass(t, hz);
        }
    }

    /// Pitched sine drop with a matching gain decay.
    pub fn kick(&self, t: f64) {
        let Ok(osc) = web::OscillatorNode::new(&self.ctx) else {
            return;
        };
        osc.set_type(web::OscillatorType::Sine);
        _ = osc.frequency().set_value_at_time(150.0, t);
        _ = osc
            .frequency()
            .exponential_ramp_to_value_at_time(40.0, t + KICK_SEC);
        let Some(gain) = self.envelope(1.0, t, KICK_SEC) else {
            return;
        };
        _ = osc.connect_with_audio_node(&gain);
        _ = osc.start_with_when(t);
        _ = osc.stop_with_when(t + KICK_SEC);
    }

    /// High-passed noise burst.
    pub fn snare(&self, t: f64) {
        self.filtered_noise(t, 1000.0, 0.7, SNARE_SEC);
    }

    /// Shorter, more aggressively filtered noise tick.
    pub fn hat(&self, t: f64) {
        self.filtered_noise(t, 7000.0, 0.35, HAT_SEC);
    }

    /// Filtered sawtooth with a frequency-sweeping "wah" lowpass.
    pub fn bass(&self, t: f64, hz: f32) {
        let Ok(osc) = web::OscillatorNode::new(&self.ctx) else {
            return;
        };
        osc.set_type(web::OscillatorType::Sawtooth);
        osc.frequency().set_value(hz);
        let Ok(lp) = web::BiquadFilterNode::new(&self.ctx) else {
            return;
        };
        lp.set_type(web::BiquadFilterType::Lowpass);
        lp.q().set_value(8.0);
        _ = lp.frequency().set_value_at_time(120.0, t);
        _ = lp
            .frequency()
            .exponential_ramp_to_value_at_time(900.0, t + BASS_SEC * 0.4);
        _ = lp
            .frequency()
            .exponential_ramp_to_value_at_time(120.0, t + BASS_SEC);
        let Some(gain) = self.envelope(0.5, t, BASS_SEC) else {
            return;
        };
        _ = osc.connect_with_audio_node(&lp);
        _ = lp.connect_with_audio_node(&gain);
        _ = osc.start_with_when(t);
        _ = osc.stop_with_when(t + BASS_SEC);
    }

    fn filtered_noise(&self, t: f64, cutoff_hz: f32, level: f32, dur: f64) {
        let Ok(src) = web::AudioBufferSourceNode::new(&self.ctx) else {
            return;
        };
        src.set_buffer(Some(&self.noise));
        let Ok(hp) = web::BiquadFilterNode::new(&self.ctx) else {
            return;
        };
        hp.set_type(web::BiquadFilterType::Highpass);
        hp.frequency().set_value(cutoff_hz);
        let Some(gain) = self.envelope(level, t, dur) else {
            return;
        };
        _ = src.connect_with_audio_node(&hp);
        _ = hp.connect_with_audio_node(&gain);
        _ = src.start_with_when(t);
        _ = src.stop_with_when(t + dur);
    }

    /// Gain node with an exponential decay from `level` to the envelope
    /// floor over `dur`, wired into the master bus.
    fn envelope(&self, level: f32, t: f64, dur: f64) -> Option<web::GainNode> {
        let gain = web::GainNode::new(&self.ctx).ok()?;
        _ = gain.gain().set_value_at_time(level, t);
        _ = gain
            .gain()
            .exponential_ramp_to_value_at_time(ENV_FLOOR, t + dur);
        _ = gain.connect_with_audio_node(&self.master);
        Some(gain)
    }
}

/// Half a second of deterministic white noise, shared by the noise-based
/// instruments. Each hit reads it through its own buffer source.
fn build_noise_buffer(ctx: &web::AudioContext) -> anyhow::Result<web::AudioBuffer> {
    let sr = ctx.sample_rate();
    let len = (sr * 0.5) as u32;
    let buf = ctx
        .create_buffer(1, len, sr)
        .map_err(|e| anyhow::anyhow!("noise buffer: {e:?}"))?;
    // xorshift32 so the texture is identical across loads
    let mut seed: u32 = 0x1234_ABCD;
    let mut data = vec![0.0_f32; len as usize];
    for v in data.iter_mut() {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        *v = (seed as f32 / u32::MAX as f32) * 2.0 - 1.0;
    }
    _ = buf.copy_to_channel(&mut data, 0);
    Ok(buf)
}
