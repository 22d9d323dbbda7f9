//! Distance-driven ambience.
//!
//! The server never touches an audio device. It turns the pursuer and exit
//! distances into smoothed synth parameters and leaves the browser to play
//! them. Smoothing mirrors Web Audio's `setTargetAtTime`: every parameter
//! decays exponentially toward its target with a per-parameter time
//! constant.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The heartbeat starts within this many cells of the pursuer
const HEARTBEAT_RANGE: f32 = 4.0;
/// Footstep thumps join in at this distance
const FOOTSTEP_RANGE: usize = 3;
/// The hope pad swells within this many cells of the exit
const HOPE_RANGE: f32 = 3.0;

const HEARTBEAT_MAX_GAIN: f32 = 0.12;
const HEARTBEAT_BASE_PITCH: f32 = 50.0;
const HEARTBEAT_IDLE_PULSE: f32 = 1.0;

const HOPE_MAX_GAIN: f32 = 0.28;
const HOPE_ROOT: f32 = 330.0;
const HOPE_FIFTH: f32 = 495.0;
const HOPE_BASE_SHIMMER: f32 = 1.5;

/// The ambient drone comes in this long after a run starts
const DRONE_DELAY: Duration = Duration::from_millis(100);

/// One-shot sounds the client should synthesize immediately
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Ping,
    Step,
    Die,
    Win,
}

impl Cue {
    /// Oscillator frequencies the cue is built from, in Hz
    pub fn frequencies(self) -> &'static [f32] {
        match self {
            Cue::Ping => &[880.0, 440.0],
            Cue::Step => &[100.0, 50.0],
            Cue::Win => &[523.25, 659.25, 783.99, 1046.5],
            Cue::Die => &[300.0, 200.0, 100.0, 50.0],
        }
    }
}

/// Low pulsing drone that quickens as the pursuer closes in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Heartbeat {
    pub gain: f32,
    pub pulse_hz: f32,
    pub pitch_hz: f32,
    /// Gap between footstep thumps; absent when the pursuer is not close
    pub footstep_ms: Option<u64>,
}

/// Two sines a fifth apart, swelling near the exit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HopePad {
    pub gain: f32,
    pub root_hz: f32,
    pub fifth_hz: f32,
    pub shimmer_hz: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioFrame {
    pub muted: bool,
    /// Ambient drone under the whole run
    pub drone: bool,
    pub heartbeat: Heartbeat,
    pub hope: HopePad,
}

impl Heartbeat {
    fn silent() -> Self {
        Self {
            gain: 0.0,
            pulse_hz: HEARTBEAT_IDLE_PULSE,
            pitch_hz: HEARTBEAT_BASE_PITCH,
            footstep_ms: None,
        }
    }
}

impl HopePad {
    fn silent() -> Self {
        Self {
            gain: 0.0,
            root_hz: HOPE_ROOT,
            fifth_hz: HOPE_FIFTH,
            shimmer_hz: HOPE_BASE_SHIMMER,
        }
    }
}

/// Holds the current parameter values between updates
#[derive(Debug, Clone)]
pub struct AudioMixer {
    heartbeat: Heartbeat,
    hope: HopePad,
    /// Audible time since the last reset
    running: Duration,
}

impl AudioMixer {
    pub fn new() -> Self {
        Self {
            heartbeat: Heartbeat::silent(),
            hope: HopePad::silent(),
            running: Duration::ZERO,
        }
    }

    /// Drop every voice to silence at once
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reset and report the silence, drone included
    pub fn silenced(&mut self, muted: bool) -> AudioFrame {
        self.reset();
        self.frame(muted, false)
    }

    pub fn update(
        &mut self,
        pursuer_distance: usize,
        exit_distance: usize,
        muted: bool,
        dt: Duration,
    ) -> AudioFrame {
        if muted {
            return self.silenced(true);
        }

        self.running += dt;
        let dt = dt.as_secs_f32();
        self.update_heartbeat(pursuer_distance, dt);
        self.update_hope(exit_distance, dt);
        self.frame(false, self.running >= DRONE_DELAY)
    }

    fn update_heartbeat(&mut self, distance: usize, dt: f32) {
        let hb = &mut self.heartbeat;

        if distance as f32 <= HEARTBEAT_RANGE {
            let intensity = ((HEARTBEAT_RANGE - distance as f32) / HEARTBEAT_RANGE).clamp(0.0, 1.0);

            hb.gain = approach(hb.gain, HEARTBEAT_MAX_GAIN * intensity, dt, 0.08);
            hb.pulse_hz = approach(hb.pulse_hz, 1.0 + intensity * 3.0, dt, 0.08);
            hb.pitch_hz = approach(hb.pitch_hz, HEARTBEAT_BASE_PITCH + intensity * 30.0, dt, 0.12);
            hb.footstep_ms = (distance <= FOOTSTEP_RANGE)
                .then(|| (700.0 - intensity * 500.0).max(180.0) as u64);
        } else {
            hb.gain = approach(hb.gain, 0.0, dt, 0.3);
            hb.pulse_hz = approach(hb.pulse_hz, HEARTBEAT_IDLE_PULSE, dt, 0.3);
            hb.footstep_ms = None;
        }
    }

    fn update_hope(&mut self, distance: usize, dt: f32) {
        let pad = &mut self.hope;

        if distance as f32 <= HOPE_RANGE {
            let h = ((HOPE_RANGE - distance as f32) / HOPE_RANGE).clamp(0.0, 1.0);

            pad.gain = approach(pad.gain, HOPE_MAX_GAIN * h, dt, 0.25);
            pad.root_hz = approach(pad.root_hz, HOPE_ROOT + h * 18.0, dt, 0.3);
            pad.fifth_hz = approach(pad.fifth_hz, HOPE_FIFTH + h * 28.0, dt, 0.3);
            pad.shimmer_hz = approach(pad.shimmer_hz, HOPE_BASE_SHIMMER + h * 1.5, dt, 0.3);
        } else {
            pad.gain = approach(pad.gain, 0.0, dt, 0.4);
        }
    }

    fn frame(&self, muted: bool, drone: bool) -> AudioFrame {
        AudioFrame {
            muted,
            drone,
            heartbeat: self.heartbeat,
            hope: self.hope,
        }
    }
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential approach of `current` toward `target` with time constant `tau`
fn approach(current: f32, target: f32, dt: f32, tau: f32) -> f32 {
    target + (current - target) * (-dt / tau).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(180);

    fn settle(mixer: &mut AudioMixer, pursuer: usize, exit: usize) -> AudioFrame {
        let mut frame = mixer.update(pursuer, exit, false, TICK);
        for _ in 0..100 {
            frame = mixer.update(pursuer, exit, false, TICK);
        }
        frame
    }

    #[test]
    fn test_silent_when_everything_is_far() {
        let mut mixer = AudioMixer::new();
        let frame = settle(&mut mixer, 12, 10);
        assert!(frame.heartbeat.gain < 1e-4);
        assert!(frame.hope.gain < 1e-4);
        assert_eq!(frame.heartbeat.footstep_ms, None);
    }

    #[test]
    fn test_heartbeat_converges_to_targets() {
        let mut mixer = AudioMixer::new();
        let frame = settle(&mut mixer, 2, 10);
        // intensity = 0.5
        assert!((frame.heartbeat.gain - 0.06).abs() < 1e-3);
        assert!((frame.heartbeat.pulse_hz - 2.5).abs() < 1e-3);
        assert!((frame.heartbeat.pitch_hz - 65.0).abs() < 1e-3);
        assert_eq!(frame.heartbeat.footstep_ms, Some(450));
    }

    #[test]
    fn test_footsteps_only_when_close() {
        let mut mixer = AudioMixer::new();
        assert_eq!(mixer.update(4, 10, false, TICK).heartbeat.footstep_ms, None);
        assert_eq!(mixer.update(3, 10, false, TICK).heartbeat.footstep_ms, Some(575));
        assert_eq!(mixer.update(0, 10, false, TICK).heartbeat.footstep_ms, Some(200));
    }

    #[test]
    fn test_transitions_are_smooth() {
        let mut mixer = AudioMixer::new();
        let first = mixer.update(0, 10, false, TICK);
        // One tick moves part of the way, not all of it
        assert!(first.heartbeat.gain > 0.0);
        assert!(first.heartbeat.gain < HEARTBEAT_MAX_GAIN);
    }

    #[test]
    fn test_hope_pad_rises_near_exit() {
        let mut mixer = AudioMixer::new();
        let frame = settle(&mut mixer, 12, 0);
        assert!((frame.hope.gain - HOPE_MAX_GAIN).abs() < 1e-3);
        assert!((frame.hope.root_hz - 348.0).abs() < 1e-2);
        assert!((frame.hope.fifth_hz - 523.0).abs() < 1e-2);
        assert!((frame.hope.shimmer_hz - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_mute_silences_immediately() {
        let mut mixer = AudioMixer::new();
        settle(&mut mixer, 0, 0);
        let frame = mixer.update(0, 0, true, TICK);
        assert!(frame.muted);
        assert!(!frame.drone);
        assert_eq!(frame.heartbeat, Heartbeat::silent());
        assert_eq!(frame.hope, HopePad::silent());
    }

    #[test]
    fn test_drone_starts_shortly_after_reset() {
        let mut mixer = AudioMixer::new();
        assert!(!mixer.update(12, 10, false, Duration::ZERO).drone);
        assert!(!mixer.update(12, 10, false, Duration::from_millis(60)).drone);
        assert!(mixer.update(12, 10, false, Duration::from_millis(60)).drone);

        let ended = mixer.silenced(false);
        assert!(!ended.drone);
        assert!(!ended.muted);
        assert!(!mixer.update(12, 10, false, Duration::ZERO).drone);
    }
}
