use std::path::PathBuf;

use crate::controller::PlayerContext;
use crate::engine::{AudioEngine, EffectKind, FilterKind};

/// Playback state as seen from the control layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded, or the last track ran to its end
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

/// One row of the equalizer panel
#[derive(Debug, Clone, PartialEq)]
pub struct EffectStatus {
    pub kind: EffectKind,
    pub bypassed: Option<bool>,
    pub cutoff_hz: Option<f32>,
}

impl EffectStatus {
    /// Caption of the panel toggle for this unit
    pub fn caption(&self) -> &'static str {
        match self.bypassed {
            Some(false) => "On",
            Some(true) => "Off",
            None => "?",
        }
    }
}

/// Snapshot of the player for display.
///
/// Fields the engine refused to report are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub track: Option<PathBuf>,
    pub position_ms: Option<u32>,
    pub length_ms: Option<u32>,
    pub volume: Option<f32>,
    pub effects: Vec<EffectStatus>,
}

impl PlayerStatus {
    pub fn capture<E: AudioEngine>(ctx: &mut PlayerContext<E>) -> Self {
        let track = ctx.track().map(PathBuf::from);

        let (state, position_ms, length_ms) = if ctx.active_channel().is_some() {
            let transport = ctx.transport();
            let state = match transport.is_paused() {
                Ok(true) => PlaybackState::Paused,
                Ok(false) => PlaybackState::Playing,
                Err(_) => PlaybackState::Idle,
            };
            (state, transport.position_ms().ok(), transport.length_ms().ok().flatten())
        } else {
            (PlaybackState::Idle, None, None)
        };

        let volume = ctx.volume().level().ok();

        let effects = {
            let effects = ctx.effects();
            EffectKind::ALL
                .iter()
                .map(|&kind| {
                    let cutoff_hz = match kind {
                        EffectKind::LowPass => effects.cutoff(FilterKind::LowPass).ok(),
                        EffectKind::HighPass => effects.cutoff(FilterKind::HighPass).ok(),
                        _ => None,
                    };
                    EffectStatus {
                        kind,
                        bypassed: effects.is_bypassed(kind).ok(),
                        cutoff_hz,
                    }
                })
                .collect()
        };

        Self {
            state,
            track,
            position_ms,
            length_ms,
            volume,
            effects,
        }
    }

    /// Fraction of the track already played, 0.0 when unknown
    pub fn progress(&self) -> f32 {
        match (self.position_ms, self.length_ms) {
            (Some(position), Some(length)) if length > 0 => {
                (position as f32 / length as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
