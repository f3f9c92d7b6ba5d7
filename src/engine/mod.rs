pub mod clock;
pub mod headless;
pub mod opener;

#[cfg(test)]
pub mod faulty;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use clock::{Clock, ManualClock, SystemClock};
pub use headless::HeadlessEngine;
pub use opener::{MemoryOpener, StreamInfo, StreamOpener, SymphoniaOpener};

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

opaque_handle!(
    /// A loaded audio stream owned by the engine
    SoundHandle
);
opaque_handle!(
    /// A live playback channel owned by the engine
    ChannelHandle
);
opaque_handle!(
    /// A DSP unit owned by the engine
    DspHandle
);

/// Effect units the player attaches to the master bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    LowPass,
    HighPass,
    Echo,
    Flange,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::LowPass,
        EffectKind::HighPass,
        EffectKind::Echo,
        EffectKind::Flange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::LowPass => "lowpass",
            EffectKind::HighPass => "highpass",
            EffectKind::Echo => "echo",
            EffectKind::Flange => "flange",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "lowpass" | "low-pass" => Some(EffectKind::LowPass),
            "highpass" | "high-pass" => Some(EffectKind::HighPass),
            "echo" => Some(EffectKind::Echo),
            "flange" => Some(EffectKind::Flange),
            _ => None,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two effect units that carry a cutoff frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    pub fn effect(self) -> EffectKind {
        match self {
            FilterKind::LowPass => EffectKind::LowPass,
            FilterKind::HighPass => EffectKind::HighPass,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match EffectKind::parse(name)? {
            EffectKind::LowPass => Some(FilterKind::LowPass),
            EffectKind::HighPass => Some(FilterKind::HighPass),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.effect().as_str())
    }
}

/// Index of the cutoff frequency parameter on both filter units
pub const CUTOFF_PARAMETER: usize = 0;

/// Commands and queries the player issues to the audio middleware.
///
/// Positions and lengths are in milliseconds. Every call reports a status;
/// the engine does its own decoding and mixing and synchronizes internally.
pub trait AudioEngine {
    /// Open `path` as a streaming sound
    fn create_stream(&mut self, path: &Path) -> Result<SoundHandle, EngineError>;

    fn set_looping(&mut self, sound: SoundHandle, looping: bool) -> Result<(), EngineError>;

    /// `None` when the stream does not report a duration
    fn sound_length_ms(&self, sound: SoundHandle) -> Result<Option<u32>, EngineError>;

    /// Release a sound; channels still playing it are stopped
    fn release_sound(&mut self, sound: SoundHandle) -> Result<(), EngineError>;

    /// Start a new channel for `sound`
    fn play_sound(&mut self, sound: SoundHandle, paused: bool) -> Result<ChannelHandle, EngineError>;

    /// Number of channels that have not been stopped or reached their end
    fn channels_playing(&self) -> Result<usize, EngineError>;

    /// Stop a channel; its handle becomes invalid
    fn stop_channel(&mut self, channel: ChannelHandle) -> Result<(), EngineError>;

    fn is_playing(&self, channel: ChannelHandle) -> Result<bool, EngineError>;

    fn is_paused(&self, channel: ChannelHandle) -> Result<bool, EngineError>;

    fn set_paused(&mut self, channel: ChannelHandle, paused: bool) -> Result<(), EngineError>;

    fn position_ms(&self, channel: ChannelHandle) -> Result<u32, EngineError>;

    fn set_position_ms(&mut self, channel: ChannelHandle, position: u32) -> Result<(), EngineError>;

    fn volume(&self, channel: ChannelHandle) -> Result<f32, EngineError>;

    fn set_volume(&mut self, channel: ChannelHandle, volume: f32) -> Result<(), EngineError>;

    fn create_dsp(&mut self, kind: EffectKind) -> Result<DspHandle, EngineError>;

    /// Insert a DSP unit at the head of the master bus
    fn attach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError>;

    fn detach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError>;

    fn release_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError>;

    fn bypass(&self, dsp: DspHandle) -> Result<bool, EngineError>;

    fn set_bypass(&mut self, dsp: DspHandle, bypass: bool) -> Result<(), EngineError>;

    fn parameter_float(&self, dsp: DspHandle, index: usize) -> Result<f32, EngineError>;

    fn set_parameter_float(&mut self, dsp: DspHandle, index: usize, value: f32) -> Result<(), EngineError>;
}
