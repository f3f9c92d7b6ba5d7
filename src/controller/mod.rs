//! Control layer between user commands and the audio engine.
//!
//! [`PlayerContext`] owns the engine together with the handles the player
//! is currently using. The four controllers are short-lived views borrowed
//! from the context: [`Transport`], [`Volume`], [`Effects`] and
//! [`Selection`].

pub mod effects;
pub mod selection;
pub mod transport;
pub mod volume;

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{AudioEngine, ChannelHandle, DspHandle, EffectKind, SoundHandle};
use crate::error::{ControlError, EngineError};
use crate::logging::{ControlEventKind, EventLog};

pub use effects::{Effects, CUTOFF_MAX_HZ, CUTOFF_MIN_HZ};
pub use selection::{NavControl, Selection};
pub use transport::Transport;
pub use volume::{Volume, VOLUME_STEP_DOWN, VOLUME_STEP_UP};

/// What to do with a failed engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the failure and report success
    #[default]
    Ignore,
    /// Return the failure to the caller
    Propagate,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Ignore => "ignore",
            ErrorPolicy::Propagate => "propagate",
        }
    }
}

/// Tags an engine status with the call that produced it
pub(crate) trait EngineResultExt<T> {
    fn op(self, op: &'static str) -> Result<T, ControlError>;
}

impl<T> EngineResultExt<T> for Result<T, EngineError> {
    fn op(self, op: &'static str) -> Result<T, ControlError> {
        self.map_err(|e| ControlError::engine(op, e))
    }
}

/// Reject NaN and infinities before a value is clamped and written
pub(crate) fn finite(op: &'static str, value: f32) -> Result<f32, ControlError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ControlError::InvalidValue { op, value })
    }
}

/// The four effect units on the master bus
#[derive(Debug, Clone, Copy)]
pub struct EffectRack {
    low_pass: DspHandle,
    high_pass: DspHandle,
    echo: DspHandle,
    flange: DspHandle,
}

impl EffectRack {
    pub fn handle(&self, kind: EffectKind) -> DspHandle {
        match kind {
            EffectKind::LowPass => self.low_pass,
            EffectKind::HighPass => self.high_pass,
            EffectKind::Echo => self.echo,
            EffectKind::Flange => self.flange,
        }
    }
}

pub struct PlayerContext<E: AudioEngine> {
    engine: E,
    policy: ErrorPolicy,
    sound: Option<SoundHandle>,
    channel: Option<ChannelHandle>,
    track: Option<PathBuf>,
    rack: EffectRack,
    events: EventLog,
}

impl<E: AudioEngine> PlayerContext<E> {
    /// Create the effect units, attach them to the master bus and bypass them.
    ///
    /// Startup failures are always returned, whatever the policy.
    pub fn new(mut engine: E, policy: ErrorPolicy) -> Result<Self, ControlError> {
        let mut build = |kind: EffectKind| -> Result<DspHandle, ControlError> {
            let dsp = engine.create_dsp(kind).op("create_dsp")?;
            engine.attach_dsp(dsp).op("attach_dsp")?;
            engine.set_bypass(dsp, true).op("set_bypass")?;
            Ok(dsp)
        };

        let rack = EffectRack {
            low_pass: build(EffectKind::LowPass)?,
            high_pass: build(EffectKind::HighPass)?,
            echo: build(EffectKind::Echo)?,
            flange: build(EffectKind::Flange)?,
        };
        debug!("Effect rack attached to master bus: {:?}", rack);

        Ok(Self {
            engine,
            policy,
            sound: None,
            channel: None,
            track: None,
            rack,
            events: EventLog::default(),
        })
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = EventLog::new(capacity);
        self
    }

    pub fn transport(&mut self) -> Transport<'_, E> {
        Transport::new(self)
    }

    pub fn volume(&mut self) -> Volume<'_, E> {
        Volume::new(self)
    }

    pub fn effects(&mut self) -> Effects<'_, E> {
        Effects::new(self)
    }

    pub fn selection(&mut self) -> Selection<'_, E> {
        Selection::new(self)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    pub fn rack(&self) -> &EffectRack {
        &self.rack
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn active_sound(&self) -> Option<SoundHandle> {
        self.sound
    }

    pub fn active_channel(&self) -> Option<ChannelHandle> {
        self.channel
    }

    /// Path of the loaded sound
    pub fn track(&self) -> Option<&Path> {
        self.track.as_deref()
    }

    pub(crate) fn channel(&self) -> Result<ChannelHandle, ControlError> {
        self.channel.ok_or(ControlError::NoActiveChannel)
    }

    pub(crate) fn loaded(&self) -> Result<(SoundHandle, ChannelHandle), ControlError> {
        match (self.sound, self.channel) {
            (Some(sound), Some(channel)) => Ok((sound, channel)),
            _ => Err(ControlError::NoActiveChannel),
        }
    }

    pub(crate) fn record(&mut self, kind: ControlEventKind, details: impl Into<String>) {
        self.events.record(kind, details);
    }

    /// Apply the error policy to the outcome of `action`
    pub(crate) fn settle(&mut self, action: &'static str, result: Result<(), ControlError>) -> Result<(), ControlError> {
        match (result, self.policy) {
            (Ok(()), _) => Ok(()),
            (Err(err), ErrorPolicy::Propagate) => Err(err),
            (Err(err), ErrorPolicy::Ignore) => {
                self.events
                    .record(ControlEventKind::ErrorSwallowed, format!("{}: {}", action, err));
                Ok(())
            }
        }
    }

    /// Poll the active channel; clears it once the engine reports it finished
    pub fn poll_finished(&mut self) -> bool {
        let Some(channel) = self.channel else {
            return false;
        };
        match self.engine.is_playing(channel) {
            Ok(true) => false,
            Ok(false) => {
                debug!("Channel {:?} reached the end of its stream", channel);
                self.channel = None;
                true
            }
            Err(err) => {
                warn!("Lost channel {:?}: {}", channel, err);
                self.channel = None;
                true
            }
        }
    }

    /// Tear down in reverse order of construction and hand the engine back
    pub fn shutdown(mut self) -> Result<E, ControlError> {
        if let Some(channel) = self.channel.take() {
            if matches!(self.engine.is_playing(channel), Ok(true)) {
                self.engine.stop_channel(channel).op("stop_channel")?;
            }
        }
        if let Some(sound) = self.sound.take() {
            self.engine.release_sound(sound).op("release_sound")?;
        }
        self.track = None;
        for kind in EffectKind::ALL {
            let dsp = self.rack.handle(kind);
            self.engine.detach_dsp(dsp).op("detach_dsp")?;
            self.engine.release_dsp(dsp).op("release_dsp")?;
        }
        debug!("Player context shut down");
        Ok(self.engine)
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub(crate) fn replace_track(&mut self, sound: Option<SoundHandle>, channel: Option<ChannelHandle>) {
        self.sound = sound;
        self.channel = channel;
    }

    pub(crate) fn set_track_path(&mut self, track: Option<PathBuf>) {
        self.track = track;
    }
}
