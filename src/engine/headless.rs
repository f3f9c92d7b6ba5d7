use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::opener::{StreamOpener, SymphoniaOpener};
use super::{AudioEngine, ChannelHandle, DspHandle, EffectKind, SoundHandle};
use crate::error::EngineError;

/// Engine default gain for a freshly created channel
pub const DEFAULT_CHANNEL_VOLUME: f32 = 1.0;

#[derive(Debug)]
struct SoundState {
    path: PathBuf,
    /// Unknown lengths never end and are never clamped
    length_ms: Option<u32>,
    looping: bool,
}

#[derive(Debug)]
struct ChannelState {
    sound: SoundHandle,
    paused: bool,
    volume: f32,
    /// Position when the channel was last paused or repositioned
    anchor_ms: u32,
    /// Clock reading at which the channel last started running
    running_since: Option<u64>,
}

#[derive(Debug)]
struct DspState {
    kind: EffectKind,
    bypass: bool,
    parameters: Vec<f32>,
}

impl DspState {
    fn new(kind: EffectKind) -> Self {
        let parameters = match kind {
            // cutoff (Hz), resonance
            EffectKind::LowPass | EffectKind::HighPass => vec![5000.0, 1.0],
            // delay (ms), feedback (%), dry level (dB), wet level (dB)
            EffectKind::Echo => vec![500.0, 50.0, 0.0, 0.0],
            // mix (%), depth, rate (Hz)
            EffectKind::Flange => vec![50.0, 1.0, 0.1],
        };
        Self {
            kind,
            bypass: false,
            parameters,
        }
    }
}

/// Software implementation of the engine boundary.
///
/// Tracks sounds, channels and DSP units and advances channel positions
/// from a [`Clock`]. It never decodes or mixes samples.
pub struct HeadlessEngine<C: Clock = SystemClock> {
    opener: Box<dyn StreamOpener>,
    clock: C,
    next_id: u64,
    sounds: HashMap<SoundHandle, SoundState>,
    channels: HashMap<ChannelHandle, ChannelState>,
    dsps: HashMap<DspHandle, DspState>,
    master_bus: Vec<DspHandle>,
}

impl HeadlessEngine<SystemClock> {
    /// Engine that opens files from disk and runs on wall-clock time
    pub fn new() -> Self {
        Self::with_parts(Box::new(SymphoniaOpener), SystemClock::new())
    }
}

impl Default for HeadlessEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> HeadlessEngine<C> {
    pub fn with_parts(opener: Box<dyn StreamOpener>, clock: C) -> Self {
        Self {
            opener,
            clock,
            next_id: 1,
            sounds: HashMap::new(),
            channels: HashMap::new(),
            dsps: HashMap::new(),
            master_bus: Vec::new(),
        }
    }

    /// DSP units on the master bus, head first
    pub fn master_bus(&self) -> &[DspHandle] {
        &self.master_bus
    }

    pub fn dsp_kind(&self, dsp: DspHandle) -> Option<EffectKind> {
        self.dsps.get(&dsp).map(|d| d.kind)
    }

    pub fn sound_path(&self, sound: SoundHandle) -> Option<&Path> {
        self.sounds.get(&sound).map(|s| s.path.as_path())
    }

    pub fn live_sounds(&self) -> usize {
        self.sounds.len()
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn channel(&self, channel: ChannelHandle) -> Result<&ChannelState, EngineError> {
        self.channels.get(&channel).ok_or(EngineError::InvalidHandle)
    }

    fn channel_mut(&mut self, channel: ChannelHandle) -> Result<&mut ChannelState, EngineError> {
        self.channels.get_mut(&channel).ok_or(EngineError::InvalidHandle)
    }

    fn dsp(&self, dsp: DspHandle) -> Result<&DspState, EngineError> {
        self.dsps.get(&dsp).ok_or(EngineError::InvalidHandle)
    }

    fn dsp_mut(&mut self, dsp: DspHandle) -> Result<&mut DspState, EngineError> {
        self.dsps.get_mut(&dsp).ok_or(EngineError::InvalidHandle)
    }

    /// Raw (unwrapped) position of a channel
    fn elapsed_ms(&self, state: &ChannelState) -> u64 {
        let running = match state.running_since {
            Some(since) => self.clock.now_ms().saturating_sub(since),
            None => 0,
        };
        state.anchor_ms as u64 + running
    }

    fn position_of(&self, state: &ChannelState) -> Result<u32, EngineError> {
        let sound = self.sounds.get(&state.sound).ok_or(EngineError::InvalidHandle)?;
        let elapsed = self.elapsed_ms(state);
        let position = match sound.length_ms {
            Some(length) if sound.looping && length > 0 => elapsed % length as u64,
            Some(length) => elapsed.min(length as u64),
            None => elapsed.min(u32::MAX as u64),
        };
        Ok(position as u32)
    }

    fn finished(&self, state: &ChannelState) -> bool {
        match self.sounds.get(&state.sound) {
            Some(sound) => match sound.length_ms {
                Some(length) => !sound.looping && self.elapsed_ms(state) >= length as u64,
                None => false,
            },
            None => true,
        }
    }
}

impl<C: Clock> AudioEngine for HeadlessEngine<C> {
    fn create_stream(&mut self, path: &Path) -> Result<SoundHandle, EngineError> {
        let info = self.opener.open(path)?;
        let handle = SoundHandle::from_raw(self.allocate());
        debug!(
            "Opened stream {} ({}) as {:?}",
            path.display(),
            info.length_ms.map_or_else(|| "unknown length".to_string(), |ms| format!("{} ms", ms)),
            handle
        );
        self.sounds.insert(
            handle,
            SoundState {
                path: path.to_path_buf(),
                length_ms: info.length_ms,
                looping: false,
            },
        );
        Ok(handle)
    }

    fn set_looping(&mut self, sound: SoundHandle, looping: bool) -> Result<(), EngineError> {
        let state = self.sounds.get_mut(&sound).ok_or(EngineError::InvalidHandle)?;
        state.looping = looping;
        Ok(())
    }

    fn sound_length_ms(&self, sound: SoundHandle) -> Result<Option<u32>, EngineError> {
        self.sounds
            .get(&sound)
            .map(|s| s.length_ms)
            .ok_or(EngineError::InvalidHandle)
    }

    fn release_sound(&mut self, sound: SoundHandle) -> Result<(), EngineError> {
        self.sounds.remove(&sound).ok_or(EngineError::InvalidHandle)?;
        self.channels.retain(|_, ch| ch.sound != sound);
        Ok(())
    }

    fn play_sound(&mut self, sound: SoundHandle, paused: bool) -> Result<ChannelHandle, EngineError> {
        if !self.sounds.contains_key(&sound) {
            return Err(EngineError::InvalidHandle);
        }
        let handle = ChannelHandle::from_raw(self.allocate());
        let running_since = if paused { None } else { Some(self.clock.now_ms()) };
        self.channels.insert(
            handle,
            ChannelState {
                sound,
                paused,
                volume: DEFAULT_CHANNEL_VOLUME,
                anchor_ms: 0,
                running_since,
            },
        );
        trace!("Started {:?} for {:?}", handle, sound);
        Ok(handle)
    }

    fn channels_playing(&self) -> Result<usize, EngineError> {
        Ok(self.channels.values().filter(|ch| !self.finished(ch)).count())
    }

    fn stop_channel(&mut self, channel: ChannelHandle) -> Result<(), EngineError> {
        self.channels.remove(&channel).ok_or(EngineError::InvalidHandle)?;
        trace!("Stopped {:?}", channel);
        Ok(())
    }

    fn is_playing(&self, channel: ChannelHandle) -> Result<bool, EngineError> {
        let state = self.channel(channel)?;
        Ok(!self.finished(state))
    }

    fn is_paused(&self, channel: ChannelHandle) -> Result<bool, EngineError> {
        Ok(self.channel(channel)?.paused)
    }

    fn set_paused(&mut self, channel: ChannelHandle, paused: bool) -> Result<(), EngineError> {
        let position = self.position_of(self.channel(channel)?)?;
        let now = self.clock.now_ms();
        let state = self.channel_mut(channel)?;
        if state.paused == paused {
            return Ok(());
        }
        state.paused = paused;
        if paused {
            state.anchor_ms = position;
            state.running_since = None;
        } else {
            state.running_since = Some(now);
        }
        Ok(())
    }

    fn position_ms(&self, channel: ChannelHandle) -> Result<u32, EngineError> {
        self.position_of(self.channel(channel)?)
    }

    fn set_position_ms(&mut self, channel: ChannelHandle, position: u32) -> Result<(), EngineError> {
        let sound = self.channel(channel)?.sound;
        let length = self.sound_length_ms(sound)?;
        let now = self.clock.now_ms();
        let state = self.channel_mut(channel)?;
        state.anchor_ms = length.map_or(position, |length| position.min(length));
        if !state.paused {
            state.running_since = Some(now);
        }
        Ok(())
    }

    fn volume(&self, channel: ChannelHandle) -> Result<f32, EngineError> {
        Ok(self.channel(channel)?.volume)
    }

    fn set_volume(&mut self, channel: ChannelHandle, volume: f32) -> Result<(), EngineError> {
        self.channel_mut(channel)?.volume = volume;
        Ok(())
    }

    fn create_dsp(&mut self, kind: EffectKind) -> Result<DspHandle, EngineError> {
        let handle = DspHandle::from_raw(self.allocate());
        self.dsps.insert(handle, DspState::new(kind));
        Ok(handle)
    }

    fn attach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        self.dsp(dsp)?;
        if self.master_bus.contains(&dsp) {
            return Err(EngineError::Failed { op: "attach_dsp" });
        }
        self.master_bus.insert(0, dsp);
        Ok(())
    }

    fn detach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        let index = self
            .master_bus
            .iter()
            .position(|d| *d == dsp)
            .ok_or(EngineError::InvalidHandle)?;
        self.master_bus.remove(index);
        Ok(())
    }

    fn release_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        if self.master_bus.contains(&dsp) {
            return Err(EngineError::Failed { op: "release_dsp" });
        }
        self.dsps.remove(&dsp).ok_or(EngineError::InvalidHandle)?;
        Ok(())
    }

    fn bypass(&self, dsp: DspHandle) -> Result<bool, EngineError> {
        Ok(self.dsp(dsp)?.bypass)
    }

    fn set_bypass(&mut self, dsp: DspHandle, bypass: bool) -> Result<(), EngineError> {
        self.dsp_mut(dsp)?.bypass = bypass;
        Ok(())
    }

    fn parameter_float(&self, dsp: DspHandle, index: usize) -> Result<f32, EngineError> {
        self.dsp(dsp)?
            .parameters
            .get(index)
            .copied()
            .ok_or(EngineError::InvalidParameter { index })
    }

    fn set_parameter_float(&mut self, dsp: DspHandle, index: usize, value: f32) -> Result<(), EngineError> {
        let slot = self
            .dsp_mut(dsp)?
            .parameters
            .get_mut(index)
            .ok_or(EngineError::InvalidParameter { index })?;
        *slot = value;
        Ok(())
    }
}
