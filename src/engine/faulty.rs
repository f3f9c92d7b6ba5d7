//! Engine wrapper that fails selected calls, for exercising error policies.

use std::collections::HashSet;
use std::path::Path;

use super::{AudioEngine, ChannelHandle, DspHandle, EffectKind, SoundHandle};
use crate::error::EngineError;

pub struct FaultyEngine<E> {
    inner: E,
    failing: HashSet<&'static str>,
}

impl<E: AudioEngine> FaultyEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
        }
    }

    pub fn fail(&mut self, op: &'static str) {
        self.failing.insert(op);
    }

    pub fn heal(&mut self, op: &'static str) {
        self.failing.remove(op);
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn check(&self, op: &'static str) -> Result<(), EngineError> {
        if self.failing.contains(op) {
            Err(EngineError::Failed { op })
        } else {
            Ok(())
        }
    }
}

impl<E: AudioEngine> AudioEngine for FaultyEngine<E> {
    fn create_stream(&mut self, path: &Path) -> Result<SoundHandle, EngineError> {
        self.check("create_stream")?;
        self.inner.create_stream(path)
    }

    fn set_looping(&mut self, sound: SoundHandle, looping: bool) -> Result<(), EngineError> {
        self.check("set_looping")?;
        self.inner.set_looping(sound, looping)
    }

    fn sound_length_ms(&self, sound: SoundHandle) -> Result<Option<u32>, EngineError> {
        self.check("sound_length")?;
        self.inner.sound_length_ms(sound)
    }

    fn release_sound(&mut self, sound: SoundHandle) -> Result<(), EngineError> {
        self.check("release_sound")?;
        self.inner.release_sound(sound)
    }

    fn play_sound(&mut self, sound: SoundHandle, paused: bool) -> Result<ChannelHandle, EngineError> {
        self.check("play_sound")?;
        self.inner.play_sound(sound, paused)
    }

    fn channels_playing(&self) -> Result<usize, EngineError> {
        self.check("channels_playing")?;
        self.inner.channels_playing()
    }

    fn stop_channel(&mut self, channel: ChannelHandle) -> Result<(), EngineError> {
        self.check("stop_channel")?;
        self.inner.stop_channel(channel)
    }

    fn is_playing(&self, channel: ChannelHandle) -> Result<bool, EngineError> {
        self.check("is_playing")?;
        self.inner.is_playing(channel)
    }

    fn is_paused(&self, channel: ChannelHandle) -> Result<bool, EngineError> {
        self.check("get_paused")?;
        self.inner.is_paused(channel)
    }

    fn set_paused(&mut self, channel: ChannelHandle, paused: bool) -> Result<(), EngineError> {
        self.check("set_paused")?;
        self.inner.set_paused(channel, paused)
    }

    fn position_ms(&self, channel: ChannelHandle) -> Result<u32, EngineError> {
        self.check("get_position")?;
        self.inner.position_ms(channel)
    }

    fn set_position_ms(&mut self, channel: ChannelHandle, position: u32) -> Result<(), EngineError> {
        self.check("set_position")?;
        self.inner.set_position_ms(channel, position)
    }

    fn volume(&self, channel: ChannelHandle) -> Result<f32, EngineError> {
        self.check("get_volume")?;
        self.inner.volume(channel)
    }

    fn set_volume(&mut self, channel: ChannelHandle, volume: f32) -> Result<(), EngineError> {
        self.check("set_volume")?;
        self.inner.set_volume(channel, volume)
    }

    fn create_dsp(&mut self, kind: EffectKind) -> Result<DspHandle, EngineError> {
        self.check("create_dsp")?;
        self.inner.create_dsp(kind)
    }

    fn attach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        self.check("attach_dsp")?;
        self.inner.attach_dsp(dsp)
    }

    fn detach_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        self.check("detach_dsp")?;
        self.inner.detach_dsp(dsp)
    }

    fn release_dsp(&mut self, dsp: DspHandle) -> Result<(), EngineError> {
        self.check("release_dsp")?;
        self.inner.release_dsp(dsp)
    }

    fn bypass(&self, dsp: DspHandle) -> Result<bool, EngineError> {
        self.check("get_bypass")?;
        self.inner.bypass(dsp)
    }

    fn set_bypass(&mut self, dsp: DspHandle, bypass: bool) -> Result<(), EngineError> {
        self.check("set_bypass")?;
        self.inner.set_bypass(dsp, bypass)
    }

    fn parameter_float(&self, dsp: DspHandle, index: usize) -> Result<f32, EngineError> {
        self.check("get_parameter")?;
        self.inner.parameter_float(dsp, index)
    }

    fn set_parameter_float(&mut self, dsp: DspHandle, index: usize, value: f32) -> Result<(), EngineError> {
        self.check("set_parameter")?;
        self.inner.set_parameter_float(dsp, index, value)
    }
}
