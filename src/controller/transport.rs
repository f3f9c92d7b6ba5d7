use std::path::Path;

use crate::engine::AudioEngine;
use crate::error::ControlError;
use crate::logging::ControlEventKind;

use super::{EngineResultExt, PlayerContext};

/// Play, pause and seek on the active channel
pub struct Transport<'a, E: AudioEngine> {
    ctx: &'a mut PlayerContext<E>,
}

impl<'a, E: AudioEngine> Transport<'a, E> {
    pub(crate) fn new(ctx: &'a mut PlayerContext<E>) -> Self {
        Self { ctx }
    }

    /// Stop whatever is playing, open `path` as a stream and start it
    pub fn play(&mut self, path: impl AsRef<Path>) -> Result<(), ControlError> {
        let result = self.start(path.as_ref());
        self.ctx.settle("play", result)
    }

    /// Flip the paused state of the active channel
    pub fn toggle_pause(&mut self) -> Result<(), ControlError> {
        let result = self.flip_paused();
        self.ctx.settle("toggle_pause", result)
    }

    /// Pause the active channel. The channel and its position are kept.
    pub fn stop(&mut self) -> Result<(), ControlError> {
        let result = self.pause();
        self.ctx.settle("stop", result)
    }

    pub fn seek_forward(&mut self, delta_ms: u32) -> Result<(), ControlError> {
        let result = self.forward(delta_ms);
        self.ctx.settle("seek_forward", result)
    }

    pub fn seek_backward(&mut self, delta_ms: u32) -> Result<(), ControlError> {
        let result = self.backward(delta_ms);
        self.ctx.settle("seek_backward", result)
    }

    pub fn seek_to_start(&mut self) -> Result<(), ControlError> {
        let result = self.rewind();
        self.ctx.settle("seek_to_start", result)
    }

    /// Jump to `percent` (0.0..=1.0) of the track: rewind, then seek forward
    /// by `percent * length`. The fraction is not clamped here.
    pub fn seek_to_fraction(&mut self, percent: f32) -> Result<(), ControlError> {
        let result = self.fraction(percent);
        self.ctx.settle("seek_to_fraction", result)
    }

    pub fn position_ms(&self) -> Result<u32, ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine().position_ms(channel).op("get_position")
    }

    /// `None` when the stream does not report a duration
    pub fn length_ms(&self) -> Result<Option<u32>, ControlError> {
        let (sound, _) = self.ctx.loaded()?;
        self.ctx.engine().sound_length_ms(sound).op("sound_length")
    }

    pub fn is_paused(&self) -> Result<bool, ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine().is_paused(channel).op("get_paused")
    }

    fn start(&mut self, path: &Path) -> Result<(), ControlError> {
        let previous_sound = self.ctx.active_sound();
        let previous_channel = self.ctx.active_channel();
        self.ctx.replace_track(None, None);
        self.ctx.set_track_path(None);

        let engine = self.ctx.engine_mut();
        if let Some(channel) = previous_channel {
            if matches!(engine.is_playing(channel), Ok(true)) {
                engine.stop_channel(channel).op("stop_channel")?;
            }
        }
        if let Some(sound) = previous_sound {
            engine.release_sound(sound).op("release_sound")?;
        }

        let sound = engine.create_stream(path).op("create_stream")?;
        let channel = engine
            .set_looping(sound, false)
            .op("set_looping")
            .and_then(|()| engine.play_sound(sound, false).op("play_sound"));
        let channel = match channel {
            Ok(channel) => channel,
            Err(err) => {
                self.ctx.replace_track(Some(sound), None);
                self.ctx.set_track_path(Some(path.to_path_buf()));
                return Err(err);
            }
        };

        self.ctx.replace_track(Some(sound), Some(channel));
        self.ctx.set_track_path(Some(path.to_path_buf()));
        self.ctx
            .record(ControlEventKind::TrackStarted, path.display().to_string());
        Ok(())
    }

    fn flip_paused(&mut self) -> Result<(), ControlError> {
        let channel = self.ctx.channel()?;
        let engine = self.ctx.engine_mut();
        let paused = engine.is_paused(channel).op("get_paused")?;
        engine.set_paused(channel, !paused).op("set_paused")?;

        let kind = if paused {
            ControlEventKind::Resumed
        } else {
            ControlEventKind::Paused
        };
        self.ctx.record(kind, format!("{:?}", channel));
        Ok(())
    }

    fn pause(&mut self) -> Result<(), ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine_mut().set_paused(channel, true).op("set_paused")?;
        self.ctx.record(ControlEventKind::Paused, "stop");
        Ok(())
    }

    fn forward(&mut self, delta_ms: u32) -> Result<(), ControlError> {
        let (sound, channel) = self.ctx.loaded()?;
        let engine = self.ctx.engine_mut();
        let position = engine.position_ms(channel).op("get_position")?;
        let length = engine.sound_length_ms(sound).op("sound_length")?;
        let target = position.saturating_add(delta_ms);
        let target = length.map_or(target, |length| target.min(length));
        engine.set_position_ms(channel, target).op("set_position")?;
        self.ctx
            .record(ControlEventKind::Seek, format!("{} -> {} ms", position, target));
        Ok(())
    }

    fn backward(&mut self, delta_ms: u32) -> Result<(), ControlError> {
        let (sound, channel) = self.ctx.loaded()?;
        let engine = self.ctx.engine_mut();
        let position = engine.position_ms(channel).op("get_position")?;
        // Length is read but unused, matching forward seek's call sequence
        engine.sound_length_ms(sound).op("sound_length")?;
        let target = if position < delta_ms { 0 } else { position - delta_ms };
        engine.set_position_ms(channel, target).op("set_position")?;
        self.ctx
            .record(ControlEventKind::Seek, format!("{} -> {} ms", position, target));
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine_mut().set_position_ms(channel, 0).op("set_position")?;
        self.ctx.record(ControlEventKind::Seek, "start");
        Ok(())
    }

    fn fraction(&mut self, percent: f32) -> Result<(), ControlError> {
        let (sound, _) = self.ctx.loaded()?;
        self.rewind()?;
        let length = self.ctx.engine().sound_length_ms(sound).op("sound_length")?;
        // Float-to-int casts saturate, so negative or NaN products become 0.
        // A stream of unknown length stays at its start.
        let delta = length.map_or(0, |length| (percent * length as f32) as u32);
        self.forward(delta)
    }
}
