use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::controller::{NavControl, PlayerContext};
use crate::engine::{AudioEngine, EffectKind, FilterKind};
use crate::error::PlayerError;
use crate::library::TrackList;
use crate::logging::ControlEventKind;

/// Typed commands emitted by the user interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Play { path: PathBuf },
    AddTrack { path: PathBuf },
    SelectTrack { index: usize },
    TogglePause,
    Stop,
    SeekForward { ms: u32 },
    SeekBackward { ms: u32 },
    SeekToStart,
    SeekToFraction { percent: f32 },
    IncreaseVolume,
    DecreaseVolume,
    Mute,
    ChangeVolumeBy { delta: f32 },
    SetVolume { level: f32 },
    ToggleBypass { effect: EffectKind },
    SetCutoff { filter: FilterKind, hz: f32 },
    CutLow { hz: f32 },
    CutHigh { hz: f32 },
    Navigate { control: NavControl },
}

/// What a handled command produced besides its side effects
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    TrackAdded { index: usize },
    Acknowledged { control: NavControl, message: &'static str },
}

/// Routes commands to the controllers of one player context
pub struct Dispatcher<E: AudioEngine> {
    context: PlayerContext<E>,
    tracks: TrackList,
}

impl<E: AudioEngine> Dispatcher<E> {
    pub fn new(context: PlayerContext<E>, tracks: TrackList) -> Self {
        Self { context, tracks }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, PlayerError> {
        debug!("Dispatching {:?}", command);
        let ctx = &mut self.context;
        match command {
            Command::Play { path } => ctx.transport().play(path)?,
            Command::AddTrack { path } => {
                let index = self.tracks.add(path)?;
                return Ok(Outcome::TrackAdded { index });
            }
            Command::SelectTrack { index } => {
                let path = self.tracks.select(index)?.to_path_buf();
                ctx.selection().on_track_selected(path)?;
            }
            Command::TogglePause => ctx.transport().toggle_pause()?,
            Command::Stop => ctx.transport().stop()?,
            Command::SeekForward { ms } => ctx.transport().seek_forward(ms)?,
            Command::SeekBackward { ms } => ctx.transport().seek_backward(ms)?,
            Command::SeekToStart => ctx.transport().seek_to_start()?,
            Command::SeekToFraction { percent } => ctx.transport().seek_to_fraction(percent)?,
            Command::IncreaseVolume => ctx.volume().increase()?,
            Command::DecreaseVolume => ctx.volume().decrease()?,
            Command::Mute => ctx.volume().mute()?,
            Command::ChangeVolumeBy { delta } => ctx.volume().change_by(delta)?,
            Command::SetVolume { level } => ctx.volume().set(level)?,
            Command::ToggleBypass { effect } => ctx.effects().toggle_bypass(effect)?,
            Command::SetCutoff { filter, hz } => ctx.effects().set_cutoff(filter, hz)?,
            Command::CutLow { hz } => ctx.effects().cut_low(hz)?,
            Command::CutHigh { hz } => ctx.effects().cut_high(hz)?,
            Command::Navigate { control } => {
                let message = ctx.selection().acknowledge(control);
                return Ok(Outcome::Acknowledged { control, message });
            }
        }
        Ok(Outcome::Applied)
    }

    /// Periodic tick: forget the channel once its track has ended
    pub fn tick(&mut self) -> bool {
        let finished = self.context.poll_finished();
        if finished {
            self.context
                .record(ControlEventKind::TrackFinished, "end of stream");
        }
        finished
    }

    pub fn context(&self) -> &PlayerContext<E> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PlayerContext<E> {
        &mut self.context
    }

    pub fn tracks(&self) -> &TrackList {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut TrackList {
        &mut self.tracks
    }

    pub fn into_context(self) -> PlayerContext<E> {
        self.context
    }
}
