use std::fmt;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine::AudioEngine;
use crate::error::ControlError;
use crate::logging::ControlEventKind;

use super::PlayerContext;

/// Navigation buttons that exist on the panel but do not advance tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavControl {
    Next,
    Previous,
    Replay,
}

impl fmt::Display for NavControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavControl::Next => "next",
            NavControl::Previous => "previous",
            NavControl::Replay => "replay",
        };
        f.write_str(name)
    }
}

/// Message shown when a navigation control is pressed
pub const ACKNOWLEDGEMENT: &str = "Button Clicked";

/// Turns a chosen track into playback
pub struct Selection<'a, E: AudioEngine> {
    ctx: &'a mut PlayerContext<E>,
}

impl<'a, E: AudioEngine> Selection<'a, E> {
    pub(crate) fn new(ctx: &'a mut PlayerContext<E>) -> Self {
        Self { ctx }
    }

    pub fn on_track_selected(&mut self, path: impl AsRef<Path>) -> Result<(), ControlError> {
        let path = path.as_ref();
        self.ctx
            .record(ControlEventKind::Selection, path.display().to_string());
        self.ctx.transport().play(path)
    }

    /// Next/previous/replay have no playlist behind them; they only acknowledge
    pub fn acknowledge(&mut self, control: NavControl) -> &'static str {
        info!("'{}' pressed; track navigation is not implemented", control);
        self.ctx
            .record(ControlEventKind::Acknowledged, control.to_string());
        ACKNOWLEDGEMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::context;
    use crate::controller::ErrorPolicy;

    #[test]
    fn test_selection_plays_track() {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        ctx.selection().on_track_selected("meow.mp3").unwrap();

        let sound = ctx.active_sound().unwrap();
        assert_eq!(ctx.engine().sound_path(sound), Some(Path::new("meow.mp3")));
        assert_eq!(ctx.events().count(ControlEventKind::Selection), 1);
    }

    #[test]
    fn test_selection_of_missing_track() {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        assert!(matches!(
            ctx.selection().on_track_selected("gone.mp3"),
            Err(ControlError::NotFound { .. })
        ));
    }

    #[test]
    fn test_navigation_only_acknowledges() {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        ctx.transport().play("meow.mp3").unwrap();
        let channel = ctx.active_channel();

        for control in [NavControl::Next, NavControl::Previous, NavControl::Replay] {
            assert_eq!(ctx.selection().acknowledge(control), ACKNOWLEDGEMENT);
        }
        assert_eq!(ctx.active_channel(), channel);
        assert_eq!(ctx.events().count(ControlEventKind::Acknowledged), 3);
    }
}
