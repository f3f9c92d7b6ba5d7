use crate::engine::AudioEngine;
use crate::error::ControlError;
use crate::logging::ControlEventKind;

use super::{finite, EngineResultExt, PlayerContext};

/// Gain added by one "volume up"
pub const VOLUME_STEP_UP: f32 = 0.05;
/// Gain removed by one "volume down". Twice the up step.
pub const VOLUME_STEP_DOWN: f32 = 0.10;

/// Gain on the active channel, always kept in `0.0..=1.0`
pub struct Volume<'a, E: AudioEngine> {
    ctx: &'a mut PlayerContext<E>,
}

impl<'a, E: AudioEngine> Volume<'a, E> {
    pub(crate) fn new(ctx: &'a mut PlayerContext<E>) -> Self {
        Self { ctx }
    }

    pub fn increase(&mut self) -> Result<(), ControlError> {
        let result = self.adjust(|vol| (vol + VOLUME_STEP_UP).min(1.0));
        self.ctx.settle("increase_volume", result)
    }

    pub fn decrease(&mut self) -> Result<(), ControlError> {
        let result = self.adjust(|vol| (vol - VOLUME_STEP_DOWN).max(0.0));
        self.ctx.settle("decrease_volume", result)
    }

    /// Set the gain to zero. The previous level is not remembered.
    pub fn mute(&mut self) -> Result<(), ControlError> {
        let result = self.write(0.0);
        self.ctx.settle("mute", result)
    }

    pub fn change_by(&mut self, delta: f32) -> Result<(), ControlError> {
        let result = finite("change_volume", delta)
            .and_then(|delta| self.adjust(|vol| (vol + delta).clamp(0.0, 1.0)));
        self.ctx.settle("change_volume", result)
    }

    pub fn set(&mut self, level: f32) -> Result<(), ControlError> {
        let result = finite("set_volume", level)
            .and_then(|level| self.write(level.clamp(0.0, 1.0)));
        self.ctx.settle("set_volume", result)
    }

    pub fn level(&self) -> Result<f32, ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine().volume(channel).op("get_volume")
    }

    fn adjust(&mut self, step: impl FnOnce(f32) -> f32) -> Result<(), ControlError> {
        let current = self.level()?;
        self.write(step(current))
    }

    fn write(&mut self, level: f32) -> Result<(), ControlError> {
        let channel = self.ctx.channel()?;
        self.ctx.engine_mut().set_volume(channel, level).op("set_volume")?;
        self.ctx
            .record(ControlEventKind::Volume, format!("{:.0}%", level * 100.0));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::test_support::{context, TestEngine};
    use crate::controller::{ErrorPolicy, PlayerContext};
    use crate::error::ControlError;

    fn playing(level: f32) -> PlayerContext<TestEngine> {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        ctx.transport().play("meow.mp3").unwrap();
        ctx.volume().set(level).unwrap();
        ctx
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_new_channel_starts_at_engine_default() {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        ctx.transport().play("meow.mp3").unwrap();
        ctx.volume().set(0.3).unwrap();

        ctx.transport().play("purr.mp3").unwrap();
        assert_close(ctx.volume().level().unwrap(), 1.0);
    }

    #[test]
    fn test_increase_volume() {
        for (start, expected) in [(0.0, 0.05), (0.5, 0.55), (0.97, 1.0), (1.0, 1.0)] {
            let mut ctx = playing(start);
            ctx.volume().increase().unwrap();
            assert_close(ctx.volume().level().unwrap(), expected);
        }
    }

    #[test]
    fn test_decrease_volume_uses_larger_step() {
        for (start, expected) in [(1.0, 0.9), (0.5, 0.4), (0.05, 0.0), (0.0, 0.0)] {
            let mut ctx = playing(start);
            ctx.volume().decrease().unwrap();
            assert_close(ctx.volume().level().unwrap(), expected);
        }
    }

    #[test]
    fn test_up_then_down_does_not_return_to_start() {
        let mut ctx = playing(0.5);
        ctx.volume().increase().unwrap();
        ctx.volume().decrease().unwrap();
        assert_close(ctx.volume().level().unwrap(), 0.45);
    }

    #[test]
    fn test_mute_is_not_a_toggle() {
        let mut ctx = playing(0.8);
        ctx.volume().mute().unwrap();
        assert_eq!(ctx.volume().level().unwrap(), 0.0);

        ctx.volume().mute().unwrap();
        assert_eq!(ctx.volume().level().unwrap(), 0.0);
    }

    #[test]
    fn test_change_by_clamps_both_ways() {
        let mut ctx = playing(0.5);
        ctx.volume().change_by(0.2).unwrap();
        assert_close(ctx.volume().level().unwrap(), 0.7);

        ctx.volume().change_by(2.0).unwrap();
        assert_close(ctx.volume().level().unwrap(), 1.0);

        ctx.volume().change_by(-3.0).unwrap();
        assert_close(ctx.volume().level().unwrap(), 0.0);
    }

    #[test]
    fn test_non_finite_levels_leave_volume_alone() {
        let mut ctx = playing(0.4);
        assert!(matches!(
            ctx.volume().set(f32::NAN),
            Err(ControlError::InvalidValue { op: "set_volume", .. })
        ));
        assert!(matches!(
            ctx.volume().change_by(f32::NAN),
            Err(ControlError::InvalidValue { op: "change_volume", .. })
        ));
        assert!(ctx.volume().change_by(f32::INFINITY).is_err());
        assert_close(ctx.volume().level().unwrap(), 0.4);

        ctx.set_policy(ErrorPolicy::Ignore);
        ctx.volume().set(f32::NAN).unwrap();
        assert_close(ctx.volume().level().unwrap(), 0.4);
    }

    #[test]
    fn test_volume_without_channel() {
        let (mut ctx, _clock) = context(ErrorPolicy::Propagate);
        assert_eq!(ctx.volume().increase(), Err(ControlError::NoActiveChannel));
        assert_eq!(ctx.volume().level(), Err(ControlError::NoActiveChannel));
    }
}
