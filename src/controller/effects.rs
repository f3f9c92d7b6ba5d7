use log::debug;

use crate::engine::{AudioEngine, EffectKind, FilterKind, CUTOFF_PARAMETER};
use crate::error::ControlError;
use crate::logging::ControlEventKind;

use super::{finite, EngineResultExt, PlayerContext};

pub const CUTOFF_MIN_HZ: f32 = 20.0;
pub const CUTOFF_MAX_HZ: f32 = 20_000.0;

/// Bypass flags and filter cutoffs on the master-bus effect rack.
///
/// Every unit starts bypassed and changes state only through
/// [`Effects::toggle_bypass`].
pub struct Effects<'a, E: AudioEngine> {
    ctx: &'a mut PlayerContext<E>,
}

impl<'a, E: AudioEngine> Effects<'a, E> {
    pub(crate) fn new(ctx: &'a mut PlayerContext<E>) -> Self {
        Self { ctx }
    }

    pub fn toggle_bypass(&mut self, kind: EffectKind) -> Result<(), ControlError> {
        let result = self.flip(kind);
        self.ctx.settle("toggle_bypass", result)
    }

    /// Write the cutoff frequency, clamped to the audible range
    pub fn set_cutoff(&mut self, filter: FilterKind, hz: f32) -> Result<(), ControlError> {
        let result = self.write_cutoff(filter, hz);
        self.ctx.settle("set_cutoff", result)
    }

    /// Cut frequencies below `hz`: set the high-pass cutoff and toggle it
    pub fn cut_low(&mut self, hz: f32) -> Result<(), ControlError> {
        let result = self
            .write_cutoff(FilterKind::HighPass, hz)
            .and_then(|_| self.flip(EffectKind::HighPass));
        self.ctx.settle("cut_low", result)
    }

    /// Cut frequencies above `hz`: set the low-pass cutoff and toggle it
    pub fn cut_high(&mut self, hz: f32) -> Result<(), ControlError> {
        let result = self
            .write_cutoff(FilterKind::LowPass, hz)
            .and_then(|_| self.flip(EffectKind::LowPass));
        self.ctx.settle("cut_high", result)
    }

    pub fn is_bypassed(&self, kind: EffectKind) -> Result<bool, ControlError> {
        let dsp = self.ctx.rack().handle(kind);
        self.ctx.engine().bypass(dsp).op("get_bypass")
    }

    pub fn cutoff(&self, filter: FilterKind) -> Result<f32, ControlError> {
        let dsp = self.ctx.rack().handle(filter.effect());
        self.ctx
            .engine()
            .parameter_float(dsp, CUTOFF_PARAMETER)
            .op("get_parameter")
    }

    fn flip(&mut self, kind: EffectKind) -> Result<(), ControlError> {
        let dsp = self.ctx.rack().handle(kind);
        let engine = self.ctx.engine_mut();
        let bypass = engine.bypass(dsp).op("get_bypass")?;
        engine.set_bypass(dsp, !bypass).op("set_bypass")?;

        let state = if bypass { "on" } else { "off" };
        self.ctx
            .record(ControlEventKind::Effect, format!("{} {}", kind, state));
        Ok(())
    }

    fn write_cutoff(&mut self, filter: FilterKind, hz: f32) -> Result<(), ControlError> {
        let clamped = finite("set_cutoff", hz)?.clamp(CUTOFF_MIN_HZ, CUTOFF_MAX_HZ);
        if clamped != hz {
            debug!("Cutoff {} Hz for {} clamped to {} Hz", hz, filter, clamped);
        }
        let dsp = self.ctx.rack().handle(filter.effect());
        self.ctx
            .engine_mut()
            .set_parameter_float(dsp, CUTOFF_PARAMETER, clamped)
            .op("set_parameter")?;
        self.ctx
            .record(ControlEventKind::Effect, format!("{} cutoff {} Hz", filter, clamped));
        Ok(())
    }
}
