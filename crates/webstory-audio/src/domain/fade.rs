//! Fade ramp generator.
//!
//! A ramp moves a volume linearly toward a target in fixed steps, one step
//! per sequencer tick. Volumes never leave `[0.0, 1.0]` and the ramp lands on
//! its target exactly, so completion can be tested by equality.

/// Default sequencer tick interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 10;

/// Distance below which a step snaps onto the target, absorbing the
/// rounding error accumulated by repeated float addition.
const SNAP_EPSILON: f64 = 1e-9;

/// Volume access for a sequencer context.
pub trait VolumeControl {
    /// Returns the volume of the active resource, or `None` when there is no
    /// active resource.
    fn volume(&self) -> Option<f64>;

    /// Sets the volume of the active resource. Does nothing without one.
    fn set_volume(&mut self, volume: f64);
}

/// A linear volume trajectory toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeRamp {
    target: f64,
    step: Option<f64>,
}

impl FadeRamp {
    /// Creates a ramp reaching `target` over `duration_ms`, sampled every
    /// `tick_ms`. A zero duration jumps straight to the target.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(target: f64, duration_ms: u64, tick_ms: u64) -> Self {
        let step = (duration_ms > 0).then(|| tick_ms.max(1) as f64 / duration_ms as f64);
        Self {
            target: target.clamp(0.0, 1.0),
            step,
        }
    }

    /// Returns the clamped target volume.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns the volume one tick further along the ramp from `current`.
    #[must_use]
    pub fn next_volume(&self, current: f64) -> f64 {
        let Some(step) = self.step else {
            return self.target;
        };
        let current = current.clamp(0.0, 1.0);
        let next = if current < self.target {
            (current + step).min(self.target)
        } else {
            (current - step).max(self.target)
        };
        if (next - self.target).abs() < SNAP_EPSILON {
            self.target
        } else {
            next
        }
    }

    /// Returns whether `volume` has reached the target.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_complete(&self, volume: f64) -> bool {
        volume == self.target
    }
}

/// Builds the `(action, is_complete)` pair of a fade for submission to the
/// sequencer.
///
/// The action nudges the context's volume one step per invocation. A context
/// without an active resource counts as complete, so a fade never stalls the
/// queue for lack of something to fade.
pub fn fade_to<C>(
    target: f64,
    duration_ms: u64,
    tick_ms: u64,
) -> (
    impl FnMut(&mut C) + Send + 'static,
    impl Fn(&C) -> bool + Send + 'static,
)
where
    C: VolumeControl + 'static,
{
    let ramp = FadeRamp::new(target, duration_ms, tick_ms);
    let action = move |ctx: &mut C| {
        if let Some(volume) = ctx.volume() {
            ctx.set_volume(ramp.next_volume(volume));
        }
    };
    let is_complete = move |ctx: &C| ctx.volume().is_none_or(|volume| ramp.is_complete(volume));
    (action, is_complete)
}
