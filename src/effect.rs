//! Periodic effects on a grouped light.
//!
//! An effect is a sequence of [`StateChange`]s written on a fixed cadence.
//! The scheduler keeps a monotonic deadline that advances by exactly one period
//! per iteration, so slow writes never shift the phase of later frames: when a
//! write runs past one or more boundaries those frames are dropped and the
//! loop waits for the next boundary instead of bursting to catch up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};

use crate::client::ResourceClient;
use crate::clock::{Clock, RuntimeClock};
use crate::errors::Error;
use crate::group::GroupController;
use crate::types::Brightness;

type Result<T> = std::result::Result<T, Error>;

/// The target state for one frame of an effect. Unset fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateChange {
    pub power: Option<bool>,
    pub brightness: Option<f64>,
    pub mirek: Option<i64>,
    pub xy: Option<(f64, f64)>,
}

impl StateChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(mut self, on: bool) -> Self {
        self.power = Some(on);
        self
    }

    pub fn brightness(mut self, percent: f64) -> Self {
        self.brightness = Some(percent);
        self
    }

    pub fn mirek(mut self, mirek: i64) -> Self {
        self.mirek = Some(mirek);
        self
    }

    pub fn xy(mut self, x: f64, y: f64) -> Self {
        self.xy = Some((x, y));
        self
    }

    /// True when no field is set. Empty frames issue no write.
    ///
    /// ```
    /// use hue_lights_rs::StateChange;
    ///
    /// assert!(StateChange::new().is_empty());
    /// assert!(!StateChange::new().power(true).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.power.is_none() && self.brightness.is_none() && self.mirek.is_none() && self.xy.is_none()
    }
}

/// Alternate between `low` and `high` brightness, starting dim.
///
/// ```
/// use hue_lights_rs::effect::{StateChange, pulse};
///
/// let mut step = pulse(10.0, 90.0);
/// assert_eq!(step(0), StateChange::new().brightness(10.0));
/// assert_eq!(step(1), StateChange::new().brightness(90.0));
/// ```
pub fn pulse(low: f64, high: f64) -> impl FnMut(usize) -> StateChange {
    move |iteration| {
        let target = if iteration % 2 == 0 { low } else { high };
        StateChange::new().brightness(target)
    }
}

/// Alternate power, starting with the lights off.
pub fn blink() -> impl FnMut(usize) -> StateChange {
    |iteration| StateChange::new().power(iteration % 2 == 1)
}

/// Settings for one effect run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectOptions {
    /// Transition time for every write. Clamped to 30% of the period when it
    /// exceeds half of it.
    pub ramp_ms: Option<u32>,
    /// Upper bound on writes per second. Ignored unless positive. Consecutive
    /// frames start at least `1 / max_write_rate` apart; throttled frames are
    /// delayed, not dropped.
    pub max_write_rate: Option<f64>,
    /// Leave the group on at `high_brightness` when the run ends.
    pub settle_to_high_on_exit: bool,
    pub high_brightness: f64,
}

impl Default for EffectOptions {
    fn default() -> Self {
        EffectOptions {
            ramp_ms: None,
            max_write_rate: None,
            settle_to_high_on_exit: false,
            high_brightness: Brightness::MAX,
        }
    }
}

/// A write that failed during a run.
#[derive(Debug)]
pub struct FailedWrite {
    /// Iteration the write belonged to. Settle writes use the iteration count.
    pub iteration: usize,
    pub error: Error,
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct EffectReport {
    pub iterations_run: usize,
    pub frames_dropped: u64,
    pub failures: Vec<FailedWrite>,
    pub cancelled: bool,
}

/// Cooperative cancellation for a running effect.
///
/// The flag is checked at the start of every iteration; a write in flight is
/// allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Runs effects against a [`GroupController`] on a fixed cadence.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use hue_lights_rs::effect::{EffectOptions, EffectScheduler};
///
/// let scheduler = EffectScheduler::new();
/// let options = EffectOptions {
///     ramp_ms: Some(200),
///     settle_to_high_on_exit: true,
///     ..EffectOptions::default()
/// };
/// let report = scheduler
///     .pulse_brightness(&mut office, Duration::from_secs(1), 10, 10.0, 100.0, &options)
///     .await?;
/// println!("dropped {} frames", report.frames_dropped);
/// ```
#[derive(Debug)]
pub struct EffectScheduler<K = RuntimeClock> {
    clock: K,
    stop: StopHandle,
}

impl Default for EffectScheduler<RuntimeClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectScheduler<RuntimeClock> {
    pub fn new() -> Self {
        Self::with_clock(RuntimeClock::new())
    }
}

impl<K: Clock> EffectScheduler<K> {
    pub fn with_clock(clock: K) -> Self {
        EffectScheduler {
            clock,
            stop: StopHandle::new(),
        }
    }

    /// A handle that stops the current and any later run of this scheduler.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Apply `step(i)` for `i` in `0..iterations`, one frame per `period`.
    ///
    /// Write failures do not stop the run; they are collected in the report.
    pub async fn run<C, F>(
        &self,
        controller: &mut GroupController<C>,
        period: Duration,
        iterations: usize,
        mut step: F,
        options: &EffectOptions,
    ) -> Result<EffectReport>
    where
        C: ResourceClient,
        F: FnMut(usize) -> StateChange,
    {
        if period.is_zero() {
            return Err(Error::invalid_input("effect period must be non-zero"));
        }

        let ramp_ms = options.ramp_ms.map(|ramp| clamp_ramp(ramp, period));
        let min_interval = options
            .max_write_rate
            .filter(|rate| *rate > 0.0 && rate.is_finite())
            .map(|rate| Duration::from_secs_f64(1.0 / rate));

        let mut report = EffectReport::default();
        let mut deadline = self.clock.elapsed();

        for iteration in 0..iterations {
            if self.stop.is_stopped() {
                debug!("effect on {} stopped before iteration {iteration}", controller.group_id());
                report.cancelled = true;
                break;
            }

            let change = step(iteration);
            let write_started = self.clock.elapsed();
            apply(controller, &change, ramp_ms, iteration, &mut report).await;
            report.iterations_run += 1;

            deadline += period;
            let now = self.clock.elapsed();

            let mut wait = if deadline >= now {
                deadline - now
            } else {
                // A boundary hit exactly counts as missed, so the next write
                // never lands at the same instant as this one.
                let overrun = now - deadline;
                let missed = overrun.as_nanos() / period.as_nanos() + 1;
                let missed = u32::try_from(missed).unwrap_or(u32::MAX);
                deadline += period * missed;
                report.frames_dropped += u64::from(missed);
                warn!(
                    "effect on {} overran by {:?}, dropping {missed} frame(s)",
                    controller.group_id(),
                    overrun
                );
                deadline - now
            };

            // Throttling moves the schedule to the wake time so the next
            // frame is measured from there and is not mistaken for an overrun.
            if let Some(min_interval) = min_interval {
                let floor = (write_started + min_interval).saturating_sub(now);
                if floor > wait {
                    wait = floor;
                    deadline = now + floor;
                }
            }

            if !wait.is_zero() {
                self.clock.sleep(wait).await;
            }
        }

        if options.settle_to_high_on_exit {
            settle(controller, options.high_brightness, ramp_ms, &mut report).await;
        }

        Ok(report)
    }

    /// Switch the group on at `high`, then alternate `low` and `high`.
    ///
    /// The warm-up writes happen before the first frame and their failure
    /// aborts the effect. Settling, when enabled, returns to `high`.
    pub async fn pulse_brightness<C: ResourceClient>(
        &self,
        controller: &mut GroupController<C>,
        period: Duration,
        iterations: usize,
        low: f64,
        high: f64,
        options: &EffectOptions,
    ) -> Result<EffectReport> {
        let options = EffectOptions {
            high_brightness: high,
            ..*options
        };
        let ramp_ms = options.ramp_ms.map(|ramp| clamp_ramp(ramp, period));

        controller.set_power(true, ramp_ms).await?;
        controller.set_brightness(high, ramp_ms).await?;

        self.run(controller, period, iterations, pulse(low, high), &options)
            .await
    }

    /// Toggle power every period, starting with the lights off.
    pub async fn blink<C: ResourceClient>(
        &self,
        controller: &mut GroupController<C>,
        period: Duration,
        iterations: usize,
        options: &EffectOptions,
    ) -> Result<EffectReport> {
        self.run(controller, period, iterations, blink(), options).await
    }
}

/// Ramps longer than half the period would overlap the next frame.
///
/// ```
/// use std::time::Duration;
/// use hue_lights_rs::effect::clamp_ramp;
///
/// assert_eq!(clamp_ramp(600, Duration::from_secs(1)), 300);
/// assert_eq!(clamp_ramp(500, Duration::from_secs(1)), 500);
/// ```
pub fn clamp_ramp(ramp_ms: u32, period: Duration) -> u32 {
    let period_ms = period.as_millis();
    if u128::from(ramp_ms) * 2 > period_ms {
        u32::try_from(period_ms * 3 / 10).unwrap_or(u32::MAX)
    } else {
        ramp_ms
    }
}

async fn apply<C: ResourceClient>(
    controller: &mut GroupController<C>,
    change: &StateChange,
    ramp_ms: Option<u32>,
    iteration: usize,
    report: &mut EffectReport,
) {
    if change.is_empty() {
        debug!("effect on {}: iteration {iteration} changes nothing", controller.group_id());
        return;
    }
    if let Some(on) = change.power {
        let result = controller.set_power(on, ramp_ms).await;
        record(controller.group_id(), iteration, result, report);
    }
    if let Some(percent) = change.brightness {
        let result = controller.set_brightness(percent, ramp_ms).await;
        record(controller.group_id(), iteration, result, report);
    }
    if let Some(mirek) = change.mirek {
        let result = controller.set_color_temperature(mirek, ramp_ms).await;
        record(controller.group_id(), iteration, result, report);
    }
    if let Some((x, y)) = change.xy {
        let result = controller.set_chromaticity(x, y, ramp_ms).await;
        record(controller.group_id(), iteration, result, report);
    }
}

async fn settle<C: ResourceClient>(
    controller: &mut GroupController<C>,
    high: f64,
    ramp_ms: Option<u32>,
    report: &mut EffectReport,
) {
    let iteration = report.iterations_run;
    let result = controller.set_brightness(high, ramp_ms).await;
    record(controller.group_id(), iteration, result, report);
    let result = controller.set_power(true, ramp_ms).await;
    record(controller.group_id(), iteration, result, report);
}

fn record<T>(group_id: &str, iteration: usize, result: Result<T>, report: &mut EffectReport) {
    if let Err(error) = result {
        warn!("effect on {group_id}: iteration {iteration} write failed: {error}");
        report.failures.push(FailedWrite { iteration, error });
    }
}
