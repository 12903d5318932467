// Incremental-form PI controller with saturation, anti-windup and a publish hysteresis gate
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Float;

use crate::history::History;

/// Error returned when a controller configuration fails validation.
///
/// Configuration problems are fatal: no controller is constructed, partially or otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PiConfigError {
    /// One of the recurrence coefficients `q0`/`q1` is NaN or infinite.
    #[cfg_attr(feature = "std", error("recurrence coefficients must be finite"))]
    InvalidRecurrenceCoefficient,

    /// The delay order is zero; the recurrence needs at least one sample of history.
    #[cfg_attr(feature = "std", error("delay order must be at least one"))]
    InvalidDelayOrder,

    /// The default setpoint is NaN or infinite.
    #[cfg_attr(feature = "std", error("default setpoint must be finite"))]
    InvalidDefaultSetpoint,

    /// The default manual operating point is NaN or infinite.
    #[cfg_attr(feature = "std", error("default manual output must be finite"))]
    InvalidDefaultManualOutput,

    /// A saturation limit is NaN, or the lower limit exceeds the upper one.
    ///
    /// Inverted limits are rejected, never silently sorted.
    #[cfg_attr(
        feature = "std",
        error("output limits must not be NaN and the lower limit must not exceed the upper")
    )]
    InvalidOutputLimits,

    /// A hysteresis offset is NaN, infinite, or negative.
    #[cfg_attr(feature = "std", error("hysteresis offsets must be finite and non-negative"))]
    InvalidHysteresisOffset,

    /// The anti-windup gain is NaN, infinite, or negative.
    #[cfg_attr(feature = "std", error("anti-windup gain must be finite and non-negative"))]
    InvalidAntiWindupGain,
}

/// Error returned when a runtime input to the controller is not a finite number.
///
/// These are recoverable: the offending call leaves the controller state untouched, and the
/// caller may retry with a corrected value on the next cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum InputError {
    /// The measurement passed to `evaluate` is NaN or infinite.
    #[cfg_attr(feature = "std", error("measurement must be finite"))]
    NonFiniteMeasurement,

    /// The setpoint passed to `set_setpoint` is NaN or infinite.
    #[cfg_attr(feature = "std", error("setpoint must be finite"))]
    NonFiniteSetpoint,

    /// The operating point passed to `set_manual_output` is NaN or infinite.
    #[cfg_attr(feature = "std", error("manual output must be finite"))]
    NonFiniteManualOutput,
}

/// The operating mode of a controller. Both modes are running states; a controller switches
/// between them freely and indefinitely.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlMode {
    /// The operator's manual output is applied verbatim (clamped) and the setpoint tracks the
    /// live measurement so a later switch to [`ControlMode::Auto`] is bumpless.
    Manual,

    /// The PI recurrence computes the output from the setpoint/measurement error.
    Auto,
}

/// Validated configuration of a PI controller. Immutable once built.
///
/// Use [`PiConfigBuilder`] to construct one; every reachable `PiConfig` value has passed
/// validation, so controller construction itself is infallible.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PiConfig<F> {
    /// Weight of the current error in the incremental recurrence.
    /// Defaults to 1.0.
    q0: F,

    /// Weight of the previous error in the incremental recurrence.
    /// Defaults to 0.0, which degenerates to a purely proportional increment.
    q1: F,

    /// Number of past samples retained in the error and output histories.
    /// Defaults to 1.
    delay_order: usize,

    /// Setpoint seeded into a fresh context.
    /// Defaults to 0.0.
    default_setpoint: F,

    /// Manual operating point seeded into a fresh context.
    /// Defaults to 0.0.
    default_manual_output: F,

    /// Minimum output value of the controller.
    /// Defaults to negative infinity, i.e. no limit.
    output_min: F,

    /// Maximum output value of the controller.
    /// Defaults to positive infinity, i.e. no limit.
    output_max: F,

    /// How far above the last published output a new output must rise to warrant a publish.
    /// Defaults to 0.0, i.e. any rise publishes.
    hyst_top_offset: F,

    /// How far below the last published output a new output must fall to warrant a publish.
    /// Defaults to 0.0, i.e. any fall publishes.
    hyst_bottom_offset: F,

    /// Back-calculation anti-windup gain. Values in (0, 1] contract the corrective
    /// accumulator monotonically while the output is saturated.
    /// Defaults to 0.5.
    anti_windup_gain: F,
}

impl<F: Float> Default for PiConfig<F> {
    fn default() -> Self {
        PiConfig {
            q0: F::one(),
            q1: F::zero(),
            delay_order: 1,
            default_setpoint: F::zero(),
            default_manual_output: F::zero(),
            output_min: -F::infinity(),
            output_max: F::infinity(),
            hyst_top_offset: F::zero(),
            hyst_bottom_offset: F::zero(),
            anti_windup_gain: F::from(0.5).unwrap(),
        }
    }
}

impl<F: Float> PiConfig<F> {
    /// Returns the current-error recurrence coefficient.
    pub fn q0(&self) -> F {
        self.q0
    }

    /// Returns the previous-error recurrence coefficient.
    pub fn q1(&self) -> F {
        self.q1
    }

    /// Returns the history depth.
    pub fn delay_order(&self) -> usize {
        self.delay_order
    }

    /// Returns the setpoint a fresh context starts with.
    pub fn default_setpoint(&self) -> F {
        self.default_setpoint
    }

    /// Returns the manual operating point a fresh context starts with.
    pub fn default_manual_output(&self) -> F {
        self.default_manual_output
    }

    /// Returns the minimum output limit.
    pub fn output_min(&self) -> F {
        self.output_min
    }

    /// Returns the maximum output limit.
    pub fn output_max(&self) -> F {
        self.output_max
    }

    /// Returns the upward hysteresis offset.
    pub fn hyst_top_offset(&self) -> F {
        self.hyst_top_offset
    }

    /// Returns the downward hysteresis offset.
    pub fn hyst_bottom_offset(&self) -> F {
        self.hyst_bottom_offset
    }

    /// Returns the anti-windup gain.
    pub fn anti_windup_gain(&self) -> F {
        self.anti_windup_gain
    }

    fn validate(self) -> Result<Self, PiConfigError> {
        if !self.q0.is_finite() || !self.q1.is_finite() {
            return Err(PiConfigError::InvalidRecurrenceCoefficient);
        }
        if self.delay_order == 0 {
            return Err(PiConfigError::InvalidDelayOrder);
        }
        if !self.default_setpoint.is_finite() {
            return Err(PiConfigError::InvalidDefaultSetpoint);
        }
        if !self.default_manual_output.is_finite() {
            return Err(PiConfigError::InvalidDefaultManualOutput);
        }
        // Equal limits are allowed: the controller degenerates to a constant-output device.
        if self.output_min.is_nan() || self.output_max.is_nan() || self.output_min > self.output_max
        {
            return Err(PiConfigError::InvalidOutputLimits);
        }
        if !self.hyst_top_offset.is_finite()
            || !self.hyst_bottom_offset.is_finite()
            || self.hyst_top_offset < F::zero()
            || self.hyst_bottom_offset < F::zero()
        {
            return Err(PiConfigError::InvalidHysteresisOffset);
        }
        if !self.anti_windup_gain.is_finite() || self.anti_windup_gain < F::zero() {
            return Err(PiConfigError::InvalidAntiWindupGain);
        }
        Ok(self)
    }
}

/// Builder for [`PiConfig`]. Field setters accumulate freely; all validation happens in
/// [`PiConfigBuilder::build`], which either yields a valid configuration or the first
/// [`PiConfigError`] encountered.
#[derive(Copy, Clone, Debug)]
pub struct PiConfigBuilder<F> {
    config: PiConfig<F>,
}

impl<F: Float> Default for PiConfigBuilder<F> {
    fn default() -> Self {
        PiConfigBuilder {
            config: PiConfig::default(),
        }
    }
}

impl<F: Float> PiConfigBuilder<F> {
    /// Sets the current-error recurrence coefficient.
    pub fn q0(mut self, q0: F) -> Self {
        self.config.q0 = q0;
        self
    }

    /// Sets the previous-error recurrence coefficient.
    pub fn q1(mut self, q1: F) -> Self {
        self.config.q1 = q1;
        self
    }

    /// Sets the history depth (number of past errors/outputs retained).
    pub fn delay_order(mut self, delay_order: usize) -> Self {
        self.config.delay_order = delay_order;
        self
    }

    /// Sets the setpoint a fresh context starts with.
    pub fn default_setpoint(mut self, setpoint: F) -> Self {
        self.config.default_setpoint = setpoint;
        self
    }

    /// Sets the manual operating point a fresh context starts with.
    pub fn default_manual_output(mut self, output: F) -> Self {
        self.config.default_manual_output = output;
        self
    }

    /// Sets the minimum and maximum output limits. These may be infinite to disable clamping
    /// on that side.
    pub fn output_limits(mut self, output_min: F, output_max: F) -> Self {
        self.config.output_min = output_min;
        self.config.output_max = output_max;
        self
    }

    /// Sets the upward and downward hysteresis offsets of the publish dead-band. The offsets
    /// may differ to tolerate rises and falls unequally.
    pub fn hysteresis_offsets(mut self, top_offset: F, bottom_offset: F) -> Self {
        self.config.hyst_top_offset = top_offset;
        self.config.hyst_bottom_offset = bottom_offset;
        self
    }

    /// Sets the back-calculation anti-windup gain.
    pub fn anti_windup_gain(mut self, gain: F) -> Self {
        self.config.anti_windup_gain = gain;
        self
    }

    /// Validates the accumulated fields.
    ///
    /// # Returns
    /// - `Ok(PiConfig)` if every field is acceptable.
    /// - `Err(PiConfigError)` naming the first rejected field otherwise.
    pub fn build(self) -> Result<PiConfig<F>, PiConfigError> {
        self.config.validate()
    }
}

/// The complete mutable state of one controller instance: operating mode, setpoint, manual
/// operating point, publish baseline, anti-windup accumulator, and the error/output histories
/// the incremental recurrence reads its `t-1` terms from.
///
/// One context exists per controlled actuator. It is created from a validated configuration,
/// mutated exclusively through [`FuncPiController::compute`] and its own setters, and carries
/// no persistence: a process restart starts from the configured defaults again.
#[derive(Clone, Debug, PartialEq)]
pub struct PiContext<F> {
    mode: ControlMode,
    setpoint: F,
    manual_output: F,
    last_published: F,
    integral: F,
    errors: History<F>,
    outputs: History<F>,
}

impl<F: Float> PiContext<F> {
    /// Creates a fresh context seeded from the configuration defaults.
    ///
    /// The controller starts in [`ControlMode::Manual`], the safe mode to come up in before an
    /// operator or supervisory layer enables closed-loop control. The publish baseline starts
    /// at zero, **not** at the default manual output: if the first computed output lies outside
    /// the dead-band around zero, the gate fires on the very first evaluation. That bootstrap
    /// publish is deliberate, so a newly started node announces its operating point.
    pub fn new(config: &PiConfig<F>) -> Self {
        PiContext {
            mode: ControlMode::Manual,
            setpoint: config.default_setpoint(),
            manual_output: config.default_manual_output(),
            last_published: F::zero(),
            integral: F::zero(),
            errors: History::zeroed(config.delay_order()),
            outputs: History::zeroed(config.delay_order()),
        }
    }

    /// Returns the operating mode.
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Returns the current setpoint. While in manual mode this tracks the measurement.
    pub fn setpoint(&self) -> F {
        self.setpoint
    }

    /// Returns the operator's manual operating point.
    pub fn manual_output(&self) -> F {
        self.manual_output
    }

    /// Returns the hysteresis baseline: the last output whose delivery was confirmed.
    pub fn last_published(&self) -> F {
        self.last_published
    }

    /// Returns the anti-windup accumulator.
    pub fn integral(&self) -> F {
        self.integral
    }

    /// Returns the most recently computed output.
    pub fn output(&self) -> F {
        self.outputs.latest()
    }

    /// Returns the most recently recorded error.
    pub fn error(&self) -> F {
        self.errors.latest()
    }

    /// Returns the retained error history.
    pub fn errors(&self) -> &History<F> {
        &self.errors
    }

    /// Returns the retained output history.
    pub fn outputs(&self) -> &History<F> {
        &self.outputs
    }

    /// Switches the operating mode.
    ///
    /// Histories and the anti-windup accumulator are left untouched: the incremental
    /// recurrence resumes from the operating point recorded in the output history, so the
    /// transfer is bumpless in both directions.
    pub fn set_mode(&mut self, mode: ControlMode) {
        self.mode = mode;
    }

    /// Stores a new setpoint. Takes effect on the next compute.
    ///
    /// # Returns
    /// - `Err(InputError::NonFiniteSetpoint)` and no state change if `setpoint` is NaN or
    ///   infinite.
    pub fn set_setpoint(&mut self, setpoint: F) -> Result<(), InputError> {
        if !setpoint.is_finite() {
            return Err(InputError::NonFiniteSetpoint);
        }
        self.setpoint = setpoint;
        Ok(())
    }

    /// Stores a new manual operating point. Applied (clamped to the saturation limits) on the
    /// next compute while in manual mode; in auto mode it is retained but unused.
    ///
    /// # Returns
    /// - `Err(InputError::NonFiniteManualOutput)` and no state change if `output` is NaN or
    ///   infinite.
    pub fn set_manual_output(&mut self, output: F) -> Result<(), InputError> {
        if !output.is_finite() {
            return Err(InputError::NonFiniteManualOutput);
        }
        self.manual_output = output;
        Ok(())
    }

    /// Records that `output` was successfully delivered, advancing the hysteresis baseline.
    ///
    /// Call this only after the transport reports success. A failed delivery must skip the
    /// confirmation so the gate stays armed and the same delta is retried next cycle.
    pub fn confirm_publish(&mut self, output: F) {
        self.last_published = output;
    }
}

/// Returns true iff `output` lies outside the dead-band spanning `reference - bottom_offset`
/// to `reference + top_offset`. Landing exactly on either edge does not count as outside.
pub fn outside_deadband<F: Float>(output: F, reference: F, top_offset: F, bottom_offset: F) -> bool {
    output > reference + top_offset || output < reference - bottom_offset
}

/// A functional implementation of the hysteresis-gated PI controller.
///
/// This implementation is stateless: a context object must be passed in and is returned,
/// updated, with each call to `compute`, which is therefore **functionally pure**.
pub struct FuncPiController<F> {
    config: PiConfig<F>,
}

impl<F: Float> FuncPiController<F> {
    /// Creates a controller from a validated configuration.
    pub fn new(config: PiConfig<F>) -> Self {
        FuncPiController { config }
    }

    /// Returns the controller configuration.
    pub fn config(&self) -> &PiConfig<F> {
        &self.config
    }

    /// Runs one compute cycle: `(context, measurement) -> (output, context)`.
    ///
    /// In [`ControlMode::Manual`] the setpoint is overwritten with the measurement, a zero
    /// error is recorded, and the output is the operator's manual operating point clamped to
    /// the saturation limits.
    ///
    /// In [`ControlMode::Auto`] the incremental recurrence
    /// `u = u_prev + q0 * e + q1 * e_prev + integral` is evaluated, saturated inclusively to
    /// the output limits, and the anti-windup accumulator is back-calculated from the
    /// saturation deviation so it stops mattering the moment the output leaves a limit.
    ///
    /// The `t-1` terms are read from the histories *before* the new samples are pushed; no
    /// slot is ever rewritten after the fact.
    ///
    /// The measurement is assumed finite; the stateful [`PiController::evaluate`] front door
    /// enforces this, and callers driving the functional controller directly are responsible
    /// for the same check.
    pub fn compute(&self, mut ctx: PiContext<F>, measurement: F) -> (F, PiContext<F>) {
        let cfg = &self.config;
        let output = match ctx.mode {
            ControlMode::Manual => {
                // Track-while-manual: the error stays pinned at zero, so nothing stale kicks
                // the recurrence when the operator hands control back.
                ctx.setpoint = measurement;
                let output = num_traits::clamp(ctx.manual_output, cfg.output_min, cfg.output_max);
                ctx.errors.push(F::zero());
                ctx.outputs.push(output);
                output
            }
            ControlMode::Auto => {
                let error = ctx.setpoint - measurement;
                let prev_output = ctx.outputs.latest();
                let prev_error = ctx.errors.latest();

                let unsaturated =
                    prev_output + cfg.q0 * error + cfg.q1 * prev_error + ctx.integral;
                let saturated = num_traits::clamp(unsaturated, cfg.output_min, cfg.output_max);

                // Back-calculated from the current deviation only: zero whenever the output is
                // inside the limits, a bounded correction while railed.
                ctx.integral = cfg.anti_windup_gain * (saturated - unsaturated);

                ctx.errors.push(error);
                ctx.outputs.push(saturated);
                saturated
            }
        };
        (output, ctx)
    }

    /// Gates `output` against the context's publish baseline using the configured dead-band.
    pub fn should_publish(&self, output: F, ctx: &PiContext<F>) -> bool {
        outside_deadband(
            output,
            ctx.last_published,
            self.config.hyst_top_offset,
            self.config.hyst_bottom_offset,
        )
    }
}

/// A stateful implementation of the hysteresis-gated PI controller.
///
/// This is the facade a process-control node drives: it owns exactly one [`PiContext`] and
/// exposes the per-cycle [`PiController::evaluate`] entry point plus the operator-facing
/// setters. It must be `mut`, and a single logical driver loop must serialize calls into one
/// instance; separate instances (one per pump) are fully independent.
pub struct PiController<F> {
    ctx: PiContext<F>,
    controller: FuncPiController<F>,
}

impl<F: Float> PiController<F> {
    /// Creates a controller with a fresh context seeded from `config`.
    pub fn new(config: PiConfig<F>) -> Self {
        let ctx = PiContext::new(&config);
        PiController {
            ctx,
            controller: FuncPiController::new(config),
        }
    }

    /// Returns the controller configuration.
    pub fn config(&self) -> &PiConfig<F> {
        self.controller.config()
    }

    /// Returns the controller state for inspection.
    pub fn context(&self) -> &PiContext<F> {
        &self.ctx
    }

    /// Returns the most recently computed output.
    pub fn output(&self) -> F {
        self.ctx.output()
    }

    /// Stores a new setpoint; see [`PiContext::set_setpoint`].
    pub fn set_setpoint(&mut self, setpoint: F) -> Result<(), InputError> {
        self.ctx.set_setpoint(setpoint)
    }

    /// Enables manual override (`true`) or hands control to the PI law (`false`).
    pub fn set_manual(&mut self, enable: bool) {
        self.ctx.set_mode(if enable {
            ControlMode::Manual
        } else {
            ControlMode::Auto
        });
    }

    /// Stores a new manual operating point; see [`PiContext::set_manual_output`].
    pub fn set_manual_output(&mut self, output: F) -> Result<(), InputError> {
        self.ctx.set_manual_output(output)
    }

    /// Runs one control cycle on a new measurement.
    ///
    /// # Returns
    /// - `Ok((output, should_publish))`: the saturated control output and the hysteresis
    ///   gate's verdict against the last published output. A `true` verdict is a proposal;
    ///   the baseline only advances when the caller reports delivery success through
    ///   [`PiController::confirm_publish`].
    /// - `Err(InputError::NonFiniteMeasurement)` if `measurement` is NaN or infinite; the
    ///   controller state is left exactly as it was.
    pub fn evaluate(&mut self, measurement: F) -> Result<(F, bool), InputError> {
        if !measurement.is_finite() {
            return Err(InputError::NonFiniteMeasurement);
        }
        let (output, ctx) = self.controller.compute(self.ctx.clone(), measurement);
        self.ctx = ctx;
        Ok((output, self.controller.should_publish(output, &self.ctx)))
    }

    /// Records a confirmed delivery; see [`PiContext::confirm_publish`].
    pub fn confirm_publish(&mut self, output: F) {
        self.ctx.confirm_publish(output);
    }
}
