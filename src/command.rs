// Typed operator commands and the outbound publish port of the controller
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

use crate::pi::{InputError, PiController};

/// An operator command addressed to one controller instance.
///
/// Transports decode their payloads (topic routing, numeric parsing) into this type and hand it
/// to [`PiController::apply`]; the controller itself never sees topic strings or raw payloads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command<F> {
    /// Replace the setpoint.
    SetSetpoint(F),
    /// Enable (`true`) or disable (`false`) manual override.
    SetManual(bool),
    /// Replace the manual operating point.
    SetManualOutput(F),
}

impl<F: Float> PiController<F> {
    /// Dispatches an operator command to the matching setter.
    ///
    /// # Returns
    /// - `Err(InputError)` and no state change if the command carries a non-finite value.
    pub fn apply(&mut self, command: Command<F>) -> Result<(), InputError> {
        match command {
            Command::SetSetpoint(setpoint) => self.set_setpoint(setpoint),
            Command::SetManual(enable) => {
                self.set_manual(enable);
                Ok(())
            }
            Command::SetManualOutput(output) => self.set_manual_output(output),
        }
    }
}

/// The outbound port a transport implements to carry control outputs to the actuator.
///
/// `publish` is treated as synchronous request/response: `true` means the value was delivered
/// and the hysteresis baseline may advance, `false` means it was not and must not.
pub trait CommandSink<F> {
    /// Attempts to deliver a control output. Returns whether delivery succeeded.
    fn publish(&mut self, output: F) -> bool;
}

/// Drives one full control cycle: evaluate, gate, attempt delivery, confirm on success.
///
/// # Returns
/// - `Ok((output, published))` where `published` is true only for a *confirmed* delivery. A
///   gated-but-failed delivery returns `(output, false)` and leaves the baseline untouched, so
///   the gate re-fires for the same delta on the next cycle; retrying is therefore free and
///   automatic, and no delivery attempt is ever made while the output sits inside the
///   dead-band.
/// - `Err(InputError::NonFiniteMeasurement)` if the measurement is rejected; the sink is not
///   touched.
pub fn run_cycle<F, S>(
    controller: &mut PiController<F>,
    sink: &mut S,
    measurement: F,
) -> Result<(F, bool), InputError>
where
    F: Float,
    S: CommandSink<F>,
{
    let (output, should_publish) = controller.evaluate(measurement)?;
    if should_publish && sink.publish(output) {
        controller.confirm_publish(output);
        return Ok((output, true));
    }
    Ok((output, false))
}
