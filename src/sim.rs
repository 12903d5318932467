use nalgebra as na;

pub enum WaveForm {
    Sine,
    Square,
}

pub struct SignalGenerator {
    fcn: fn(f64) -> f64,
    amplitude: f64,
    offset: f64,
}

impl SignalGenerator {
    pub fn new(waveform: WaveForm, amplitude: f64, offset: f64) -> Self {
        Self {
            fcn: match waveform {
                WaveForm::Sine => f64::sin,
                WaveForm::Square => |x| x.sin().signum(),
            },
            amplitude,
            offset,
        }
    }

    pub fn generate(&self, time_s: f64) -> f64 {
        self.amplitude * (self.fcn)(time_s) + self.offset
    }
}

pub struct PumpFlowPlant {
    /// Time constant of the pump drive responding to its commanded operating point, in seconds.
    pub actuator_tau: f64,
    /// Time constant of the measured flow responding to the pump drive, in seconds.
    pub flow_tau: f64,
    /// Steady-state flow per unit of drive, e.g. m³/h per % of operating point.
    pub gain: f64,
}

impl PumpFlowPlant {
    /// Implements the state-space realization of the drive/flow cascade:
    /// ┌    ┐   ┌                  ┐┌   ┐   ┌      ┐
    /// │ a' │ = │ -1/τₐ    0       ││ a │ + │ 1/τₐ │ u
    /// │ q' │   │  K/τ_q  -1/τ_q   ││ q │   │ 0    │
    /// └    ┘   └                  ┘└   ┘   └      ┘
    ///     ┌      ┐┌   ┐
    /// q = │ 0  1 ││ a │
    ///     └      ┘│ q │
    ///             └   ┘
    /// where `a` is the drive actually applied by the pump and `q` the measured flow.
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let mat_a = na::Matrix2::new(
            -1.0 / self.actuator_tau,
            0.0,
            self.gain / self.flow_tau,
            -1.0 / self.flow_tau,
        );
        let mat_b = na::Vector2::new(1.0 / self.actuator_tau, 0.0);

        mat_a * x + mat_b * u
    }

    pub fn h(&self, x: na::Vector2<f64>) -> f64 {
        x[1]
    }

    /// Drive required at steady state for the flow to settle at `flow`.
    pub fn steady_state_drive(&self, flow: f64) -> f64 {
        flow / self.gain
    }
}

pub fn euler_step<Fd>(f: Fd, x: na::Vector2<f64>, dt: f64) -> na::Vector2<f64>
where
    Fd: Fn(na::Vector2<f64>) -> na::Vector2<f64>,
{
    x + f(x) * dt
}
