//! Example of a pump flow loop stepping between two setpoints under hysteresis-gated PI control
//! This example requires the `--features simulation` flag to be enabled.
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

#[cfg(feature = "simulation")]
pub fn main() {
    use nalgebra as na;

    use gated_pi::command::{run_cycle, CommandSink};
    use gated_pi::pi::{PiConfigBuilder, PiController};
    use gated_pi::sim;

    const CONTROL_PERIOD_S: f64 = 2.0;
    const PLANT_SUBSTEP_S: f64 = 0.05;
    const N_CYCLES: usize = 240;

    struct HoldingSink {
        drive: f64,
        publishes: usize,
    }

    impl CommandSink<f64> for HoldingSink {
        fn publish(&mut self, output: f64) -> bool {
            self.drive = output;
            self.publishes += 1;
            true
        }
    }

    let config = PiConfigBuilder::default()
        .q0(1.2)
        .q1(-1.0)
        .delay_order(2)
        .output_limits(0.0, 100.0)
        .hysteresis_offsets(0.5, 0.5)
        .anti_windup_gain(0.5)
        .build()
        .unwrap();
    let mut controller = PiController::new(config);
    controller.set_manual(false);

    let plant = sim::PumpFlowPlant {
        actuator_tau: 1.0,
        flow_tau: 2.0,
        gain: 0.2,
    };
    // Step the flow target between 6 and 14 every ~160 seconds
    let square = sim::SignalGenerator::new(sim::WaveForm::Square, 4.0, 10.0);

    let mut sink = HoldingSink {
        drive: 0.0,
        publishes: 0,
    };
    let mut state = na::Vector2::<f64>::zeros();

    println!("{:>8} {:>10} {:>10} {:>10} {:>10}", "time_s", "setpoint", "flow", "drive", "published");
    for cycle in 0..N_CYCLES {
        let time_s = cycle as f64 * CONTROL_PERIOD_S;
        let setpoint = square.generate(time_s / 50.0);
        controller.set_setpoint(setpoint).unwrap();

        let flow = plant.h(state);
        let (output, published) = run_cycle(&mut controller, &mut sink, flow).unwrap();

        println!(
            "{:>8.1} {:>10.2} {:>10.3} {:>10.3} {:>10}",
            time_s,
            setpoint,
            flow,
            output,
            if published { "*" } else { "" }
        );

        let substeps = (CONTROL_PERIOD_S / PLANT_SUBSTEP_S) as usize;
        for _ in 0..substeps {
            state = sim::euler_step(|x| plant.f(x, sink.drive), state, PLANT_SUBSTEP_S);
        }
    }

    println!(
        "\n{} cycles, {} publishes ({}% suppressed by the dead-band)",
        N_CYCLES,
        sink.publishes,
        100 * (N_CYCLES - sink.publishes) / N_CYCLES
    );
}

#[cfg(not(feature = "simulation"))]
fn main() {
    eprintln!("This example requires `--features simulation` to run.");
}
