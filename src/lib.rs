#![warn(missing_docs)]

//! # Hysteresis-Gated PI Controller Library
//!
//! This library provides the control core of a closed-loop process-control node: a discrete PI
//! (proportional-integral) controller in incremental form, with output saturation, anti-windup,
//! manual/auto operating modes and a hysteresis gate deciding whether a freshly computed output
//! differs enough from the last *published* output to be worth sending again.
//!
//! It includes both functional and stateful implementations, allowing users to choose the
//! approach that best suits their needs.
//!
//! ## Features
//!
//! - Respects the best practices for sampled-data PI control:
//!   - Configurable and fully validated controller parameters.
//!   - Bounded output via inclusive saturation limits.
//!   - Back-calculation anti-windup: the corrective accumulator stays bounded while the output
//!     is railed and vanishes as soon as the output leaves the limit.
//!   - Bumpless manual/auto transfer: while in manual mode the setpoint tracks the live
//!     measurement and the manual operating point is carried in the output history, so the
//!     incremental recurrence resumes from it.
//!
//! - Explicit support for **publish-gated** operation:
//!   - An asymmetric hysteresis dead-band compares each computed output against the last
//!     published one.
//!   - A two-phase publish protocol: the gate only proposes a publish; the baseline advances
//!     when the caller confirms delivery, so a failed transport attempt is naturally retried
//!     on the next cycle.
//!
//! - Typed collaborator boundaries instead of stringly-typed glue:
//!   - [`command::Command`] is a tagged operator-command type dispatched onto a controller.
//!   - [`command::CommandSink`] is the outbound port a transport implements.
//!
//! ## Usage
//!
//! ### Functional PI Controller
//!
//! The functional controller lets you explicitly manage the state of the control loop.
//!
//! In exchange, the controller holds no mutable state and the `compute` method is **functionally
//! pure**, making it exceptionally easy to test and validate, or to make thread-safe. If the
//! configuration is final, the controller itself can be non-`mut` as well.
//!
//! ```rust
//! use gated_pi::pi::{ControlMode, FuncPiController, PiConfigBuilder, PiContext};
//!
//! let config = PiConfigBuilder::default()
//!     .q0(1.2)
//!     .q1(-1.0)
//!     .output_limits(0.0, 100.0)
//!     .build()
//!     .expect("invalid controller config");
//! let pi = FuncPiController::new(config);
//!
//! let mut ctx = PiContext::new(pi.config());
//! ctx.set_mode(ControlMode::Auto);
//! ctx.set_setpoint(10.0).unwrap();
//!
//! let measurement = 5.0;
//! let (output, ctx) = pi.compute(ctx, measurement);
//!
//! assert!((0.0..=100.0).contains(&output));
//! if pi.should_publish(output, &ctx) {
//!     // hand `output` to the transport
//! }
//! ```
//!
//! ### Stateful PI Controller
//!
//! The stateful controller manages a [`pi::PiContext`] internally and adds the per-cycle
//! entry point the surrounding node drives.
//!
//! ```rust
//! use gated_pi::pi::{PiConfigBuilder, PiController};
//!
//! let config = PiConfigBuilder::default()
//!     .q0(1.2)
//!     .q1(-1.0)
//!     .output_limits(0.0, 100.0)
//!     .hysteresis_offsets(0.5, 0.5)
//!     .build()
//!     .expect("invalid controller config");
//!
//! let mut controller = PiController::new(config);
//! controller.set_setpoint(10.0).unwrap();
//! controller.set_manual(false);
//!
//! let (output, should_publish) = controller.evaluate(8.7).unwrap();
//! if should_publish {
//!     // attempt delivery; on confirmed success, and only then:
//!     controller.confirm_publish(output);
//! }
//! ```
//!
//! ### Driving a full cycle against a transport
//!
//! ```rust
//! use gated_pi::command::{run_cycle, CommandSink};
//! use gated_pi::pi::{PiConfigBuilder, PiController};
//!
//! struct Recorder(Vec<f64>);
//!
//! impl CommandSink<f64> for Recorder {
//!     fn publish(&mut self, output: f64) -> bool {
//!         self.0.push(output);
//!         true
//!     }
//! }
//!
//! let config = PiConfigBuilder::default()
//!     .q0(0.8)
//!     .q1(-0.6)
//!     .output_limits(0.0, 100.0)
//!     .build()
//!     .unwrap();
//! let mut controller = PiController::new(config);
//! controller.set_manual(false);
//! controller.set_setpoint(10.0).unwrap();
//!
//! let mut sink = Recorder(Vec::new());
//! let (output, published) = run_cycle(&mut controller, &mut sink, 6.0).unwrap();
//! assert_eq!(published, sink.0.last() == Some(&output));
//! ```
//!
//! ## License
//!
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// The main module for the PI controller library.
pub mod pi;

/// The module containing the fixed-capacity history ring buffer backing the controller state.
pub mod history;

/// The module defining the typed operator-command and publish boundaries of the controller.
pub mod command;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
