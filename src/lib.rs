//! Six-step (trapezoidal) commutation core for hall-sensored BLDC motors.
//!
//! The crate is written against capability traits ([`PhaseOutput`],
//! [`Timebase`], [`HallInput`]) so the same commutation logic runs on the
//! STM32 firmware and in host tests.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod command;
pub mod commutation;
pub mod commutator;
pub mod config;
pub mod error;
pub mod hall;
pub mod hall_input;
pub mod phase_output;
pub mod supervisor;
pub mod timebase;

#[cfg(test)]
mod test_support;

pub use command::{Command, Response};
pub use commutation::{
    ForcedCommutation, HallTransitionDecoder, ModulationController, MotorState, Phase,
    PhasePattern, Sector, SpeedEstimator, SpeedReading,
};
pub use commutator::Commutator;
pub use config::DriveConfig;
pub use error::{ConfigError, Error};
pub use hall::{HallCode, HallEdge, HallLevel, HallLine};
pub use hall_input::HallInput;
pub use phase_output::PhaseOutput;
pub use supervisor::CommutationSupervisor;
pub use timebase::Timebase;
