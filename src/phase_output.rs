//! Three-phase bridge output abstraction

use crate::commutation::{Phase, PhasePattern};

/// Half-bridge outputs of a three-phase inverter
///
/// Each phase has a PWM duty and an enable. A disabled phase is floating
/// (both switches off); an enabled phase with zero duty is held low.
pub trait PhaseOutput {
    /// Full-scale duty value
    fn max_duty(&self) -> u16;

    /// Set the duty of one phase
    fn set_duty(&mut self, phase: Phase, duty: u16);

    /// Enable or float one phase
    fn set_enable(&mut self, phase: Phase, enabled: bool);

    /// Drive the sector-1 marker output, if the board has one
    fn set_sector_marker(&mut self, _high: bool) {}

    /// Apply a commutation pattern
    ///
    /// The floating phase is released before the other two are driven.
    fn apply(&mut self, pattern: &PhasePattern, duty: u16) {
        self.set_enable(pattern.floating, false);
        for (phase, value) in Phase::ALL.into_iter().zip(pattern.duties(duty)) {
            self.set_duty(phase, value);
        }
        self.set_enable(pattern.modulated, true);
        self.set_enable(pattern.low, true);
    }

    /// De-energize every phase
    fn all_off(&mut self) {
        for phase in Phase::ALL {
            self.set_enable(phase, false);
            self.set_duty(phase, 0);
        }
        self.set_sector_marker(false);
    }
}
