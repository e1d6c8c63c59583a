// Six-step commutation building blocks
// Sector table, hall decoder, forced start, modulation and speed estimation

pub mod forced_commutation;
pub mod hall_decoder;
pub mod modulation;
pub mod sector_table;
pub mod speed_estimator;

// Re-export main types for easier access
pub use forced_commutation::ForcedCommutation;
pub use hall_decoder::{HallTransitionDecoder, TickSample, Transition};
pub use modulation::ModulationController;
pub use sector_table::{Phase, PhaseDrive, PhasePattern, Sector};
pub use speed_estimator::{SpeedEstimator, SpeedReading};

/// Motor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MotorState {
    /// All phases off, waiting for a start command
    Stopped = 0,
    /// Open-loop forced commutation running
    ForcedStart = 1,
    /// Hall-sensor commutation running
    ClosedLoopRunning = 2,
}

impl MotorState {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => MotorState::ForcedStart,
            2 => MotorState::ClosedLoopRunning,
            _ => MotorState::Stopped,
        }
    }
}
