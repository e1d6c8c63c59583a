//! Drive parameters and their defaults

use embassy_time::Duration;

use crate::commutation::ForcedCommutation;
use crate::error::ConfigError;

/// Modulation index representing 100 % duty
pub const MODULATION_UNITY: u32 = 1_000_000;

/// Motor pole pairs
pub const DEFAULT_POLE_PAIRS: u8 = 7;

/// PWM carrier frequency [Hz]
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 20_000;

/// Modulation index when hall-sensor commutation takes over
pub const DEFAULT_CLOSED_LOOP_MODULATION: u32 = 400_000;

/// Modulation index during forced commutation
pub const DEFAULT_FORCED_MODULATION: u32 = 400_000;

/// Forced commutation repetitions (multiplied by pole pairs)
pub const DEFAULT_FORCED_REPETITIONS: u32 = 8;

/// Time spent in each sector during forced commutation [µs]
pub const DEFAULT_FORCED_DWELL_US: u64 = 100;

/// Modulation change per raise/lower command
pub const DEFAULT_MODULATION_STEP: u32 = 20_000;

/// Wait after arming the decoder before checking it has seen an edge [µs]
pub const DEFAULT_CONFIRMATION_DELAY_US: u64 = 50_000;

/// Moving-average window of the speed estimator (electrical periods)
pub const SPEED_FILTER_LEN: usize = 540;

/// Runtime drive configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveConfig {
    /// Motor pole pairs
    pub pole_pairs: u8,
    /// Forced commutation repetitions; total electrical cycles = repetitions × pole pairs
    pub forced_repetitions: u32,
    /// Dwell per sector during forced commutation
    pub forced_dwell: Duration,
    /// Modulation index applied during forced commutation
    pub forced_modulation: u32,
    /// Modulation index applied when the hall decoder is armed
    pub closed_loop_modulation: u32,
    /// Modulation change per raise/lower command
    pub modulation_step: u32,
    /// Time allowed for the first hall edge after arming
    pub confirmation_delay: Duration,
}

impl DriveConfig {
    pub const fn new() -> Self {
        Self {
            pole_pairs: DEFAULT_POLE_PAIRS,
            forced_repetitions: DEFAULT_FORCED_REPETITIONS,
            forced_dwell: Duration::from_micros(DEFAULT_FORCED_DWELL_US),
            forced_modulation: DEFAULT_FORCED_MODULATION,
            closed_loop_modulation: DEFAULT_CLOSED_LOOP_MODULATION,
            modulation_step: DEFAULT_MODULATION_STEP,
            confirmation_delay: Duration::from_micros(DEFAULT_CONFIRMATION_DELAY_US),
        }
    }

    /// Check the configuration before handing it to the supervisor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pole_pairs == 0 {
            return Err(ConfigError::ZeroPolePairs);
        }
        if self.forced_repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if self.forced_dwell.as_ticks() == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        if self.forced_modulation > MODULATION_UNITY
            || self.closed_loop_modulation > MODULATION_UNITY
        {
            return Err(ConfigError::ModulationOutOfRange);
        }
        if self.modulation_step == 0 || self.modulation_step > MODULATION_UNITY {
            return Err(ConfigError::InvalidModulationStep);
        }
        Ok(())
    }

    /// Number of sector writes forced commutation performs
    pub fn forced_steps(&self) -> u32 {
        ForcedCommutation::from_config(self).total_steps()
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self::new()
    }
}
