// Error types for the commutation core

use core::fmt;

/// Errors reported to the command surface
///
/// None of these are fatal: every path that produces one leaves the motor in
/// the de-energized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Forced commutation finished but no hall edge arrived within the
    /// confirmation delay
    StartupFailed,
    /// No tick deltas recorded yet, the average period is zero
    NoSpeedData,
    /// Command key not recognized
    UnknownCommand(u8),
    /// Drive configuration rejected
    InvalidConfig(ConfigError),
}

/// Reasons a [`DriveConfig`](crate::DriveConfig) is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pole pair count is zero
    ZeroPolePairs,
    /// Forced commutation repetition count is zero
    ZeroRepetitions,
    /// Forced commutation dwell time is zero
    ZeroDwell,
    /// A modulation level exceeds unity
    ModulationOutOfRange,
    /// Modulation step is zero or exceeds unity
    InvalidModulationStep,
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidConfig(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StartupFailed => f.write_str("failed to hand over to hall-sensor commutation"),
            Error::NoSpeedData => f.write_str("no speed data available"),
            Error::UnknownCommand(key) => write!(f, "unknown command: {:#04x}", key),
            Error::InvalidConfig(err) => write!(f, "invalid drive configuration: {}", err),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroPolePairs => "pole pairs must be at least 1",
            ConfigError::ZeroRepetitions => "forced commutation repetitions must be at least 1",
            ConfigError::ZeroDwell => "forced commutation dwell must be non-zero",
            ConfigError::ModulationOutOfRange => "modulation level exceeds unity",
            ConfigError::InvalidModulationStep => "modulation step must be in (0, unity]",
        };
        f.write_str(msg)
    }
}
