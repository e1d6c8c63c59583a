//! Operator commands and their responses

use crate::commutation::SpeedReading;
use crate::error::Error;

/// Operator command, one per key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `s`: forced start, then hand over to hall-sensor commutation
    Start,
    /// `h`: halt
    Stop,
    /// `r`: raise the modulation index by one step
    RaiseModulation,
    /// `l`: lower the modulation index by one step
    LowerModulation,
    /// `t`: report the average speed
    QuerySpeed,
    /// `e`: stop and end the control loop
    Shutdown,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Start,
        Command::Stop,
        Command::RaiseModulation,
        Command::LowerModulation,
        Command::QuerySpeed,
        Command::Shutdown,
    ];

    pub fn from_key(key: u8) -> Result<Self, Error> {
        match key {
            b's' => Ok(Command::Start),
            b'h' => Ok(Command::Stop),
            b'r' => Ok(Command::RaiseModulation),
            b'l' => Ok(Command::LowerModulation),
            b't' => Ok(Command::QuerySpeed),
            b'e' => Ok(Command::Shutdown),
            other => Err(Error::UnknownCommand(other)),
        }
    }

    pub const fn key(self) -> u8 {
        match self {
            Command::Start => b's',
            Command::Stop => b'h',
            Command::RaiseModulation => b'r',
            Command::LowerModulation => b'l',
            Command::QuerySpeed => b't',
            Command::Shutdown => b'e',
        }
    }
}

/// Outcome of a successfully executed command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Hall-sensor commutation took over
    Started,
    /// Start requested while already running; nothing changed
    AlreadyRunning,
    Stopped,
    /// Stop requested while already stopped
    AlreadyStopped,
    /// New modulation index
    Modulation(u32),
    Speed(SpeedReading),
    /// Motor stopped; the control loop should exit
    ShutDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_key(command.key()), Ok(command));
        }
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(Command::from_key(b'x'), Err(Error::UnknownCommand(b'x')));
        assert_eq!(Command::from_key(b'S'), Err(Error::UnknownCommand(b'S')));
        assert_eq!(Command::from_key(b'\n'), Err(Error::UnknownCommand(b'\n')));
    }
}
