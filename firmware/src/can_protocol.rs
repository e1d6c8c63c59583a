// CAN communication protocol definitions for the six-step driver

use sixstep::{Error, MotorState, Response, Sector};

/// CAN message IDs
pub mod can_ids {
    /// Emergency stop (any data length)
    pub const EMERGENCY_STOP: u32 = 0x000;

    /// Operator command (key byte, 1 byte: s/h/r/l/t/e)
    pub const COMMAND: u32 = 0x100;

    /// Motor status feedback (state: u8, sector: u8, modulation: u16 ‰, period: u32 µs, 8 bytes)
    pub const STATUS: u32 = 0x200;

    /// Command response (tag: u8, payload up to 7 bytes)
    pub const RESPONSE: u32 = 0x201;
}

/// Response tags (byte 0 of a RESPONSE frame)
pub mod response_tags {
    pub const STARTED: u8 = 0x01;
    pub const ALREADY_RUNNING: u8 = 0x02;
    pub const STOPPED: u8 = 0x03;
    pub const ALREADY_STOPPED: u8 = 0x04;
    /// Followed by the modulation index (u32)
    pub const MODULATION: u8 = 0x05;
    /// Followed by rpm (u16), 0.1 Hz units (u16) and the period (u24 µs)
    pub const SPEED: u8 = 0x06;
    pub const SHUT_DOWN: u8 = 0x07;
    /// Followed by an error code and, for unknown commands, the key
    pub const ERROR: u8 = 0x80;
}

/// Error codes (byte 1 of an ERROR response)
pub mod error_codes {
    pub const STARTUP_FAILED: u8 = 0x01;
    pub const NO_SPEED_DATA: u8 = 0x02;
    pub const UNKNOWN_COMMAND: u8 = 0x03;
    pub const INVALID_CONFIG: u8 = 0x04;
}

/// Largest period the SPEED response can carry [µs]
const MAX_U24: u32 = 0xFF_FFFF;

/// Motor status snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStatus {
    pub state: MotorState,
    pub sector: Option<Sector>,
    /// Modulation index in ‰ of unity
    pub modulation_permille: u16,
    /// Average electrical period [µs], 0 when there is no data
    pub period_us: u32,
}

/// Parse the key byte of a command frame
///
/// # Returns
/// * `Some(key)` if the frame carries at least one byte
/// * `None` for an empty frame
pub fn parse_command_key(data: &[u8]) -> Option<u8> {
    data.first().copied()
}

/// Encode motor status into CAN data
///
/// # Returns
/// 8-byte array containing encoded status
pub fn encode_status(status: &MotorStatus) -> [u8; 8] {
    let mut data = [0u8; 8];

    data[0] = status.state as u8;
    data[1] = status.sector.map_or(0, Sector::number);
    data[2..4].copy_from_slice(&status.modulation_permille.to_le_bytes());
    data[4..8].copy_from_slice(&status.period_us.to_le_bytes());

    data
}

/// Decode motor status from CAN data
///
/// # Returns
/// * `Some(MotorStatus)` if parsing successful
/// * `None` if data length is incorrect
#[allow(dead_code)]
pub fn decode_status(data: &[u8]) -> Option<MotorStatus> {
    if data.len() < 8 {
        return None;
    }

    Some(MotorStatus {
        state: MotorState::from_u8(data[0]),
        sector: Sector::new(data[1]),
        modulation_permille: u16::from_le_bytes([data[2], data[3]]),
        period_us: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
    })
}

/// Encode a command result into a RESPONSE frame payload
///
/// # Returns
/// 8-byte array and the number of bytes used
pub fn encode_response(result: &Result<Response, Error>) -> ([u8; 8], usize) {
    use response_tags::*;

    let mut data = [0u8; 8];
    let len = match result {
        Ok(Response::Started) => {
            data[0] = STARTED;
            1
        }
        Ok(Response::AlreadyRunning) => {
            data[0] = ALREADY_RUNNING;
            1
        }
        Ok(Response::Stopped) => {
            data[0] = STOPPED;
            1
        }
        Ok(Response::AlreadyStopped) => {
            data[0] = ALREADY_STOPPED;
            1
        }
        Ok(Response::Modulation(index)) => {
            data[0] = MODULATION;
            data[1..5].copy_from_slice(&index.to_le_bytes());
            5
        }
        Ok(Response::Speed(reading)) => {
            data[0] = SPEED;
            let rpm = reading.rpm.clamp(0.0, u16::MAX as f32) as u16;
            data[1..3].copy_from_slice(&rpm.to_le_bytes());
            let deci_hz = (reading.hz * 10.0).clamp(0.0, u16::MAX as f32) as u16;
            data[3..5].copy_from_slice(&deci_hz.to_le_bytes());
            let period_us = reading.period_us.min(MAX_U24);
            data[5..8].copy_from_slice(&period_us.to_le_bytes()[..3]);
            8
        }
        Ok(Response::ShutDown) => {
            data[0] = SHUT_DOWN;
            1
        }
        Err(err) => {
            data[0] = ERROR;
            match err {
                Error::StartupFailed => data[1] = error_codes::STARTUP_FAILED,
                Error::NoSpeedData => data[1] = error_codes::NO_SPEED_DATA,
                Error::UnknownCommand(key) => {
                    data[1] = error_codes::UNKNOWN_COMMAND;
                    data[2] = *key;
                }
                Error::InvalidConfig(_) => data[1] = error_codes::INVALID_CONFIG,
            }
            3
        }
    };

    (data, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixstep::SpeedReading;

    #[test]
    fn test_parse_command_key() {
        assert_eq!(parse_command_key(b"s"), Some(b's'));
        assert_eq!(parse_command_key(&[]), None);
    }

    #[test]
    fn test_encode_decode_status() {
        let status = MotorStatus {
            state: MotorState::ClosedLoopRunning,
            sector: Some(Sector::S4),
            modulation_permille: 400,
            period_us: 8_571,
        };

        let encoded = encode_status(&status);
        assert_eq!(encoded[0], 2);
        assert_eq!(encoded[1], 4);
        assert_eq!(decode_status(&encoded), Some(status));
    }

    #[test]
    fn test_status_without_sector() {
        let status = MotorStatus {
            state: MotorState::Stopped,
            sector: None,
            modulation_permille: 0,
            period_us: 0,
        };
        assert_eq!(encode_status(&status)[1], 0);
    }

    #[test]
    fn test_encode_error_response() {
        let (data, len) = encode_response(&Err(Error::UnknownCommand(b'x')));
        assert_eq!(len, 3);
        assert_eq!(&data[..3], &[response_tags::ERROR, error_codes::UNKNOWN_COMMAND, b'x']);
    }

    #[test]
    fn test_encode_speed_response() {
        let reading = SpeedReading::from_period(1_000, 7).unwrap();
        let (data, len) = encode_response(&Ok(Response::Speed(reading)));
        assert_eq!(len, 8);
        assert_eq!(data[0], response_tags::SPEED);
        assert_eq!(u16::from_le_bytes([data[1], data[2]]), 8_571);
        assert_eq!(u16::from_le_bytes([data[3], data[4]]), 1_428);
        assert_eq!(u32::from_le_bytes([data[5], data[6], data[7], 0]), 1_000);
    }

    #[test]
    fn test_speed_response_saturates_period() {
        let reading = SpeedReading::from_period(20_000_000, 1).unwrap();
        let (data, _) = encode_response(&Ok(Response::Speed(reading)));
        assert_eq!(u32::from_le_bytes([data[5], data[6], data[7], 0]), 0xFF_FFFF);
    }

    #[test]
    fn test_encode_modulation_response() {
        let (data, len) = encode_response(&Ok(Response::Modulation(420_000)));
        assert_eq!(len, 5);
        assert_eq!(data[0], response_tags::MODULATION);
        assert_eq!(u32::from_le_bytes([data[1], data[2], data[3], data[4]]), 420_000);
    }
}
