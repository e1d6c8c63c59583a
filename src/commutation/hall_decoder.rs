// Hall edge → sector transition decoding

use embassy_time::Instant;

use crate::commutation::Sector;
use crate::hall::{HallCode, HallEdge, HallLevel, HallLine};

/// Timestamp captured on entry into sector 1, once per electrical cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickSample {
    pub at: Instant,
}

/// Result of a recognized hall edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// Sector to commutate to
    pub sector: Sector,
    /// Present when `sector` is sector 1
    pub tick: Option<TickSample>,
}

/// Hall transition decoder
///
/// Six edges advance the sector:
///
/// | edge     | sector |
/// |----------|--------|
/// | C rises  | 1      |
/// | B falls  | 2      |
/// | A rises  | 3      |
/// | C falls  | 4      |
/// | B rises  | 5      |
/// | A falls  | 6      |
///
/// Any other event (a watchdog event without a level change) is ignored and
/// leaves the sector as it was. The sector is chosen by the edge alone; the
/// tracked hall code is informational.
pub struct HallTransitionDecoder {
    sector: Option<Sector>,
    code: HallCode,
    transitions: u32,
}

impl HallTransitionDecoder {
    pub const fn new() -> Self {
        Self {
            sector: None,
            code: HallCode::new(0),
            transitions: 0,
        }
    }

    /// Target sector of a single edge
    pub const fn decode(line: HallLine, level: HallLevel) -> Option<Sector> {
        match (line, level) {
            (HallLine::C, HallLevel::High) => Some(Sector::S1),
            (HallLine::B, HallLevel::Low) => Some(Sector::S2),
            (HallLine::A, HallLevel::High) => Some(Sector::S3),
            (HallLine::C, HallLevel::Low) => Some(Sector::S4),
            (HallLine::B, HallLevel::High) => Some(Sector::S5),
            (HallLine::A, HallLevel::Low) => Some(Sector::S6),
            (_, HallLevel::Unchanged) => None,
        }
    }

    /// Process one edge
    ///
    /// # Returns
    /// * `Some(Transition)` for a recognized edge
    /// * `None` when the edge is ignored; the sector is left unchanged
    pub fn update(&mut self, edge: &HallEdge) -> Option<Transition> {
        self.code = self.code.with_edge(edge);

        let Some(sector) = Self::decode(edge.line, edge.level) else {
            trace!("Ignored hall edge: {}", edge.line as u8);
            return None;
        };

        self.sector = Some(sector);
        self.transitions = self.transitions.wrapping_add(1);

        let tick = (sector == Sector::S1).then_some(TickSample { at: edge.at });
        Some(Transition { sector, tick })
    }

    /// Seed the tracked hall code from a direct read of the sensor lines
    pub fn seed(&mut self, code: HallCode) {
        self.code = code;
    }

    /// Sector of the last recognized edge
    pub fn sector(&self) -> Option<Sector> {
        self.sector
    }

    /// Hall code as tracked from edges
    pub fn hall_code(&self) -> HallCode {
        self.code
    }

    /// Number of recognized transitions since the last reset
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn reset(&mut self) {
        self.sector = None;
        self.code = HallCode::new(0);
        self.transitions = 0;
    }
}

impl Default for HallTransitionDecoder {
    fn default() -> Self {
        Self::new()
    }
}
