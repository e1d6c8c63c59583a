// Hall sensor lines, edge events and the 3-bit sensor code

use embassy_time::Instant;

use crate::commutation::Sector;

/// One of the three hall sensor lines
///
/// A, B and C correspond to H1, H2 and H3 on the driver board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HallLine {
    A,
    B,
    C,
}

impl HallLine {
    pub const ALL: [HallLine; 3] = [HallLine::A, HallLine::B, HallLine::C];

    /// Bit of this line inside a [`HallCode`] (A is the most significant)
    const fn mask(self) -> u8 {
        match self {
            HallLine::A => 0b100,
            HallLine::B => 0b010,
            HallLine::C => 0b001,
        }
    }
}

/// Level reported with a hall event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HallLevel {
    Low,
    High,
    /// Input watchdog fired without a level change
    Unchanged,
}

impl HallLevel {
    pub const fn from_bool(high: bool) -> Self {
        if high {
            HallLevel::High
        } else {
            HallLevel::Low
        }
    }
}

/// An event on one hall line, timestamped by the edge context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallEdge {
    /// Line the event belongs to
    pub line: HallLine,
    /// New level of the line
    pub level: HallLevel,
    /// Time the event was observed
    pub at: Instant,
}

impl HallEdge {
    pub const fn new(line: HallLine, level: HallLevel, at: Instant) -> Self {
        Self { line, level, at }
    }

    pub const fn rising(line: HallLine, at: Instant) -> Self {
        Self::new(line, HallLevel::High, at)
    }

    pub const fn falling(line: HallLine, at: Instant) -> Self {
        Self::new(line, HallLevel::Low, at)
    }

    pub const fn unchanged(line: HallLine, at: Instant) -> Self {
        Self::new(line, HallLevel::Unchanged, at)
    }
}

/// Raw hall code, written A B C (A = bit 2)
///
/// Forward rotation walks 011 → 001 → 101 → 100 → 110 → 010. 000 and 111
/// never occur on a healthy sensor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallCode(u8);

impl HallCode {
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn from_levels(a: bool, b: bool, c: bool) -> Self {
        Self(((a as u8) << 2) | ((b as u8) << 1) | c as u8)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn level(self, line: HallLine) -> bool {
        self.0 & line.mask() != 0
    }

    /// Code after `edge` has been applied
    pub const fn with_edge(self, edge: &HallEdge) -> Self {
        match edge.level {
            HallLevel::High => Self(self.0 | edge.line.mask()),
            HallLevel::Low => Self(self.0 & !edge.line.mask()),
            HallLevel::Unchanged => self,
        }
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0b000 && self.0 != 0b111
    }

    /// Sector this code commutates to, `None` for the two invalid codes
    pub const fn sector(self) -> Option<Sector> {
        match self.0 {
            0b011 => Some(Sector::S1),
            0b001 => Some(Sector::S2),
            0b101 => Some(Sector::S3),
            0b100 => Some(Sector::S4),
            0b110 => Some(Sector::S5),
            0b010 => Some(Sector::S6),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_codes() {
        assert!(!HallCode::new(0b000).is_valid());
        assert!(!HallCode::new(0b111).is_valid());
        assert_eq!(HallCode::new(0b000).sector(), None);
        assert_eq!(HallCode::new(0b111).sector(), None);
    }

    #[test]
    fn test_every_valid_code_has_a_distinct_sector() {
        let mut seen = [false; 7];
        for bits in 1..=6u8 {
            let sector = HallCode::new(bits).sector().unwrap();
            assert!(!seen[sector.number() as usize]);
            seen[sector.number() as usize] = true;
        }
    }

    #[test]
    fn test_edges_update_code() {
        let t = Instant::from_micros(0);
        let code = HallCode::from_levels(false, true, false);
        assert_eq!(code.bits(), 0b010);
        let code = code.with_edge(&HallEdge::rising(HallLine::C, t));
        assert_eq!(code.bits(), 0b011);
        assert!(code.level(HallLine::C));
        let code = code.with_edge(&HallEdge::falling(HallLine::B, t));
        assert_eq!(code.bits(), 0b001);
        assert!(!code.level(HallLine::B));
        let code = code.with_edge(&HallEdge::unchanged(HallLine::A, t));
        assert_eq!(code.bits(), 0b001);
    }
}
